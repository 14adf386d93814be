//! Periodic refresh scheduling.
//!
//! [`RefreshScheduler`] decides *when* a view refreshes; the refresh itself is a
//! callback returning a future. One scheduler drives one view and runs its
//! cycles strictly one after another: a cycle that is still fetching delays the
//! next tick instead of overlapping with it.
//!
//! Time comes from a [`Clock`], so tests drive ticks by advancing a
//! [`ManualClock`] and calling [`RefreshScheduler::tick`]. In the server,
//! [`SharedScheduler::run`] sleeps on tokio timers between ticks.
//!
//! A slow upstream fetch starves the view: while one cycle waits on the
//! network no further cycle starts. At the default 5 second cadence and a 10
//! second fetch timeout the view at worst skips ticks.

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use crate::error::{EngineError, EngineResult};

/// Refresh cadence used when none is configured.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Work run on every tick. Receives the tick time.
pub type RefreshCallback = Box<dyn FnMut(DateTime<Utc>) -> BoxFuture<'static, ()> + Send>;

struct ActiveTimer {
    interval: chrono::Duration,
    next_due: DateTime<Utc>,
    callback: RefreshCallback,
}

/// Start/stop-able periodic timer for one view.
pub struct RefreshScheduler {
    clock: Arc<dyn Clock>,
    active: Option<ActiveTimer>,
}

impl RefreshScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            active: None,
        }
    }

    /// Scheduler on wall-clock time.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Begin ticking every `interval`. The first tick is due immediately.
    ///
    /// Returns `Ok(false)` without replacing the callback when already running.
    ///
    /// # Errors
    /// `InvalidInput` for a zero or unrepresentable interval.
    pub fn start<F, Fut>(&mut self, interval: Duration, mut callback: F) -> EngineResult<bool>
    where
        F: FnMut(DateTime<Utc>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.active.is_some() {
            return Ok(false);
        }
        if interval.is_zero() {
            return Err(EngineError::invalid_input("refresh interval must be non-zero"));
        }
        let interval = chrono::Duration::from_std(interval).map_err(|e| {
            EngineError::invalid_input(format!("refresh interval out of range: {}", e))
        })?;

        self.active = Some(ActiveTimer {
            interval,
            next_due: self.clock.now(),
            callback: Box::new(move |now| callback(now).boxed()),
        });
        Ok(true)
    }

    /// Cancel future ticks. Returns `false` when it was not running.
    pub fn stop(&mut self) -> bool {
        self.active.take().is_some()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn interval(&self) -> Option<Duration> {
        self.active.as_ref().and_then(|a| a.interval.to_std().ok())
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|a| a.next_due)
    }

    /// Time left until the next tick, zero when overdue, `None` when stopped.
    pub fn time_until_due(&self) -> Option<Duration> {
        let next_due = self.next_due()?;
        Some(
            next_due
                .signed_duration_since(self.clock.now())
                .to_std()
                .unwrap_or(Duration::ZERO),
        )
    }

    /// If a tick is due, schedule the following one and hand back this tick's
    /// cycle for the caller to await.
    pub fn poll_due(&mut self) -> Option<BoxFuture<'static, ()>> {
        let now = self.clock.now();
        let active = self.active.as_mut()?;
        if now < active.next_due {
            return None;
        }
        active.next_due = now + active.interval;
        Some((active.callback)(now))
    }

    /// Run the due cycle to completion. Returns whether one ran.
    pub async fn tick(&mut self) -> bool {
        match self.poll_due() {
            Some(cycle) => {
                cycle.await;
                true
            }
            None => false,
        }
    }
}

/// A scheduler shared between its driver task and whoever starts/stops it.
#[derive(Clone)]
pub struct SharedScheduler {
    inner: Arc<Mutex<RefreshScheduler>>,
    wake: Arc<Notify>,
}

impl SharedScheduler {
    pub fn new(scheduler: RefreshScheduler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn start<F, Fut>(&self, interval: Duration, callback: F) -> EngineResult<bool>
    where
        F: FnMut(DateTime<Utc>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let started = self.inner.lock().start(interval, callback)?;
        if started {
            self.wake.notify_one();
        }
        Ok(started)
    }

    pub fn stop(&self) -> bool {
        let stopped = self.inner.lock().stop();
        self.wake.notify_one();
        stopped
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().is_running()
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().next_due()
    }

    /// Run the due cycle, if any, without holding the lock while it runs.
    pub async fn tick(&self) -> bool {
        let cycle = self.inner.lock().poll_due();
        match cycle {
            Some(cycle) => {
                cycle.await;
                true
            }
            None => false,
        }
    }

    /// Tick forever, sleeping until the next due time. While stopped, waits for
    /// `start` (or at most `idle`) before checking again.
    pub async fn run(self, idle: Duration) {
        loop {
            self.tick().await;
            let wait = self.inner.lock().time_until_due().unwrap_or(idle);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = self.wake.notified() => {}
            }
        }
    }

    /// Spawn [`run`](Self::run) on the tokio runtime.
    pub fn spawn(&self, idle: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.clone().run(idle))
    }
}
