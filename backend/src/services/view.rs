//! A view: one map kept fresh by its own scheduler.
//!
//! Activating a view starts its scheduler; every tick fetches vehicle
//! positions, runs the pipeline and publishes the frame. Deactivating stops the
//! scheduler and bumps the view epoch. A cycle that was already waiting on the
//! feed when that happened notices the epoch change and drops its result, so a
//! hidden view never publishes.
//!
//! The epoch lock is held while the scheduler starts or stops and while a
//! cycle checks its epoch and publishes, so an activation racing a
//! deactivation cannot leave a running scheduler on a stale epoch.

use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::pipeline::ViewPipeline;
use crate::error::EngineResult;
use crate::feed::{fetch_or_empty, TransitFeed};
use crate::models::{Frame, LineId, ViewId};
use crate::render::{Layout, RenderSink};
use crate::scheduler::{Clock, RefreshScheduler, SharedScheduler};

struct ViewCore {
    id: ViewId,
    pipeline: Mutex<ViewPipeline>,
    feed: Arc<dyn TransitFeed>,
    sink: Arc<dyn RenderSink>,
    epoch: Mutex<u64>,
}

impl ViewCore {
    /// Fetch, build and publish. Returns `None` when the cycle was discarded
    /// because the view changed state while the fetch was in flight.
    async fn cycle(&self, epoch: u64, now: DateTime<Utc>) -> Option<Frame> {
        let vehicles = fetch_or_empty(self.feed.as_ref()).await;

        let current = self.epoch.lock();
        if *current != epoch {
            debug!("view {}: discarding cycle started before deactivation", self.id);
            return None;
        }

        let frame = self.pipeline.lock().run(&vehicles, now);
        debug!(
            "view {}: {} vehicles, {} occupied stations",
            self.id,
            vehicles.len(),
            frame.occupied_count()
        );
        self.sink.publish(&self.id, frame.clone(), now);
        drop(current);
        Some(frame)
    }
}

/// A named map with its pipeline, scheduler and collaborators.
pub struct View {
    core: Arc<ViewCore>,
    layout: Layout,
    interval: Duration,
    clock: Arc<dyn Clock>,
    scheduler: SharedScheduler,
}

impl View {
    pub fn new(
        id: ViewId,
        layout: Layout,
        pipeline: ViewPipeline,
        feed: Arc<dyn TransitFeed>,
        sink: Arc<dyn RenderSink>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        let scheduler = SharedScheduler::new(RefreshScheduler::new(Arc::clone(&clock)));
        Self {
            core: Arc::new(ViewCore {
                id,
                pipeline: Mutex::new(pipeline),
                feed,
                sink,
                epoch: Mutex::new(0),
            }),
            layout,
            interval,
            clock,
            scheduler,
        }
    }

    pub fn id(&self) -> &ViewId {
        &self.core.id
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn line_ids(&self) -> Vec<LineId> {
        self.core.pipeline.lock().line_ids()
    }

    pub fn is_active(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Current epoch; bumped on every deactivation.
    pub fn epoch(&self) -> u64 {
        *self.core.epoch.lock()
    }

    /// Start refreshing. The first cycle is due immediately.
    ///
    /// Returns `Ok(false)` if the view was already active.
    pub fn activate(&self) -> EngineResult<bool> {
        let guard = self.core.epoch.lock();
        let epoch = *guard;
        let core = Arc::clone(&self.core);
        let started = self.scheduler.start(self.interval, move |now| {
            let core = Arc::clone(&core);
            async move {
                core.cycle(epoch, now).await;
            }
        })?;
        drop(guard);
        if started {
            info!("view {} activated (every {:?})", self.id(), self.interval);
        }
        Ok(started)
    }

    /// Stop refreshing and discard any cycle still in flight.
    ///
    /// Returns `false` if the view was not active.
    pub fn deactivate(&self) -> bool {
        let mut epoch = self.core.epoch.lock();
        *epoch += 1;
        let stopped = self.scheduler.stop();
        drop(epoch);
        if stopped {
            info!("view {} deactivated", self.id());
        }
        stopped
    }

    /// Run one cycle now, regardless of the schedule, and publish it.
    pub async fn refresh_once(&self) -> Option<Frame> {
        let now = self.clock.now();
        self.core.cycle(self.epoch(), now).await
    }

    /// Run the scheduled cycle if one is due. Returns whether one ran.
    pub async fn tick(&self) -> bool {
        self.scheduler.tick().await
    }

    /// Drive this view's scheduler on its own task until the runtime shuts
    /// down. While inactive the driver parks until activation.
    pub fn spawn_driver(&self, idle: Duration) -> JoinHandle<()> {
        self.scheduler.spawn(idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewKind;
    use crate::feed::ScriptedFeed;
    use crate::models::VehicleReport;
    use crate::registry::{StaticRegistry, StationRegistry};
    use crate::scheduler::ManualClock;
    use crate::services::pipeline::DetectorSettings;
    use crate::services::SnapshotStore;

    fn view(feed: Arc<ScriptedFeed>, store: SnapshotStore, clock: ManualClock) -> View {
        let registry = StaticRegistry::bundled().unwrap();
        let pipeline = ViewPipeline::for_view(
            &ViewKind::Line {
                line: "blue".into(),
            },
            &registry,
            DetectorSettings::default(),
        )
        .unwrap();
        View::new(
            ViewId::new("blue"),
            Layout::Vertical,
            pipeline,
            feed,
            Arc::new(store),
            Arc::new(clock),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_activate_publishes_immediately() {
        let feed = Arc::new(ScriptedFeed::new());
        let store = SnapshotStore::new();
        let clock = ManualClock::default();
        let view = view(Arc::clone(&feed), store.clone(), clock.clone());

        assert!(view.activate().unwrap());
        assert!(!view.activate().unwrap());
        assert!(view.tick().await);

        let snapshot = store.get("blue").unwrap();
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.refreshed_at, Some(clock.now()));
        assert_eq!(feed.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_deactivated_view_stops_publishing() {
        let feed = Arc::new(ScriptedFeed::new());
        let store = SnapshotStore::new();
        let clock = ManualClock::default();
        let view = view(feed, store.clone(), clock.clone());

        view.activate().unwrap();
        view.tick().await;
        assert!(view.deactivate());
        assert!(!view.deactivate());
        assert!(!view.is_active());

        clock.advance(chrono::Duration::seconds(30));
        assert!(!view.tick().await);
        assert_eq!(store.version("blue"), Some(1));
    }

    #[tokio::test]
    async fn test_refresh_once_runs_off_schedule() {
        let feed = Arc::new(ScriptedFeed::new());
        let registry = StaticRegistry::bundled().unwrap();
        let station = registry.line("blue").unwrap().stations[0].clone();
        feed.push_vehicles(vec![VehicleReport::new(
            "1",
            "901",
            station.latitude,
            station.longitude,
            Utc::now(),
        )]);
        let store = SnapshotStore::new();
        let view = view(feed, store.clone(), ManualClock::default());

        let frame = view.refresh_once().await.unwrap();
        assert_eq!(frame.occupied_count(), 1);
        assert!(!view.is_active());
        assert_eq!(store.version("blue"), Some(1));
        assert_eq!(view.line_ids(), vec![LineId::new("blue")]);
    }

    #[tokio::test]
    async fn test_epoch_bumps_on_deactivate() {
        let view = view(
            Arc::new(ScriptedFeed::new()),
            SnapshotStore::new(),
            ManualClock::default(),
        );
        assert_eq!(view.epoch(), 0);
        view.deactivate();
        assert_eq!(view.epoch(), 1);
    }

    #[tokio::test]
    async fn test_racing_activate_and_deactivate_never_wedges() {
        let store = SnapshotStore::new();
        let view = Arc::new(view(
            Arc::new(ScriptedFeed::new()),
            store.clone(),
            ManualClock::default(),
        ));

        let mut published = 0;
        for _ in 0..500 {
            view.deactivate();
            let barrier = std::sync::Barrier::new(2);
            std::thread::scope(|scope| {
                scope.spawn(|| {
                    barrier.wait();
                    view.deactivate();
                });
                barrier.wait();
                view.activate().unwrap();
            });

            // Whichever call won, an active view must still publish
            if view.is_active() {
                assert!(view.tick().await);
                published += 1;
                assert_eq!(store.version("blue"), Some(published));
            }
        }
    }
}
