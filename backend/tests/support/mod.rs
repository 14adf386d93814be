#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;

use metro_linemap::config::{AppConfig, ViewConfig, ViewKind};
use metro_linemap::engine::DirectionThresholds;
use metro_linemap::feed::TransitFeed;
use metro_linemap::models::{VehicleReport, ViewId};
use metro_linemap::registry::StaticRegistry;
use metro_linemap::render::Layout;
use metro_linemap::scheduler::ManualClock;
use metro_linemap::services::{SnapshotStore, ViewSet};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Three stations one degree apart on a north/south line:
/// A@(0,0) B@(1,0) C@(2,0), route "R1".
pub const ABC_REGISTRY: &str = r#"
[[lines]]
id = "abc"
name = "ABC Line"
route_id = "R1"
axis = "latitude"

[[lines.stations]]
name = "A"
latitude = 0.0
longitude = 0.0

[[lines.stations]]
name = "B"
latitude = 1.0
longitude = 0.0

[[lines.stations]]
name = "C"
latitude = 2.0
longitude = 0.0
"#;

pub fn abc_registry() -> StaticRegistry {
    StaticRegistry::from_toml_str(ABC_REGISTRY).unwrap()
}

/// Single view "abc" over the ABC line with a 0.5 degree latitude threshold.
pub fn abc_config() -> AppConfig {
    AppConfig {
        direction: metro_linemap::config::DirectionConfig {
            thresholds: DirectionThresholds::new(0.5, 0.5),
            stale_after_secs: 0,
        },
        views: vec![ViewConfig {
            id: ViewId::new("abc"),
            kind: ViewKind::Line { line: "abc".into() },
            layout: Layout::Vertical,
        }],
        ..AppConfig::default()
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

pub fn report(vehicle_id: &str, route_id: &str, latitude: f64, longitude: f64) -> VehicleReport {
    VehicleReport::new(vehicle_id, route_id, latitude, longitude, t0())
}

/// Views for `config` over `registry`, publishing into a fresh store.
pub fn build_views(
    config: &AppConfig,
    registry: &StaticRegistry,
    feed: Arc<dyn TransitFeed>,
    clock: &ManualClock,
) -> (ViewSet, SnapshotStore) {
    let store = SnapshotStore::new();
    let views = ViewSet::from_config(
        config,
        registry,
        feed,
        Arc::new(store.clone()),
        Arc::new(clock.clone()),
    )
    .unwrap();
    for id in views.ids() {
        store.register(&id);
    }
    (views, store)
}
