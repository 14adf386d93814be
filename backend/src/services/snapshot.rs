//! Latest published frame per view.
//!
//! The store is the [`RenderSink`] the server hands to every view. HTTP
//! handlers read from it; they never touch a view's pipeline directly.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{Frame, ViewId};
use crate::render::RenderSink;

/// What a view currently shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    pub view_id: ViewId,
    /// `None` until the first cycle has been published
    pub frame: Option<Frame>,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Incremented on every publish
    pub version: u64,
}

impl ViewSnapshot {
    fn empty(view_id: ViewId) -> Self {
        Self {
            view_id,
            frame: None,
            refreshed_at: None,
            version: 0,
        }
    }
}

/// In-memory snapshot store.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    snapshots: Arc<RwLock<HashMap<ViewId, ViewSnapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a view known before its first frame arrives. No-op if already
    /// registered.
    pub fn register(&self, view_id: &ViewId) {
        self.snapshots
            .write()
            .entry(view_id.clone())
            .or_insert_with(|| ViewSnapshot::empty(view_id.clone()));
    }

    pub fn get(&self, view_id: &str) -> Option<ViewSnapshot> {
        self.snapshots.read().get(view_id).cloned()
    }

    /// Publish counter of a view, `None` for unknown views.
    pub fn version(&self, view_id: &str) -> Option<u64> {
        self.snapshots.read().get(view_id).map(|s| s.version)
    }

    /// All snapshots ordered by view id.
    pub fn list(&self) -> Vec<ViewSnapshot> {
        let mut snapshots: Vec<ViewSnapshot> = self.snapshots.read().values().cloned().collect();
        snapshots.sort_by(|a, b| a.view_id.cmp(&b.view_id));
        snapshots
    }
}

impl RenderSink for SnapshotStore {
    fn publish(&self, view_id: &ViewId, frame: Frame, refreshed_at: DateTime<Utc>) {
        let mut snapshots = self.snapshots.write();
        let snapshot = snapshots
            .entry(view_id.clone())
            .or_insert_with(|| ViewSnapshot::empty(view_id.clone()));
        snapshot.frame = Some(frame);
        snapshot.refreshed_at = Some(refreshed_at);
        snapshot.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Axis, LineHeader, LineId, LineMap};

    fn frame(at: DateTime<Utc>) -> Frame {
        Frame::Line(LineMap {
            line: LineHeader {
                line_id: LineId::new("blue"),
                line_name: "Blue Line".into(),
                axis: Axis::Latitude,
            },
            entries: vec![],
            refreshed_at: at,
        })
    }

    #[test]
    fn test_register_then_publish() {
        let store = SnapshotStore::new();
        let id = ViewId::new("blue");
        store.register(&id);

        let snapshot = store.get("blue").unwrap();
        assert!(snapshot.frame.is_none());
        assert_eq!(snapshot.version, 0);

        let now = Utc::now();
        store.publish(&id, frame(now), now);
        let snapshot = store.get("blue").unwrap();
        assert_eq!(snapshot.refreshed_at, Some(now));
        assert_eq!(snapshot.version, 1);
    }

    #[test]
    fn test_publish_replaces_previous_frame() {
        let store = SnapshotStore::new();
        let id = ViewId::new("blue");
        let first = Utc::now();
        let second = first + chrono::Duration::seconds(5);

        store.publish(&id, frame(first), first);
        store.publish(&id, frame(second), second);

        let snapshot = store.get("blue").unwrap();
        assert_eq!(snapshot.frame.map(|f| f.refreshed_at()), Some(second));
        assert_eq!(store.version("blue"), Some(2));
    }

    #[test]
    fn test_register_keeps_existing_snapshot() {
        let store = SnapshotStore::new();
        let id = ViewId::new("green");
        let now = Utc::now();
        store.publish(&id, frame(now), now);
        store.register(&id);
        assert_eq!(store.version("green"), Some(1));
    }

    #[test]
    fn test_unknown_view() {
        let store = SnapshotStore::new();
        assert!(store.get("nope").is_none());
        assert_eq!(store.version("nope"), None);
    }

    #[test]
    fn test_list_sorted() {
        let store = SnapshotStore::new();
        store.register(&ViewId::new("green"));
        store.register(&ViewId::new("blue"));
        let ids: Vec<String> = store.list().into_iter().map(|s| s.view_id.0).collect();
        assert_eq!(ids, vec!["blue", "green"]);
    }
}
