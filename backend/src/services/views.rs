use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::pipeline::{DetectorSettings, ViewPipeline};
use super::view::View;
use crate::config::AppConfig;
use crate::error::EngineResult;
use crate::feed::TransitFeed;
use crate::models::ViewId;
use crate::registry::StationRegistry;
use crate::render::RenderSink;
use crate::scheduler::Clock;

/// How long an idle driver waits before re-checking its scheduler.
pub const DRIVER_IDLE: Duration = Duration::from_secs(1);

/// Every configured view, in configuration order.
#[derive(Clone, Default)]
pub struct ViewSet {
    views: Vec<Arc<View>>,
}

impl ViewSet {
    pub fn new(views: Vec<View>) -> Self {
        Self {
            views: views.into_iter().map(Arc::new).collect(),
        }
    }

    /// Build one view per `[[views]]` entry.
    ///
    /// # Errors
    /// `UnknownLine` if a view references a line the registry lacks.
    pub fn from_config(
        config: &AppConfig,
        registry: &dyn StationRegistry,
        feed: Arc<dyn TransitFeed>,
        sink: Arc<dyn RenderSink>,
        clock: Arc<dyn Clock>,
    ) -> EngineResult<Self> {
        let settings = DetectorSettings {
            thresholds: config.direction.thresholds,
            stale_after: config.stale_after(),
        };

        let views = config
            .views
            .iter()
            .map(|view| {
                let pipeline = ViewPipeline::for_view(&view.kind, registry, settings)?;
                Ok(View::new(
                    view.id.clone(),
                    view.layout,
                    pipeline,
                    Arc::clone(&feed),
                    Arc::clone(&sink),
                    Arc::clone(&clock),
                    config.refresh_interval(),
                ))
            })
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(Self::new(views))
    }

    pub fn get(&self, view_id: &str) -> Option<Arc<View>> {
        self.views
            .iter()
            .find(|v| v.id().as_str() == view_id)
            .cloned()
    }

    pub fn ids(&self) -> Vec<ViewId> {
        self.views.iter().map(|v| v.id().clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<View>> {
        self.views.iter()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Activate every view. Returns how many were started.
    pub fn activate_all(&self) -> EngineResult<usize> {
        let mut started = 0;
        for view in &self.views {
            if view.activate()? {
                started += 1;
            }
        }
        Ok(started)
    }

    pub fn deactivate_all(&self) -> usize {
        self.views.iter().filter(|v| v.deactivate()).count()
    }

    /// One driver task per view.
    pub fn spawn_drivers(&self) -> Vec<JoinHandle<()>> {
        self.views
            .iter()
            .map(|view| view.spawn_driver(DRIVER_IDLE))
            .collect()
    }
}
