//! Application configuration.
//!
//! Settings are read from a `linemap.toml` file; every field has a default so
//! an empty (or missing) file describes the Metro Transit Blue/Green
//! deployment. A few deployment knobs can be overridden from the environment.
//!
//! ```toml
//! [refresh]
//! interval_secs = 5
//!
//! [direction]
//! latitude = 0.0001
//! longitude = 0.00005
//! stale_after_secs = 600
//!
//! [[views]]
//! id = "blue"
//! kind = "line"
//! line = "blue"
//!
//! [[views]]
//! id = "combined"
//! kind = "combined"
//! left = "blue"
//! right = "green"
//! ```

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::DirectionThresholds;
use crate::error::{EngineError, EngineResult};
use crate::models::ViewId;
use crate::registry::StationRegistry;
use crate::render::Layout;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "LINEMAP_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub direction: DirectionConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_views")]
    pub views: Vec<ViewConfig>,
}

/// Upstream endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_vehicle_positions_url")]
    pub vehicle_positions_url: String,
    #[serde(default = "default_trip_updates_url")]
    pub trip_updates_url: String,
    #[serde(default = "default_alerts_url")]
    pub alerts_url: String,
    #[serde(default = "default_routes_url")]
    pub routes_url: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

/// Direction inference tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionConfig {
    #[serde(flatten)]
    pub thresholds: DirectionThresholds,
    /// Forget vehicles not seen for this long. `0` keeps them forever.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Station registry file; the bundled registry when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// One map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub id: ViewId,
    #[serde(flatten)]
    pub kind: ViewKind,
    /// Text layout for single-line views
    #[serde(default)]
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ViewKind {
    Line { line: String },
    Combined { left: String, right: String },
}

impl ViewKind {
    /// Line ids this view draws, left first.
    pub fn line_ids(&self) -> Vec<&str> {
        match self {
            ViewKind::Line { line } => vec![line.as_str()],
            ViewKind::Combined { left, right } => vec![left.as_str(), right.as_str()],
        }
    }
}

fn default_vehicle_positions_url() -> String {
    "https://svc.metrotransit.org/mtgtfs/vehiclepositions.pb".to_string()
}

fn default_trip_updates_url() -> String {
    "https://svc.metrotransit.org/mtgtfs/tripupdates.pb".to_string()
}

fn default_alerts_url() -> String {
    "https://svc.metrotransit.org/mtgtfs/alerts.pb".to_string()
}

fn default_routes_url() -> String {
    "https://svc.metrotransit.org/nextripv2/routes".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_interval_secs() -> u64 {
    5
}

fn default_stale_after_secs() -> u64 {
    600
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_views() -> Vec<ViewConfig> {
    let line = |id: &str, line: &str, layout| ViewConfig {
        id: ViewId::new(id),
        kind: ViewKind::Line {
            line: line.to_string(),
        },
        layout,
    };
    vec![
        line("blue", "blue", Layout::Vertical),
        line("green", "green", Layout::Vertical),
        line("horizontal", "blue", Layout::Horizontal),
        ViewConfig {
            id: ViewId::new("combined"),
            kind: ViewKind::Combined {
                left: "blue".to_string(),
                right: "green".to_string(),
            },
            layout: Layout::Vertical,
        },
    ]
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            vehicle_positions_url: default_vehicle_positions_url(),
            trip_updates_url: default_trip_updates_url(),
            alerts_url: default_alerts_url(),
            routes_url: default_routes_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl Default for DirectionConfig {
    fn default() -> Self {
        Self {
            thresholds: DirectionThresholds::default(),
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            refresh: RefreshConfig::default(),
            direction: DirectionConfig::default(),
            registry: RegistryConfig::default(),
            server: ServerConfig::default(),
            views: default_views(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// `Configuration` if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            EngineError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from the default location.
    ///
    /// Uses `LINEMAP_CONFIG` when set (the file must exist), otherwise the
    /// first `linemap.toml` found in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    ///
    /// Falls back to [`AppConfig::default`] when none exists.
    pub fn from_default_location() -> EngineResult<Self> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            info!("Loading configuration from {} ({})", path, CONFIG_PATH_ENV);
            return Self::from_file(path);
        }

        let search_paths = [
            PathBuf::from("linemap.toml"),
            PathBuf::from("backend/linemap.toml"),
            PathBuf::from("../linemap.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                info!("Loading configuration from {}", path.display());
                return Self::from_file(&path);
            }
        }

        info!("No linemap.toml found, using built-in defaults");
        Ok(Self::default())
    }

    /// Apply `HOST`, `PORT` and `LINEMAP_REFRESH_SECS` overrides.
    ///
    /// # Errors
    /// `Configuration` if a numeric override does not parse.
    pub fn apply_env_overrides(&mut self) -> EngineResult<()> {
        if let Ok(host) = env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port.parse().map_err(|_| {
                EngineError::configuration(format!("PORT must be a valid port number, got '{}'", port))
            })?;
        }
        if let Ok(secs) = env::var("LINEMAP_REFRESH_SECS") {
            self.refresh.interval_secs = secs.parse().map_err(|_| {
                EngineError::configuration(format!(
                    "LINEMAP_REFRESH_SECS must be a whole number of seconds, got '{}'",
                    secs
                ))
            })?;
        }
        Ok(())
    }

    /// [`from_default_location`](Self::from_default_location) followed by
    /// environment overrides.
    pub fn load() -> EngineResult<Self> {
        let mut config = Self::from_default_location()?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Check the configuration against itself and the station registry.
    ///
    /// # Errors
    /// `Configuration` for a zero refresh interval or fetch timeout,
    /// non-positive thresholds or duplicate view ids. `UnknownLine` when a
    /// view names a line missing from the registry.
    pub fn validate(&self, registry: &dyn StationRegistry) -> EngineResult<()> {
        if self.refresh.interval_secs == 0 {
            return Err(EngineError::configuration("refresh.interval_secs must be positive"));
        }
        if self.feed.timeout_secs == 0 {
            return Err(EngineError::configuration("feed.timeout_secs must be positive"));
        }

        let thresholds = &self.direction.thresholds;
        for (name, value) in [("latitude", thresholds.latitude), ("longitude", thresholds.longitude)] {
            if value.is_nan() || value <= 0.0 {
                return Err(EngineError::configuration(format!(
                    "direction.{} threshold must be positive, got {}",
                    name, value
                )));
            }
        }

        let mut seen = HashSet::new();
        for view in &self.views {
            if !seen.insert(view.id.clone()) {
                return Err(EngineError::configuration(format!(
                    "duplicate view id '{}'",
                    view.id
                )));
            }
            for line_id in view.kind.line_ids() {
                registry.line(line_id)?;
            }
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }

    /// Staleness window for direction state, `None` when disabled.
    pub fn stale_after(&self) -> Option<chrono::Duration> {
        match self.direction.stale_after_secs {
            0 => None,
            secs => i64::try_from(secs).ok().map(chrono::Duration::seconds),
        }
    }
}
