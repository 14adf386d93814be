mod support;

use std::io::Write;
use std::time::Duration;

use metro_linemap::config::{AppConfig, ViewKind, CONFIG_PATH_ENV};
use metro_linemap::error::EngineError;
use metro_linemap::registry::{StaticRegistry, StationRegistry};
use metro_linemap::render::Layout;

const OVERRIDE_VARS: [&str; 3] = ["HOST", "PORT", "LINEMAP_REFRESH_SECS"];

fn config_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn without_overrides<'a>(mut changes: Vec<(&'a str, Option<&'a str>)>) -> Vec<(&'a str, Option<&'a str>)> {
    for var in OVERRIDE_VARS {
        if !changes.iter().any(|(k, _)| *k == var) {
            changes.push((var, None));
        }
    }
    changes
}

#[test]
fn test_load_from_config_path_env() {
    let file = config_file(
        r#"
[refresh]
interval_secs = 15

[[views]]
id = "east"
kind = "line"
line = "green"
layout = "horizontal"
"#,
    );
    let path = file.path().to_str().unwrap();

    let config = support::with_scoped_env(
        &without_overrides(vec![(CONFIG_PATH_ENV, Some(path))]),
        AppConfig::load,
    )
    .unwrap();

    assert_eq!(config.refresh_interval(), Duration::from_secs(15));
    assert_eq!(config.views.len(), 1);
    assert_eq!(config.views[0].layout, Layout::Horizontal);
    assert!(matches!(&config.views[0].kind, ViewKind::Line { line } if line == "green"));
    // Sections left out keep their defaults
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.stale_after(), Some(chrono::Duration::seconds(600)));

    config.validate(&StaticRegistry::bundled().unwrap()).unwrap();
}

#[test]
fn test_missing_config_path_is_an_error() {
    let result = support::with_scoped_env(
        &without_overrides(vec![(CONFIG_PATH_ENV, Some("/nonexistent/linemap.toml"))]),
        AppConfig::load,
    );
    assert!(matches!(result, Err(EngineError::Configuration(_))));
}

#[test]
fn test_env_overrides() {
    let file = config_file("[server]\nport = 9000\n");
    let path = file.path().to_str().unwrap();

    let config = support::with_scoped_env(
        &[
            (CONFIG_PATH_ENV, Some(path)),
            ("HOST", Some("127.0.0.1")),
            ("PORT", Some("3001")),
            ("LINEMAP_REFRESH_SECS", Some("30")),
        ],
        AppConfig::load,
    )
    .unwrap();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 3001);
    assert_eq!(config.refresh.interval_secs, 30);
}

#[test]
fn test_invalid_port_override_is_an_error() {
    let file = config_file("");
    let path = file.path().to_str().unwrap();

    let result = support::with_scoped_env(
        &without_overrides(vec![(CONFIG_PATH_ENV, Some(path)), ("PORT", Some("eighty"))]),
        AppConfig::load,
    );
    match result {
        Err(EngineError::Configuration(msg)) => assert!(msg.contains("eighty")),
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

#[test]
fn test_registry_from_file() {
    let file = config_file(support::ABC_REGISTRY);
    let registry = StaticRegistry::load(Some(file.path())).unwrap();

    let line = registry.line("abc").unwrap();
    assert_eq!(line.route_id, "R1");
    assert_eq!(line.station_count(), 3);
    assert_eq!(line.stations[2].index, 2);
    assert!(registry.line("blue").is_err());
}

#[test]
fn test_config_rejects_view_on_unknown_line() {
    let config = AppConfig::from_toml_str(
        r#"
[[views]]
id = "both"
kind = "combined"
left = "abc"
right = "blue"
"#,
    )
    .unwrap();

    let err = config.validate(&support::abc_registry()).unwrap_err();
    assert_eq!(err, EngineError::UnknownLine("blue".into()));
}
