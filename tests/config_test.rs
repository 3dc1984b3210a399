//! Integration tests for configuration loading

use scan_station::infra::Config;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[station]
id = "backroom-1"
store_code = "S42"

[scanner]
listener_enabled = false
listener_port = 7800

[export]
dir = "/var/lib/scan-station/exports"

[share]
command = "share-handler"
args = ["--mime", "{mime}", "{file}"]

[metrics]
interval_secs = 5
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.station_id(), "backroom-1");
    assert_eq!(config.default_store_code(), "S42");
    assert!(!config.scanner_listener_enabled());
    assert_eq!(config.scanner_listener_port(), 7800);
    assert_eq!(config.export_dir(), Path::new("/var/lib/scan-station/exports"));
    assert_eq!(config.share_command(), "share-handler");
    assert_eq!(config.share_args(), ["--mime", "{mime}", "{file}"]);
    assert_eq!(config.metrics_interval_secs(), 5);
}

#[test]
fn test_load_from_path_fallback() {
    let config = Config::load_from_path("/nonexistent/config.toml");
    assert_eq!(config.station_id(), "scan-station");
    assert!(config.scanner_listener_enabled());
    assert_eq!(config.scanner_listener_port(), 7711);
    assert_eq!(config.share_command(), "xdg-open");
}

#[test]
fn test_missing_sections_use_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[station]\nid = \"front-desk\"\n").unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();
    assert_eq!(config.station_id(), "front-desk");
    assert_eq!(config.default_store_code(), "");
    assert_eq!(config.scanner_listener_port(), 7711);
    assert_eq!(config.export_dir(), Path::new("exports"));
    assert_eq!(config.metrics_interval_secs(), 30);
}
