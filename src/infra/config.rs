//! Configuration loading from TOML files
//!
//! Config file is selected via the --config command line argument of each
//! binary; a missing or unreadable file falls back to built-in defaults
//! with a warning.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    /// Station identifier shown in logs and the console header
    #[serde(default = "default_station_id")]
    pub id: String,
    /// Store code preloaded at startup ("" = operator supplies it)
    #[serde(default)]
    pub store_code: String,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self { id: default_station_id(), store_code: String::new() }
    }
}

fn default_station_id() -> String {
    "scan-station".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Enable the scanner TCP listener
    #[serde(default = "default_scanner_enabled")]
    pub listener_enabled: bool,
    /// Scanner TCP listener port
    #[serde(default = "default_scanner_port")]
    pub listener_port: u16,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self { listener_enabled: default_scanner_enabled(), listener_port: default_scanner_port() }
    }
}

fn default_scanner_enabled() -> bool {
    true
}

fn default_scanner_port() -> u16 {
    7711
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Directory for exported CSV files
    #[serde(default = "default_export_dir")]
    pub dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { dir: default_export_dir() }
    }
}

fn default_export_dir() -> String {
    "exports".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareConfig {
    /// Handler command receiving the exported file
    #[serde(default = "default_share_command")]
    pub command: String,
    /// Handler arguments; {file} and {mime} placeholders are substituted
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self { command: default_share_command(), args: Vec::new() }
    }
}

fn default_share_command() -> String {
    "xdg-open".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Seconds between counter summary log lines
    #[serde(default = "default_metrics_interval")]
    pub interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { interval_secs: default_metrics_interval() }
    }
}

fn default_metrics_interval() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub station: StationConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub share: ShareConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    station_id: String,
    default_store_code: String,
    scanner_listener_enabled: bool,
    scanner_listener_port: u16,
    export_dir: PathBuf,
    share_command: String,
    share_args: Vec<String>,
    metrics_interval_secs: u64,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default")
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: &str) -> Self {
        Self {
            station_id: toml_config.station.id,
            default_store_code: toml_config.station.store_code,
            scanner_listener_enabled: toml_config.scanner.listener_enabled,
            scanner_listener_port: toml_config.scanner.listener_port,
            export_dir: PathBuf::from(toml_config.export.dir),
            share_command: toml_config.share.command,
            share_args: toml_config.share.args,
            metrics_interval_secs: toml_config.metrics.interval_secs,
            config_file: config_file.to_string(),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self::from_toml(toml_config, &path.display().to_string()))
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    // Getters for all config fields
    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn default_store_code(&self) -> &str {
        &self.default_store_code
    }

    pub fn scanner_listener_enabled(&self) -> bool {
        self.scanner_listener_enabled
    }

    pub fn scanner_listener_port(&self) -> u16 {
        self.scanner_listener_port
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn share_command(&self) -> &str {
        &self.share_command
    }

    pub fn share_args(&self) -> &[String] {
        &self.share_args
    }

    pub fn metrics_interval_secs(&self) -> u64 {
        self.metrics_interval_secs
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to set the export directory
    #[cfg(test)]
    pub fn with_export_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.export_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Builder method for tests to preset the store code
    #[cfg(test)]
    pub fn with_default_store_code(mut self, code: &str) -> Self {
        self.default_store_code = code.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.station_id(), "scan-station");
        assert_eq!(config.default_store_code(), "");
        assert!(config.scanner_listener_enabled());
        assert_eq!(config.scanner_listener_port(), 7711);
        assert_eq!(config.export_dir(), Path::new("exports"));
        assert_eq!(config.share_command(), "xdg-open");
        assert!(config.share_args().is_empty());
        assert_eq!(config.metrics_interval_secs(), 30);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let toml_config: TomlConfig = toml::from_str("").unwrap();
        let config = Config::from_toml(toml_config, "empty");
        assert_eq!(config.station_id(), "scan-station");
        assert_eq!(config.scanner_listener_port(), 7711);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let toml_config: TomlConfig = toml::from_str(
            r#"
[scanner]
listener_port = 9000
"#,
        )
        .unwrap();
        let config = Config::from_toml(toml_config, "partial");
        assert_eq!(config.scanner_listener_port(), 9000);
        assert!(config.scanner_listener_enabled());
        assert_eq!(config.export_dir(), Path::new("exports"));
    }

    #[test]
    fn test_store_code_preset() {
        let toml_config: TomlConfig = toml::from_str(
            r#"
[station]
id = "backroom"
store_code = "S42"
"#,
        )
        .unwrap();
        let config = Config::from_toml(toml_config, "preset");
        assert_eq!(config.station_id(), "backroom");
        assert_eq!(config.default_store_code(), "S42");
    }
}
