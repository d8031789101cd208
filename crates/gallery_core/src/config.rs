//! Application configuration

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub server: ServerConfig,
    pub gallery: GallerySettings,
    pub search: SearchSettings,
    pub scan: ScanSettings,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySettings {
    /// Page size for photo listings
    pub per_page: u32,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self { per_page: 50 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Idle gap that coalesces search-as-you-type input into one request
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Interval between scan-status polls
    pub poll_interval_ms: u64,
    /// Upper bound on how long a scan is polled before giving up
    pub poll_timeout_secs: u64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            poll_timeout_secs: 3600,
        }
    }
}

impl GalleryConfig {
    /// Load configuration from the default location
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, falling back to defaults
    /// when the file does not exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::info!("Configuration loaded from {:?}", path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "PicStream", "PicStream")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    pub fn server_timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    pub fn scan_poll_interval(&self) -> Duration {
        Duration::from_millis(self.scan.poll_interval_ms)
    }

    pub fn scan_poll_timeout(&self) -> Duration {
        Duration::from_secs(self.scan.poll_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = GalleryConfig::default();
        assert_eq!(config.gallery.per_page, 50);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.scan.poll_interval_ms, 1000);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: GalleryConfig = toml::from_str(
            r#"
            [server]
            base_url = "http://gallery.local/api"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.base_url, "http://gallery.local/api");
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.gallery.per_page, 50);
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = GalleryConfig::default();
        config.gallery.per_page = 25;
        config.save_to(&path).unwrap();

        let loaded = GalleryConfig::load_from(&path).unwrap();
        assert_eq!(loaded.gallery.per_page, 25);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GalleryConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.scan.poll_timeout_secs, 3600);
    }
}
