//! Catalog configuration.

use crate::error::{CatalogError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where audio and duration data come from, and how long to wait for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base that relative audio paths are joined to
    #[serde(default = "default_audio_base_url")]
    pub audio_base_url: String,

    /// Duration table location (URL, `file://` URL or path)
    #[serde(default = "default_durations_source")]
    pub durations_source: String,

    /// Whole-request timeout for HTTP fetches
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout for HTTP fetches
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Upper bound for a single duration probe
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            audio_base_url: default_audio_base_url(),
            durations_source: default_durations_source(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from `tilawa.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("tilawa.toml"))
    }

    /// Load configuration from a file (if present) and environment
    ///
    /// Environment variables are prefixed with `TILAWA_` and override the
    /// file, e.g. `TILAWA_AUDIO_BASE_URL`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(PathBuf::from(path)));
        }

        // No key separator: field names contain underscores and nothing nests
        settings = settings.add_source(config::Environment::with_prefix("TILAWA").try_parsing(true));

        let config = settings
            .build()
            .map_err(|e| CatalogError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CatalogError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base = self.audio_base_url.trim();
        if base.is_empty() {
            return Err(CatalogError::Config(
                "Audio base URL is required (set TILAWA_AUDIO_BASE_URL)".to_string(),
            ));
        }

        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(CatalogError::Config(format!(
                "Audio base URL must start with http:// or https:// (got {base})"
            )));
        }

        if self.durations_source.trim().is_empty() {
            return Err(CatalogError::Config(
                "Duration table source is required".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 || self.probe_timeout_secs == 0 {
            return Err(CatalogError::Config(
                "Timeouts must be at least one second".to_string(),
            ));
        }

        Ok(())
    }

    /// HTTP client with the configured timeouts
    pub fn http_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .user_agent(format!("Tilawa/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CatalogError::Request)
    }

    /// Probe timeout as a `Duration`
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

// Default values
fn default_audio_base_url() -> String {
    "https://verses.quran.com/".to_string()
}

fn default_durations_source() -> String {
    "quran/audio-durations.json".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_probe_timeout_secs() -> u64 {
    20
}
