//! Configuration Management
//!
//! File-based configuration plus the resolved [`ProviderConfig`] context
//! handed to every data source read.

use crate::gcp::auth;
use crate::gcp::client::DEFAULT_COMPUTE_ENDPOINT;
use crate::resource::self_link::region_from_zone;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User agent sent with every API request
pub const USER_AGENT: &str = concat!("gce-igm-datasource/", env!("CARGO_PKG_VERSION"));

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default project ID
    #[serde(default)]
    pub project_id: Option<String>,
    /// Default zone
    #[serde(default)]
    pub zone: Option<String>,
    /// Default region
    #[serde(default)]
    pub region: Option<String>,
    /// Override for the Compute Engine endpoint
    #[serde(default)]
    pub compute_endpoint: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gce-igm-datasource").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get effective project (config > gcloud default)
    pub fn effective_project(&self) -> Option<String> {
        self.project_id.clone().or_else(auth::get_default_project)
    }

    /// Get effective zone (config > gcloud default)
    pub fn effective_zone(&self) -> Option<String> {
        self.zone.clone().or_else(auth::get_default_zone)
    }

    /// Get effective region (config > gcloud default > derived from zone)
    pub fn effective_region(&self) -> Option<String> {
        self.region
            .clone()
            .or_else(auth::get_default_region)
            .or_else(|| self.effective_zone().map(|z| region_from_zone(&z)))
    }

    /// Resolve into the context passed to reads
    pub fn into_provider_config(self) -> ProviderConfig {
        ProviderConfig {
            project: self.effective_project(),
            zone: self.effective_zone(),
            region: self.effective_region(),
            compute_endpoint: self
                .compute_endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_COMPUTE_ENDPOINT.to_string()),
            ..ProviderConfig::default()
        }
    }
}

/// Provider-level defaults and transport settings for a read
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Project used when neither the input nor the self-link names one
    pub project: Option<String>,
    pub zone: Option<String>,
    pub region: Option<String>,
    pub user_agent: String,
    pub compute_endpoint: String,
    /// Fixed OAuth2 token; ADC is used when unset
    pub access_token: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            project: None,
            zone: None,
            region: None,
            user_agent: USER_AGENT.to_string(),
            compute_endpoint: DEFAULT_COMPUTE_ENDPOINT.to_string(),
            access_token: None,
        }
    }
}

impl ProviderConfig {
    /// Default region, falling back to the one containing the default zone
    pub fn default_region(&self) -> Option<String> {
        self.region
            .clone()
            .or_else(|| self.zone.as_deref().map(region_from_zone))
    }
}
