//! GCP Authentication
//!
//! Bearer tokens for the Compute Engine API come either from Application
//! Default Credentials or from an access token handed in by the caller.
//! This module also resolves gcloud defaults for project, zone and region.

use anyhow::{Context, Result};
use gcp_auth::TokenProvider;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// OAuth2 scope requested from ADC
pub const COMPUTE_READ_SCOPES: &[&str] = &["https://www.googleapis.com/auth/compute.readonly"];

/// Margin kept before an ADC token's assumed expiry
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// ADC does not tell us the lifetime, so assume the shortest one Google issues
const ASSUMED_ADC_LIFETIME: Duration = Duration::from_secs(30 * 60);

/// A token we hold on to between requests
#[derive(Clone)]
struct HeldToken {
    value: String,
    /// `None` for caller-supplied tokens, which we never refresh
    refresh_after: Option<Instant>,
}

impl HeldToken {
    fn is_fresh(&self) -> bool {
        self.refresh_after.map_or(true, |at| Instant::now() < at)
    }
}

/// Source of bearer tokens shared by every request of a client
#[derive(Clone)]
pub struct TokenSource {
    /// ADC provider; absent when the token was supplied by the caller
    adc: Option<Arc<dyn TokenProvider>>,
    held: Arc<RwLock<Option<HeldToken>>>,
}

impl TokenSource {
    /// Tokens from Application Default Credentials
    pub async fn adc() -> Result<Self> {
        let provider = gcp_auth::provider().await.context(
            "Failed to initialize GCP authentication. Run 'gcloud auth application-default login'",
        )?;

        Ok(Self {
            adc: Some(provider),
            held: Arc::new(RwLock::new(None)),
        })
    }

    /// A fixed access token, e.g. from `gcloud auth print-access-token`
    pub fn fixed(token: impl Into<String>) -> Self {
        let held = HeldToken {
            value: token.into(),
            refresh_after: None,
        };
        Self {
            adc: None,
            held: Arc::new(RwLock::new(Some(held))),
        }
    }

    /// Bearer token for the next request
    pub async fn token(&self) -> Result<String> {
        if let Some(held) = self.held.read().await.as_ref() {
            if held.is_fresh() {
                return Ok(held.value.clone());
            }
            tracing::debug!("ADC token reached its refresh margin");
        }

        let Some(provider) = &self.adc else {
            anyhow::bail!("No access token available");
        };

        let token = provider
            .token(COMPUTE_READ_SCOPES)
            .await
            .context("Failed to get access token")?;
        let value = token.as_str().to_string();

        *self.held.write().await = Some(HeldToken {
            value: value.clone(),
            refresh_after: Some(Instant::now() + ASSUMED_ADC_LIFETIME - REFRESH_MARGIN),
        });
        tracing::debug!("Fetched ADC token");

        Ok(value)
    }
}

/// Get the gcloud configuration directory
pub fn get_gcloud_config_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|p| p.join("gcloud"))
}

/// Validate a GCP project ID format
/// Project IDs must be 6-30 characters, lowercase letters, digits, and hyphens
/// Must start with a letter and cannot end with a hyphen
pub fn validate_project_id(project: &str) -> bool {
    if project.len() < 6 || project.len() > 30 {
        return false;
    }

    match project.chars().next() {
        Some(c) if c.is_ascii_lowercase() => {},
        _ => return false,
    }

    if project.ends_with('-') {
        return false;
    }

    project
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Look up `key` inside `[section]` of an INI-style gcloud properties file
fn find_property(content: &str, section: &str, key: &str) -> Option<String> {
    let header = format!("[{}]", section);
    let mut in_section = false;

    for line in content.lines() {
        let line = line.trim();
        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_section = line == header;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((name, value)) = line.split_once('=') {
            if name.trim() == key {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}

/// Read a property from the gcloud installation properties, then the
/// active named configuration
fn read_gcloud_property(section: &str, key: &str) -> Option<String> {
    let config_dir = get_gcloud_config_dir()?;

    if let Ok(content) = std::fs::read_to_string(config_dir.join("properties")) {
        if let Some(value) = find_property(&content, section, key) {
            return Some(value);
        }
    }

    let active_config = std::fs::read_to_string(config_dir.join("active_config")).ok()?;
    let config_name = active_config.trim();

    // Validate config name to prevent path traversal
    if !config_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        tracing::warn!("Invalid characters in active_config name");
        return None;
    }

    let config_path = config_dir
        .join("configurations")
        .join(format!("config_{}", config_name));

    let content = std::fs::read_to_string(config_path).ok()?;
    find_property(&content, section, key)
}

/// Read the default project from the environment or gcloud configuration
/// Validates project ID format before returning
pub fn get_default_project() -> Option<String> {
    for var in ["CLOUDSDK_CORE_PROJECT", "GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"] {
        if let Ok(project) = std::env::var(var) {
            if validate_project_id(&project) {
                return Some(project);
            }
            tracing::warn!("Invalid project ID format in {}", var);
        }
    }

    read_gcloud_property("core", "project").filter(|p| validate_project_id(p))
}

/// Get the default zone from the environment or gcloud configuration
pub fn get_default_zone() -> Option<String> {
    if let Ok(zone) = std::env::var("CLOUDSDK_COMPUTE_ZONE") {
        return Some(zone);
    }

    read_gcloud_property("compute", "zone")
}

/// Get the default region from the environment or gcloud configuration
pub fn get_default_region() -> Option<String> {
    if let Ok(region) = std::env::var("CLOUDSDK_COMPUTE_REGION") {
        return Some(region);
    }

    read_gcloud_property("compute", "region")
}
