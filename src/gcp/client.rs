//! GCP Client
//!
//! Main client for interacting with the Compute Engine API, combining
//! authentication and HTTP functionality.

use super::auth::TokenSource;
use super::http::{ApiError, GcpHttpClient};
use crate::config::ProviderConfig;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Default Compute Engine v1 endpoint
pub const DEFAULT_COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1/";

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub tokens: TokenSource,
    pub http: GcpHttpClient,
    compute_endpoint: String,
}

impl GcpClient {
    /// Create a client from the provider configuration
    ///
    /// Uses the configured access token when present, Application Default
    /// Credentials otherwise.
    pub async fn new(config: &ProviderConfig) -> Result<Self> {
        let tokens = match &config.access_token {
            Some(token) => TokenSource::fixed(token.clone()),
            None => TokenSource::adc()
                .await
                .context("Failed to initialize GCP credentials")?,
        };

        Self::with_tokens(tokens, config).context("Failed to create HTTP client")
    }

    /// Create a client with an explicit token source
    pub fn with_tokens(tokens: TokenSource, config: &ProviderConfig) -> Result<Self, ApiError> {
        let http = GcpHttpClient::new(&config.user_agent)?;

        Ok(Self {
            tokens,
            http,
            compute_endpoint: normalize_endpoint(&config.compute_endpoint),
        })
    }

    /// Make a GET request to a GCP API
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let token = self.tokens.token().await.map_err(ApiError::Auth)?;
        self.http.get(url, &token).await
    }

    // =========================================================================
    // Compute Engine API helpers
    // =========================================================================

    /// Build Compute Engine API URL for a project
    pub fn compute_url(&self, project: &str, path: &str) -> String {
        format!(
            "{}projects/{}/{}",
            self.compute_endpoint,
            urlencoding::encode(project),
            path
        )
    }

    /// Build zonal Compute Engine API URL
    pub fn compute_zonal_url(&self, project: &str, zone: &str, resource: &str) -> String {
        self.compute_url(
            project,
            &format!("zones/{}/{}", urlencoding::encode(zone), resource),
        )
    }

    /// Build regional Compute Engine API URL
    pub fn compute_regional_url(&self, project: &str, region: &str, resource: &str) -> String {
        self.compute_url(
            project,
            &format!("regions/{}/{}", urlencoding::encode(region), resource),
        )
    }
}

/// Ensure the endpoint ends with exactly one slash
fn normalize_endpoint(endpoint: &str) -> String {
    format!("{}/", endpoint.trim_end_matches('/'))
}
