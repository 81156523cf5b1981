//! GCP API interaction module
//!
//! This module provides the core functionality for interacting with the
//! Compute Engine API: authentication, HTTP client, and the instance group
//! manager model.
//!
//! # Module Structure
//!
//! - [`auth`] - Authentication (ADC or static token) and gcloud defaults
//! - [`client`] - Main GCP client for making API requests
//! - [`compute`] - Instance group manager model and point lookup
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use gce_igm_datasource::config::ProviderConfig;
//! use gce_igm_datasource::gcp::client::GcpClient;
//! use gce_igm_datasource::gcp::compute::{get_instance_group_manager, LocationScope};
//!
//! async fn example(config: &ProviderConfig) -> anyhow::Result<()> {
//!     let client = GcpClient::new(config).await?;
//!     let igm = get_instance_group_manager(
//!         &client, LocationScope::Zonal, "my-project", "us-central1-a", "mig-1",
//!     ).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod compute;
pub mod http;
