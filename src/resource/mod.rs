//! Data source layer
//!
//! This module maps a remote instance group manager onto a declarative,
//! schema-checked record.
//!
//! # Architecture
//!
//! - [`schema`] - Loads and caches the attribute catalog from embedded JSON
//! - [`locator`] - Resolves project, location and name from input fields
//! - [`populate`] - Field table copying a fetched manager into a record
//! - [`state`] - The schema-checked result record
//! - [`data_source`] - The read routine tying the pieces together
//! - [`self_link`] - Self-link parsing and comparison helpers
//!
//! # Example
//!
//! ```ignore
//! use gce_igm_datasource::resource::{DataSourceInput, InstanceGroupManagerDataSource};
//!
//! async fn read(client: &GcpClient, config: &ProviderConfig) -> Result<(), ReadError> {
//!     let source = InstanceGroupManagerDataSource::zonal();
//!     let mut record = source.new_record();
//!     source.read(client, config, &DataSourceInput::named("mig-1"), &mut record).await?;
//!     Ok(())
//! }
//! ```

mod data_source;
pub mod locator;
pub mod populate;
pub mod schema;
pub mod self_link;
pub mod state;

pub use data_source::{validate_input, InstanceGroupManagerDataSource, ReadOutcome};
pub use locator::{locate, DataSourceInput, ResourceCoordinates};
pub use state::{FieldError, ResourceData};
