//! Read-only data source for Compute Engine instance group managers.
//!
//! Resolves a manager from a name and location or from its self-link,
//! fetches it with a single Compute Engine API call and reflects it into a
//! schema-checked [`resource::ResourceData`] record.

pub mod config;
pub mod error;
pub mod gcp;
pub mod resource;

pub use error::ReadError;
