//! Read errors
//!
//! Everything a data source read can fail with. A missing remote resource
//! is not an error: it clears the record instead (see
//! [`ReadOutcome::Cleared`](crate::resource::ReadOutcome::Cleared)).

use crate::gcp::http::ApiError;
use crate::resource::state::FieldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    /// The input does not identify a resource
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The lookup failed for a reason other than the resource being gone
    #[error("error reading {resource}: {source}")]
    Api {
        resource: String,
        #[source]
        source: ApiError,
    },

    /// The record rejected a fetched value
    #[error("error setting {field}: {source}")]
    FieldAssignment {
        field: String,
        #[source]
        source: FieldError,
    },
}

impl ReadError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ReadError::Configuration(message.into())
    }
}
