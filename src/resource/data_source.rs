//! Instance group manager data source
//!
//! One read: validate the input, locate the manager, fetch it once and
//! copy it into the record. A manager that no longer exists clears the
//! record instead of failing the read.

use super::locator::{locate, DataSourceInput};
use super::populate::populate;
use super::schema::{data_source_name, get_data_source, DataSourceSchema};
use super::state::ResourceData;
use crate::config::ProviderConfig;
use crate::error::ReadError;
use crate::gcp::client::GcpClient;
use crate::gcp::compute::{get_instance_group_manager, LocationScope};
use crate::gcp::http::ApiError;
use serde_json::{json, Value};

/// What a successful read left in the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The record holds the fetched manager
    Found,
    /// The manager does not exist; the record was cleared
    Cleared,
}

/// Read-only view of a zonal or regional instance group manager
#[derive(Debug, Clone, Copy)]
pub struct InstanceGroupManagerDataSource {
    scope: LocationScope,
}

impl InstanceGroupManagerDataSource {
    pub fn zonal() -> Self {
        Self {
            scope: LocationScope::Zonal,
        }
    }

    pub fn regional() -> Self {
        Self {
            scope: LocationScope::Regional,
        }
    }

    pub fn name(&self) -> &'static str {
        data_source_name(self.scope)
    }

    pub fn schema(&self) -> &'static DataSourceSchema {
        schema_for(self.scope)
    }

    /// Empty record for this data source
    pub fn new_record(&self) -> ResourceData {
        ResourceData::new(self.schema())
    }

    /// Run one read into `record`
    ///
    /// The record is replaced wholesale, and only once every field was
    /// written; a failed read leaves it as it was. When a self-link
    /// addresses the other scope, the record is rebuilt with that scope's
    /// schema.
    pub async fn read(
        &self,
        client: &GcpClient,
        config: &ProviderConfig,
        input: &DataSourceInput,
        record: &mut ResourceData,
    ) -> Result<ReadOutcome, ReadError> {
        validate_input(self.schema(), input)?;

        let coordinates = locate(input, config, self.scope)?;

        let manager = match get_instance_group_manager(
            client,
            coordinates.scope,
            &coordinates.project,
            &coordinates.location,
            &coordinates.name,
        )
        .await
        {
            Ok(manager) => manager,
            Err(err) => {
                let resource = format!(
                    "{} Instance Group Manager {:?}",
                    match coordinates.scope {
                        LocationScope::Zonal => "Zonal",
                        LocationScope::Regional => "Region",
                    },
                    coordinates.name
                );
                return handle_not_found(err, record, resource);
            },
        };

        let mut fresh = ResourceData::new(schema_for(coordinates.scope));
        populate(&mut fresh, &coordinates, input, &manager)?;
        *record = fresh;

        tracing::debug!("Read {}", coordinates);
        Ok(ReadOutcome::Found)
    }
}

fn schema_for(scope: LocationScope) -> &'static DataSourceSchema {
    let name = data_source_name(scope);
    get_data_source(name)
        .unwrap_or_else(|| panic!("embedded schema is missing data source {}", name))
}

/// Clear the record when the lookup says the resource is gone
fn handle_not_found(
    err: ApiError,
    record: &mut ResourceData,
    resource: String,
) -> Result<ReadOutcome, ReadError> {
    if err.is_not_found() {
        tracing::warn!(
            "Removing {} because it's gone",
            resource
        );
        record.clear();
        return Ok(ReadOutcome::Cleared);
    }

    Err(ReadError::Api {
        resource,
        source: err,
    })
}

/// Check configured values against the schema's validations
///
/// `name` is ignored when a self-link is given, as the lookup never uses it.
pub fn validate_input(schema: &DataSourceSchema, input: &DataSourceInput) -> Result<(), ReadError> {
    let has_self_link = input.self_link.as_ref().is_some_and(|l| !l.trim().is_empty());
    let name = input.name.as_ref().filter(|_| !has_self_link);
    let configured: [(&str, Option<Value>); 2] = [
        ("name", name.map(|n| json!(n))),
        (
            "wait_for_instances_status",
            Some(json!(input.wait_for_instances_status)),
        ),
    ];

    for (attribute, value) in configured {
        let Some(value) = value else {
            continue;
        };
        let Some(validation) = schema.attribute(attribute).and_then(|d| d.validation.as_ref()) else {
            continue;
        };
        validation
            .check(&value)
            .map_err(|msg| ReadError::configuration(format!("{}: {}", attribute, msg)))?;
    }

    Ok(())
}
