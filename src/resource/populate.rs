//! State Populator
//!
//! Copies a fetched instance group manager into a [`ResourceData`]. The
//! copy is driven by one field table shared by the zonal and regional data
//! sources; each entry names the record attribute and how to produce its
//! value.

use super::locator::{DataSourceInput, ResourceCoordinates};
use super::state::ResourceData;
use crate::error::ReadError;
use crate::gcp::compute::{
    FixedOrPercent, InstanceGroupManager, LocationScope, StatefulStatus, Status, UpdatePolicy,
};
use serde_json::{json, Value};

/// Inputs available to a field accessor
pub struct FieldSource<'a> {
    pub coordinates: &'a ResourceCoordinates,
    pub input: &'a DataSourceInput,
    pub manager: &'a InstanceGroupManager,
}

/// One row of the field table
pub struct FieldMapping {
    pub attribute: &'static str,
    /// Written only for records of this scope
    pub scope: Option<LocationScope>,
    pub value: fn(&FieldSource) -> Value,
}

const fn field(attribute: &'static str, value: fn(&FieldSource) -> Value) -> FieldMapping {
    FieldMapping {
        attribute,
        scope: None,
        value,
    }
}

const fn scoped(
    attribute: &'static str,
    scope: LocationScope,
    value: fn(&FieldSource) -> Value,
) -> FieldMapping {
    FieldMapping {
        attribute,
        scope: Some(scope),
        value,
    }
}

/// Record attributes in write order
pub const FIELDS: &[FieldMapping] = &[
    field("self_link", |s| json!(s.manager.self_link)),
    field("name", |s| json!(s.coordinates.name)),
    field("project", |s| json!(s.coordinates.project)),
    scoped("zone", LocationScope::Zonal, |s| json!(s.coordinates.location)),
    scoped("region", LocationScope::Regional, |s| json!(s.coordinates.location)),
    field("base_instance_name", |s| json!(s.manager.base_instance_name)),
    field("instance_template", |s| json!(s.manager.instance_template)),
    field("description", |s| json!(s.manager.description)),
    field("fingerprint", |s| json!(s.manager.fingerprint)),
    field("instance_group", |s| json!(s.manager.instance_group)),
    field("target_size", |s| json!(s.manager.target_size)),
    field("target_pools", |s| json!(s.manager.target_pools)),
    field("named_port", flatten_named_ports),
    field("version", flatten_versions),
    field("auto_healing_policies", flatten_auto_healing_policies),
    field("update_policy", |s| flatten_update_policy(s.manager.update_policy.as_ref())),
    field("stateful_disk", flatten_stateful_disks),
    field("status", |s| flatten_status(s.manager.status.as_ref())),
    scoped(
        "distribution_policy_zones",
        LocationScope::Regional,
        flatten_distribution_zones,
    ),
    scoped("distribution_policy_target_shape", LocationScope::Regional, |s| {
        json!(s
            .manager
            .distribution_policy
            .as_ref()
            .and_then(|p| p.target_shape.clone()))
    }),
    field("wait_for_instances", |s| json!(s.input.wait_for_instances)),
    field("wait_for_instances_status", |s| {
        json!(s.input.wait_for_instances_status)
    }),
];

fn flatten_named_ports(s: &FieldSource) -> Value {
    s.manager
        .named_ports
        .iter()
        .map(|p| json!({"name": p.name, "port": p.port}))
        .collect()
}

fn flatten_fixed_or_percent(value: Option<&FixedOrPercent>) -> Value {
    match value {
        Some(v) => json!([{"fixed": v.fixed, "percent": v.percent}]),
        None => json!([]),
    }
}

fn flatten_versions(s: &FieldSource) -> Value {
    s.manager
        .versions
        .iter()
        .map(|v| {
            json!({
                "name": v.name,
                "instance_template": v.instance_template,
                "target_size": flatten_fixed_or_percent(v.target_size.as_ref()),
            })
        })
        .collect()
}

fn flatten_auto_healing_policies(s: &FieldSource) -> Value {
    s.manager
        .auto_healing_policies
        .iter()
        .map(|p| {
            json!({
                "health_check": p.health_check,
                "initial_delay_sec": p.initial_delay_sec,
            })
        })
        .collect()
}

fn flatten_update_policy(policy: Option<&UpdatePolicy>) -> Value {
    let Some(p) = policy else {
        return json!([]);
    };
    let surge = p.max_surge.as_ref();
    let unavailable = p.max_unavailable.as_ref();

    json!([{
        "minimal_action": p.minimal_action,
        "type": p.kind,
        "max_surge_fixed": surge.and_then(|v| v.fixed),
        "max_surge_percent": surge.and_then(|v| v.percent),
        "max_unavailable_fixed": unavailable.and_then(|v| v.fixed),
        "max_unavailable_percent": unavailable.and_then(|v| v.percent),
        "instance_redistribution_type": p.instance_redistribution_type,
        "replacement_method": p.replacement_method,
    }])
}

fn flatten_stateful_disks(s: &FieldSource) -> Value {
    let Some(preserved) = s
        .manager
        .stateful_policy
        .as_ref()
        .and_then(|p| p.preserved_state.as_ref())
    else {
        return json!([]);
    };

    preserved
        .disks
        .iter()
        .map(|(device_name, disk)| {
            json!({
                "device_name": device_name,
                "delete_rule": disk.auto_delete.as_deref().unwrap_or("NEVER"),
            })
        })
        .collect()
}

fn flatten_stateful_status(stateful: Option<&StatefulStatus>) -> Value {
    let Some(st) = stateful else {
        return json!([]);
    };
    let per_instance_configs = match &st.per_instance_configs {
        Some(pic) => json!([{"all_effective": pic.all_effective}]),
        None => json!([]),
    };

    json!([{
        "has_stateful_config": st.has_stateful_config,
        "per_instance_configs": per_instance_configs,
    }])
}

fn flatten_status(status: Option<&Status>) -> Value {
    let Some(st) = status else {
        return json!([]);
    };
    let version_target = match &st.version_target {
        Some(vt) => json!([{"is_reached": vt.is_reached}]),
        None => json!([]),
    };

    json!([{
        "is_stable": st.is_stable,
        "version_target": version_target,
        "stateful": flatten_stateful_status(st.stateful.as_ref()),
    }])
}

fn flatten_distribution_zones(s: &FieldSource) -> Value {
    s.manager
        .distribution_policy
        .iter()
        .flat_map(|p| p.zones.iter())
        .filter_map(|z| z.zone.clone())
        .map(Value::String)
        .collect()
}

/// Write the identifier and every field of `manager` into `record`
///
/// The identifier comes from the coordinates used for the fetch, never from
/// the fetched object. The first rejected write aborts the copy.
pub fn populate(
    record: &mut ResourceData,
    coordinates: &ResourceCoordinates,
    input: &DataSourceInput,
    manager: &InstanceGroupManager,
) -> Result<(), ReadError> {
    let scope = record.schema().scope;
    let fields = FieldSource {
        coordinates,
        input,
        manager,
    };

    record.set_id(coordinates.id());

    for mapping in FIELDS
        .iter()
        .filter(|m| m.scope.map_or(true, |s| s == scope))
    {
        record
            .set(mapping.attribute, (mapping.value)(&fields))
            .map_err(|source| ReadError::FieldAssignment {
                field: mapping.attribute.to_string(),
                source,
            })?;
    }

    Ok(())
}
