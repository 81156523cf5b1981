//! Compute Engine instance group managers
//!
//! Serde model of the `InstanceGroupManager` REST representation and the
//! point lookup used by the data source. Only the fields the data source
//! reflects are modelled; everything else in the response is ignored.

use super::client::GcpClient;
use super::http::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a manager lives in a zone or spans a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationScope {
    Zonal,
    Regional,
}

impl LocationScope {
    /// Collection segment used in URLs and identifiers
    pub fn collection(self) -> &'static str {
        match self {
            LocationScope::Zonal => "zones",
            LocationScope::Regional => "regions",
        }
    }

    /// Record attribute holding the location
    pub fn attribute(self) -> &'static str {
        match self {
            LocationScope::Zonal => "zone",
            LocationScope::Regional => "region",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceGroupManager {
    pub name: Option<String>,
    pub base_instance_name: Option<String>,
    pub description: Option<String>,
    pub fingerprint: Option<String>,
    pub self_link: Option<String>,
    pub instance_group: Option<String>,
    pub instance_template: Option<String>,
    pub target_size: Option<i64>,
    #[serde(default)]
    pub target_pools: Vec<String>,
    #[serde(default)]
    pub named_ports: Vec<NamedPort>,
    /// Order is significant: it is the canary precedence of the versions
    #[serde(default)]
    pub versions: Vec<Version>,
    #[serde(default)]
    pub auto_healing_policies: Vec<AutoHealingPolicy>,
    pub distribution_policy: Option<DistributionPolicy>,
    pub update_policy: Option<UpdatePolicy>,
    pub stateful_policy: Option<StatefulPolicy>,
    pub status: Option<Status>,
    pub zone: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedPort {
    pub name: Option<String>,
    pub port: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub name: Option<String>,
    pub instance_template: Option<String>,
    pub target_size: Option<FixedOrPercent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedOrPercent {
    pub fixed: Option<i64>,
    pub percent: Option<i64>,
    /// Output only
    pub calculated: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoHealingPolicy {
    pub health_check: Option<String>,
    pub initial_delay_sec: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionPolicy {
    #[serde(default)]
    pub zones: Vec<DistributionPolicyZone>,
    pub target_shape: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistributionPolicyZone {
    pub zone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePolicy {
    pub minimal_action: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub max_surge: Option<FixedOrPercent>,
    pub max_unavailable: Option<FixedOrPercent>,
    pub instance_redistribution_type: Option<String>,
    pub replacement_method: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatefulPolicy {
    pub preserved_state: Option<PreservedState>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreservedState {
    /// Keyed by device name
    #[serde(default)]
    pub disks: BTreeMap<String, PreservedDisk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreservedDisk {
    pub auto_delete: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub is_stable: Option<bool>,
    pub version_target: Option<VersionTargetStatus>,
    pub stateful: Option<StatefulStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionTargetStatus {
    pub is_reached: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatefulStatus {
    pub has_stateful_config: Option<bool>,
    pub per_instance_configs: Option<PerInstanceConfigsStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerInstanceConfigsStatus {
    pub all_effective: Option<bool>,
}

/// Fetch one instance group manager by its coordinates
pub async fn get_instance_group_manager(
    client: &GcpClient,
    scope: LocationScope,
    project: &str,
    location: &str,
    name: &str,
) -> Result<InstanceGroupManager, ApiError> {
    let resource = format!("instanceGroupManagers/{}", urlencoding::encode(name));
    let url = match scope {
        LocationScope::Zonal => client.compute_zonal_url(project, location, &resource),
        LocationScope::Regional => client.compute_regional_url(project, location, &resource),
    };

    client.get(&url).await
}
