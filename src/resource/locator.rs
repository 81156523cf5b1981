//! Resource Locator
//!
//! Works out which instance group manager a read addresses, either from a
//! self-link or from explicit fields backed by provider defaults.

use super::self_link::{parse_self_link, region_from_zone};
use crate::config::ProviderConfig;
use crate::error::ReadError;
use crate::gcp::compute::LocationScope;
use std::fmt;

/// Configured fields of a data source instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceInput {
    pub name: Option<String>,
    pub self_link: Option<String>,
    pub zone: Option<String>,
    pub region: Option<String>,
    pub project: Option<String>,
    pub wait_for_instances: bool,
    pub wait_for_instances_status: String,
}

impl Default for DataSourceInput {
    fn default() -> Self {
        Self {
            name: None,
            self_link: None,
            zone: None,
            region: None,
            project: None,
            wait_for_instances: false,
            wait_for_instances_status: "STABLE".to_string(),
        }
    }
}

impl DataSourceInput {
    /// Input addressing a manager by name only
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Input addressing a manager by self-link
    pub fn from_self_link(self_link: impl Into<String>) -> Self {
        Self {
            self_link: Some(self_link.into()),
            ..Self::default()
        }
    }
}

/// Everything needed to address one instance group manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCoordinates {
    pub scope: LocationScope,
    pub project: String,
    /// Zone for zonal managers, region for regional ones
    pub location: String,
    pub name: String,
}

impl ResourceCoordinates {
    /// Composite identifier recorded as the data source id
    pub fn id(&self) -> String {
        format!(
            "projects/{}/{}/{}/instanceGroupManagers/{}",
            self.project,
            self.scope.collection(),
            self.location,
            self.name
        )
    }
}

impl fmt::Display for ResourceCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Trim surrounding whitespace; blank strings count as unset
fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Resolve the coordinates of the manager a read addresses
///
/// A self-link wins over explicit fields and decides the scope on its own:
/// a `regions/` link addresses a regional manager even when the zonal data
/// source was invoked. Without one, `default_scope` applies and the name
/// must be given explicitly.
pub fn locate(
    input: &DataSourceInput,
    config: &ProviderConfig,
    default_scope: LocationScope,
) -> Result<ResourceCoordinates, ReadError> {
    let project_fallback = || non_empty(input.project.as_ref()).or_else(|| non_empty(config.project.as_ref()));

    let coordinates = match non_empty(input.self_link.as_ref()) {
        Some(self_link) => {
            let parts = parse_self_link(&self_link);
            let (Some(scope), Some(location)) = (parts.scope, parts.location) else {
                return Err(ReadError::configuration(format!(
                    "self_link {:?} does not contain a zone or region",
                    self_link
                )));
            };
            let Some(name) = parts.name else {
                return Err(ReadError::configuration(format!(
                    "self_link {:?} does not contain an instance group manager name",
                    self_link
                )));
            };

            ResourceCoordinates {
                scope,
                project: parts.project.or_else(project_fallback).unwrap_or_default(),
                location,
                name,
            }
        },
        None => {
            let Some(name) = non_empty(input.name.as_ref()) else {
                return Err(ReadError::configuration(
                    "one of name or self_link must be set",
                ));
            };

            let location = match default_scope {
                LocationScope::Zonal => non_empty(input.zone.as_ref())
                    .or_else(|| non_empty(config.zone.as_ref())),
                LocationScope::Regional => non_empty(input.region.as_ref())
                    .or_else(|| non_empty(input.zone.as_ref()).map(|z| region_from_zone(&z)))
                    .or_else(|| config.default_region()),
            };

            ResourceCoordinates {
                scope: default_scope,
                project: project_fallback().unwrap_or_default(),
                location: location.unwrap_or_default(),
                name,
            }
        },
    };

    if coordinates.project.is_empty() {
        return Err(ReadError::configuration(
            "project: required field is not set and no provider default is configured",
        ));
    }
    if coordinates.location.is_empty() {
        return Err(ReadError::configuration(format!(
            "{}: required field is not set and no provider default is configured",
            coordinates.scope.attribute()
        )));
    }

    Ok(coordinates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> ProviderConfig {
        ProviderConfig {
            project: Some("default-project".to_string()),
            zone: Some("europe-west1-b".to_string()),
            ..ProviderConfig::default()
        }
    }

    fn bare() -> ProviderConfig {
        ProviderConfig::default()
    }

    #[test]
    fn test_zonal_self_link() {
        let input = DataSourceInput::from_self_link(
            "https://www.googleapis.com/compute/v1/projects/p/zones/z/instanceGroupManagers/n",
        );
        let coords = locate(&input, &bare(), LocationScope::Zonal).unwrap();
        assert_eq!(
            coords,
            ResourceCoordinates {
                scope: LocationScope::Zonal,
                project: "p".to_string(),
                location: "z".to_string(),
                name: "n".to_string(),
            }
        );
    }

    #[test]
    fn test_regional_self_link_overrides_variant() {
        let input = DataSourceInput::from_self_link(
            "https://www.googleapis.com/compute/v1/projects/proj/regions/us-central1/instanceGroupManagers/mig-2",
        );
        let coords = locate(&input, &defaults(), LocationScope::Zonal).unwrap();
        assert_eq!(coords.scope, LocationScope::Regional);
        assert_eq!(coords.project, "proj");
        assert_eq!(coords.location, "us-central1");
        assert_eq!(coords.name, "mig-2");
    }

    #[test]
    fn test_self_link_wins_over_explicit_fields() {
        let input = DataSourceInput {
            name: Some("other".to_string()),
            zone: Some("asia-east1-a".to_string()),
            self_link: Some("projects/p/zones/z/instanceGroupManagers/n".to_string()),
            ..DataSourceInput::default()
        };
        let coords = locate(&input, &defaults(), LocationScope::Zonal).unwrap();
        assert_eq!(coords.name, "n");
        assert_eq!(coords.location, "z");
    }

    #[test]
    fn test_self_link_without_project_uses_fallbacks() {
        let mut input = DataSourceInput::from_self_link("regions/us-central1/instanceGroupManagers/mig-2");
        let coords = locate(&input, &defaults(), LocationScope::Regional).unwrap();
        assert_eq!(coords.project, "default-project");

        input.project = Some("input-project".to_string());
        let coords = locate(&input, &defaults(), LocationScope::Regional).unwrap();
        assert_eq!(coords.project, "input-project");

        let coords = locate(&input, &bare(), LocationScope::Regional).unwrap();
        assert_eq!(coords.project, "input-project");

        input.project = None;
        assert!(matches!(
            locate(&input, &bare(), LocationScope::Regional),
            Err(ReadError::Configuration(_))
        ));
    }

    #[test]
    fn test_malformed_self_links() {
        for link in [
            "projects/p/instanceGroupManagers/n",
            "projects/p/zones/z/instanceGroupManagers",
            "not a link",
        ] {
            let input = DataSourceInput::from_self_link(link);
            assert!(
                matches!(locate(&input, &defaults(), LocationScope::Zonal), Err(ReadError::Configuration(_))),
                "{} should be rejected",
                link
            );
        }
    }

    #[test]
    fn test_name_with_provider_defaults() {
        let coords = locate(&DataSourceInput::named("mig-1"), &defaults(), LocationScope::Zonal).unwrap();
        assert_eq!(coords.project, "default-project");
        assert_eq!(coords.location, "europe-west1-b");
        assert_eq!(coords.name, "mig-1");
        assert_eq!(
            coords.id(),
            "projects/default-project/zones/europe-west1-b/instanceGroupManagers/mig-1"
        );
    }

    #[test]
    fn test_explicit_fields_override_defaults() {
        let input = DataSourceInput {
            name: Some("mig-1".to_string()),
            zone: Some("us-central1-a".to_string()),
            project: Some("proj".to_string()),
            ..DataSourceInput::default()
        };
        let coords = locate(&input, &defaults(), LocationScope::Zonal).unwrap();
        assert_eq!(
            coords.to_string(),
            "projects/proj/zones/us-central1-a/instanceGroupManagers/mig-1"
        );
    }

    #[test]
    fn test_regional_location_fallbacks() {
        let mut input = DataSourceInput::named("mig");
        input.region = Some("asia-east1".to_string());
        input.zone = Some("us-west1-b".to_string());
        assert_eq!(
            locate(&input, &defaults(), LocationScope::Regional).unwrap().location,
            "asia-east1"
        );

        input.region = None;
        assert_eq!(
            locate(&input, &defaults(), LocationScope::Regional).unwrap().location,
            "us-west1"
        );

        input.zone = None;
        assert_eq!(
            locate(&input, &defaults(), LocationScope::Regional).unwrap().location,
            "europe-west1"
        );
    }

    #[test]
    fn test_missing_name_and_self_link() {
        let err = locate(&DataSourceInput::default(), &defaults(), LocationScope::Zonal).unwrap_err();
        assert!(matches!(err, ReadError::Configuration(_)));

        let input = DataSourceInput {
            name: Some("  ".to_string()),
            self_link: Some(String::new()),
            ..DataSourceInput::default()
        };
        assert!(locate(&input, &defaults(), LocationScope::Zonal).is_err());
    }

    #[test]
    fn test_missing_project_or_zone() {
        let input = DataSourceInput::named("mig-1");
        let err = locate(&input, &bare(), LocationScope::Zonal).unwrap_err();
        assert!(err.to_string().contains("project"));

        let config = ProviderConfig {
            project: Some("proj".to_string()),
            ..ProviderConfig::default()
        };
        let err = locate(&input, &config, LocationScope::Zonal).unwrap_err();
        assert!(err.to_string().contains("zone"));
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let input = DataSourceInput {
            name: Some(" mig-1\n".to_string()),
            zone: Some(" us-central1-a ".to_string()),
            project: Some("\tproj".to_string()),
            ..DataSourceInput::default()
        };
        let coords = locate(&input, &bare(), LocationScope::Zonal).unwrap();
        assert_eq!(coords.id(), "projects/proj/zones/us-central1-a/instanceGroupManagers/mig-1");

        let input = DataSourceInput::from_self_link(
            " projects/p/regions/us-east1/instanceGroupManagers/mig-2 ",
        );
        let coords = locate(&input, &bare(), LocationScope::Zonal).unwrap();
        assert_eq!(coords.location, "us-east1");
        assert_eq!(coords.name, "mig-2");
    }
}
