//! Self-link helpers
//!
//! Compute Engine identifies resources by URLs such as
//! `https://www.googleapis.com/compute/v1/projects/p/zones/z/instanceGroupManagers/n`.
//! These helpers pick such links apart and compare them independently of
//! the API host and version prefix.

use crate::gcp::compute::LocationScope;
use url::Url;

/// Coordinates found in a self-link; any of them may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelfLinkParts {
    pub project: Option<String>,
    pub scope: Option<LocationScope>,
    pub location: Option<String>,
    pub name: Option<String>,
}

/// Split a self-link (full URL or relative path) into path segments
fn path_segments(link: &str) -> Vec<String> {
    if let Ok(url) = Url::parse(link) {
        if let Some(segments) = url.path_segments() {
            return segments
                .filter(|s| !s.is_empty())
                .map(|s| {
                    urlencoding::decode(s)
                        .map(|d| d.into_owned())
                        .unwrap_or_else(|_| s.to_string())
                })
                .collect();
        }
    }

    link.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Extract project, location and manager name from a self-link
pub fn parse_self_link(link: &str) -> SelfLinkParts {
    let segments = path_segments(link.trim());
    let mut parts = SelfLinkParts::default();

    let mut iter = segments.iter().peekable();
    while let Some(segment) = iter.next() {
        let Some(value) = iter.peek() else {
            break;
        };

        match segment.as_str() {
            "projects" => parts.project = Some(value.to_string()),
            "zones" => {
                parts.scope = Some(LocationScope::Zonal);
                parts.location = Some(value.to_string());
            },
            "regions" => {
                parts.scope = Some(LocationScope::Regional);
                parts.location = Some(value.to_string());
            },
            "instanceGroupManagers" => parts.name = Some(value.to_string()),
            _ => continue,
        }
        iter.next();
    }

    parts
}

/// Strip everything before `projects/`, leaving the host-independent path
pub fn self_link_relative_path(link: &str) -> &str {
    match link.find("projects/") {
        Some(idx) => &link[idx..],
        None => link,
    }
}

/// Whether two self-links address the same resource
pub fn compare_self_link_relative_paths(a: &str, b: &str) -> bool {
    self_link_relative_path(a) == self_link_relative_path(b)
}

/// Last path segment of a self-link, or the input when it is already a name
pub fn resource_name_from_self_link(link: &str) -> &str {
    link.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(link)
}

/// Region containing a zone, e.g. `us-central1-a` -> `us-central1`
pub fn region_from_zone(zone: &str) -> String {
    match zone.rsplit_once('-') {
        Some((region, _)) => region.to_string(),
        None => zone.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_zonal_url() {
        let parts = parse_self_link(
            "https://www.googleapis.com/compute/v1/projects/proj/zones/us-central1-a/instanceGroupManagers/mig-1",
        );
        assert_eq!(
            parts,
            SelfLinkParts {
                project: Some("proj".to_string()),
                scope: Some(LocationScope::Zonal),
                location: Some("us-central1-a".to_string()),
                name: Some("mig-1".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_relative_regional_path() {
        let parts = parse_self_link("projects/proj/regions/us-central1/instanceGroupManagers/mig-2");
        assert_eq!(parts.project.as_deref(), Some("proj"));
        assert_eq!(parts.scope, Some(LocationScope::Regional));
        assert_eq!(parts.location.as_deref(), Some("us-central1"));
        assert_eq!(parts.name.as_deref(), Some("mig-2"));
    }

    #[test]
    fn test_parse_without_project() {
        let parts = parse_self_link("regions/us-central1/instanceGroupManagers/mig-2");
        assert_eq!(parts.project, None);
        assert_eq!(parts.location.as_deref(), Some("us-central1"));
        assert_eq!(parts.name.as_deref(), Some("mig-2"));
    }

    #[test]
    fn test_parse_truncated_link() {
        let parts = parse_self_link("projects/proj/zones/us-central1-a/instanceGroupManagers");
        assert_eq!(parts.location.as_deref(), Some("us-central1-a"));
        assert_eq!(parts.name, None);
    }

    #[test]
    fn test_relative_path_comparison() {
        assert!(compare_self_link_relative_paths(
            "https://www.googleapis.com/compute/v1/projects/p/regions/r/targetPools/tp",
            "https://compute.googleapis.com/compute/beta/projects/p/regions/r/targetPools/tp",
        ));
        assert!(!compare_self_link_relative_paths(
            "projects/p/regions/r/targetPools/a",
            "projects/p/regions/r/targetPools/b",
        ));
        assert_eq!(self_link_relative_path("no-project-here"), "no-project-here");
    }

    #[test]
    fn test_resource_name() {
        assert_eq!(
            resource_name_from_self_link("https://x/compute/v1/projects/p/zones/us-east1-b"),
            "us-east1-b"
        );
        assert_eq!(resource_name_from_self_link("us-east1-b"), "us-east1-b");
    }

    #[test]
    fn test_region_from_zone() {
        assert_eq!(region_from_zone("us-central1-a"), "us-central1");
        assert_eq!(region_from_zone("europe-west4-c"), "europe-west4");
        assert_eq!(region_from_zone("nohyphen"), "nohyphen");
    }
}
