//! Schema Registry - Load data source schemas from JSON
//!
//! The attribute catalog of the instance group manager data sources lives
//! in an embedded JSON file. It is parsed once and shared by validation,
//! the result record and the CLI's `--schema` output.

use crate::gcp::compute::LocationScope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Embedded schema catalog (compiled into the binary)
const SCHEMA_FILE: &str = include_str!("../resources/instance_group_manager.json");

/// Data source name of the zonal variant
pub const ZONAL_DATA_SOURCE: &str = "google_compute_instance_group_manager";

/// Data source name of the regional variant
pub const REGIONAL_DATA_SOURCE: &str = "google_compute_region_instance_group_manager";

/// Value type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    String,
    Int,
    Bool,
    List,
    Set,
}

/// Constraint checked against configured values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validation {
    IntBetween(i64, i64),
    StringInSlice {
        values: Vec<String>,
        #[serde(default)]
        ignore_case: bool,
    },
    /// 1-63 characters, lowercase letter first, no trailing hyphen
    Rfc1035Name,
}

impl Validation {
    /// Check a value, returning a message describing the violation
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Validation::IntBetween(min, max) => {
                let Some(n) = value.as_i64() else {
                    return Err(format!("expected an integer, got {}", value));
                };
                if n < *min || n > *max {
                    return Err(format!("expected to be in the range ({} - {}), got {}", min, max, n));
                }
                Ok(())
            },
            Validation::StringInSlice {
                values,
                ignore_case,
            } => {
                let Some(s) = value.as_str() else {
                    return Err(format!("expected a string, got {}", value));
                };
                let found = values.iter().any(|v| {
                    if *ignore_case {
                        v.eq_ignore_ascii_case(s)
                    } else {
                        v == s
                    }
                });
                if !found {
                    return Err(format!("expected to be one of {:?}, got {:?}", values, s));
                }
                Ok(())
            },
            Validation::Rfc1035Name => {
                let Some(s) = value.as_str() else {
                    return Err(format!("expected a string, got {}", value));
                };
                if is_rfc1035_name(s) {
                    Ok(())
                } else {
                    Err(format!("{:?} is not a valid RFC1035 name", s))
                }
            },
        }
    }
}

fn is_rfc1035_name(s: &str) -> bool {
    if s.is_empty() || s.len() > 63 {
        return false;
    }
    if !s.starts_with(|c: char| c.is_ascii_lowercase()) || s.ends_with('-') {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Key that orders and deduplicates set elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetKey {
    /// Host-independent self-link path
    SelfLinkRelativePath,
    /// Last path segment, so names and self-links collide
    ResourceName,
}

/// Attribute definition from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDef {
    #[serde(rename = "type")]
    pub attr_type: AttrType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_key: Option<SetKey>,
    /// Element type of a list or set of primitives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elem: Option<AttrType>,
    /// Nested attributes of a list or set of objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<BTreeMap<String, AttributeDef>>,
    #[serde(default)]
    pub description: String,
}

/// Schema of one data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceSchema {
    pub scope: LocationScope,
    #[serde(default)]
    pub description: String,
    pub attributes: BTreeMap<String, AttributeDef>,
}

impl DataSourceSchema {
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.get(name)
    }
}

/// Root structure of the embedded catalog
#[derive(Debug, Clone, Deserialize)]
struct SchemaFile {
    #[serde(default)]
    common_attributes: BTreeMap<String, AttributeDef>,
    data_sources: BTreeMap<String, DataSourceSchema>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<BTreeMap<String, DataSourceSchema>> = OnceLock::new();

/// Get the schema registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static BTreeMap<String, DataSourceSchema> {
    REGISTRY.get_or_init(|| {
        let file: SchemaFile = serde_json::from_str(SCHEMA_FILE)
            .unwrap_or_else(|e| panic!("Failed to parse embedded schema JSON: {}", e));

        file.data_sources
            .into_iter()
            .map(|(name, mut schema)| {
                for (attr, def) in &file.common_attributes {
                    schema
                        .attributes
                        .entry(attr.clone())
                        .or_insert_with(|| def.clone());
                }
                (name, schema)
            })
            .collect()
    })
}

/// Get a data source schema by name
pub fn get_data_source(name: &str) -> Option<&'static DataSourceSchema> {
    get_registry().get(name)
}

/// Name of the data source serving a scope
pub fn data_source_name(scope: LocationScope) -> &'static str {
    match scope {
        LocationScope::Zonal => ZONAL_DATA_SOURCE,
        LocationScope::Regional => REGIONAL_DATA_SOURCE,
    }
}
