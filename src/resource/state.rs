//! Result record
//!
//! [`ResourceData`] is the caller-visible output of a read: an identifier
//! plus one value per schema attribute. Every write is checked against the
//! data source schema, and set-typed attributes are normalized so that the
//! same remote state always produces the same record.

use super::schema::{AttrType, AttributeDef, DataSourceSchema, SetKey};
use super::self_link::{resource_name_from_self_link, self_link_relative_path};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// A value the record refused to store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0}: no such attribute in schema")]
    UnknownAttribute(String),

    #[error("{path}: expected {expected}, got {got}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        got: String,
    },

    #[error("{path}: attribute supports {max} item maximum, got {got}")]
    TooManyItems { path: String, max: usize, got: usize },
}

/// Identifier plus attributes of one data source instance
#[derive(Debug, Clone, Serialize)]
pub struct ResourceData {
    #[serde(skip)]
    schema: &'static DataSourceSchema,
    id: Option<String>,
    attributes: Map<String, Value>,
}

impl ResourceData {
    pub fn new(schema: &'static DataSourceSchema) -> Self {
        Self {
            schema,
            id: None,
            attributes: Map::new(),
        }
    }

    pub fn schema(&self) -> &'static DataSourceSchema {
        self.schema
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Store a value after checking it against the schema
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), FieldError> {
        let def = self
            .schema
            .attribute(key)
            .ok_or_else(|| FieldError::UnknownAttribute(key.to_string()))?;

        let value = check_value(key, def, value)?;
        self.attributes.insert(key.to_string(), value);
        Ok(())
    }

    /// Forget everything, marking the resource as gone
    pub fn clear(&mut self) {
        self.id = None;
        self.attributes.clear();
    }

    pub fn is_cleared(&self) -> bool {
        self.id.is_none() && self.attributes.is_empty()
    }
}

fn type_name(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Number(n) => format!("number {}", n),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "list".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

fn mismatch(path: &str, expected: &'static str, got: &Value) -> FieldError {
    FieldError::TypeMismatch {
        path: path.to_string(),
        expected,
        got: type_name(got),
    }
}

fn check_primitive(path: &str, attr_type: AttrType, value: Value) -> Result<Value, FieldError> {
    let ok = match attr_type {
        AttrType::String => value.is_string(),
        AttrType::Int => value.as_i64().is_some(),
        AttrType::Bool => value.is_boolean(),
        AttrType::List | AttrType::Set => false,
    };
    if ok {
        return Ok(value);
    }

    let expected = match attr_type {
        AttrType::String => "string",
        AttrType::Int => "integer",
        AttrType::Bool => "bool",
        AttrType::List | AttrType::Set => "primitive element",
    };
    Err(mismatch(path, expected, &value))
}

/// Check a value against an attribute definition, normalizing sets
fn check_value(path: &str, def: &AttributeDef, value: Value) -> Result<Value, FieldError> {
    if value.is_null() {
        return Ok(value);
    }

    match def.attr_type {
        AttrType::List | AttrType::Set => {},
        primitive => return check_primitive(path, primitive, value),
    }

    let Value::Array(items) = value else {
        return Err(mismatch(path, "list", &value));
    };

    let mut checked = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        let item_path = format!("{}.{}", path, idx);
        checked.push(check_element(&item_path, def, item)?);
    }

    if def.attr_type == AttrType::Set {
        checked = normalize_set(def.set_key, checked);
    }

    if let Some(max) = def.max_items {
        if checked.len() > max {
            return Err(FieldError::TooManyItems {
                path: path.to_string(),
                max,
                got: checked.len(),
            });
        }
    }

    Ok(Value::Array(checked))
}

fn check_element(path: &str, def: &AttributeDef, item: Value) -> Result<Value, FieldError> {
    if let Some(block) = &def.block {
        let Value::Object(fields) = item else {
            return Err(mismatch(path, "object", &item));
        };

        let mut checked = Map::new();
        for (key, value) in fields {
            let field_path = format!("{}.{}", path, key);
            let Some(field_def) = block.get(&key) else {
                return Err(FieldError::UnknownAttribute(field_path));
            };
            checked.insert(key, check_value(&field_path, field_def, value)?);
        }
        return Ok(Value::Object(checked));
    }

    check_primitive(path, def.elem.unwrap_or(AttrType::String), item)
}

/// Deduplicate and order set elements by their key
fn normalize_set(set_key: Option<SetKey>, items: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut keyed: Vec<(String, Value)> = items
        .into_iter()
        .map(|item| (element_key(set_key, &item), item))
        .filter(|(key, _)| seen.insert(key.clone()))
        .collect();

    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, item)| item).collect()
}

fn element_key(set_key: Option<SetKey>, item: &Value) -> String {
    match (set_key, item.as_str()) {
        (Some(SetKey::SelfLinkRelativePath), Some(s)) => self_link_relative_path(s).to_string(),
        (Some(SetKey::ResourceName), Some(s)) => resource_name_from_self_link(s).to_string(),
        _ => canonical_json(item),
    }
}

/// JSON rendering with object keys sorted, independent of insertion order
fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, String> =
                map.iter().map(|(k, v)| (k, canonical_json(v))).collect();
            let fields: Vec<String> = sorted
                .into_iter()
                .map(|(k, v)| format!("{:?}:{}", k, v))
                .collect();
            format!("{{{}}}", fields.join(","))
        },
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", items.join(","))
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::schema::{get_data_source, REGIONAL_DATA_SOURCE, ZONAL_DATA_SOURCE};
    use serde_json::json;

    fn zonal() -> ResourceData {
        ResourceData::new(get_data_source(ZONAL_DATA_SOURCE).unwrap())
    }

    #[test]
    fn test_set_and_get_scalars() {
        let mut d = zonal();
        d.set("target_size", json!(3)).unwrap();
        d.set("base_instance_name", json!("mig-1-")).unwrap();
        d.set("description", Value::Null).unwrap();

        assert_eq!(d.get("target_size"), Some(&json!(3)));
        assert_eq!(d.get("base_instance_name"), Some(&json!("mig-1-")));
        assert_eq!(d.get("description"), Some(&Value::Null));
    }

    #[test]
    fn test_rejects_type_mismatch() {
        let mut d = zonal();
        let err = d.set("target_size", json!("three")).unwrap_err();
        assert_eq!(
            err,
            FieldError::TypeMismatch {
                path: "target_size".to_string(),
                expected: "integer",
                got: "string".to_string(),
            }
        );
        assert!(d.get("target_size").is_none());
    }

    #[test]
    fn test_rejects_unknown_attributes() {
        let mut d = zonal();
        assert_eq!(
            d.set("region", json!("us-central1")).unwrap_err(),
            FieldError::UnknownAttribute("region".to_string())
        );

        let err = d
            .set("named_port", json!([{"name": "http", "port": 80, "protocol": "tcp"}]))
            .unwrap_err();
        assert_eq!(err, FieldError::UnknownAttribute("named_port.0.protocol".to_string()));
    }

    #[test]
    fn test_rejects_too_many_items() {
        let mut d = zonal();
        let err = d
            .set(
                "auto_healing_policies",
                json!([
                    {"health_check": "a", "initial_delay_sec": 1},
                    {"health_check": "b", "initial_delay_sec": 2}
                ]),
            )
            .unwrap_err();
        assert!(matches!(err, FieldError::TooManyItems { max: 1, got: 2, .. }));
    }

    #[test]
    fn test_nested_type_checking() {
        let mut d = zonal();
        let err = d
            .set("status", json!([{"is_stable": "yes"}]))
            .unwrap_err();
        assert_eq!(
            err,
            FieldError::TypeMismatch {
                path: "status.0.is_stable".to_string(),
                expected: "bool",
                got: "string".to_string(),
            }
        );
    }

    #[test]
    fn test_list_order_preserved() {
        let mut d = zonal();
        let versions = json!([
            {"name": "primary", "instance_template": "t-b"},
            {"name": "canary", "instance_template": "t-a"}
        ]);
        d.set("version", versions.clone()).unwrap();
        assert_eq!(d.get("version"), Some(&versions));
    }

    #[test]
    fn test_set_normalization_is_order_independent() {
        let mut a = zonal();
        let mut b = zonal();
        a.set("named_port", json!([{"name": "https", "port": 443}, {"name": "http", "port": 80}]))
            .unwrap();
        b.set("named_port", json!([{"port": 80, "name": "http"}, {"name": "https", "port": 443}]))
            .unwrap();
        assert_eq!(a.get("named_port"), b.get("named_port"));
    }

    #[test]
    fn test_target_pools_dedupe_by_relative_path() {
        let mut d = zonal();
        d.set(
            "target_pools",
            json!([
                "https://www.googleapis.com/compute/v1/projects/p/regions/r/targetPools/b",
                "https://www.googleapis.com/compute/v1/projects/p/regions/r/targetPools/a",
                "https://compute.googleapis.com/compute/v1/projects/p/regions/r/targetPools/a"
            ]),
        )
        .unwrap();
        assert_eq!(
            d.get("target_pools"),
            Some(&json!([
                "https://www.googleapis.com/compute/v1/projects/p/regions/r/targetPools/a",
                "https://www.googleapis.com/compute/v1/projects/p/regions/r/targetPools/b"
            ]))
        );
    }

    #[test]
    fn test_distribution_zones_keyed_by_name() {
        let mut d = ResourceData::new(get_data_source(REGIONAL_DATA_SOURCE).unwrap());
        d.set(
            "distribution_policy_zones",
            json!(["projects/p/zones/us-central1-c", "us-central1-a", "zones/us-central1-c"]),
        )
        .unwrap();
        assert_eq!(
            d.get("distribution_policy_zones"),
            Some(&json!(["us-central1-a", "projects/p/zones/us-central1-c"]))
        );
    }

    #[test]
    fn test_clear() {
        let mut d = zonal();
        d.set_id("projects/p/zones/z/instanceGroupManagers/n");
        d.set("target_size", json!(1)).unwrap();
        assert!(!d.is_cleared());

        d.clear();
        assert!(d.is_cleared());
        assert_eq!(d.id(), None);
    }
}
