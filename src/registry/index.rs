//! Ordered, indexed view of a capability registry.
//!
//! Declarations keep the authored order of the registry document: generated
//! fields and generated checks follow it, so it is part of the output
//! contract. Beyond the structural checks needed to render Rust (a
//! `capabilities` object, a known `type`, identifier names, representable
//! bounds) nothing is validated here; in particular `min <= max` is left to
//! the registry author.

use crate::read_json_file;
use crate::registry::identity::{CapabilityName, ValueType};
use crate::registry::model::{Bound, CapabilityDeclaration, CapabilityKind};
use crate::registry::SchemaError;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

pub const CAPABILITIES_KEY: &str = "capabilities";
const TYPE_KEY: &str = "type";
const MIN_KEY: &str = "min";
const MAX_KEY: &str = "max";

#[derive(Clone, Debug, Default)]
/// Capability declarations in authored order plus a lookup by name.
pub struct Registry {
    declarations: Vec<CapabilityDeclaration>,
    by_name: BTreeMap<CapabilityName, usize>,
}

impl Registry {
    /// Load a registry document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let root = read_json_file(path)?;
        Self::from_value(&root).with_context(|| format!("loading registry {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(raw).context("parsing registry JSON")?;
        Ok(Self::from_value(&root)?)
    }

    /// Build the registry from an already-parsed document.
    pub fn from_value(root: &Value) -> Result<Self, SchemaError> {
        let entries = root
            .get(CAPABILITIES_KEY)
            .and_then(Value::as_object)
            .ok_or(SchemaError::MissingCapabilities)?;

        let mut registry = Registry::default();
        for (raw_name, entry) in entries {
            let declaration = parse_declaration(raw_name, entry)?;
            registry
                .by_name
                .insert(declaration.name.clone(), registry.declarations.len());
            registry.declarations.push(declaration);
        }
        Ok(registry)
    }

    /// Declarations in authored order.
    pub fn declarations(&self) -> impl Iterator<Item = &CapabilityDeclaration> {
        self.declarations.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &CapabilityName> {
        self.declarations.iter().map(|decl| &decl.name)
    }

    pub fn get(&self, name: &str) -> Option<&CapabilityDeclaration> {
        let index = self.by_name.get(&CapabilityName(name.to_string()))?;
        self.declarations.get(*index)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

fn parse_declaration(raw_name: &str, entry: &Value) -> Result<CapabilityDeclaration, SchemaError> {
    let name = raw_name.to_string();
    let fields = entry
        .as_object()
        .ok_or_else(|| SchemaError::NotAnObject { name: name.clone() })?;

    let raw_type = fields
        .get(TYPE_KEY)
        .ok_or_else(|| SchemaError::MissingType { name: name.clone() })?;
    let ty = raw_type
        .as_str()
        .and_then(ValueType::parse)
        .ok_or_else(|| SchemaError::UnknownType {
            name: name.clone(),
            ty: raw_type.as_str().map_or_else(|| raw_type.to_string(), str::to_string),
        })?;

    if !CapabilityName::is_valid_identifier(raw_name) {
        return Err(SchemaError::InvalidName { name });
    }

    let kind = if ty == ValueType::Bool {
        if fields.contains_key(MIN_KEY) || fields.contains_key(MAX_KEY) {
            return Err(SchemaError::BoundsOnBoolean { name });
        }
        CapabilityKind::Boolean
    } else {
        CapabilityKind::Numeric {
            ty,
            min: parse_bound(&name, ty, fields, MIN_KEY)?,
            max: parse_bound(&name, ty, fields, MAX_KEY)?,
        }
    };

    Ok(CapabilityDeclaration {
        name: CapabilityName(name),
        kind,
    })
}

fn parse_bound(
    name: &str,
    ty: ValueType,
    fields: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<Bound>, SchemaError> {
    let Some(raw) = fields.get(key) else {
        return Ok(None);
    };
    Bound::from_json(ty, raw)
        .map(Some)
        .map_err(|reason| SchemaError::InvalidBound {
            name: name.to_string(),
            bound: key,
            reason,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_authored_order() {
        let registry = Registry::from_value(&json!({
            "capabilities": {
                "zeta": {"type": "bool"},
                "alpha": {"type": "int", "min": 0, "max": 5},
                "mid": {"type": "float"}
            }
        }))
        .unwrap();
        let names: Vec<&str> = registry.names().map(CapabilityName::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.len(), 3);

        let alpha = registry.get("alpha").unwrap();
        assert_eq!(alpha.value_type(), ValueType::I32);
        assert_eq!(alpha.min(), Some(Bound::Int(0)));
        assert_eq!(alpha.max(), Some(Bound::Int(5)));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn missing_capabilities_section_is_rejected() {
        let err = Registry::from_value(&json!({"caps": {}})).unwrap_err();
        assert_eq!(err, SchemaError::MissingCapabilities);
        let err = Registry::from_value(&json!({"capabilities": []})).unwrap_err();
        assert_eq!(err, SchemaError::MissingCapabilities);
    }

    #[test]
    fn missing_type_is_rejected() {
        let err = Registry::from_value(&json!({
            "capabilities": {"retries": {"min": 0}}
        }))
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingType {
                name: "retries".into()
            }
        );
    }

    #[test]
    fn structural_problems_are_reported_per_entry() {
        let unknown = Registry::from_value(&json!({
            "capabilities": {"label": {"type": "string"}}
        }))
        .unwrap_err();
        assert!(matches!(unknown, SchemaError::UnknownType { ref ty, .. } if ty == "string"));

        let bad_name = Registry::from_value(&json!({
            "capabilities": {"frame-rate": {"type": "float"}}
        }))
        .unwrap_err();
        assert!(matches!(bad_name, SchemaError::InvalidName { .. }));

        let bool_bounds = Registry::from_value(&json!({
            "capabilities": {"frameless": {"type": "bool", "max": 1}}
        }))
        .unwrap_err();
        assert!(matches!(bool_bounds, SchemaError::BoundsOnBoolean { .. }));

        let bad_bound = Registry::from_value(&json!({
            "capabilities": {"loops": {"type": "u8", "max": 1000}}
        }))
        .unwrap_err();
        assert!(matches!(bad_bound, SchemaError::InvalidBound { bound: "max", .. }));

        let not_object = Registry::from_value(&json!({
            "capabilities": {"loops": "int"}
        }))
        .unwrap_err();
        assert!(matches!(not_object, SchemaError::NotAnObject { .. }));
    }

    #[test]
    fn inverted_bounds_are_left_to_the_author() {
        let registry = Registry::from_value(&json!({
            "capabilities": {"loops": {"type": "int", "min": 9, "max": 1}}
        }))
        .unwrap();
        let loops = registry.get("loops").unwrap();
        assert_eq!(loops.min(), Some(Bound::Int(9)));
        assert_eq!(loops.max(), Some(Bound::Int(1)));
    }

    #[test]
    fn empty_registry_is_valid() {
        let registry = Registry::from_json_str(r#"{"capabilities": {}}"#).unwrap();
        assert!(registry.is_empty());
    }
}
