//! JSON Schema for capabilities and enable documents.
//!
//! The schema is derived from the registry: each declared capability gets an
//! entry shape with a typed `default`. Capabilities files must also carry
//! `modifiable`; enable files carry the declared bounds as
//! `minimum`/`maximum`. Keys the registry does not declare are allowed, since
//! the loaders ignore them.

use crate::registry::{CapabilityDeclaration, Registry, ValueType};
use crate::runtime::{CAPABILITIES_KEY, DEFAULT_FIELD, MODIFIABLE_FIELD};
use anyhow::{Result, anyhow, bail};
use jsonschema::{Draft, JSONSchema};
use serde_json::{Map, Value, json};
use std::fmt;

const DRAFT7_URI: &str = "http://json-schema.org/draft-07/schema#";

/// Which loading phase a document feeds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DocumentKind {
    Capabilities,
    Enable,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Capabilities => "capabilities",
            DocumentKind::Enable => "enable",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "capabilities" => Ok(DocumentKind::Capabilities),
            "enable" => Ok(DocumentKind::Enable),
            other => bail!("unknown document kind '{other}' (expected capabilities|enable)"),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render the JSON Schema for documents of `kind`.
pub fn render_document_schema(registry: &Registry, kind: DocumentKind) -> Value {
    let mut properties = Map::new();
    for decl in registry.declarations() {
        properties.insert(decl.name.0.clone(), entry_schema(decl, kind));
    }

    json!({
        "$schema": DRAFT7_URI,
        "title": format!("{kind} document"),
        "type": "object",
        "properties": {
            CAPABILITIES_KEY: {
                "type": "object",
                "properties": properties,
            }
        }
    })
}

fn entry_schema(decl: &CapabilityDeclaration, kind: DocumentKind) -> Value {
    let mut fields = Map::new();
    fields.insert(DEFAULT_FIELD.to_string(), value_schema(decl, kind));
    let required = match kind {
        DocumentKind::Capabilities => {
            fields.insert(MODIFIABLE_FIELD.to_string(), json!({"type": "boolean"}));
            json!([DEFAULT_FIELD, MODIFIABLE_FIELD])
        }
        DocumentKind::Enable => json!([DEFAULT_FIELD]),
    };
    json!({
        "type": "object",
        "properties": fields,
        "required": required,
    })
}

fn value_schema(decl: &CapabilityDeclaration, kind: DocumentKind) -> Value {
    let ty: ValueType = decl.value_type();
    let mut schema = Map::new();
    schema.insert("type".to_string(), json!(ty.json_schema_type()));

    let (mut minimum, mut maximum) = match ty.integer_range() {
        Some((lo, hi)) => (Some(int_json(lo)), Some(int_json(hi))),
        None => (None, None),
    };
    // Declared bounds only bind the override phase.
    if kind == DocumentKind::Enable {
        if let Some(min) = decl.min() {
            minimum = Some(min.to_json());
        }
        if let Some(max) = decl.max() {
            maximum = Some(max.to_json());
        }
    }
    if let Some(minimum) = minimum {
        schema.insert("minimum".to_string(), minimum);
    }
    if let Some(maximum) = maximum {
        schema.insert("maximum".to_string(), maximum);
    }
    Value::Object(schema)
}

fn int_json(value: i128) -> Value {
    match i64::try_from(value) {
        Ok(v) => Value::from(v),
        Err(_) => Value::from(value as u64),
    }
}

/// Compiled document schema for one registry and document kind.
pub struct DocumentValidator {
    kind: DocumentKind,
    compiled: JSONSchema,
}

impl DocumentValidator {
    pub fn compile(registry: &Registry, kind: DocumentKind) -> Result<Self> {
        let schema = render_document_schema(registry, kind);
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|err| anyhow!("compiling {kind} document schema: {err}"))?;
        Ok(Self { kind, compiled })
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Every schema violation in `document`, or `Ok` when it conforms.
    pub fn validate(&self, document: &Value) -> std::result::Result<(), Vec<String>> {
        self.compiled.validate(document).map_err(|errors| {
            errors
                .map(|err| format!("{}: {}", err.instance_path, err))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::from_value(&json!({
            "capabilities": {
                "retries": {"type": "u8", "min": 1, "max": 5},
                "frameless": {"type": "bool"},
                "loop_time": {"type": "double"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn capabilities_schema_requires_modifiable_and_ignores_bounds() {
        let schema = render_document_schema(&registry(), DocumentKind::Capabilities);
        let retries = &schema["properties"]["capabilities"]["properties"]["retries"];
        assert_eq!(retries["required"], json!(["default", "modifiable"]));
        assert_eq!(retries["properties"]["default"]["minimum"], json!(0));
        assert_eq!(retries["properties"]["default"]["maximum"], json!(255));
        let loop_time = &schema["properties"]["capabilities"]["properties"]["loop_time"];
        assert_eq!(loop_time["properties"]["default"], json!({"type": "number"}));
    }

    #[test]
    fn enable_schema_carries_declared_bounds() {
        let schema = render_document_schema(&registry(), DocumentKind::Enable);
        let retries = &schema["properties"]["capabilities"]["properties"]["retries"];
        assert_eq!(retries["required"], json!(["default"]));
        assert_eq!(
            retries["properties"]["default"],
            json!({"type": "integer", "minimum": 1, "maximum": 5})
        );
    }

    #[test]
    fn validator_reports_each_violation() {
        let validator = DocumentValidator::compile(&registry(), DocumentKind::Enable).unwrap();
        assert_eq!(validator.kind(), DocumentKind::Enable);
        assert!(
            validator
                .validate(&json!({"capabilities": {"retries": {"default": 3}, "other": 1}}))
                .is_ok()
        );
        let errors = validator
            .validate(&json!({"capabilities": {
                "retries": {"default": 9},
                "frameless": {"default": "yes"}
            }}))
            .unwrap_err();
        assert_eq!(errors.len(), 2);

        let base = DocumentValidator::compile(&registry(), DocumentKind::Capabilities).unwrap();
        assert!(
            base.validate(&json!({"capabilities": {"frameless": {"default": true}}}))
                .is_err()
        );
    }

    #[test]
    fn kind_parses_known_names() {
        assert_eq!(DocumentKind::parse("enable").unwrap(), DocumentKind::Enable);
        assert_eq!(
            DocumentKind::parse("capabilities").unwrap().to_string(),
            "capabilities"
        );
        assert!(DocumentKind::parse("settings").is_err());
    }
}
