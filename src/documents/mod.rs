//! Whole capabilities and enable documents.
//!
//! Next to the `capabilities` section both documents carry metadata, scenes,
//! typed settings and adaptations. The enable document can only pick from
//! what the capabilities document declares: its `target` must name that
//! document, its scenes, settings and adaptations must be declared there, and
//! numeric settings stay within the declared `min`/`max`.

pub mod capabilities_file;
pub mod enable_file;
pub mod settings;

pub use capabilities_file::{Adaptation, CapabilitiesFile, DEFAULT_VERSION, Scene};
pub use enable_file::{EnableFile, EnableIntent};
pub use settings::{Setting, SettingKind, SettingValue};

use crate::runtime::{BoundLimit, LoadError};
use serde_json::{Map, Value};
use thiserror::Error;

/// A capabilities or enable document that breaks the document rules.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FileError {
    #[error("document is missing required field `{field}`")]
    MissingField { field: String },
    #[error("`{field}` must be {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },
    #[error("setting `{setting}` has unsupported type `{ty}`")]
    UnknownSettingType { setting: String, ty: String },
    #[error("setting `{setting}` lists option `{option}` more than once")]
    DuplicateOption { setting: String, option: String },
    #[error("setting `{setting}` has no option `{option}`")]
    UnknownOption { setting: String, option: String },
    #[error("setting `{setting}` value {value} is {limit} {bound}")]
    SettingOutOfBounds {
        setting: String,
        value: String,
        bound: String,
        limit: BoundLimit,
    },
    #[error("enable file targets `{target}` but the capabilities file is `{name}`")]
    TargetMismatch { target: String, name: String },
    #[error("scene `{scene}` is not declared by the capabilities file")]
    UnknownScene { scene: String },
    #[error("scene `{scene}` is enabled more than once")]
    DuplicateScene { scene: String },
    #[error("setting `{setting}` is not declared by the capabilities file")]
    UnknownSetting { setting: String },
    #[error("unknown intent `{intent}` (expected showcase|benchmark|testing)")]
    UnknownIntent { intent: String },
    #[error("adaptation `{adaptation}` is not declared by the capabilities file")]
    UnknownAdaptation { adaptation: String },
    #[error(transparent)]
    Capabilities(#[from] LoadError),
}

pub(crate) fn invalid(field: impl Into<String>, expected: &'static str) -> FileError {
    FileError::InvalidField {
        field: field.into(),
        expected,
    }
}

/// `root[key]` as an object; absent is `None`.
pub(crate) fn object_section<'a>(
    root: &'a Value,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, FileError> {
    match root.get(key) {
        None => Ok(None),
        Some(Value::Object(section)) => Ok(Some(section)),
        Some(_) => Err(invalid(key, "an object")),
    }
}

/// `node[key]` as a string; `path` names the field in errors.
pub(crate) fn optional_str<'a>(
    node: &'a Value,
    key: &str,
    path: &str,
) -> Result<Option<&'a str>, FileError> {
    match node.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(invalid(path, "a string")),
    }
}

pub(crate) fn required_str<'a>(node: &'a Value, key: &str) -> Result<&'a str, FileError> {
    optional_str(node, key, key)?.ok_or_else(|| FileError::MissingField {
        field: key.to_string(),
    })
}

/// Entries of an object section whose values are `{ "description": ... }`.
pub(crate) fn described_entries(
    root: &Value,
    key: &str,
) -> Result<Vec<(String, String)>, FileError> {
    let Some(section) = object_section(root, key)? else {
        return Ok(Vec::new());
    };
    let mut entries = Vec::with_capacity(section.len());
    for (name, entry) in section {
        let path = format!("{key}.{name}");
        if !entry.is_object() {
            return Err(invalid(path, "an object"));
        }
        let description = optional_str(entry, "description", &format!("{path}.description"))?;
        entries.push((name.clone(), description.unwrap_or_default().to_string()));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn described_entries_keep_order_and_default_description() {
        let root = json!({"scenes": {
            "intro": {"description": "Opening flyby"},
            "cave": {}
        }});
        assert_eq!(
            described_entries(&root, "scenes").unwrap(),
            vec![
                ("intro".to_string(), "Opening flyby".to_string()),
                ("cave".to_string(), String::new())
            ]
        );
        assert!(described_entries(&json!({}), "scenes").unwrap().is_empty());
    }

    #[test]
    fn malformed_fields_name_their_path() {
        let err = described_entries(&json!({"scenes": {"intro": 1}}), "scenes").unwrap_err();
        assert_eq!(err.to_string(), "`scenes.intro` must be an object");

        let err = required_str(&json!({"name": 3}), "name").unwrap_err();
        assert_eq!(err, invalid("name", "a string"));

        let err = required_str(&json!({}), "target").unwrap_err();
        assert_eq!(
            err.to_string(),
            "document is missing required field `target`"
        );
        assert!(object_section(&json!({"settings": []}), "settings").is_err());
    }
}
