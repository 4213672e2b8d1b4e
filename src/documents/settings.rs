//! Typed settings.
//!
//! A capabilities file declares each setting with a type, its constraints
//! (`options` for selections, `min`/`max` for numbers) and an optional
//! default. An enable file assigns bare values to declared settings.

use crate::documents::{FileError, invalid, optional_str};
use crate::runtime::{BoundLimit, DEFAULT_FIELD};
use serde_json::{Map, Value, json};
use std::fmt::Display;

#[derive(Clone, Debug, PartialEq)]
pub enum SettingKind {
    Selection { options: Vec<String> },
    Bool,
    Integer { min: i64, max: i64 },
    Float { min: f64, max: f64 },
}

impl SettingKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingKind::Selection { .. } => "selection",
            SettingKind::Bool => "bool",
            SettingKind::Integer { .. } => "integer",
            SettingKind::Float { .. } => "float",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SettingValue {
    /// Index into the selection's options.
    Selection(usize),
    Bool(bool),
    Integer(i64),
    Float(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Setting {
    pub name: String,
    pub description: String,
    pub kind: SettingKind,
    pub value: Option<SettingValue>,
}

impl Setting {
    /// Parse a `settings.<name>` declaration from a capabilities file.
    pub(crate) fn declare(name: &str, entry: &Value) -> Result<Self, FileError> {
        let path = format!("settings.{name}");
        if !entry.is_object() {
            return Err(invalid(path, "an object"));
        }
        let ty = optional_str(entry, "type", &format!("{path}.type"))?.ok_or_else(|| {
            FileError::MissingField {
                field: format!("{path}.type"),
            }
        })?;

        let kind = match ty {
            "selection" => SettingKind::Selection {
                options: parse_options(name, entry, &path)?,
            },
            "bool" => SettingKind::Bool,
            "integer" => SettingKind::Integer {
                min: number_field(entry, "min", &path, Value::as_i64, "an integer")?,
                max: number_field(entry, "max", &path, Value::as_i64, "an integer")?,
            },
            "float" => SettingKind::Float {
                min: number_field(entry, "min", &path, Value::as_f64, "a number")?,
                max: number_field(entry, "max", &path, Value::as_f64, "a number")?,
            },
            other => {
                return Err(FileError::UnknownSettingType {
                    setting: name.to_string(),
                    ty: other.to_string(),
                });
            }
        };

        let mut setting = Setting {
            name: name.to_string(),
            description: optional_str(entry, "description", &format!("{path}.description"))?
                .unwrap_or_default()
                .to_string(),
            kind,
            value: None,
        };
        if let Some(raw) = entry.get(DEFAULT_FIELD) {
            setting.value = Some(setting.decode(raw, &format!("{path}.{DEFAULT_FIELD}"))?);
        }
        Ok(setting)
    }

    /// This declaration with `raw` from an enable file as its value.
    ///
    /// Numeric values must lie within the declared bounds.
    pub(crate) fn assign(&self, raw: &Value) -> Result<Self, FileError> {
        let value = self.decode(raw, &format!("settings.{}", self.name))?;
        match (&self.kind, &value) {
            (SettingKind::Integer { min, max }, SettingValue::Integer(v)) => {
                self.check_bounds(v, min, max)?
            }
            (SettingKind::Float { min, max }, SettingValue::Float(v)) => {
                self.check_bounds(v, min, max)?
            }
            _ => {}
        }
        Ok(Setting {
            value: Some(value),
            ..self.clone()
        })
    }

    fn decode(&self, raw: &Value, path: &str) -> Result<SettingValue, FileError> {
        match &self.kind {
            SettingKind::Selection { options } => {
                let option = raw.as_str().ok_or_else(|| invalid(path, "a string"))?;
                options
                    .iter()
                    .position(|candidate| candidate == option)
                    .map(SettingValue::Selection)
                    .ok_or_else(|| FileError::UnknownOption {
                        setting: self.name.clone(),
                        option: option.to_string(),
                    })
            }
            SettingKind::Bool => raw
                .as_bool()
                .map(SettingValue::Bool)
                .ok_or_else(|| invalid(path, "a boolean")),
            SettingKind::Integer { .. } => raw
                .as_i64()
                .map(SettingValue::Integer)
                .ok_or_else(|| invalid(path, "an integer")),
            SettingKind::Float { .. } => raw
                .as_f64()
                .map(SettingValue::Float)
                .ok_or_else(|| invalid(path, "a number")),
        }
    }

    fn check_bounds<T>(&self, value: &T, min: &T, max: &T) -> Result<(), FileError>
    where
        T: PartialOrd + Display,
    {
        let (bound, limit) = if value < min {
            (min, BoundLimit::Min)
        } else if value > max {
            (max, BoundLimit::Max)
        } else {
            return Ok(());
        };
        tracing::debug!(setting = %self.name, %value, %bound, ?limit, "setting out of bounds");
        Err(FileError::SettingOutOfBounds {
            setting: self.name.clone(),
            value: value.to_string(),
            bound: bound.to_string(),
            limit,
        })
    }

    /// The value as it is spelled in documents.
    pub fn value_json(&self) -> Option<Value> {
        let value = self.value.as_ref()?;
        Some(match (value, &self.kind) {
            (SettingValue::Selection(index), SettingKind::Selection { options }) => {
                Value::from(options.get(*index)?.as_str())
            }
            (SettingValue::Selection(index), _) => Value::from(*index),
            (SettingValue::Bool(v), _) => Value::from(*v),
            (SettingValue::Integer(v), _) => Value::from(*v),
            (SettingValue::Float(v), _) => Value::from(*v),
        })
    }

    /// The declaration as it appears in a capabilities file.
    pub fn to_declaration(&self) -> Value {
        let mut entry = Map::new();
        entry.insert("type".to_string(), json!(self.kind.type_name()));
        if !self.description.is_empty() {
            entry.insert("description".to_string(), json!(self.description));
        }
        match &self.kind {
            SettingKind::Selection { options } => {
                entry.insert("options".to_string(), json!(options));
            }
            SettingKind::Bool => {}
            SettingKind::Integer { min, max } => {
                entry.insert("min".to_string(), json!(min));
                entry.insert("max".to_string(), json!(max));
            }
            SettingKind::Float { min, max } => {
                entry.insert("min".to_string(), json!(min));
                entry.insert("max".to_string(), json!(max));
            }
        }
        if let Some(value) = self.value_json() {
            entry.insert(DEFAULT_FIELD.to_string(), value);
        }
        Value::Object(entry)
    }
}

fn parse_options(name: &str, entry: &Value, path: &str) -> Result<Vec<String>, FileError> {
    let field = format!("{path}.options");
    let raw = entry
        .get("options")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid(field.as_str(), "an array of strings"))?;
    let mut options: Vec<String> = Vec::with_capacity(raw.len());
    for option in raw {
        let option = option
            .as_str()
            .ok_or_else(|| invalid(field.as_str(), "an array of strings"))?;
        if options.iter().any(|known| known == option) {
            return Err(FileError::DuplicateOption {
                setting: name.to_string(),
                option: option.to_string(),
            });
        }
        options.push(option.to_string());
    }
    Ok(options)
}

fn number_field<T>(
    entry: &Value,
    key: &str,
    path: &str,
    read: fn(&Value) -> Option<T>,
    expected: &'static str,
) -> Result<T, FileError> {
    let field = format!("{path}.{key}");
    let raw = entry
        .get(key)
        .ok_or_else(|| FileError::MissingField {
            field: field.clone(),
        })?;
    read(raw).ok_or_else(|| invalid(field, expected))
}
