//! Registry-driven interpreter of the two-phase loading protocol.
//!
//! `CapabilitySnapshot` applies the same rules as the generated
//! `LoadCapabilities` implementation, but reads declarations from a
//! [`Registry`] at runtime instead of from generated fields. The driver uses
//! it to check documents without compiling generated code.

use crate::registry::{Bound, CapabilityDeclaration, CapabilityName, Registry, ValueType};
use crate::runtime::{
    self, Capability, DEFAULT_FIELD, LoadError, MODIFIABLE_FIELD, capabilities_section,
};
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::fmt;

/// A capability value with its declared type erased.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int(i128),
    Float(f64),
}

impl PartialOrd for ScalarValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (ScalarValue::Bool(a), ScalarValue::Bool(b)) => a.partial_cmp(b),
            (ScalarValue::Int(a), ScalarValue::Int(b)) => a.partial_cmp(b),
            (ScalarValue::Float(a), ScalarValue::Float(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(value) => write!(f, "{value}"),
            ScalarValue::Int(value) => write!(f, "{value}"),
            ScalarValue::Float(value) => write!(f, "{value}"),
        }
    }
}

impl ScalarValue {
    pub fn to_json(&self) -> Value {
        match self {
            ScalarValue::Bool(value) => Value::Bool(*value),
            ScalarValue::Int(value) => match i64::try_from(*value) {
                Ok(v) => Value::from(v),
                Err(_) => Value::from(*value as u64),
            },
            ScalarValue::Float(value) => Value::from(*value),
        }
    }

    /// A bound as it compares against values of type `ty`.
    ///
    /// `f32` bounds are rounded to `f32` first, matching the comparison the
    /// generated code performs on `f32` fields.
    fn from_bound(bound: Bound, ty: ValueType) -> Self {
        match bound {
            Bound::Int(value) => ScalarValue::Int(value),
            Bound::Float(value) if ty == ValueType::F32 => ScalarValue::Float(value as f32 as f64),
            Bound::Float(value) => ScalarValue::Float(value),
        }
    }
}

/// Decode `entry.default` as the declared type of `decl`.
fn decode_value(entry: &Value, decl: &CapabilityDeclaration) -> Result<ScalarValue, LoadError> {
    let name = decl.name.as_str();
    let value = match decl.value_type() {
        ValueType::Bool => ScalarValue::Bool(runtime::decode_field(entry, name, DEFAULT_FIELD)?),
        ValueType::I8 => int(runtime::decode_field::<i8>(entry, name, DEFAULT_FIELD)?),
        ValueType::I16 => int(runtime::decode_field::<i16>(entry, name, DEFAULT_FIELD)?),
        ValueType::I32 => int(runtime::decode_field::<i32>(entry, name, DEFAULT_FIELD)?),
        ValueType::I64 => int(runtime::decode_field::<i64>(entry, name, DEFAULT_FIELD)?),
        ValueType::U8 => int(runtime::decode_field::<u8>(entry, name, DEFAULT_FIELD)?),
        ValueType::U16 => int(runtime::decode_field::<u16>(entry, name, DEFAULT_FIELD)?),
        ValueType::U32 => int(runtime::decode_field::<u32>(entry, name, DEFAULT_FIELD)?),
        ValueType::U64 => int(runtime::decode_field::<u64>(entry, name, DEFAULT_FIELD)?),
        ValueType::F32 => {
            ScalarValue::Float(runtime::decode_field::<f32>(entry, name, DEFAULT_FIELD)? as f64)
        }
        ValueType::F64 => ScalarValue::Float(runtime::decode_field(entry, name, DEFAULT_FIELD)?),
    };
    Ok(value)
}

fn int(value: impl Into<i128>) -> ScalarValue {
    ScalarValue::Int(value.into())
}

#[derive(Clone, Debug, Default, PartialEq)]
/// A loaded aggregate: present capabilities in registry order.
pub struct CapabilitySnapshot {
    entries: Vec<(CapabilityName, Capability<ScalarValue>)>,
}

impl CapabilitySnapshot {
    /// Operation A: the base aggregate from a capabilities file.
    pub fn load_base(registry: &Registry, root: &Value) -> Result<Self, LoadError> {
        let mut snapshot = Self::default();
        let Some(node) = capabilities_section(root)? else {
            return Ok(snapshot);
        };
        for decl in registry.declarations() {
            let Some(entry) = node.get(decl.name.as_str()) else {
                continue;
            };
            let capability = Capability {
                value: decode_value(entry, decl)?,
                modifiable: runtime::decode_field(entry, decl.name.as_str(), MODIFIABLE_FIELD)?,
            };
            snapshot.entries.push((decl.name.clone(), capability));
        }
        Ok(snapshot)
    }

    /// Operation B: the effective aggregate from `base` and an enable file.
    pub fn load_effective(
        registry: &Registry,
        base: &CapabilitySnapshot,
        root: &Value,
        add_capabilities_file_defaults: bool,
    ) -> Result<Self, LoadError> {
        let mut snapshot = Self::default();
        let Some(node) = capabilities_section(root)? else {
            return Ok(snapshot);
        };
        for decl in registry.declarations() {
            let key = decl.name.as_str();
            let inherited = base.get(key);
            if let Some(entry) = node.get(key) {
                let granted = runtime::require_modifiable(inherited, key)?;
                let value = decode_value(entry, decl)?;
                let ty = decl.value_type();
                if let Some(min) = decl.min() {
                    runtime::check_min(key, &value, ScalarValue::from_bound(min, ty))?;
                }
                if let Some(max) = decl.max() {
                    runtime::check_max(key, &value, ScalarValue::from_bound(max, ty))?;
                }
                tracing::debug!(capability = key, %value, "capability overridden by enable file");
                snapshot.entries.push((
                    decl.name.clone(),
                    Capability {
                        value,
                        modifiable: granted.modifiable,
                    },
                ));
            } else if add_capabilities_file_defaults {
                if let Some(capability) = inherited {
                    tracing::trace!(capability = key, "capability inherited from capabilities file");
                    snapshot.entries.push((decl.name.clone(), *capability));
                }
            }
        }
        Ok(snapshot)
    }

    pub fn get(&self, name: &str) -> Option<&Capability<ScalarValue>> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name.as_str() == name)
            .map(|(_, capability)| capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CapabilityName, &Capability<ScalarValue>)> {
        self.entries.iter().map(|(name, capability)| (name, capability))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a capabilities-file shaped document.
    pub fn to_document(&self) -> Value {
        let mut capabilities = Map::new();
        for (name, capability) in &self.entries {
            capabilities.insert(
                name.0.clone(),
                json!({
                    DEFAULT_FIELD: capability.value.to_json(),
                    MODIFIABLE_FIELD: capability.modifiable,
                }),
            );
        }
        json!({ runtime::CAPABILITIES_KEY: capabilities })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{BoundLimit, DocumentError, PermissionDenial};

    fn registry() -> Registry {
        Registry::from_value(&json!({
            "capabilities": {
                "retries": {"type": "int", "min": 0, "max": 5},
                "frameless": {"type": "bool"},
                "fixed_framerate": {"type": "float", "max": 0.1}
            }
        }))
        .unwrap()
    }

    fn base() -> CapabilitySnapshot {
        CapabilitySnapshot::load_base(
            &registry(),
            &json!({"capabilities": {
                "retries": {"default": 3, "modifiable": true},
                "frameless": {"default": false, "modifiable": false},
                "fixed_framerate": {"default": 0.05, "modifiable": true}
            }}),
        )
        .unwrap()
    }

    #[test]
    fn base_skips_unlisted_and_unknown_entries() {
        let snapshot = CapabilitySnapshot::load_base(
            &registry(),
            &json!({"capabilities": {
                "retries": {"default": 3, "modifiable": true},
                "undeclared": {"default": 1, "modifiable": true}
            }}),
        )
        .unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get("retries"),
            Some(&Capability {
                value: ScalarValue::Int(3),
                modifiable: true
            })
        );
        assert!(snapshot.get("frameless").is_none());
    }

    #[test]
    fn override_replaces_value_and_keeps_flag() {
        let effective = CapabilitySnapshot::load_effective(
            &registry(),
            &base(),
            &json!({"capabilities": {"retries": {"default": 5}}}),
            false,
        )
        .unwrap();
        assert_eq!(effective.len(), 1);
        assert_eq!(
            effective.get("retries"),
            Some(&Capability {
                value: ScalarValue::Int(5),
                modifiable: true
            })
        );
    }

    #[test]
    fn violations_abort_loading() {
        let registry = registry();
        let base = base();
        let bounds = CapabilitySnapshot::load_effective(
            &registry,
            &base,
            &json!({"capabilities": {"retries": {"default": 9}}}),
            true,
        )
        .unwrap_err();
        assert!(matches!(
            bounds,
            LoadError::BoundsViolation {
                limit: BoundLimit::Max,
                ..
            }
        ));

        let locked = CapabilitySnapshot::load_effective(
            &registry,
            &base,
            &json!({"capabilities": {"frameless": {"default": true}}}),
            true,
        )
        .unwrap_err();
        assert!(matches!(
            locked,
            LoadError::PermissionViolation {
                reason: PermissionDenial::NotModifiable,
                ..
            }
        ));

        let empty_base = CapabilitySnapshot::default();
        let absent = CapabilitySnapshot::load_effective(
            &registry,
            &empty_base,
            &json!({"capabilities": {"retries": {"default": 1}}}),
            true,
        )
        .unwrap_err();
        assert!(matches!(
            absent,
            LoadError::PermissionViolation {
                reason: PermissionDenial::Absent,
                ..
            }
        ));
    }

    #[test]
    fn f32_bounds_compare_in_f32() {
        let effective = CapabilitySnapshot::load_effective(
            &registry(),
            &base(),
            &json!({"capabilities": {"fixed_framerate": {"default": 0.1}}}),
            false,
        )
        .unwrap();
        assert!(effective.get("fixed_framerate").is_some());
    }

    #[test]
    fn defaults_follow_flag_and_section_presence() {
        let registry = registry();
        let base = base();
        let with_defaults = CapabilitySnapshot::load_effective(
            &registry,
            &base,
            &json!({"capabilities": {}}),
            true,
        )
        .unwrap();
        assert_eq!(with_defaults, base);

        let without = CapabilitySnapshot::load_effective(
            &registry,
            &base,
            &json!({"capabilities": {}}),
            false,
        )
        .unwrap();
        assert!(without.is_empty());

        let no_section =
            CapabilitySnapshot::load_effective(&registry, &base, &json!({}), true).unwrap();
        assert!(no_section.is_empty());
    }

    #[test]
    fn malformed_section_is_rejected_even_with_defaults() {
        let registry = registry();
        let base = base();
        for section in [json!(null), json!([]), json!("retries")] {
            let err = CapabilitySnapshot::load_effective(
                &registry,
                &base,
                &json!({ "capabilities": section }),
                true,
            )
            .unwrap_err();
            assert_eq!(err, LoadError::Document(DocumentError::SectionNotObject));
        }
        assert!(
            CapabilitySnapshot::load_base(&registry, &json!({"capabilities": null})).is_err()
        );
    }

    #[test]
    fn document_round_trips_through_base_loader() {
        let registry = registry();
        let base = base();
        let document = base.to_document();
        assert_eq!(
            document["capabilities"]["retries"],
            json!({"default": 3, "modifiable": true})
        );
        let reloaded = CapabilitySnapshot::load_base(&registry, &document).unwrap();
        assert_eq!(reloaded, base);
    }
}
