//! Typed capability declarations.
//!
//! A declaration is either boolean or numeric; only numeric declarations can
//! carry bounds, so bound checks are generated exactly where they apply.

use crate::registry::identity::{CapabilityName, ValueType};
use serde_json::Value;

/// Inclusive bound literal, already checked to be representable in the
/// declaration's type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bound {
    Int(i128),
    Float(f64),
}

impl Bound {
    /// Decode a `min`/`max` value for a numeric type.
    ///
    /// Integer types accept integral JSON numbers only (`5` or `5.0`) that fit
    /// the declared width; float types accept any finite number.
    pub(crate) fn from_json(ty: ValueType, raw: &Value) -> Result<Self, String> {
        if ty.is_float() {
            let value = raw
                .as_f64()
                .ok_or_else(|| format!("expected a number, got {raw}"))?;
            if ty == ValueType::F32 && !(value as f32).is_finite() {
                return Err(format!("{value} does not fit in f32"));
            }
            return Ok(Bound::Float(value));
        }

        let (lo, hi) = ty
            .integer_range()
            .ok_or_else(|| format!("type {ty} does not take bounds"))?;
        let value = if let Some(v) = raw.as_i64() {
            v as i128
        } else if let Some(v) = raw.as_u64() {
            v as i128
        } else if let Some(v) = raw.as_f64() {
            if v.fract() != 0.0 || !v.is_finite() {
                return Err(format!("{raw} is not an integer"));
            }
            v as i128
        } else {
            return Err(format!("expected a number, got {raw}"));
        };
        if value < lo || value > hi {
            return Err(format!("{value} does not fit in {ty}"));
        }
        Ok(Bound::Int(value))
    }

    /// Literal spelling used inside generated code.
    ///
    /// Float bounds always carry a decimal point or exponent so they infer as
    /// the field's float type.
    pub fn rust_literal(&self) -> String {
        match self {
            Bound::Int(value) => value.to_string(),
            Bound::Float(value) => format!("{value:?}"),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Bound::Int(value) => match i64::try_from(*value) {
                Ok(v) => Value::from(v),
                Err(_) => Value::from(*value as u64),
            },
            Bound::Float(value) => Value::from(*value),
        }
    }
}

/// Declared shape of a capability.
#[derive(Clone, Debug, PartialEq)]
pub enum CapabilityKind {
    Boolean,
    Numeric {
        ty: ValueType,
        min: Option<Bound>,
        max: Option<Bound>,
    },
}

#[derive(Clone, Debug, PartialEq)]
/// One registry entry: name plus declared kind.
pub struct CapabilityDeclaration {
    pub name: CapabilityName,
    pub kind: CapabilityKind,
}

impl CapabilityDeclaration {
    pub fn value_type(&self) -> ValueType {
        match &self.kind {
            CapabilityKind::Boolean => ValueType::Bool,
            CapabilityKind::Numeric { ty, .. } => *ty,
        }
    }

    pub fn min(&self) -> Option<Bound> {
        match &self.kind {
            CapabilityKind::Boolean => None,
            CapabilityKind::Numeric { min, .. } => *min,
        }
    }

    pub fn max(&self) -> Option<Bound> {
        match &self.kind {
            CapabilityKind::Boolean => None,
            CapabilityKind::Numeric { max, .. } => *max,
        }
    }
}
