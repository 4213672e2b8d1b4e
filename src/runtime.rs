//! Runtime support linked by generated capability code.
//!
//! Generated `load_from_capabilities_file` / `load_from_enable_file` bodies
//! are sequences of calls into this module: locate the `capabilities`
//! section, decode a field, require override permission, check a bound.
//! Keeping the primitives here means every generated crate reports the same
//! errors for the same document.

use serde::de::DeserializeOwned;
use serde_json::Map;
use std::fmt::{self, Display};
use thiserror::Error;

pub use serde_json::Value;

pub const CAPABILITIES_KEY: &str = "capabilities";
pub const DEFAULT_FIELD: &str = "default";
pub const MODIFIABLE_FIELD: &str = "modifiable";

/// A configured capability: its value and whether an enable file may
/// override it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Capability<T> {
    pub value: T,
    pub modifiable: bool,
}

/// A capabilities or enable document that does not decode.
///
/// The aggregate being loaded is left partially reset and must be discarded.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DocumentError {
    #[error("`capabilities` section must be a JSON object")]
    SectionNotObject,
    #[error("capability `{capability}` is missing field `{field}`")]
    MissingField {
        capability: String,
        field: &'static str,
    },
    #[error("capability `{capability}` has an undecodable `{field}`: {message}")]
    InvalidValue {
        capability: String,
        field: &'static str,
        message: String,
    },
}

/// Why an enable file may not override a capability.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PermissionDenial {
    Absent,
    NotModifiable,
}

impl Display for PermissionDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionDenial::Absent => f.write_str("it is absent from the capabilities file"),
            PermissionDenial::NotModifiable => {
                f.write_str("the capabilities file does not mark it modifiable")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BoundLimit {
    Min,
    Max,
}

impl Display for BoundLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundLimit::Min => f.write_str("below the minimum"),
            BoundLimit::Max => f.write_str("above the maximum"),
        }
    }
}

/// Failure of either loading phase.
///
/// Permission and bounds violations mean the enable document breaks the
/// contract set by the capabilities file; callers must not continue with the
/// aggregate.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LoadError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("capability `{capability}` cannot be overridden: {reason}")]
    PermissionViolation {
        capability: String,
        reason: PermissionDenial,
    },
    #[error("capability `{capability}` value {value} is {limit} {bound}")]
    BoundsViolation {
        capability: String,
        value: String,
        bound: String,
        limit: BoundLimit,
    },
}

/// The `capabilities` object of a document, if it has one.
///
/// A document without the key (or a non-object root) has nothing to load;
/// a key holding anything other than an object is malformed.
pub fn capabilities_section(root: &Value) -> Result<Option<&Map<String, Value>>, LoadError> {
    match root.get(CAPABILITIES_KEY) {
        None => Ok(None),
        Some(Value::Object(section)) => Ok(Some(section)),
        Some(_) => Err(DocumentError::SectionNotObject.into()),
    }
}

/// Decode `entry[field]` as `T`.
pub fn decode_field<T>(entry: &Value, capability: &str, field: &'static str) -> Result<T, LoadError>
where
    T: DeserializeOwned,
{
    let raw = entry.get(field).ok_or_else(|| DocumentError::MissingField {
        capability: capability.to_string(),
        field,
    })?;
    serde_json::from_value(raw.clone()).map_err(|err| {
        DocumentError::InvalidValue {
            capability: capability.to_string(),
            field,
            message: err.to_string(),
        }
        .into()
    })
}

/// The base instance an override is allowed to replace.
pub fn require_modifiable<'a, T>(
    base: Option<&'a Capability<T>>,
    capability: &str,
) -> Result<&'a Capability<T>, LoadError> {
    match base {
        None => Err(LoadError::PermissionViolation {
            capability: capability.to_string(),
            reason: PermissionDenial::Absent,
        }),
        Some(granted) if !granted.modifiable => Err(LoadError::PermissionViolation {
            capability: capability.to_string(),
            reason: PermissionDenial::NotModifiable,
        }),
        Some(granted) => Ok(granted),
    }
}

/// Fails unless `value >= min`. NaN never passes.
pub fn check_min<T>(capability: &str, value: &T, min: T) -> Result<(), LoadError>
where
    T: PartialOrd + Display,
{
    if *value >= min {
        return Ok(());
    }
    Err(bounds_violation(capability, value, &min, BoundLimit::Min))
}

/// Fails unless `value <= max`. NaN never passes.
pub fn check_max<T>(capability: &str, value: &T, max: T) -> Result<(), LoadError>
where
    T: PartialOrd + Display,
{
    if *value <= max {
        return Ok(());
    }
    Err(bounds_violation(capability, value, &max, BoundLimit::Max))
}

fn bounds_violation<T: Display>(
    capability: &str,
    value: &T,
    bound: &T,
    limit: BoundLimit,
) -> LoadError {
    tracing::debug!(capability, %value, %bound, ?limit, "capability override out of bounds");
    LoadError::BoundsViolation {
        capability: capability.to_string(),
        value: value.to_string(),
        bound: bound.to_string(),
        limit,
    }
}
