//! Capability registry wiring.
//!
//! The registry is the schema document listing every known capability with
//! its type and optional numeric bounds. It is read once at generation time;
//! `Registry` keeps the declarations in authored order for the generator.

pub mod identity;
pub mod index;
pub mod model;

pub use identity::{CapabilityName, ValueType};
pub use index::Registry;
pub use model::{Bound, CapabilityDeclaration, CapabilityKind};

use thiserror::Error;

/// Structural problems in a registry document. Generation aborts on any of
/// them before anything is written.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("registry has no top-level `capabilities` object")]
    MissingCapabilities,
    #[error("capability `{name}` must be declared as an object")]
    NotAnObject { name: String },
    #[error("capability `{name}` has no `type`")]
    MissingType { name: String },
    #[error("capability `{name}` has unsupported type `{ty}`")]
    UnknownType { name: String, ty: String },
    #[error("capability name `{name}` is not a valid identifier")]
    InvalidName { name: String },
    #[error("capability `{name}` is boolean and cannot declare min/max")]
    BoundsOnBoolean { name: String },
    #[error("capability `{name}` has an invalid `{bound}`: {reason}")]
    InvalidBound {
        name: String,
        bound: &'static str,
        reason: String,
    },
}
