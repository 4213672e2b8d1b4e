//! Capability registry code generator.
//!
//! A registry declares named, typed capabilities with optional numeric
//! bounds. From it the crate renders a `Capabilities` aggregate and the code
//! that loads it in two phases: a trusted capabilities file sets defaults and
//! marks which capabilities may be overridden, then an enable file overrides
//! only those, within the declared bounds. Generated code links against
//! [`runtime`]; [`CapabilitySnapshot`] applies the same protocol directly from
//! a registry for tooling that cannot compile generated code, and
//! [`documents`] loads the full capabilities and enable files around it.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub mod document_schema;
pub mod documents;
pub mod enable_source;
pub mod generate;
pub mod registry;
pub mod runtime;
pub mod snapshot;

pub use document_schema::{DocumentKind, DocumentValidator, render_document_schema};
pub use documents::{
    Adaptation, CapabilitiesFile, EnableFile, EnableIntent, FileError, Scene, Setting, SettingKind,
    SettingValue,
};
pub use enable_source::{EnableSource, EnableSourceError};
pub use generate::{
    GeneratedArtifacts, GeneratorOptions, generate, render_loading_logic, render_type_definition,
};
pub use registry::{
    Bound, CapabilityDeclaration, CapabilityKind, CapabilityName, Registry, SchemaError,
    ValueType,
};
pub use runtime::{Capability, DocumentError, LoadError};
pub use snapshot::{CapabilitySnapshot, ScalarValue};

/// Read and parse a JSON document from disk.
pub fn read_json_file(path: &Path) -> Result<Value> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

/// Write a generated artifact, replacing `path` in one step.
///
/// The text goes to a temporary file in the destination directory which is
/// then renamed over `path`, so readers never observe a half-written file.
/// Returns `false` without touching the file when it already holds
/// `contents`, which keeps build tools from seeing a spurious change.
pub fn write_artifact(path: &Path, contents: &str) -> Result<bool> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == contents {
            return Ok(false);
        }
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    staged
        .write_all(contents.as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    staged
        .persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(true)
}
