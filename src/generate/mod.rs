//! Capability code generator.
//!
//! Turns a [`Registry`] into two Rust source artifacts: the type definition
//! (`Capabilities` plus the `LoadCapabilities` trait) and the loading logic
//! implementing that trait. Rendering is pure and deterministic; the same
//! registry and options always produce byte-identical text. Writing the
//! artifacts anywhere is the caller's job.

pub mod emit;
pub mod logic;
pub mod types;

pub use logic::render_loading_logic;
pub use types::render_type_definition;

use crate::registry::Registry;

pub const DEFAULT_RUNTIME_PATH: &str = "capgen::runtime";
pub const DEFAULT_TYPES_PATH: &str = "super";

/// Module paths baked into the generated code.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratorOptions {
    /// Path of the runtime support module the artifacts import.
    pub runtime_path: String,
    /// Path from the logic artifact to the type artifact.
    pub types_path: String,
    /// When set, the type artifact declares `mod <name>;` so the logic
    /// artifact can live in a child module file.
    pub logic_module: Option<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            types_path: DEFAULT_TYPES_PATH.to_string(),
            logic_module: None,
        }
    }
}

/// Both rendered artifacts.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedArtifacts {
    pub types: String,
    pub logic: String,
}

/// Render both artifacts for `registry`.
pub fn generate(registry: &Registry, options: &GeneratorOptions) -> GeneratedArtifacts {
    let artifacts = GeneratedArtifacts {
        types: render_type_definition(registry, options),
        logic: render_loading_logic(registry, options),
    };
    tracing::debug!(
        capabilities = registry.len(),
        types_bytes = artifacts.types.len(),
        logic_bytes = artifacts.logic.len(),
        "rendered capability artifacts"
    );
    artifacts
}
