//! Renders the type-definition artifact: the `Capabilities` aggregate and the
//! `LoadCapabilities` trait carrying the two loading operations.

use crate::generate::GeneratorOptions;
use crate::generate::emit::RustFile;
use crate::registry::Registry;

/// Render the type definition for `registry`.
///
/// One `Option<Capability<T>>` field per declaration, in registry order.
pub fn render_type_definition(registry: &Registry, options: &GeneratorOptions) -> String {
    let mut f = RustFile::new();

    // An empty aggregate has no `Capability` fields to name.
    let imports = if registry.is_empty() {
        "LoadError, Value"
    } else {
        "Capability, LoadError, Value"
    };
    f.line(&format!("use {}::{{{imports}}};", options.runtime_path));
    f.blank();

    if let Some(module) = &options.logic_module {
        f.line(&format!("mod {module};"));
        f.blank();
    }

    f.doc_comment(0, "Every capability declared in the registry, in registry order.");
    if registry.is_empty() {
        f.line("pub const CAPABILITY_NAMES: [&str; 0] = [];");
    } else {
        f.line(&format!(
            "pub const CAPABILITY_NAMES: [&str; {}] = [",
            registry.len()
        ));
        for name in registry.names() {
            f.line(&format!("    \"{name}\","));
        }
        f.line("];");
    }
    f.blank();

    f.doc_comment(
        0,
        "One optional entry per declared capability; `None` means not configured.",
    );
    f.line("#[derive(Clone, Copy, Debug, Default, PartialEq)]");
    f.line("pub struct Capabilities {");
    for decl in registry.declarations() {
        f.line(&format!(
            "    pub {}: Option<Capability<{}>>,",
            decl.name.field_ident(),
            decl.value_type().rust_type()
        ));
    }
    f.line("}");
    f.blank();

    f.doc_comment(0, "Two-phase loading of a [`Capabilities`] aggregate.");
    f.line("pub trait LoadCapabilities {");
    f.doc_comment(1, "Resets every field, then loads defaults and modifiability from a");
    f.doc_comment(1, "capabilities file.");
    f.line("    fn load_from_capabilities_file(&mut self, root: &Value) -> Result<(), LoadError>;");
    f.blank();
    f.doc_comment(1, "Resets every field, then applies the overrides of an enable file on");
    f.doc_comment(1, "top of `capabilities`, the aggregate loaded from the capabilities file.");
    f.doc_comment(1, "With `add_capabilities_file_defaults`, capabilities the enable file");
    f.doc_comment(1, "does not mention are inherited from `capabilities` unchanged.");
    f.line("    fn load_from_enable_file(");
    f.line("        &mut self,");
    f.line("        capabilities: &Capabilities,");
    f.line("        root: &Value,");
    f.line("        add_capabilities_file_defaults: bool,");
    f.line("    ) -> Result<(), LoadError>;");
    f.line("}");

    f.finish()
}
