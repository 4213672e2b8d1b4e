//! Renders the loading-logic artifact: `impl LoadCapabilities for
//! Capabilities`.
//!
//! Both operations reset the aggregate first, then walk the registry in order
//! against the document's `capabilities` section. The enable-file operation
//! only replaces a value the base marked modifiable, keeps the base's
//! `modifiable` flag, and checks the new value against the declared bounds.

use crate::generate::GeneratorOptions;
use crate::generate::emit::RustFile;
use crate::registry::{CapabilityDeclaration, Registry};

/// Render the loading logic for `registry`.
pub fn render_loading_logic(registry: &Registry, options: &GeneratorOptions) -> String {
    let mut f = RustFile::new();

    let imports = if registry.is_empty() {
        "self as rt, LoadError, Value"
    } else {
        "self as rt, Capability, LoadError, Value"
    };
    f.line(&format!("use {}::{{{imports}}};", options.runtime_path));
    f.blank();
    f.line(&format!(
        "use {}::{{Capabilities, LoadCapabilities}};",
        options.types_path
    ));
    f.blank();

    if registry.is_empty() {
        f.line("#[allow(unused_variables)]");
    }
    f.line("impl LoadCapabilities for Capabilities {");
    render_capabilities_file_loader(&mut f, registry);
    f.blank();
    render_enable_file_loader(&mut f, registry);
    f.line("}");

    f.finish()
}

fn render_capabilities_file_loader(f: &mut RustFile, registry: &Registry) {
    f.line("    fn load_from_capabilities_file(&mut self, root: &Value) -> Result<(), LoadError> {");
    f.line("        *self = Capabilities::default();");
    f.blank();
    f.line("        if let Some(node) = rt::capabilities_section(root)? {");
    for (position, decl) in registry.declarations().enumerate() {
        if position > 0 {
            f.blank();
        }
        let key = decl.name.as_str();
        let field = decl.name.field_ident();
        f.line(&format!("            if let Some(entry) = node.get(\"{key}\") {{"));
        f.line(&format!("                self.{field} = Some(Capability {{"));
        f.line(&format!(
            "                    value: rt::decode_field(entry, \"{key}\", rt::DEFAULT_FIELD)?,"
        ));
        f.line(&format!(
            "                    modifiable: rt::decode_field(entry, \"{key}\", rt::MODIFIABLE_FIELD)?,"
        ));
        f.line("                });");
        f.line("            }");
    }
    f.line("        }");
    f.blank();
    f.line("        Ok(())");
    f.line("    }");
}

fn render_enable_file_loader(f: &mut RustFile, registry: &Registry) {
    f.line("    fn load_from_enable_file(");
    f.line("        &mut self,");
    f.line("        capabilities: &Capabilities,");
    f.line("        root: &Value,");
    f.line("        add_capabilities_file_defaults: bool,");
    f.line("    ) -> Result<(), LoadError> {");
    f.line("        *self = Capabilities::default();");
    f.blank();
    f.line("        if let Some(node) = rt::capabilities_section(root)? {");
    for (position, decl) in registry.declarations().enumerate() {
        if position > 0 {
            f.blank();
        }
        render_override(f, decl);
    }
    f.line("        }");
    f.blank();
    f.line("        Ok(())");
    f.line("    }");
}

fn render_override(f: &mut RustFile, decl: &CapabilityDeclaration) {
    let key = decl.name.as_str();
    let field = decl.name.field_ident();
    f.line(&format!("            if let Some(entry) = node.get(\"{key}\") {{"));
    f.line(&format!(
        "                let granted = rt::require_modifiable(capabilities.{field}.as_ref(), \"{key}\")?;"
    ));
    f.line(&format!(
        "                let value: {} = rt::decode_field(entry, \"{key}\", rt::DEFAULT_FIELD)?;",
        decl.value_type().rust_type()
    ));
    if let Some(min) = decl.min() {
        f.line(&format!(
            "                rt::check_min(\"{key}\", &value, {})?;",
            min.rust_literal()
        ));
    }
    if let Some(max) = decl.max() {
        f.line(&format!(
            "                rt::check_max(\"{key}\", &value, {})?;",
            max.rust_literal()
        ));
    }
    f.line(&format!("                self.{field} = Some(Capability {{"));
    f.line("                    value,");
    f.line("                    modifiable: granted.modifiable,");
    f.line("                });");
    f.line("            } else if add_capabilities_file_defaults {");
    f.line(&format!("                self.{field} = capabilities.{field};"));
    f.line("            }");
}
