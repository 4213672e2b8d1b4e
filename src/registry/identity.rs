use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a capability as authored in the registry.
///
/// The same string is the key inside capabilities and enable documents and
/// the field name of the generated aggregate, so it must be a Rust identifier.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityName(pub String);

// Keywords that may still appear as raw identifiers (`r#loop`).
const RAW_IDENT_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

// Keywords with no raw form.
const RESERVED_PATH_KEYWORDS: &[&str] = &["crate", "self", "Self", "super", "_"];

impl CapabilityName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `raw` can name a struct field, possibly through `r#`.
    pub fn is_valid_identifier(raw: &str) -> bool {
        let mut chars = raw.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        if !(first.is_ascii_alphabetic() || first == '_') {
            return false;
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return false;
        }
        !RESERVED_PATH_KEYWORDS.contains(&raw)
    }

    /// Identifier used for the generated struct field.
    pub fn field_ident(&self) -> String {
        if RAW_IDENT_KEYWORDS.contains(&self.0.as_str()) {
            format!("r#{}", self.0)
        } else {
            self.0.clone()
        }
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Semantic value type of a capability.
///
/// Registry spellings are accepted both as Rust primitive names and as the
/// looser aliases (`int`, `float`, `double`, ...) older registries use.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ValueType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl ValueType {
    pub fn parse(raw: &str) -> Option<Self> {
        let parsed = match raw {
            "bool" | "boolean" => ValueType::Bool,
            "i8" => ValueType::I8,
            "i16" | "short" => ValueType::I16,
            "i32" | "int" | "integer" => ValueType::I32,
            "i64" | "long" => ValueType::I64,
            "u8" => ValueType::U8,
            "u16" => ValueType::U16,
            "u32" | "unsigned" => ValueType::U32,
            "u64" => ValueType::U64,
            "f32" | "float" => ValueType::F32,
            "f64" | "double" => ValueType::F64,
            _ => return None,
        };
        Some(parsed)
    }

    /// The Rust primitive the generated field stores.
    pub fn rust_type(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::I8 => "i8",
            ValueType::I16 => "i16",
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::U8 => "u8",
            ValueType::U16 => "u16",
            ValueType::U32 => "u32",
            ValueType::U64 => "u64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
        }
    }

    /// JSON Schema `type` keyword for values of this type.
    pub fn json_schema_type(&self) -> &'static str {
        match self {
            ValueType::Bool => "boolean",
            ValueType::F32 | ValueType::F64 => "number",
            _ => "integer",
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ValueType::F32 | ValueType::F64)
    }

    /// Inclusive range of an integer type; `None` for bool and floats.
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        let range = match self {
            ValueType::I8 => (i8::MIN as i128, i8::MAX as i128),
            ValueType::I16 => (i16::MIN as i128, i16::MAX as i128),
            ValueType::I32 => (i32::MIN as i128, i32::MAX as i128),
            ValueType::I64 => (i64::MIN as i128, i64::MAX as i128),
            ValueType::U8 => (0, u8::MAX as i128),
            ValueType::U16 => (0, u16::MAX as i128),
            ValueType::U32 => (0, u32::MAX as i128),
            ValueType::U64 => (0, u64::MAX as i128),
            ValueType::Bool | ValueType::F32 | ValueType::F64 => return None,
        };
        Some(range)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_type())
    }
}
