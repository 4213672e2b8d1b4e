//! Line-oriented builder for generated Rust source.

/// First line of every generated artifact.
pub const GENERATED_HEADER: &str =
    "// @generated by capgen from the capability registry. Do not edit.";

/// Accumulates one generated file.
pub struct RustFile {
    pub buf: String,
}

impl RustFile {
    /// Starts a file with the generated-code header and a blank line.
    pub fn new() -> Self {
        let mut file = Self { buf: String::new() };
        file.line(GENERATED_HEADER);
        file.blank();
        file
    }

    pub fn line(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// `///` doc line at the given indentation depth (four spaces per level).
    pub fn doc_comment(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.buf.push_str("    ");
        }
        if text.is_empty() {
            self.line("///");
        } else {
            self.line(&format!("/// {text}"));
        }
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

impl Default for RustFile {
    fn default() -> Self {
        Self::new()
    }
}
