//! Python script writing utilities for the FreeCAD compiler.

use std::fmt::Write;

/// Line-oriented Python script writer.
pub struct ScriptWriter {
    /// Current indentation level (4 spaces each).
    indent: usize,
    /// Output buffer.
    buffer: String,
}

impl ScriptWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self {
            indent: 0,
            buffer: String::new(),
        }
    }

    /// Get the generated script.
    pub fn output(&self) -> &str {
        &self.buffer
    }

    /// Take the generated script.
    pub fn take_output(self) -> String {
        self.buffer
    }

    /// Write one line at the current indentation.
    pub fn write_line(&mut self, content: &str) {
        writeln!(self.buffer, "{:width$}{}", "", content, width = self.indent * 4).unwrap();
    }

    /// Write an empty line.
    pub fn blank(&mut self) {
        self.buffer.push('\n');
    }

    /// Write a comment line.
    pub fn write_comment(&mut self, comment: &str) {
        self.write_line(&format!("# {}", comment));
    }

    /// Write a section banner.
    pub fn write_section(&mut self, title: &str) {
        self.blank();
        self.write_line(&format!("# ===== {} =====", title));
    }

    /// Write `target = value`.
    pub fn assign(&mut self, target: &str, value: &str) {
        self.write_line(&format!("{} = {}", target, value));
    }

    /// Write a block header (ending in `:`) and indent the following lines.
    pub fn open_block(&mut self, header: &str) {
        self.write_line(&format!("{}:", header));
        self.indent += 1;
    }

    /// Return to the enclosing indentation level.
    pub fn close_block(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Print a tagged progress line from the script.
    pub fn log(&mut self, message: &str) {
        self.write_line(&format!("print({})", py_string(&format!("[TEXTCAD] {}", message))));
    }

    /// Abort the script with exit status 1 after printing a message.
    pub fn fail(&mut self, message: &str) {
        self.log(message);
        self.write_line("sys.exit(1)");
    }
}

impl Default for ScriptWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number as a Python float literal.
pub fn format_float(value: f64) -> String {
    // Remove trailing zeros but keep at least one decimal place
    let s = format!("{:.6}", value);
    let s = s.trim_end_matches('0');
    let s = s.trim_end_matches('.');
    if s.is_empty() || s == "-" || s == "-0" {
        "0.0".to_string()
    } else if !s.contains('.') {
        format!("{}.0", s)
    } else {
        s.to_string()
    }
}

/// `FreeCAD.Vector(x, y, z)` literal.
pub fn format_vector(v: [f64; 3]) -> String {
    format!(
        "FreeCAD.Vector({}, {}, {})",
        format_float(v[0]),
        format_float(v[1]),
        format_float(v[2])
    )
}

/// Double-quoted Python string literal.
pub fn py_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Python identifier for a plan solid name.
pub fn py_ident(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ident.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}
