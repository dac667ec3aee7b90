//! Structured assembly output.
//!
//! Generation never splices indentation or newlines into instruction
//! text. It appends `Line` values to a `UnitBuffer`, and the whole unit is
//! serialized in one step once the unit is done: directives un-indented,
//! branch-target labels single-indented, instructions double-indented.

/// One line of a translation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Assembler directive (`.class`, `.method`, `.limit`, ...).
    Directive(String),
    /// Branch target; serialized with a trailing colon.
    Label(String),
    /// Machine instruction.
    Instr(String),
}

/// Append-only line buffer for one output file.
#[derive(Debug, Default)]
pub struct UnitBuffer {
    name: String,
    lines: Vec<Line>,
}

impl UnitBuffer {
    pub fn new(name: impl Into<String>) -> Self {
        UnitBuffer {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    /// File stem of the unit (`Main`, or a struct's name).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directive(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Directive(text.into()));
    }

    pub fn label(&mut self, name: impl Into<String>) {
        self.lines.push(Line::Label(name.into()));
    }

    pub fn instr(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Instr(text.into()));
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Serialize the buffered unit with the three-tier indentation
    /// convention.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Directive(text) => out.push_str(text),
                Line::Label(name) => {
                    out.push('\t');
                    out.push_str(name);
                    out.push(':');
                }
                Line::Instr(text) => {
                    out.push_str("\t\t");
                    out.push_str(text);
                }
            }
            out.push('\n');
        }
        out
    }
}
