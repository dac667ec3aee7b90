pub mod codegen;
pub mod diagnostics;
pub mod sink;
pub mod types;

use std::path::PathBuf;

/// Emission options for the Rye backend.
///
/// Separated from CLI argument parsing so the backend can be driven
/// programmatically by a frontend or a test harness.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Destination directory for the generated unit set. Rebuilt from
    /// scratch on every run.
    pub out_dir: PathBuf,
}

impl EmitOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        EmitOptions {
            out_dir: out_dir.into(),
        }
    }
}

/// Emit the complete unit set for `program`.
///
/// This is the primary API for invoking the backend: it collects symbol
/// information from the program, prepares the output directory (staging
/// the runtime-support units), and generates one translation unit per
/// struct plus the entry unit.
pub fn emit_program(program: &rye_ast::Program, options: &EmitOptions) -> anyhow::Result<()> {
    let symbols = types::SymbolTable::from_program(program).map_err(|d| {
        diagnostics::emit_diagnostic(&d);
        anyhow::Error::new(d)
    })?;
    let sink = sink::OutputSink::prepare(&options.out_dir)?;
    let codegen = codegen::CodeGen {
        symbols: &symbols,
        sink: &sink,
    };
    codegen.generate(program)
}
