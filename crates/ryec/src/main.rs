//! Command-line driver for the Rye backend.
//!
//! Reads a type-checked, scope-resolved program (the serialized
//! `rye_ast` tree a frontend hands over) and emits one assembly
//! translation unit per struct plus the program entry unit, ready for the
//! external assembler.
//!
//! ```bash
//! ryec program.json --out-dir out
//! ```

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser)]
#[command(name = "ryec", about = "Rye compiler backend", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Serialized typed program (JSON) produced by the frontend
    program: String,

    /// Destination directory for the generated unit set
    #[arg(long = "out-dir", default_value = "out")]
    out_dir: std::path::PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let text = std::fs::read_to_string(&cli.program)
        .with_context(|| format!("reading program {}", cli.program))?;
    let program: rye_ast::Program = serde_json::from_str(&text)
        .with_context(|| format!("decoding program {}", cli.program))?;

    ryec::emit_program(&program, &ryec::EmitOptions::new(cli.out_dir))
}
