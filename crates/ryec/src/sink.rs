//! Output directory management.
//!
//! The sink owns the destination directory: it rebuilds the output set
//! from scratch on every run, stages the fixed runtime-support units the
//! generated code links against, and writes each translation unit in a
//! single step once its generation has completed. A unit file never exists
//! in a partially generated state.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::codegen::instr::UnitBuffer;

/// Runtime-support units staged into every output directory. The
/// assembler expects them at these relative paths.
const SUPPORT_UNITS: [(&str, &str); 2] = [
    ("List.j", include_str!("../runtime/List.j")),
    ("Fptr.j", include_str!("../runtime/Fptr.j")),
];

pub struct OutputSink {
    out_dir: PathBuf,
}

impl OutputSink {
    /// Prepare the destination directory: create it if absent, remove
    /// stale outputs from previous runs, and stage the support units.
    /// Any failure here is a fatal startup error.
    pub fn prepare(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("creating output directory {}", out_dir.display()))?;

        let entries = fs::read_dir(&out_dir)
            .with_context(|| format!("listing output directory {}", out_dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("listing output directory {}", out_dir.display()))?
                .path();
            if path.is_file() {
                fs::remove_file(&path)
                    .with_context(|| format!("removing stale output {}", path.display()))?;
            }
        }

        let sink = OutputSink { out_dir };
        for (name, text) in SUPPORT_UNITS {
            fs::write(sink.unit_path(name), text)
                .with_context(|| format!("staging support unit {}", name))?;
        }
        Ok(sink)
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn unit_path(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(file_name)
    }

    /// Serialize and write one completed unit.
    pub fn write_unit(&self, unit: &UnitBuffer) -> Result<()> {
        let path = self.unit_path(&format!("{}.j", unit.name()));
        fs::write(&path, unit.render())
            .with_context(|| format!("writing unit {}", path.display()))
    }
}
