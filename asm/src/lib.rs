//! Two-pass assembler for AC32.
//!
//! Pass 1 parses every line and lays out cells, binding labels as it goes.
//! Pass 2 resolves label references and encodes the artifact.

pub mod error;
pub mod label;
pub mod layout;
pub mod parser;
pub mod util;

use arch::program::Program;
use std::path::Path;
use tracing::info;

use error::{FileError, LineError};
use layout::Layout;

/// Assemble `source` into a program, or every error found.
pub fn assemble(source: &str) -> Result<Program, Vec<LineError>> {
    let lines = parser::parse(source)?;
    let layout = Layout::build(&lines)?;
    let program = layout.encode()?;
    info!(
        sections = program.sections.len(),
        cells = program.cells().count(),
        "assembled"
    );
    Ok(program)
}

/// Serialize `program` and write it to `path`.
///
/// The artifact is rendered in full before the file is created, so a failure
/// never leaves a truncated artifact behind.
pub fn emit(program: &Program, path: &Path) -> Result<(), FileError> {
    let json = program.to_json()?;
    std::fs::write(path, json)
        .map_err(|e| FileError::FileWrite(path.display().to_string(), e))
}

/// `dir/prog.asm` -> `prog.json`
pub fn default_output(source: &Path) -> std::path::PathBuf {
    let stem = source.file_stem().unwrap_or(source.as_os_str());
    Path::new(stem).with_extension("json")
}
