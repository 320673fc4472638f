//! AC32 simulator: machine state, I/O devices, the run loop and its hooks.

pub mod config;
pub mod fault;
pub mod hooks;
pub mod io;
pub mod model;
pub mod run;

use arch::program::{Program, ProgramError};
use std::path::Path;
use thiserror::Error;

pub use fault::Fault;
pub use model::{Machine, Retired, Status};
pub use run::{run, Outcome};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read `{0}`: {1}")]
    Read(String, #[source] std::io::Error),

    #[error("Failed to load program: {0}")]
    Program(#[from] ProgramError),
}

/// Errors that stop the simulator before or outside of execution.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn read_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|e| LoadError::Read(path.display().to_string(), e))
}

pub fn load_program(path: &Path) -> Result<Program, LoadError> {
    let bytes = read_file(path)?;
    Ok(Program::from_slice(&bytes)?)
}
