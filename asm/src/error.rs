use arch::program::ProgramError;
use color_print::ceprintln;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown operation: `{0}`")]
    UnknownOperation(String),

    #[error("`{0}` requires an argument")]
    MissingArgument(String),

    #[error("Unexpected argument: `{0}`")]
    ExtraArgument(String),

    #[error("Cannot parse `{0}` as {1}")]
    ParseArgument(String, String),

    #[error("Syntax Error: {0}")]
    SyntaxError(String),

    #[error("Undefined label: `{0}`")]
    UndefinedLabel(String),

    #[error("Re-defined label: `{0}` (first defined on line {1})")]
    RedefinedLabel(String, usize),

    #[error("Address 0x{0:X} is outside of the 16-bit address space")]
    AddressOverflow(usize),

    #[error("Cell 0x{0:04X} is already occupied by line {1}")]
    Overlap(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Syntax,
    Resolution,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::Syntax => write!(f, "syntax error"),
            ErrorClass::Resolution => write!(f, "resolution error"),
        }
    }
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::UnknownOperation(_)
            | Error::MissingArgument(_)
            | Error::ExtraArgument(_)
            | Error::ParseArgument(_, _)
            | Error::SyntaxError(_) => ErrorClass::Syntax,
            Error::UndefinedLabel(_)
            | Error::RedefinedLabel(_, _)
            | Error::AddressOverflow(_)
            | Error::Overlap(_, _) => ErrorClass::Resolution,
        }
    }

    pub fn at(self, line: usize) -> LineError {
        LineError { line, error: self }
    }
}

/// An assembler error tied to its 1-based source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {error}")]
pub struct LineError {
    pub line: usize,
    #[source]
    pub error: Error,
}

impl LineError {
    /// Print error with diagnostic information showing file location and line content
    pub fn print_diag(&self, file: &str, source: &str) {
        ceprintln!("<red,bold>{}</>: {}", self.error.class(), self.error);

        ceprintln!("     <blue>--></> <underline>{}:{}</>", file, self.line);
        ceprintln!("      <blue>|</>");

        let line_content = source.lines().nth(self.line.saturating_sub(1)).unwrap_or("");

        ceprintln!(" <blue>{:>4} |</> {}", self.line, line_content);
        ceprintln!("      <blue>|</>");
    }
}

#[derive(Error, Debug)]
pub enum FileError {
    #[error("Failed to open file `{0}`: {1}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to write file `{0}`: {1}")]
    FileWrite(String, #[source] std::io::Error),

    #[error("Failed to encode artifact")]
    Encode(#[from] ProgramError),
}
