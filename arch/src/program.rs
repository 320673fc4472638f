//! Machine-code artifact: the only interface between assembler and simulator.
//!
//! The artifact is pretty-printed JSON with a trailing newline. Serialization
//! is a pure function of the resolved program, so the same source always
//! produces byte-identical output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inst::Inst;
use crate::{Addr, Word};

/// Bumped whenever the artifact schema or the word encoding changes.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Program {
    pub version: u32,
    pub sections: Vec<Section>,
}

/// A run of consecutive cells starting at `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Section {
    pub start: Addr,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Item {
    Command(Inst),
    Data(Word),
}

#[derive(Error, Debug)]
pub enum ProgramError {
    #[error("malformed artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("artifact format version {found} is not supported (expected {})", FORMAT_VERSION)]
    Version { found: u32 },

    #[error("section at 0x{start:04X} with {len} cells does not fit into {memory_size} words of memory")]
    DoesNotFit {
        start: Addr,
        len: usize,
        memory_size: usize,
    },

    #[error("cell 0x{0:04X} is written by more than one section")]
    Overlap(usize),
}

impl Item {
    pub fn to_bin(&self) -> Word {
        match self {
            Item::Command(inst) => inst.to_bin(),
            Item::Data(word) => *word,
        }
    }
}

impl Section {
    pub fn new(start: Addr) -> Self {
        Section {
            start,
            items: vec![],
        }
    }

    /// One past the last cell of the section.
    pub fn end(&self) -> usize {
        self.start as usize + self.items.len()
    }
}

impl Program {
    pub fn new(sections: Vec<Section>) -> Self {
        Program {
            version: FORMAT_VERSION,
            sections,
        }
    }

    pub fn to_json(&self) -> Result<String, ProgramError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    pub fn from_json(json: &str) -> Result<Program, ProgramError> {
        Program::from_slice(json.as_bytes())
    }

    /// Parse an artifact straight from file bytes. Invalid UTF-8 is an error.
    pub fn from_slice(bytes: &[u8]) -> Result<Program, ProgramError> {
        let program: Program = serde_json::from_slice(bytes)?;
        if program.version != FORMAT_VERSION {
            return Err(ProgramError::Version {
                found: program.version,
            });
        }
        Ok(program)
    }

    /// Every `(address, word)` cell in section order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, Word)> + '_ {
        self.sections.iter().flat_map(|section| {
            section
                .items
                .iter()
                .enumerate()
                .map(move |(offset, item)| (section.start as usize + offset, item.to_bin()))
        })
    }

    /// Check that every section fits into `memory_size` words and that no
    /// two sections write the same cell.
    pub fn validate(&self, memory_size: usize) -> Result<(), ProgramError> {
        let mut spans: Vec<(usize, usize)> = vec![];
        for section in &self.sections {
            if section.end() > memory_size {
                return Err(ProgramError::DoesNotFit {
                    start: section.start,
                    len: section.items.len(),
                    memory_size,
                });
            }
            if !section.items.is_empty() {
                spans.push((section.start as usize, section.end()));
            }
        }
        spans.sort();
        for pair in spans.windows(2) {
            let ((_, prev_end), (next_start, _)) = (pair[0], pair[1]);
            if next_start < prev_end {
                return Err(ProgramError::Overlap(next_start));
            }
        }
        Ok(())
    }
}
