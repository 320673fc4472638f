use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::op::{Mode, Opcode, OperandKind};
use crate::Word;

/// A fully resolved instruction: one memory cell once encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Inst {
    pub opcode: Opcode,
    pub mode: Mode,
    pub operand: u16,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown opcode 0x{0:02X}")]
    UnknownOpcode(u8),

    #[error("unknown addressing mode 0x{0:02X}")]
    UnknownMode(u8),

    #[error("{opcode} does not accept {mode} operand")]
    IllegalMode { opcode: Opcode, mode: Mode },

    #[error("port {0} is out of range")]
    PortOutOfRange(u16),
}

// ----------------------------------------------------------------------------
// Word format
//   [31:24] opcode  [23:16] mode  [15:0] operand

fn enc_format(opcode: u8, mode: u8, operand: u16) -> Word {
    ((opcode as Word) << 24) | ((mode as Word) << 16) | (operand as Word)
}

fn dec_format(bin: Word) -> (u8, u8, u16) {
    let opcode = ((bin >> 24) & 0xFF) as u8;
    let mode = ((bin >> 16) & 0xFF) as u8;
    let operand = (bin & 0xFFFF) as u16;
    (opcode, mode, operand)
}

// ----------------------------------------------------------------------------

impl Inst {
    pub fn new(opcode: Opcode, mode: Mode, operand: u16) -> Self {
        Inst {
            opcode,
            mode,
            operand,
        }
    }

    pub fn implied(opcode: Opcode) -> Self {
        Inst::new(opcode, Mode::Implied, 0)
    }

    pub fn to_bin(&self) -> Word {
        enc_format(self.opcode.into(), self.mode.into(), self.operand)
    }

    pub fn from_bin(bin: Word) -> Result<Inst, DecodeError> {
        let (opcode, mode, operand) = dec_format(bin);
        let opcode = Opcode::try_from(opcode).map_err(|_| DecodeError::UnknownOpcode(opcode))?;
        let mode = Mode::try_from(mode).map_err(|_| DecodeError::UnknownMode(mode))?;
        if !opcode.operand_kind().allows(mode) {
            return Err(DecodeError::IllegalMode { opcode, mode });
        }
        if opcode.operand_kind() == OperandKind::Port && operand > 0xFF {
            return Err(DecodeError::PortOutOfRange(operand));
        }
        Ok(Inst {
            opcode,
            mode,
            operand,
        })
    }

    fn operand_text(&self) -> String {
        match (self.opcode.operand_kind(), self.mode) {
            (OperandKind::None, _) => String::new(),
            (OperandKind::Port, _) => format!("{}", self.operand),
            (_, Mode::Implied) => String::new(),
            (_, Mode::Immediate) => format!("#0x{:04X}", self.operand),
            (_, Mode::Absolute) => format!("!0x{:04X}", self.operand),
            (_, Mode::Relative) => format!("0x{:04X}", self.operand),
            (_, Mode::Indirect) => format!("(0x{:04X})", self.operand),
        }
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operand = self.operand_text();
        if operand.is_empty() {
            write!(f, "{}", self.opcode)
        } else {
            write!(f, "{} {}", self.opcode, operand)
        }
    }
}
