use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    EnumIter,
    Display,
)]
#[repr(u8)]
pub enum Opcode {
    IN = 0x01,
    OUT = 0x02,
    LOAD = 0x03,
    STORE = 0x04,
    ADD = 0x05,
    INC = 0x06,
    AND = 0x07,
    CMP = 0x08,
    #[strum(to_string = "SHL", serialize = "SHIFT_LEFT")]
    SHL = 0x09,
    #[strum(to_string = "SHR", serialize = "SHIFT_RIGHT")]
    SHR = 0x0A,
    JZC = 0x0B,
    #[strum(to_string = "JZS", serialize = "JZ")]
    JZS = 0x0C,
    #[strum(to_string = "JCS", serialize = "JC")]
    JCS = 0x0D,
    JCC = 0x0E,
    JUMP = 0x0F,
    NOP = 0x10,
    HALT = 0x11,
}

impl Opcode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_uppercase().parse::<Self>() {
            Ok(op) => Ok(op),
            Err(_) => Err(format!("Undefined Op: {s}")),
        }
    }

    pub fn operand_kind(&self) -> OperandKind {
        use Opcode::*;
        match self {
            IN | OUT => OperandKind::Port,
            LOAD | ADD | AND | CMP => OperandKind::Value,
            STORE | JZC | JZS | JCS | JCC | JUMP => OperandKind::Address,
            INC | SHL | SHR | NOP | HALT => OperandKind::None,
        }
    }
}

/// How the 16-bit operand field of an instruction word is interpreted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Mode {
    #[default]
    Implied = 0,
    Immediate = 1,
    /// `!x`
    Absolute = 2,
    /// `x`, offset from the next instruction
    Relative = 3,
    /// `(x)`, pointer stored at an offset from the next instruction
    Indirect = 4,
}

/// Operand shape accepted by an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OperandKind {
    None,
    Port,
    Address,
    Value,
}

impl OperandKind {
    pub fn allows(&self, mode: Mode) -> bool {
        use Mode::*;
        match self {
            OperandKind::None => mode == Implied,
            OperandKind::Port => mode == Immediate,
            OperandKind::Address => matches!(mode, Absolute | Relative | Indirect),
            OperandKind::Value => matches!(mode, Immediate | Absolute | Relative | Indirect),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Opcode::parse("load"), Ok(Opcode::LOAD));
        assert_eq!(Opcode::parse("Halt"), Ok(Opcode::HALT));
        assert!(Opcode::parse("hoge").is_err());
    }

    #[test]
    fn aliases_print_canonical_name() {
        assert_eq!(Opcode::parse("jz"), Ok(Opcode::JZS));
        assert_eq!(Opcode::parse("jc"), Ok(Opcode::JCS));
        assert_eq!(Opcode::parse("shift_left"), Ok(Opcode::SHL));
        assert_eq!(Opcode::JZS.to_string(), "JZS");
        assert_eq!(Opcode::SHR.to_string(), "SHR");
    }

    #[test]
    fn zero_is_not_an_opcode() {
        assert!(Opcode::try_from(0u8).is_err());
        assert!(Opcode::iter().all(|op| u8::from(op) != 0));
    }

    #[test]
    fn every_kind_allows_some_mode() {
        for op in Opcode::iter() {
            let kind = op.operand_kind();
            let modes = [
                Mode::Implied,
                Mode::Immediate,
                Mode::Absolute,
                Mode::Relative,
                Mode::Indirect,
            ];
            assert!(modes.iter().any(|m| kind.allows(*m)), "{op}");
        }
    }

    #[test]
    fn store_and_jumps_reject_immediate() {
        assert!(!Opcode::STORE.operand_kind().allows(Mode::Immediate));
        assert!(!Opcode::JUMP.operand_kind().allows(Mode::Immediate));
        assert!(Opcode::LOAD.operand_kind().allows(Mode::Immediate));
    }
}
