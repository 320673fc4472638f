use arch::{inst::DecodeError, Addr, Port, Word};
use thiserror::Error;

/// Why execution stopped abnormally. Every fault carries the PC of the
/// instruction that could not retire. Only a fetch can see a PC past the
/// 16-bit address space, so those variants carry a full word.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    #[error("program counter is outside of memory")]
    PcOutOfRange { pc: Word },

    #[error("illegal instruction 0x{word:08X}: {reason}")]
    IllegalInstruction {
        pc: Addr,
        word: Word,
        reason: DecodeError,
    },

    #[error("address 0x{addr:04X} is out of range")]
    AddressOutOfRange { pc: Addr, addr: Word },

    #[error("no device on port {port}")]
    NoDevice { pc: Addr, port: Port },

    #[error("port {port} is write-only")]
    WriteOnly { pc: Addr, port: Port },

    #[error("input exhausted")]
    InputExhausted { pc: Addr },

    #[error("tick limit of {limit} instructions reached")]
    TickLimit { pc: Word, limit: u64 },
}

impl Fault {
    pub fn pc(&self) -> Word {
        match self {
            Fault::PcOutOfRange { pc } | Fault::TickLimit { pc, .. } => *pc,
            Fault::IllegalInstruction { pc, .. }
            | Fault::AddressOutOfRange { pc, .. }
            | Fault::NoDevice { pc, .. }
            | Fault::WriteOnly { pc, .. }
            | Fault::InputExhausted { pc } => *pc as Word,
        }
    }
}

#[test]
fn test() {
    let fault = Fault::IllegalInstruction {
        pc: 3,
        word: 0,
        reason: DecodeError::UnknownOpcode(0),
    };
    assert_eq!(fault.pc(), 3);
    assert_eq!(
        fault.to_string(),
        "illegal instruction 0x00000000: unknown opcode 0x00"
    );
    assert_eq!(
        Fault::AddressOutOfRange { pc: 0, addr: 0x800 }.to_string(),
        "address 0x0800 is out of range"
    );
    assert_eq!(Fault::PcOutOfRange { pc: 0x1_0000 }.pc(), 0x1_0000);
}
