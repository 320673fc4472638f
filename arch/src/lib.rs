//! AC32: a 32-bit accumulator machine with 16-bit addresses.
//!
//! This crate is the contract shared by the assembler and the simulator:
//! the opcode table, the instruction word encoding, the ALU and the
//! machine-code artifact schema.

pub mod alu;
pub mod inst;
pub mod op;
pub mod program;
pub mod reg;

/// Data word. All arithmetic wraps at this width.
pub type Word = u32;

/// Memory address.
pub type Addr = u16;

/// I/O port number.
pub type Port = u8;

/// Default memory size in words.
pub const MEMORY_SIZE: usize = 2048;

/// Largest memory that 16-bit addresses can reach.
pub const MAX_MEMORY_SIZE: usize = 1 << 16;
