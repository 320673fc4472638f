use arch::{
    alu::{valu, AluOut, ALU},
    inst::{DecodeError, Inst},
    op::{Mode, Opcode},
    program::{Program, ProgramError},
    reg::{Flags, Reg},
    Addr, Port, Word,
};
use std::fmt;
use tracing::{debug, info};

use crate::{fault::Fault, io::IoController};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ready,
    Running,
    Halted,
    Faulted(Fault),
}

/// One observable consequence of a retired instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    In { port: Port, value: Word },
    Out { port: Port, value: Word },
    Store { addr: Addr, value: Word },
    Acc(Word),
    Flags(Flags),
    /// Taken jump.
    Jump(Addr),
    Halted,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::In { port, value } => write!(f, "IN[{port}]=0x{value:08X}"),
            Effect::Out { port, value } => write!(f, "OUT[{port}]=0x{value:08X}"),
            Effect::Store { addr, value } => write!(f, "M[0x{addr:04X}]=0x{value:08X}"),
            Effect::Acc(value) => write!(f, "{}", Reg::AC.format(*value)),
            Effect::Flags(flags) => write!(f, "{flags}"),
            Effect::Jump(addr) => write!(f, "{}", Reg::PC.format(*addr as Word)),
            Effect::Halted => write!(f, "HALTED"),
        }
    }
}

/// An instruction that completed, with its effects in order of occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retired {
    pub pc: Addr,
    pub inst: Inst,
    pub effects: Vec<Effect>,
}

impl fmt::Display for Retired {
    /// `PPPP: INSTRUCTION     EFFECTS`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let effects = if self.effects.is_empty() {
            "-".to_string()
        } else {
            self.effects
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };
        write!(f, "{:04X}: {:<16} {}", self.pc, self.inst.to_string(), effects)
    }
}

/// Architectural state of the machine.
#[derive(Debug)]
pub struct Machine {
    mem: Vec<Word>,
    ac: Word,
    /// One past 0xFFFF after running off the end of a 64K memory.
    pc: Word,
    flags: Flags,
    status: Status,
    io: IoController,
}

// Register and memory access
impl Machine {
    pub fn ac(&self) -> Word {
        self.ac
    }

    pub fn pc(&self) -> Word {
        self.pc
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn memory_size(&self) -> usize {
        self.mem.len()
    }

    pub fn get(&self, addr: Addr) -> Option<Word> {
        self.mem.get(addr as usize).copied()
    }

    pub fn output(&self) -> &[u8] {
        self.io.output()
    }

    fn read(&self, pc: Addr, addr: Addr) -> Result<Word, Fault> {
        self.get(addr).ok_or(Fault::AddressOutOfRange {
            pc,
            addr: addr as Word,
        })
    }

    fn write(&mut self, pc: Addr, addr: Addr, value: Word) -> Result<(), Fault> {
        match self.mem.get_mut(addr as usize) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Fault::AddressOutOfRange {
                pc,
                addr: addr as Word,
            }),
        }
    }
}

impl Machine {
    /// Reset machine with `memory_size` zeroed words.
    pub fn new(memory_size: usize, io: IoController) -> Self {
        Machine {
            mem: vec![0; memory_size],
            ac: 0,
            pc: 0,
            flags: Flags::default(),
            status: Status::Ready,
            io,
        }
    }

    /// Burn `program` into memory. Nothing is written unless every section fits.
    pub fn load(&mut self, program: &Program) -> Result<(), ProgramError> {
        program.validate(self.mem.len())?;
        let mut cells = 0;
        for (addr, word) in program.cells() {
            self.mem[addr] = word;
            cells += 1;
        }
        info!(
            sections = program.sections.len(),
            cells,
            memory_size = self.mem.len(),
            "program loaded"
        );
        Ok(())
    }

    /// Stop with `fault`, as if the current instruction had raised it.
    pub fn abort(&mut self, fault: Fault) -> Fault {
        debug!(pc = fault.pc(), %fault, "faulted");
        self.status = Status::Faulted(fault.clone());
        fault
    }

    /// Execute one instruction.
    ///
    /// Returns `None` once the machine has halted. A faulted machine keeps
    /// reporting its fault.
    pub fn step(&mut self) -> Result<Option<Retired>, Fault> {
        match &self.status {
            Status::Halted => return Ok(None),
            Status::Faulted(fault) => return Err(fault.clone()),
            Status::Ready | Status::Running => {}
        }
        self.status = Status::Running;
        match self.exec() {
            Ok(retired) => {
                if retired.inst.opcode == Opcode::HALT {
                    info!(pc = retired.pc, "halted");
                    self.status = Status::Halted;
                }
                Ok(Some(retired))
            }
            Err(fault) => Err(self.abort(fault)),
        }
    }

    fn exec(&mut self) -> Result<Retired, Fault> {
        let (pc, word) = Addr::try_from(self.pc)
            .ok()
            .and_then(|pc| Some((pc, self.get(pc)?)))
            .ok_or(Fault::PcOutOfRange { pc: self.pc })?;
        let inst = Inst::from_bin(word).map_err(|reason| Fault::IllegalInstruction {
            pc,
            word,
            reason,
        })?;

        let mut effects = vec![];
        // Sequential flow may step past 0xFFFF; the next fetch faults there.
        let mut next = self.pc + 1;

        use Opcode::*;
        match inst.opcode {
            IN => {
                let port = port(pc, word, &inst)?;
                let value = self.io.read(pc, port)?;
                effects.push(Effect::In { port, value });
                self.set_ac(value, &mut effects);
            }
            OUT => {
                let port = port(pc, word, &inst)?;
                self.io.write(pc, port, self.ac)?;
                effects.push(Effect::Out {
                    port,
                    value: self.ac,
                });
            }
            LOAD => {
                let value = self.value(pc, &inst)?;
                self.set_ac(value, &mut effects);
            }
            STORE => {
                let addr = self.ea(pc, &inst)?;
                self.write(pc, addr, self.ac)?;
                effects.push(Effect::Store {
                    addr,
                    value: self.ac,
                });
            }
            ADD => {
                let value = self.value(pc, &inst)?;
                self.calc(ALU::ADD, value, &mut effects);
            }
            INC => self.calc(ALU::ADD, 1, &mut effects),
            AND => {
                let value = self.value(pc, &inst)?;
                self.calc(ALU::AND, value, &mut effects);
            }
            CMP => {
                let value = self.value(pc, &inst)?;
                let out = valu(ALU::SUB, self.ac, value);
                self.set_flags(out, &mut effects);
            }
            SHL => self.calc(ALU::SL, 0, &mut effects),
            SHR => self.calc(ALU::SR, 0, &mut effects),
            JZC | JZS | JCS | JCC | JUMP => {
                let taken = match inst.opcode {
                    JZC => !self.flags.zero,
                    JZS => self.flags.zero,
                    JCS => self.flags.carry,
                    JCC => !self.flags.carry,
                    _ => true,
                };
                // The target is only evaluated for a taken jump.
                if taken {
                    let target = self.ea(pc, &inst)?;
                    effects.push(Effect::Jump(target));
                    next = target as Word;
                }
            }
            NOP => {}
            HALT => effects.push(Effect::Halted),
        }

        self.pc = next;
        Ok(Retired { pc, inst, effects })
    }

    /// Effective address of an address-mode operand.
    fn ea(&self, pc: Addr, inst: &Inst) -> Result<Addr, Fault> {
        let next = pc.wrapping_add(1);
        match inst.mode {
            Mode::Absolute => Ok(inst.operand),
            Mode::Relative => Ok(next.wrapping_add(inst.operand)),
            Mode::Indirect => {
                let pointer = self.read(pc, next.wrapping_add(inst.operand))?;
                Addr::try_from(pointer).map_err(|_| Fault::AddressOutOfRange { pc, addr: pointer })
            }
            // Decoding only admits address modes for address operands.
            Mode::Implied | Mode::Immediate => Ok(inst.operand),
        }
    }

    fn value(&self, pc: Addr, inst: &Inst) -> Result<Word, Fault> {
        match inst.mode {
            Mode::Immediate => Ok(inst.operand as Word),
            _ => {
                let addr = self.ea(pc, inst)?;
                self.read(pc, addr)
            }
        }
    }

    fn set_ac(&mut self, value: Word, effects: &mut Vec<Effect>) {
        self.ac = value;
        effects.push(Effect::Acc(value));
    }

    fn set_flags(&mut self, out: AluOut, effects: &mut Vec<Effect>) {
        self.flags = Flags {
            zero: out.zero,
            carry: out.carry,
        };
        effects.push(Effect::Flags(self.flags));
    }

    fn calc(&mut self, op: ALU, operand: Word, effects: &mut Vec<Effect>) {
        let out = valu(op, self.ac, operand);
        self.set_ac(out.value, effects);
        self.set_flags(out, effects);
    }
}

fn port(pc: Addr, word: Word, inst: &Inst) -> Result<Port, Fault> {
    Port::try_from(inst.operand).map_err(|_| Fault::IllegalInstruction {
        pc,
        word,
        reason: DecodeError::PortOutOfRange(inst.operand),
    })
}
