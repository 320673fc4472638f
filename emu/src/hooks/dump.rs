use arch::reg::Reg;
use arch::Addr;
use std::collections::HashMap;
use std::io::{self, Write};

use super::Hook;
use crate::config::DumpRequest;
use crate::model::{Machine, Retired};

/// Register and memory dumps after selected instructions.
pub struct Dump<W: Write> {
    out: W,
    all: bool,
    list: HashMap<Addr, DumpRequest>,
}

impl<W: Write> Dump<W> {
    pub fn new(list: HashMap<Addr, DumpRequest>, all: bool, out: W) -> Self {
        Dump { out, all, list }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn get(&self, pc: Addr) -> Option<&DumpRequest> {
        self.list.get(&pc)
    }
}

impl<W: Write> Hook for Dump<W> {
    fn init(&mut self, _machine: &Machine) -> io::Result<()> {
        if self.all {
            writeln!(self.out, " * Dump all")?;
        }
        if !self.list.is_empty() {
            writeln!(self.out, " * Dump[{}]", self.list.len())?;
        }
        Ok(())
    }

    fn exec(&mut self, tick: u64, retired: &Retired, machine: &Machine) -> io::Result<()> {
        if let Some(cfg) = self.get(retired.pc) {
            let memory = cfg.memory.clone();
            self.print_reg(tick, retired, machine)?;
            self.print_memory(machine, &memory)?;
        } else if self.all {
            self.print_reg(tick, retired, machine)?;
        }
        Ok(())
    }
}

impl<W: Write> Dump<W> {
    fn print_reg(&mut self, tick: u64, retired: &Retired, machine: &Machine) -> io::Result<()> {
        writeln!(self.out, " +------------------------------------------------+")?;
        writeln!(
            self.out,
            " | [{:0>4}] {:04X}: {:<30} |",
            tick,
            retired.pc,
            retired.inst.to_string()
        )?;
        writeln!(
            self.out,
            " | {} | {} | {} |",
            Reg::AC.format(machine.ac()),
            Reg::PC.format(machine.pc()),
            machine.flags()
        )?;
        writeln!(self.out, " +------------------------------------------------+")
    }

    fn print_memory(&mut self, machine: &Machine, addrs: &[Addr]) -> io::Result<()> {
        for addr in addrs {
            match machine.get(*addr) {
                Some(word) => writeln!(self.out, " | {:04X} : {:08X}{:29}|", addr, word, "")?,
                None => writeln!(self.out, " | {:04X} : --------{:29}|", addr, "")?,
            }
        }
        writeln!(self.out, " +------------------------------------------------+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::IoController;
    use crate::model::Effect;
    use arch::inst::Inst;
    use arch::op::{Mode, Opcode};

    fn retired(pc: Addr) -> Retired {
        Retired {
            pc,
            inst: Inst::new(Opcode::LOAD, Mode::Immediate, 1),
            effects: vec![Effect::Acc(1)],
        }
    }

    #[test]
    fn dumps_configured_pc_only() {
        let machine = Machine::new(4, IoController::new());
        let list = HashMap::from([(1, DumpRequest { memory: vec![2, 9] })]);
        let mut dump = Dump::new(list, false, Vec::new());
        dump.exec(0, &retired(0), &machine).unwrap();
        assert!(dump.out.is_empty());

        dump.exec(1, &retired(1), &machine).unwrap();
        let text = String::from_utf8(dump.into_inner()).unwrap();
        assert!(text.contains("[0001] 0001: LOAD #0x0001"));
        assert!(text.contains("AC=0x00000000 | PC=0x0000 | Z=1 C=0"));
        assert!(text.contains(" | 0002 : 00000000"));
        assert!(text.contains(" | 0009 : --------"));
    }

    #[test]
    fn dump_all() {
        let machine = Machine::new(4, IoController::new());
        let mut dump = Dump::new(HashMap::new(), true, Vec::new());
        dump.init(&machine).unwrap();
        dump.exec(0, &retired(0), &machine).unwrap();
        dump.exec(1, &retired(1), &machine).unwrap();
        let text = String::from_utf8(dump.into_inner()).unwrap();
        assert!(text.starts_with(" * Dump all\n"));
        assert_eq!(text.matches("AC=").count(), 2);
    }
}
