pub mod dump;
pub mod serial;
pub mod trace;

use std::io;

use crate::fault::Fault;
use crate::model::{Machine, Retired};

/// Observer of the run loop. `tick` is the index of the retired instruction,
/// or of the instruction that faulted.
pub trait Hook {
    fn init(&mut self, _machine: &Machine) -> io::Result<()> {
        Ok(())
    }

    fn exec(&mut self, tick: u64, retired: &Retired, machine: &Machine) -> io::Result<()>;

    fn fault(&mut self, _tick: u64, _fault: &Fault, _machine: &Machine) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self, _machine: &Machine) -> io::Result<()> {
        Ok(())
    }
}
