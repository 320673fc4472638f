use std::io::{self, Write};

use super::Hook;
use crate::fault::Fault;
use crate::model::{Machine, Retired};

/// Streams program output to `out` as it is produced.
pub struct Serial<W: Write> {
    out: W,
    sent: usize,
}

impl<W: Write> Serial<W> {
    pub fn new(out: W) -> Self {
        Serial { out, sent: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn forward(&mut self, machine: &Machine) -> io::Result<()> {
        let output = machine.output();
        if output.len() > self.sent {
            self.out.write_all(&output[self.sent..])?;
            self.sent = output.len();
        }
        Ok(())
    }
}

impl<W: Write> Hook for Serial<W> {
    fn exec(&mut self, _tick: u64, _retired: &Retired, machine: &Machine) -> io::Result<()> {
        self.forward(machine)
    }

    fn fault(&mut self, _tick: u64, _fault: &Fault, machine: &Machine) -> io::Result<()> {
        self.forward(machine)?;
        self.out.flush()
    }

    fn finish(&mut self, machine: &Machine) -> io::Result<()> {
        self.forward(machine)?;
        self.out.flush()
    }
}
