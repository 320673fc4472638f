use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::Hook;
use crate::fault::Fault;
use crate::model::{Machine, Retired};

/// Execution log: one line per retired instruction, then a `FAULT` line if
/// the run did not halt.
pub struct Trace<W: Write> {
    out: W,
}

impl Trace<BufWriter<File>> {
    /// Open the log file, appending unless `truncate` is set.
    pub fn open(path: &Path, truncate: bool) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(!truncate)
            .truncate(truncate)
            .open(path)?;
        Ok(Trace::new(BufWriter::new(file)))
    }
}

impl<W: Write> Trace<W> {
    pub fn new(out: W) -> Self {
        Trace { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn record(tick: u64, retired: &Retired) -> String {
    let line = format!("[{:0>4}] {}", tick, retired);
    line.trim_end().to_string()
}

pub fn fault_record(tick: u64, fault: &Fault) -> String {
    format!("[{:0>4}] {:04X}: FAULT {}", tick, fault.pc(), fault)
}

impl<W: Write> Hook for Trace<W> {
    fn exec(&mut self, tick: u64, retired: &Retired, _machine: &Machine) -> io::Result<()> {
        writeln!(self.out, "{}", record(tick, retired))
    }

    fn fault(&mut self, tick: u64, fault: &Fault, _machine: &Machine) -> io::Result<()> {
        writeln!(self.out, "{}", fault_record(tick, fault))?;
        self.out.flush()
    }

    fn finish(&mut self, _machine: &Machine) -> io::Result<()> {
        self.out.flush()
    }
}
