use arch::{Addr, Port, Word};
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::fault::Fault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    WriteOnly,
    Exhausted,
}

pub trait Device: Debug {
    fn read(&mut self) -> Result<Word, DeviceError>;
    /// Append whatever the device emits for `value` to `output`.
    fn write(&mut self, value: Word, output: &mut Vec<u8>) -> Result<(), DeviceError>;
}

/// Port 0. Reads yield the input length first, then every input byte.
/// Writes emit the low byte of the value.
#[derive(Debug)]
pub struct Console {
    input: Vec<u8>,
    length_sent: bool,
    cursor: usize,
}

impl Console {
    pub const PORT: Port = 0;

    pub fn new(input: Vec<u8>) -> Self {
        Console {
            input,
            length_sent: false,
            cursor: 0,
        }
    }
}

impl Device for Console {
    fn read(&mut self) -> Result<Word, DeviceError> {
        if !self.length_sent {
            self.length_sent = true;
            return Ok(self.input.len() as Word);
        }
        let byte = self.input.get(self.cursor).ok_or(DeviceError::Exhausted)?;
        self.cursor += 1;
        Ok(*byte as Word)
    }

    fn write(&mut self, value: Word, output: &mut Vec<u8>) -> Result<(), DeviceError> {
        output.push(value as u8);
        Ok(())
    }
}

/// Port 1. Write-only, prints the value in decimal followed by a newline.
#[derive(Debug)]
pub struct Decimal;

impl Decimal {
    pub const PORT: Port = 1;
}

impl Device for Decimal {
    fn read(&mut self) -> Result<Word, DeviceError> {
        Err(DeviceError::WriteOnly)
    }

    fn write(&mut self, value: Word, output: &mut Vec<u8>) -> Result<(), DeviceError> {
        output.extend_from_slice(format!("{value}\n").as_bytes());
        Ok(())
    }
}

/// Routes port accesses to devices and owns the output stream.
#[derive(Debug, Default)]
pub struct IoController {
    devices: BTreeMap<Port, Box<dyn Device>>,
    output: Vec<u8>,
}

impl IoController {
    pub fn new() -> Self {
        IoController::default()
    }

    /// Console on port 0 fed with `input`, decimal printer on port 1.
    pub fn standard(input: Vec<u8>) -> Self {
        IoController::new()
            .connect(Console::PORT, Box::new(Console::new(input)))
            .connect(Decimal::PORT, Box::new(Decimal))
    }

    pub fn connect(mut self, port: Port, device: Box<dyn Device>) -> Self {
        self.devices.insert(port, device);
        self
    }

    pub fn read(&mut self, pc: Addr, port: Port) -> Result<Word, Fault> {
        let device = self
            .devices
            .get_mut(&port)
            .ok_or(Fault::NoDevice { pc, port })?;
        device.read().map_err(|err| fault(err, pc, port))
    }

    pub fn write(&mut self, pc: Addr, port: Port, value: Word) -> Result<(), Fault> {
        let device = self
            .devices
            .get_mut(&port)
            .ok_or(Fault::NoDevice { pc, port })?;
        device
            .write(value, &mut self.output)
            .map_err(|err| fault(err, pc, port))
    }

    /// Every byte written so far, in order.
    pub fn output(&self) -> &[u8] {
        &self.output
    }
}

fn fault(err: DeviceError, pc: Addr, port: Port) -> Fault {
    match err {
        DeviceError::WriteOnly => Fault::WriteOnly { pc, port },
        DeviceError::Exhausted => Fault::InputExhausted { pc },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_sends_length_then_bytes() {
        let mut io = IoController::standard(b"ab".to_vec());
        assert_eq!(io.read(0, 0), Ok(2));
        assert_eq!(io.read(0, 0), Ok(b'a' as Word));
        assert_eq!(io.read(0, 0), Ok(b'b' as Word));
        assert_eq!(io.read(7, 0), Err(Fault::InputExhausted { pc: 7 }));
    }

    #[test]
    fn empty_input() {
        let mut io = IoController::standard(vec![]);
        assert_eq!(io.read(0, 0), Ok(0));
        assert_eq!(io.read(1, 0), Err(Fault::InputExhausted { pc: 1 }));
    }

    #[test]
    fn output_is_ordered() {
        let mut io = IoController::standard(vec![]);
        io.write(0, 0, 0x1234_5641).unwrap();
        io.write(0, 1, 42).unwrap();
        io.write(0, 0, b'!' as Word).unwrap();
        assert_eq!(io.output(), b"A42\n!");
    }

    #[test]
    fn port_faults() {
        let mut io = IoController::standard(vec![]);
        assert_eq!(io.read(4, 1), Err(Fault::WriteOnly { pc: 4, port: 1 }));
        assert_eq!(io.read(5, 9), Err(Fault::NoDevice { pc: 5, port: 9 }));
        assert_eq!(io.write(6, 2, 0), Err(Fault::NoDevice { pc: 6, port: 2 }));
        assert!(io.output().is_empty());
    }
}
