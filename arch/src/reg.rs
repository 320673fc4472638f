use std::fmt;

use strum::Display;

use crate::Word;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Reg {
    AC,
    PC,
}

impl Reg {
    /// Hex digits used when printing the register.
    pub fn width(&self) -> usize {
        match self {
            Reg::AC => 8,
            Reg::PC => 4,
        }
    }

    pub fn format(&self, value: Word) -> String {
        format!("{}=0x{:0>width$X}", self, value, width = self.width())
    }
}

/// Status flags. Reset state has `zero` set since the accumulator is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    pub zero: bool,
    pub carry: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Flags {
            zero: true,
            carry: false,
        }
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Z={} C={}", self.zero as u8, self.carry as u8)
    }
}

#[test]
fn test() {
    assert_eq!(Reg::AC.format(5), "AC=0x00000005");
    assert_eq!(Reg::PC.format(0x12), "PC=0x0012");
    assert_eq!(Flags::default().to_string(), "Z=1 C=0");
}
