use crate::Word;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ALU {
    ADD,
    AND,
    /// `a + !b + 1`: carry is set when no borrow occurs (`a >= b`).
    SUB,
    SL,
    SR,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluOut {
    pub value: Word,
    pub zero: bool,
    pub carry: bool,
}

pub fn valu(op: ALU, a: Word, b: Word) -> AluOut {
    use ALU::*;
    let (value, carry) = match op {
        ADD => a.overflowing_add(b),
        AND => (a & b, false),
        SUB => {
            let (partial, c0) = a.overflowing_add(!b);
            let (value, c1) = partial.overflowing_add(1);
            (value, c0 || c1)
        }
        SL => (a << 1, false),
        SR => (a >> 1, false),
    };
    AluOut {
        value,
        zero: value == 0,
        carry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_alu {
        ($($name:ident: $op:ident($a:expr, $b:expr) => ($value:expr, $zero:expr, $carry:expr),)*) => {
            $(
                #[test]
                fn $name() {
                    let (a, b): (Word, Word) = ($a, $b);
                    let out = valu(ALU::$op, a, b);
                    assert_eq!(
                        out,
                        AluOut { value: $value, zero: $zero, carry: $carry },
                        "{:?}({:#X}, {:#X})", ALU::$op, a, b
                    );
                }
            )*
        }
    }

    test_alu! {
        add: ADD(2, 3) => (5, false, false),
        add_wraps_with_carry: ADD(0xFFFF_FFFF, 1) => (0, true, true),
        and_clears_carry: AND(0xF0, 0x0F) => (0, true, false),
        sub_equal: SUB(7, 7) => (0, true, true),
        sub_greater: SUB(9, 7) => (2, false, true),
        sub_less_borrows: SUB(7, 9) => (0xFFFF_FFFE, false, false),
        sub_zero: SUB(0, 0) => (0, true, true),
        sl_drops_high_bit: SL(0x8000_0001, 0) => (2, false, false),
        sr: SR(1, 0) => (0, true, false),
    }
}
