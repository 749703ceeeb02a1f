//! The arithmetic logic unit. Everything here is pure: it takes register
//! values and hands back either a new value for `reg[a]` or new flags.

use crate::{
    registers::{FLAG_E, FLAG_G, FLAG_L},
    FaultKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Inc,
    Dec,
    Cmp,
    And,
    Not,
    Or,
    Xor,
    Shl,
    Shr,
}

impl AluOp {
    /// Resolve the low nibble of an ALU opcode.
    pub fn from_selector(selector: u8) -> Result<AluOp, FaultKind> {
        Ok(match selector {
            0x0 => AluOp::Add,
            0x1 => AluOp::Sub,
            0x2 => AluOp::Mul,
            0x3 => AluOp::Div,
            0x4 => AluOp::Mod,
            0x5 => AluOp::Inc,
            0x6 => AluOp::Dec,
            0x7 => AluOp::Cmp,
            0x8 => AluOp::And,
            0x9 => AluOp::Not,
            0xA => AluOp::Or,
            0xB => AluOp::Xor,
            0xC => AluOp::Shl,
            0xD => AluOp::Shr,
            selector => return Err(FaultKind::UnsupportedOperation { selector }),
        })
    }

    /// How many register operands the operation reads.
    pub fn operand_count(self) -> u8 {
        match self {
            AluOp::Inc | AluOp::Dec | AluOp::Not => 1,
            _ => 2,
        }
    }
}

/// What an operation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluResult {
    /// Store this into `reg[a]`.
    Value(u8),
    /// Replace the FL register with this. No register changes.
    Flags(u8),
}

/// Apply `op` to `a` and `b`. Single-operand operations ignore `b`.
pub fn apply(op: AluOp, a: u8, b: u8) -> Result<AluResult, FaultKind> {
    let value = match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Div => a.checked_div(b).ok_or(FaultKind::DivisionByZero)?,
        AluOp::Mod => a.checked_rem(b).ok_or(FaultKind::DivisionByZero)?,
        AluOp::Inc => a.wrapping_add(1),
        AluOp::Dec => a.wrapping_sub(1),
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Not => !a,
        // Shifting by 8 or more pushes every bit out.
        AluOp::Shl => a.checked_shl(u32::from(b)).unwrap_or(0),
        AluOp::Shr => a.checked_shr(u32::from(b)).unwrap_or(0),
        AluOp::Cmp => return Ok(AluResult::Flags(compare(a, b))),
    };
    Ok(AluResult::Value(value))
}

fn compare(a: u8, b: u8) -> u8 {
    use std::cmp::Ordering::*;
    match a.cmp(&b) {
        Equal => FLAG_E,
        Greater => FLAG_G,
        Less => FLAG_L,
    }
}
