//! Defines the [`Fault`] type of the crate.
//!
//! Every fault is fatal: the machine has no resumable trap for any of these.
//! The only resumable path is an interrupt, which is not an error at all.

use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
    io,
};

/// The reason the machine stopped executing.
#[derive(Debug)]
pub enum FaultKind {
    /// Memory was accessed at an address that does not exist. Addresses never
    /// wrap around.
    AddressOutOfRange { address: u16 },
    /// The fetched opcode does not name any instruction.
    UnknownInstruction { opcode: u8 },
    /// The ALU was handed an operation selector it does not implement.
    UnsupportedOperation { selector: u8 },
    /// `DIV` or `MOD` with a zero divisor.
    DivisionByZero,
    /// An operand named a register that does not exist.
    InvalidRegister { register: u8 },
    /// The output channel refused a `PRN` or `PRA`.
    Output(io::Error),
}

impl Display for FaultKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            FaultKind::AddressOutOfRange { address } => {
                write!(fmt, "address out of range: ${address:04X}")
            }
            FaultKind::UnknownInstruction { opcode } => {
                write!(fmt, "unknown instruction: {opcode:#010b}")
            }
            FaultKind::UnsupportedOperation { selector } => {
                write!(fmt, "unsupported ALU operation: {selector:#06b}")
            }
            FaultKind::DivisionByZero => write!(fmt, "division by zero"),
            FaultKind::InvalidRegister { register } => {
                write!(fmt, "invalid register: R{register}")
            }
            FaultKind::Output(error) => write!(fmt, "output channel failed: {error}"),
        }
    }
}

impl Error for FaultKind {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FaultKind::Output(error) => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for FaultKind {
    fn from(error: io::Error) -> Self {
        FaultKind::Output(error)
    }
}

/// A [`FaultKind`] along with the program counter it happened at.
#[derive(Debug)]
pub struct Fault {
    pub pc: u16,
    pub kind: FaultKind,
}

impl Display for Fault {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{} (PC: ${:02X})", self.kind, self.pc)
    }
}

// `Display` already shows the kind, so the chain skips straight to its cause.
impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.kind.source()
    }
}
