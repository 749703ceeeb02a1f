use crate::FaultKind;

use std::ops::BitAnd;

pub const REGISTER_COUNT: usize = 8;

/// R5: the Interrupt **M**ask. Interrupts are enabled whenever it is non-zero.
pub const IM: u8 = 5;
/// R6: the Interrupt **S**tatus. One pending bit per interrupt line.
pub const IS: u8 = 6;
/// R7: the **S**tack **P**ointer.
pub const SP: u8 = 7;

/// Where SP points when the machine starts. The stack grows down from here.
pub const STACK_TOP: u8 = 0xF4;

// Bits of the FL register. Only `CMP` sets these, and exactly one at a time.
/// **E**qual: the last compare found `a == b`
pub const FLAG_E: u8 = 0b_0000_0001;
/// **G**reater: the last compare found `a > b`
pub const FLAG_G: u8 = 0b_0000_0010;
/// **L**ess: the last compare found `a < b`
pub const FLAG_L: u8 = 0b_0000_0100;

pub(crate) fn clear_bit(input: u8, bit: u8) -> u8 {
    input & !bit
}
pub(crate) fn set_bit(input: u8, bit: u8) -> u8 {
    input | bit
}
pub(crate) fn is_bit_set<A, B>(input: A, bit: B) -> bool
where
    A: BitAnd<B, Output = B>,
    B: PartialEq + Copy,
{
    input & bit == bit
}

/// The eight general purpose registers, R0 through R7.
///
/// R5, R6 and R7 double as [`IM`], [`IS`] and [`SP`]. They are still plain
/// registers as far as programs are concerned.
#[derive(Clone, PartialEq, Eq)]
pub struct Registers([u8; REGISTER_COUNT]);

impl Registers {
    pub fn new() -> Registers {
        let mut registers = [0; REGISTER_COUNT];
        registers[SP as usize] = STACK_TOP;
        Registers(registers)
    }

    pub fn get(&self, register: u8) -> Result<u8, FaultKind> {
        let Self(registers) = self;
        registers
            .get(register as usize)
            .copied()
            .ok_or(FaultKind::InvalidRegister { register })
    }

    pub fn set(&mut self, register: u8, value: u8) -> Result<(), FaultKind> {
        let Self(registers) = self;
        let slot = registers
            .get_mut(register as usize)
            .ok_or(FaultKind::InvalidRegister { register })?;
        *slot = value;
        Ok(())
    }

    // The reserved registers always exist, so these can't fail.
    pub fn sp(&self) -> u8 {
        self.0[SP as usize]
    }
    pub fn set_sp(&mut self, value: u8) {
        self.0[SP as usize] = value;
    }
    pub fn im(&self) -> u8 {
        self.0[IM as usize]
    }
    pub fn set_im(&mut self, value: u8) {
        self.0[IM as usize] = value;
    }
    pub fn is(&self) -> u8 {
        self.0[IS as usize]
    }
    pub fn set_is(&mut self, value: u8) {
        self.0[IS as usize] = value;
    }

    pub fn as_array(&self) -> &[u8; REGISTER_COUNT] {
        &self.0
    }
}

impl Default for Registers {
    fn default() -> Self {
        Registers::new()
    }
}
