//! The interrupt controller.
//!
//! The controller is either [`Enabled`](InterruptState::Enabled) or
//! [`Disabled`](InterruptState::Disabled), which is simply whether the
//! interrupt mask (R5) is non-zero. Pending interrupts are the bits of the
//! interrupt status register (R6). Dispatching an interrupt disables the
//! controller, and only `IRET` enables it again, so handlers never nest.
//! Anything that becomes pending in the meantime stays queued in R6.

use std::time::{Duration, Instant};

use crate::registers::{clear_bit, set_bit, Registers};

/// Address of the first entry of the interrupt vector table. Line `n` jumps
/// to the address stored at `VECTOR_TABLE + n`.
pub const VECTOR_TABLE: u16 = 0xF8;

pub const TIMER_LINE: u8 = 0;
pub const KEYBOARD_LINE: u8 = 1;

pub const INTERRUPT_LINES: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptState {
    Enabled,
    Disabled,
}

impl InterruptState {
    pub fn from_mask(mask: u8) -> InterruptState {
        if mask == 0 {
            InterruptState::Disabled
        } else {
            InterruptState::Enabled
        }
    }
}

/// The lowest interrupt line that is both enabled and pending.
pub fn next_pending(mask: u8, status: u8) -> Option<u8> {
    let masked = mask & status;
    if masked == 0 {
        None
    } else {
        Some(masked.trailing_zeros() as u8)
    }
}

/// Where the handler address for `line` lives.
pub fn vector_address(line: u8) -> u16 {
    VECTOR_TABLE + u16::from(line % INTERRUPT_LINES)
}

pub fn line_bit(line: u8) -> u8 {
    1 << (line % INTERRUPT_LINES)
}

pub struct InterruptController {
    timer_period: Duration,
    /// When the timer last started counting: machine start, the last time it
    /// raised its line, or the last `IRET`.
    last_service: Instant,
}

impl InterruptController {
    pub fn new(timer_period: Duration, now: Instant) -> InterruptController {
        InterruptController {
            timer_period,
            last_service: now,
        }
    }

    pub fn state(&self, registers: &Registers) -> InterruptState {
        InterruptState::from_mask(registers.im())
    }

    /// Mark `line` as pending.
    pub fn raise(&self, registers: &mut Registers, line: u8) {
        registers.set_is(set_bit(registers.is(), line_bit(line)));
    }

    /// Run the timer, then pick an interrupt to service, if any. A returned
    /// line has already been acknowledged: the controller is now disabled and
    /// the line's pending bit is cleared. The caller still has to save the
    /// machine context and jump through the vector.
    pub fn poll(&mut self, registers: &mut Registers, now: Instant) -> Option<u8> {
        if now.saturating_duration_since(self.last_service) > self.timer_period {
            log::debug!("Timer interrupt is now pending");
            self.raise(registers, TIMER_LINE);
            self.last_service = now;
        }
        match self.state(registers) {
            InterruptState::Disabled => None,
            InterruptState::Enabled => {
                let line = next_pending(registers.im(), registers.is())?;
                registers.set_im(0);
                registers.set_is(clear_bit(registers.is(), line_bit(line)));
                Some(line)
            }
        }
    }

    /// Called once `IRET` has restored the interrupted context.
    pub fn finish(&mut self, registers: &mut Registers, now: Instant) {
        registers.set_im(1);
        self.last_service = now;
    }
}
