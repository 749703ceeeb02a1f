//! An emulator for the LS-8, a small 8-bit stack machine with 256 bytes of
//! RAM, eight registers and a timer interrupt.

mod cpu;
pub use cpu::*;
mod error;
pub use error::*;
mod memory;
pub use memory::*;
mod registers;
pub use registers::{Registers, FLAG_E, FLAG_G, FLAG_L, IM, IS, SP, STACK_TOP};

use std::io::Write;

/// A whole LS-8: the CPU, its RAM, and wherever `PRN` and `PRA` print to.
pub struct Computer<W: Write> {
    cpu: Cpu,
    memory: Ram,
    output: W,
}

impl<W: Write> Computer<W> {
    pub fn new(output: W) -> Computer<W> {
        Computer::with_config(output, CpuConfig::default())
    }

    pub fn with_config(output: W, config: CpuConfig) -> Computer<W> {
        Computer {
            cpu: Cpu::with_config(config),
            memory: Ram::new(),
            output,
        }
    }

    /// Put a program image in RAM, starting at address 0. Must happen before
    /// the first step.
    pub fn load(&mut self, image: &[u8]) -> Result<(), FaultKind> {
        self.memory.load(image)
    }

    pub fn step(&mut self) -> Result<State, Fault> {
        self.cpu.step(&mut self.memory, &mut self.output)
    }

    pub fn run(&mut self) -> Result<(), Fault> {
        self.cpu.run(&mut self.memory, &mut self.output)
    }

    pub fn get_cpu(&self) -> &Cpu {
        &self.cpu
    }
    pub fn get_cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }
    pub fn get_memory(&self) -> &Ram {
        &self.memory
    }
    pub fn get_memory_mut(&mut self) -> &mut Ram {
        &mut self.memory
    }
    pub fn get_output(&self) -> &W {
        &self.output
    }
    pub fn into_output(self) -> W {
        self.output
    }
}
