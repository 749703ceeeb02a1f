use super::{Fault, FaultKind, Memory};
use crate::registers::*;

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    io::Write,
    time::{Duration, Instant},
};

mod alu;
mod decode;
mod interrupts;
pub use alu::{AluOp, AluResult};
pub use decode::{decode, Instruction, Operation};
use interrupts::{vector_address, InterruptController};
pub use interrupts::{InterruptState, KEYBOARD_LINE, TIMER_LINE, VECTOR_TABLE};

pub struct CpuConfig {
    /// How long the timer waits, after start, after it last raised its line
    /// or after the last `IRET`, before it raises the timer interrupt.
    pub timer_period: Duration,
}

impl Default for CpuConfig {
    fn default() -> Self {
        CpuConfig {
            timer_period: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    /// Stopped by `HLT`.
    Halted,
    /// Stopped by a [`Fault`].
    Faulted,
}

pub struct Cpu {
    /// R0 through R7. R5, R6 and R7 are also IM, IS and SP.
    registers: Registers,
    /// The flags register. Written by `CMP`, read by the conditional jumps.
    fl: u8,
    /// The program counter. Wider than a byte so that running off the end of
    /// memory is caught on the next fetch instead of wrapping to 0.
    pc: u16,
    interrupts: InterruptController,
    state: State,
}

impl Debug for Cpu {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(
            fmt,
            "PC:{pc:02X} FL:{l}{g}{e}",
            pc = self.pc,
            l = if is_bit_set(self.fl, FLAG_L) { "L" } else { "l" },
            g = if is_bit_set(self.fl, FLAG_G) { "G" } else { "g" },
            e = if is_bit_set(self.fl, FLAG_E) { "E" } else { "e" },
        )?;
        for (index, value) in self.registers.as_array().iter().enumerate() {
            write!(fmt, " R{index}:{value:02X}")?;
        }
        Ok(())
    }
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu::with_config(CpuConfig::default())
    }

    pub fn with_config(config: CpuConfig) -> Cpu {
        Cpu {
            registers: Registers::new(),
            fl: 0,
            pc: 0,
            interrupts: InterruptController::new(config.timer_period, Instant::now()),
            state: State::Running,
        }
    }

    /// Run one cycle: service an interrupt if one is due, then fetch, decode
    /// and execute one instruction. Does nothing once the CPU has stopped.
    pub fn step<M: Memory, W: Write>(
        &mut self,
        memory: &mut M,
        output: &mut W,
    ) -> Result<State, Fault> {
        if self.state != State::Running {
            return Ok(self.state);
        }
        match self.cycle(memory, output) {
            Ok(()) => Ok(self.state),
            Err(kind) => {
                self.state = State::Faulted;
                Err(Fault { pc: self.pc, kind })
            }
        }
    }

    /// Step until `HLT` or a fault.
    pub fn run<M: Memory, W: Write>(&mut self, memory: &mut M, output: &mut W) -> Result<(), Fault> {
        while self.step(memory, output)? == State::Running {}
        Ok(())
    }

    /// Mark an interrupt line as pending. This is how devices outside the
    /// CPU (the keyboard, say) get its attention.
    ///
    /// A line raised while a handler is running is lost if that handler ends
    /// with `IRET`, because `IRET` restores R6 from the stack.
    pub fn raise_interrupt(&mut self, line: u8) {
        self.interrupts.raise(&mut self.registers, line);
    }

    fn cycle<M: Memory, W: Write>(
        &mut self,
        memory: &mut M,
        output: &mut W,
    ) -> Result<(), FaultKind> {
        self.service_interrupts(memory, Instant::now())?;
        let opcode = memory.read_byte(self.pc)?;
        let instruction = decode(opcode)?;
        let mut operands = [0u8; 2];
        for (n, operand) in operands
            .iter_mut()
            .take(instruction.operand_count as usize)
            .enumerate()
        {
            *operand = memory.read_byte(self.pc + 1 + n as u16)?;
        }
        log::trace!(
            "{:?} | {opcode:08b} {:?} {operands:02X?}",
            self,
            instruction.operation
        );
        self.execute(memory, output, &instruction, operands)?;
        if !instruction.sets_pc_directly {
            self.pc += instruction.length();
        }
        Ok(())
    }

    fn execute<M: Memory, W: Write>(
        &mut self,
        memory: &mut M,
        output: &mut W,
        instruction: &Instruction,
        [a, b]: [u8; 2],
    ) -> Result<(), FaultKind> {
        match instruction.operation {
            Operation::Nop => (),
            Operation::Hlt => {
                log::info!("Halted at ${:02X}", self.pc);
                self.state = State::Halted;
            }
            Operation::Ldi => self.registers.set(a, b)?,
            Operation::Ld => {
                let address = self.registers.get(b)?;
                let value = memory.read_byte(address.into())?;
                self.registers.set(a, value)?;
            }
            Operation::St => {
                let address = self.registers.get(a)?;
                let value = self.registers.get(b)?;
                memory.write_byte(address.into(), value)?;
            }
            Operation::Push => {
                let value = self.registers.get(a)?;
                self.push_byte(memory, value)?;
            }
            Operation::Pop => {
                self.registers.get(a)?;
                let value = self.pop_byte(memory)?;
                self.registers.set(a, value)?;
            }
            Operation::Prn => {
                writeln!(output, "{}", self.registers.get(a)?)?;
                output.flush()?;
            }
            Operation::Pra => {
                write!(output, "{}", char::from(self.registers.get(a)?))?;
                output.flush()?;
            }
            Operation::Call => {
                let destination = self.registers.get(a)?;
                self.push_pc(memory, self.pc + instruction.length())?;
                self.pc = destination.into();
            }
            Operation::Ret => self.pc = self.pop_byte(memory)?.into(),
            Operation::Int => {
                let line = self.registers.get(a)?;
                self.raise_interrupt(line);
                self.pc += instruction.length();
            }
            Operation::Iret => self.return_from_interrupt(memory)?,
            Operation::Jmp => self.jump_if(instruction, a, true)?,
            Operation::Jeq => self.jump_if(instruction, a, is_bit_set(self.fl, FLAG_E))?,
            Operation::Jne => self.jump_if(instruction, a, !is_bit_set(self.fl, FLAG_E))?,
            Operation::Jgt => self.jump_if(instruction, a, is_bit_set(self.fl, FLAG_G))?,
            Operation::Jge => self.jump_if(instruction, a, self.fl & (FLAG_G | FLAG_E) != 0)?,
            Operation::Jlt => self.jump_if(instruction, a, is_bit_set(self.fl, FLAG_L))?,
            Operation::Jle => self.jump_if(instruction, a, self.fl & (FLAG_L | FLAG_E) != 0)?,
            Operation::Alu(op) => self.alu(op, a, b)?,
        }
        Ok(())
    }

    fn alu(&mut self, op: AluOp, reg_a: u8, reg_b: u8) -> Result<(), FaultKind> {
        let a = self.registers.get(reg_a)?;
        let b = if op.operand_count() == 2 {
            self.registers.get(reg_b)?
        } else {
            0
        };
        match alu::apply(op, a, b)? {
            AluResult::Value(value) => self.registers.set(reg_a, value)?,
            AluResult::Flags(flags) => self.fl = flags,
        }
        Ok(())
    }

    /// Jump to the address in `register` when `should_jump`, otherwise fall
    /// through to the next instruction.
    fn jump_if(
        &mut self,
        instruction: &Instruction,
        register: u8,
        should_jump: bool,
    ) -> Result<(), FaultKind> {
        let destination = self.registers.get(register)?;
        if should_jump {
            self.pc = destination.into();
        } else {
            self.pc += instruction.length();
        }
        Ok(())
    }

    fn push_byte<M: Memory>(&mut self, memory: &mut M, byte: u8) -> Result<(), FaultKind> {
        let sp = self.registers.sp().wrapping_sub(1);
        self.registers.set_sp(sp);
        memory.write_byte(sp.into(), byte)
    }

    fn pop_byte<M: Memory>(&mut self, memory: &mut M) -> Result<u8, FaultKind> {
        let sp = self.registers.sp();
        let result = memory.read_byte(sp.into())?;
        self.registers.set_sp(sp.wrapping_add(1));
        Ok(result)
    }

    /// Push an address. Return addresses have to fit in a byte like
    /// everything else on the stack.
    fn push_pc<M: Memory>(&mut self, memory: &mut M, pc: u16) -> Result<(), FaultKind> {
        let byte = u8::try_from(pc).map_err(|_| FaultKind::AddressOutOfRange { address: pc })?;
        self.push_byte(memory, byte)
    }

    fn service_interrupts<M: Memory>(&mut self, memory: &mut M, now: Instant) -> Result<(), FaultKind> {
        let Some(line) = self.interrupts.poll(&mut self.registers, now) else {
            return Ok(());
        };
        log::debug!("Servicing interrupt {line}, interrupted at ${:02X}", self.pc);
        self.push_pc(memory, self.pc)?;
        self.push_byte(memory, self.fl)?;
        for register in 0..SP {
            let value = self.registers.get(register)?;
            self.push_byte(memory, value)?;
        }
        self.pc = memory.read_byte(vector_address(line))?.into();
        Ok(())
    }

    /// Undo [`service_interrupts`](Cpu::service_interrupts). R6 comes back
    /// from the stack too, so lines raised during the handler are dropped.
    fn return_from_interrupt<M: Memory>(&mut self, memory: &mut M) -> Result<(), FaultKind> {
        for register in (0..SP).rev() {
            let value = self.pop_byte(memory)?;
            self.registers.set(register, value)?;
        }
        self.fl = self.pop_byte(memory)?;
        self.pc = self.pop_byte(memory)?.into();
        self.interrupts.finish(&mut self.registers, Instant::now());
        log::debug!("Returned from interrupt to ${:02X}", self.pc);
        Ok(())
    }

    // Ways to inspect the state of the CPU, for debugging and testing.
    pub fn get_pc(&self) -> u16 {
        self.pc
    }
    pub fn get_fl(&self) -> u8 {
        self.fl
    }
    pub fn get_register(&self, register: u8) -> Result<u8, FaultKind> {
        self.registers.get(register)
    }
    pub fn get_registers(&self) -> &Registers {
        &self.registers
    }
    pub fn get_state(&self) -> State {
        self.state
    }
    pub fn interrupt_state(&self) -> InterruptState {
        self.interrupts.state(&self.registers)
    }
    // No LS-8 program can do these, so we'll feature gate them.
    #[cfg(feature = "override-registers")]
    pub fn set_pc(&mut self, nu: u16) {
        self.pc = nu
    }
    #[cfg(feature = "override-registers")]
    pub fn set_fl(&mut self, nu: u8) {
        self.fl = nu
    }
    #[cfg(feature = "override-registers")]
    pub fn set_register(&mut self, register: u8, nu: u8) -> Result<(), FaultKind> {
        self.registers.set(register, nu)
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Cpu::new()
    }
}
