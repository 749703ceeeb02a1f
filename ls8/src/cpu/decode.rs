//! Opcode decoding.
//!
//! An opcode is laid out as `AABCDDDD`:
//!
//! - `AA`: how many operand bytes follow the opcode (0, 1 or 2)
//! - `B`: the instruction is handled by the ALU
//! - `C`: the instruction sets the PC itself
//! - `DDDD`: instruction identifier (for the ALU, the operation selector)

use super::alu::AluOp;
use crate::{registers::is_bit_set, FaultKind};

const OPERAND_COUNT_SHIFT: u8 = 6;
pub const ALU_BIT: u8 = 0b_0010_0000;
pub const SETS_PC_BIT: u8 = 0b_0001_0000;
const ALU_SELECTOR_MASK: u8 = 0b_0000_1111;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Nop,
    Hlt,
    Ldi,
    Ld,
    St,
    Push,
    Pop,
    Prn,
    Pra,
    Call,
    Ret,
    Int,
    Iret,
    Jmp,
    Jeq,
    Jne,
    Jgt,
    Jge,
    Jlt,
    Jle,
    Alu(AluOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u8,
    pub operand_count: u8,
    pub handled_by_alu: bool,
    pub sets_pc_directly: bool,
    pub operation: Operation,
}

impl Instruction {
    /// Size of the whole instruction in bytes, opcode included.
    pub fn length(&self) -> u16 {
        1 + u16::from(self.operand_count)
    }
}

pub fn operand_count(opcode: u8) -> u8 {
    opcode >> OPERAND_COUNT_SHIFT
}
pub fn handled_by_alu(opcode: u8) -> bool {
    is_bit_set(opcode, ALU_BIT)
}
pub fn sets_pc_directly(opcode: u8) -> bool {
    is_bit_set(opcode, SETS_PC_BIT)
}

pub fn decode(opcode: u8) -> Result<Instruction, FaultKind> {
    let unknown = FaultKind::UnknownInstruction { opcode };
    let operand_count = operand_count(opcode);
    let handled_by_alu = handled_by_alu(opcode);
    let sets_pc_directly = sets_pc_directly(opcode);
    if operand_count > 2 {
        return Err(unknown);
    }
    let operation = if handled_by_alu {
        let op = AluOp::from_selector(opcode & ALU_SELECTOR_MASK)?;
        // The ALU never moves the PC, and every operation has one fixed shape.
        if sets_pc_directly || op.operand_count() != operand_count {
            return Err(unknown);
        }
        Operation::Alu(op)
    } else {
        match opcode {
            // NOP
            // No OPeration
            0b_0000_0000 => Operation::Nop,
            // HLT
            // HaLT the machine
            0b_0000_0001 => Operation::Hlt,
            // RET
            // RETurn from subroutine
            0b_0001_0001 => Operation::Ret,
            // IRET
            // Interrupt RETurn
            0b_0001_0011 => Operation::Iret,
            // PUSH r
            0b_0100_0101 => Operation::Push,
            // POP r
            0b_0100_0110 => Operation::Pop,
            // PRN r
            // PRint Number (decimal)
            0b_0100_0111 => Operation::Prn,
            // PRA r
            // PRint Alpha (character)
            0b_0100_1000 => Operation::Pra,
            // CALL r
            0b_0101_0000 => Operation::Call,
            // INT r
            // raise INTerrupt number r
            0b_0101_0010 => Operation::Int,
            // JMP r
            0b_0101_0100 => Operation::Jmp,
            // JEQ r
            // Jump if EQual
            0b_0101_0101 => Operation::Jeq,
            // JNE r
            // Jump if Not Equal
            0b_0101_0110 => Operation::Jne,
            // JGT r
            // Jump if Greater Than
            0b_0101_0111 => Operation::Jgt,
            // JLT r
            // Jump if Less Than
            0b_0101_1000 => Operation::Jlt,
            // JLE r
            // Jump if Less than or Equal
            0b_0101_1001 => Operation::Jle,
            // JGE r
            // Jump if Greater than or Equal
            0b_0101_1010 => Operation::Jge,
            // LDI r,imm
            // LoaD Immediate
            0b_1000_0010 => Operation::Ldi,
            // LD a,b
            // LoaD a from the address in b
            0b_1000_0011 => Operation::Ld,
            // ST a,b
            // STore b at the address in a
            0b_1000_0100 => Operation::St,
            _ => return Err(unknown),
        }
    };
    Ok(Instruction {
        opcode,
        operand_count,
        handled_by_alu,
        sets_pc_directly,
        operation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_come_from_the_high_bits() {
        let ldi = decode(0b_1000_0010).unwrap();
        assert_eq!(ldi.operand_count, 2);
        assert!(!ldi.handled_by_alu);
        assert!(!ldi.sets_pc_directly);
        assert_eq!(ldi.length(), 3);

        let call = decode(0b_0101_0000).unwrap();
        assert_eq!(call.operation, Operation::Call);
        assert_eq!(call.operand_count, 1);
        assert!(call.sets_pc_directly);

        let hlt = decode(0b_0000_0001).unwrap();
        assert_eq!(hlt.operand_count, 0);
        assert_eq!(hlt.length(), 1);
    }

    #[test]
    fn every_control_transfer_sets_the_pc() {
        for opcode in [
            0b_0101_0000,
            0b_0001_0001,
            0b_0001_0011,
            0b_0101_0010,
            0b_0101_0100,
            0b_0101_0101,
            0b_0101_0110,
            0b_0101_0111,
            0b_0101_1000,
            0b_0101_1001,
            0b_0101_1010,
        ] {
            assert!(decode(opcode).unwrap().sets_pc_directly, "{opcode:08b}");
        }
    }

    #[test]
    fn alu_opcodes_resolve_their_operation() {
        let table = [
            (0b_1010_0000, AluOp::Add),
            (0b_1010_0001, AluOp::Sub),
            (0b_1010_0010, AluOp::Mul),
            (0b_1010_0011, AluOp::Div),
            (0b_1010_0100, AluOp::Mod),
            (0b_0110_0101, AluOp::Inc),
            (0b_0110_0110, AluOp::Dec),
            (0b_1010_0111, AluOp::Cmp),
            (0b_1010_1000, AluOp::And),
            (0b_0110_1001, AluOp::Not),
            (0b_1010_1010, AluOp::Or),
            (0b_1010_1011, AluOp::Xor),
            (0b_1010_1100, AluOp::Shl),
            (0b_1010_1101, AluOp::Shr),
        ];
        for (opcode, op) in table {
            let instruction = decode(opcode).unwrap();
            assert!(instruction.handled_by_alu);
            assert_eq!(instruction.operation, Operation::Alu(op));
        }
    }

    #[test]
    fn unregistered_opcodes_are_unknown() {
        for opcode in [0b_0000_0010, 0b_1111_1111, 0b_1000_0000, 0b_0110_0000] {
            assert!(
                matches!(decode(opcode), Err(FaultKind::UnknownInstruction { opcode: o }) if o == opcode),
                "{opcode:08b}"
            );
        }
    }

    #[test]
    fn alu_selector_outside_the_table_is_unsupported() {
        assert!(matches!(
            decode(0b_1010_1110),
            Err(FaultKind::UnsupportedOperation { selector: 0xE })
        ));
    }
}
