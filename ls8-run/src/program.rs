use anyhow::{bail, Context, Result};
use log::*;
use ls8::MEMORY_SIZE;
use std::fs;

/// Prints 8. Run when we're not given a program.
const FALLBACK: &[u8] = &[
    0b1000_0010, // LDI R0,8
    0b0000_0000,
    0b0000_1000,
    0b0100_0111, // PRN R0
    0b0000_0000,
    0b0000_0001, // HLT
];

/// A program image: the bytes that go into RAM, starting at address 0.
pub struct Program {
    pub bytes: Vec<u8>,
}

impl Program {
    pub fn from_path(path: &str) -> Result<Program> {
        info!("Attempting to open path: '{path}'");
        let source =
            fs::read_to_string(path).with_context(|| format!("failed to read '{path}'"))?;
        let program = Program::parse(&source).with_context(|| format!("failed to load '{path}'"))?;
        info!("Program is {} bytes long", program.bytes.len());
        Ok(program)
    }

    pub fn fallback() -> Program {
        Program {
            bytes: FALLBACK.to_vec(),
        }
    }

    /// One byte per line, written as binary digits. Anything after a `#` is a
    /// comment, and lines with nothing else on them are skipped.
    pub fn parse(source: &str) -> Result<Program> {
        let mut bytes = Vec::new();
        for (index, line) in source.lines().enumerate() {
            let code = match line.split_once('#') {
                Some((code, _comment)) => code,
                None => line,
            };
            let Some(literal) = code.split_whitespace().next() else {
                continue;
            };
            if !literal.bytes().all(|digit| digit == b'0' || digit == b'1') {
                bail!("line {}: '{literal}' is not a binary number", index + 1);
            }
            let byte = u8::from_str_radix(literal, 2)
                .with_context(|| format!("line {}: '{literal}' does not fit in a byte", index + 1))?;
            bytes.push(byte);
        }
        if bytes.len() > MEMORY_SIZE {
            bail!(
                "program is {} bytes long, but there are only {MEMORY_SIZE} bytes of memory",
                bytes.len()
            );
        }
        Ok(Program { bytes })
    }
}
