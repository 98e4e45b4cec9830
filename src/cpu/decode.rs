//! Instruction decoder.
//!
//! Instructions are plain text: an opcode mnemonic optionally followed by a
//! single whitespace-separated decimal operand, e.g. `"LOAD 5"` or `"HALT"`.
//! Opcodes are matched case-sensitively as a prefix of the instruction
//! text, checked in the order LOAD, ADD, STORE, HALT.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The four supported operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// ACC := [addr]
    Load,
    /// ACC := ACC + [addr]
    Add,
    /// [addr] := ACC
    Store,
    /// Stop execution
    Halt,
}

impl Opcode {
    /// All opcodes, in decode priority order.
    pub const ALL: [Opcode; 4] = [Opcode::Load, Opcode::Add, Opcode::Store, Opcode::Halt];

    /// Assembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Load => "LOAD",
            Opcode::Add => "ADD",
            Opcode::Store => "STORE",
            Opcode::Halt => "HALT",
        }
    }

    /// Whether the instruction carries an address operand.
    pub fn takes_operand(self) -> bool {
        !matches!(self, Opcode::Halt)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A fully decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    /// Address operand (always 0 for HALT).
    pub operand: usize,
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.opcode.takes_operand() {
            write!(f, "{} {}", self.opcode, self.operand)
        } else {
            write!(f, "{}", self.opcode)
        }
    }
}

/// Errors that can occur while decoding an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown opcode in {0:?}")]
    UnknownOpcode(String),

    #[error("invalid operand {token:?} in {instruction:?}")]
    InvalidOperand { instruction: String, token: String },

    #[error("missing operand in {0:?}")]
    MissingOperand(String),
}

/// Determine the opcode of an instruction by prefix match.
pub fn decode_opcode(text: &str) -> Result<Opcode, DecodeError> {
    Opcode::ALL
        .into_iter()
        .find(|op| text.starts_with(op.mnemonic()))
        .ok_or_else(|| DecodeError::UnknownOpcode(text.to_string()))
}

/// Parse the address operand: the token following the opcode.
pub fn parse_operand(text: &str) -> Result<usize, DecodeError> {
    let token = text
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| DecodeError::MissingOperand(text.to_string()))?;

    token.parse::<usize>().map_err(|_| DecodeError::InvalidOperand {
        instruction: text.to_string(),
        token: token.to_string(),
    })
}

/// Decode an instruction strictly: unknown opcodes and bad operands are errors.
pub fn decode(text: &str) -> Result<Instruction, DecodeError> {
    let opcode = decode_opcode(text)?;
    let operand = if opcode.takes_operand() {
        parse_operand(text)?
    } else {
        0
    };
    Ok(Instruction { opcode, operand })
}
