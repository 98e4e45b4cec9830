//! CPU registers.
//!
//! The simplified machine has 5 registers:
//! - PC: program counter, address of the next instruction
//! - MAR: memory address register, address currently being accessed
//! - MDR: memory data register, data in transit between memory and CPU
//! - CIR: current instruction register
//! - ACC: accumulator, the only arithmetic register

use serde::{Serialize, Deserialize};

/// The register file.
///
/// MAR, MDR and CIR start out empty and are only filled in once the
/// first fetch touches them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// PC: address of the next instruction to fetch
    pub pc: usize,

    /// MAR: address on its way to RAM
    pub mar: Option<usize>,

    /// MDR: word read from or about to be written to RAM
    pub mdr: Option<String>,

    /// CIR: instruction being decoded/executed
    pub cir: Option<String>,

    /// ACC: accumulator
    pub acc: i64,
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self {
            pc: 0,
            mar: None,
            mdr: None,
            cir: None,
            acc: 0,
        }
    }

    /// Reset all registers to their power-on values.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Increment the program counter by 1.
    pub fn advance_pc(&mut self) {
        self.pc = self.pc.wrapping_add(1);
    }

    /// MAR as a memory index. An empty MAR addresses cell 0.
    pub fn mar_index(&self) -> usize {
        self.mar.unwrap_or(0)
    }

    /// Display helper: register contents or `-` when empty.
    pub fn mar_text(&self) -> String {
        self.mar.map(|m| m.to_string()).unwrap_or_else(|| "-".into())
    }

    pub fn mdr_text(&self) -> &str {
        self.mdr.as_deref().unwrap_or("-")
    }

    pub fn cir_text(&self) -> &str {
        self.cir.as_deref().unwrap_or("-")
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
