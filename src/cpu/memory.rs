//! Main memory.
//!
//! Eight text cells. Each cell holds an instruction (`"LOAD 5"`), a
//! decimal operand (`"10"`) or the empty marker `"-"`.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of memory cells.
pub const MEMORY_SIZE: usize = 8;

/// Marker stored in cells that hold nothing.
pub const EMPTY_CELL: &str = "-";

/// The built-in program: ACC := [5] + [6]; [7] := ACC.
pub const INITIAL_PROGRAM: [&str; MEMORY_SIZE] = [
    "LOAD 5",  // 0
    "ADD 6",   // 1
    "STORE 7", // 2
    "HALT",    // 3
    EMPTY_CELL,
    "10", // 5
    "5",  // 6
    "0",  // 7: result
];

/// Memory: 8 text cells.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    cells: Vec<String>,
}

impl Memory {
    /// Create a memory holding the built-in program.
    pub fn new() -> Self {
        Self::from_cells(INITIAL_PROGRAM)
    }

    /// Create a memory from explicit cell contents.
    pub fn from_cells(cells: [&str; MEMORY_SIZE]) -> Self {
        Self {
            cells: cells.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Read a cell by address (0-7).
    pub fn read(&self, addr: usize) -> Result<&str, MemoryError> {
        self.cells
            .get(addr)
            .map(String::as_str)
            .ok_or(MemoryError::AddressOutOfRange(addr))
    }

    /// Write a cell by address (0-7).
    pub fn write(&mut self, addr: usize, value: impl Into<String>) -> Result<(), MemoryError> {
        let cell = self
            .cells
            .get_mut(addr)
            .ok_or(MemoryError::AddressOutOfRange(addr))?;
        *cell = value.into();
        Ok(())
    }

    /// Check whether an address is inside memory.
    #[inline]
    pub fn contains(&self, addr: usize) -> bool {
        addr < self.cells.len()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in address order.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Dump memory contents (for tracing).
    pub fn dump(&self) -> Vec<(usize, &str)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.as_str()))
            .collect()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.cells.iter()).finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Address is outside valid memory range.
    #[error("memory address {0} out of range (0-{max})", max = MEMORY_SIZE - 1)]
    AddressOutOfRange(usize),
}
