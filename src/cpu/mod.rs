//! CPU model for the Von Neumann visualizer.
//!
//! This module implements the simplified machine:
//! - 8 text memory cells holding a fixed LOAD/ADD/STORE/HALT program
//! - 5 registers: PC, MAR, MDR, CIR, ACC
//! - a micro-step catalogue and the engine that walks through it

pub mod memory;
pub mod registers;
pub mod decode;
pub mod step;
pub mod bus;
pub mod execute;
pub mod engine;

pub use memory::{Memory, MemoryError};
pub use registers::Registers;
pub use decode::{Instruction, Opcode, DecodeError};
pub use step::{Phase, Step};
pub use bus::{BusEvent, BusKind, BusEndpoint, ComponentId};
pub use execute::{Fault, Machine, Transition, transition};
pub use engine::{Snapshot, StepEngine};
