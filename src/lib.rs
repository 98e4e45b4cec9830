//! # Von Neumann Stepper
//!
//! An interactive, step-by-step visualization of the fetch-decode-execute
//! cycle of a simplified Von Neumann CPU.
//!
//! The machine runs one fixed program (`LOAD 5; ADD 6; STORE 7; HALT`)
//! one micro-step at a time so that every register transfer and bus
//! movement can be watched. The [`StepEngine`] is the only stateful part;
//! the terminal UI and the WebAssembly bindings just render its snapshots.

pub mod cpu;
pub mod config;
pub mod labels;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use cpu::{StepEngine, Snapshot, Step, Phase, BusEvent, BusKind, ComponentId, Fault, Memory, Registers};
pub use config::{EngineConfig, ConfigError};
pub use labels::{describe_phase, describe_step, explain_step};

#[cfg(feature = "tui")]
pub use tui::run_visualizer;
