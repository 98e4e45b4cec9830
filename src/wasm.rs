//! WebAssembly bindings for the web page front end.
//!
//! This module provides JavaScript-friendly wrappers around the step engine.
//! The page calls `advance()` from its "Next Step" button and `tick()` from
//! an interval timer, then re-reads the registers or `snapshot_json()`.

use wasm_bindgen::prelude::*;
use crate::{EngineConfig, StepEngine, Step};
use crate::labels;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly engine wrapper.
#[wasm_bindgen]
pub struct WasmStepEngine {
    engine: StepEngine,
}

#[wasm_bindgen]
impl WasmStepEngine {
    /// Create an engine with default pacing.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: StepEngine::new(),
        }
    }

    /// Create an engine from a JSON config string.
    #[wasm_bindgen]
    pub fn with_config(json: &str) -> Result<WasmStepEngine, JsError> {
        let config = EngineConfig::from_json(json)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        Ok(Self {
            engine: StepEngine::with_config(config),
        })
    }

    /// Perform the next micro-step. Returns false if halted or busy.
    #[wasm_bindgen]
    pub fn advance(&mut self) -> bool {
        self.engine.advance()
    }

    /// One animation tick. Returns true when the pending step completed.
    #[wasm_bindgen]
    pub fn tick(&mut self) -> bool {
        self.engine.tick()
    }

    #[wasm_bindgen]
    pub fn settle(&mut self) {
        self.engine.settle();
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.engine.reset();
    }

    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.engine.is_halted()
    }

    #[wasm_bindgen]
    pub fn is_busy(&self) -> bool {
        self.engine.is_busy()
    }

    /// Milliseconds per animation tick.
    #[wasm_bindgen]
    pub fn tick_ms(&self) -> u32 {
        self.engine.config().tick_ms.min(u32::MAX as u64) as u32
    }

    /// Current step identifier.
    #[wasm_bindgen]
    pub fn step(&self) -> String {
        self.engine.step().id().to_string()
    }

    #[wasm_bindgen]
    pub fn pc(&self) -> u32 {
        self.engine.registers().pc as u32
    }

    /// MAR, or undefined when empty.
    #[wasm_bindgen]
    pub fn mar(&self) -> Option<u32> {
        self.engine.registers().mar.map(|m| m as u32)
    }

    #[wasm_bindgen]
    pub fn mdr(&self) -> Option<String> {
        self.engine.registers().mdr.clone()
    }

    #[wasm_bindgen]
    pub fn cir(&self) -> Option<String> {
        self.engine.registers().cir.clone()
    }

    #[wasm_bindgen]
    pub fn acc(&self) -> f64 {
        self.engine.registers().acc as f64
    }

    /// Memory cells as a JS array of strings.
    #[wasm_bindgen]
    pub fn memory_cells(&self) -> js_sys::Array {
        self.engine
            .memory()
            .cells()
            .iter()
            .map(|cell| JsValue::from_str(cell))
            .collect()
    }

    /// Progress through the busy window, 0 to 1.
    #[wasm_bindgen]
    pub fn progress(&self) -> f32 {
        self.engine.progress()
    }

    /// Full snapshot as JSON.
    #[wasm_bindgen]
    pub fn snapshot_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.engine.snapshot())
            .map_err(|e| JsError::new(&format!("{}", e)))
    }
}

impl Default for WasmStepEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Phase name for a step identifier.
#[wasm_bindgen]
pub fn describe_phase(step: &str) -> String {
    labels::describe_phase(step).to_string()
}

/// One-line description for a step identifier.
#[wasm_bindgen]
pub fn describe_step(step: &str) -> String {
    labels::describe_step(step).to_string()
}

/// Long explanation for a step identifier.
#[wasm_bindgen]
pub fn explain_step(step: &str) -> String {
    labels::explain_step(step).to_string()
}

/// All step identifiers in cycle order.
#[wasm_bindgen]
pub fn step_ids() -> js_sys::Array {
    Step::ALL.iter().map(|s| JsValue::from_str(s.id())).collect()
}
