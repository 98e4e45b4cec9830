//! Engine configuration.
//!
//! Settings can come from a JSON file and be overridden on the command line:
//!
//! ```json
//! { "transition_ticks": 2, "tick_ms": 500 }
//! ```

use serde::{Serialize, Deserialize};
use std::path::Path;
use thiserror::Error;

/// Pacing of the step animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Animation ticks per hop of a step. 0 completes steps immediately.
    pub transition_ticks: u32,
    /// Wall-clock length of one tick, used by interactive front ends.
    pub tick_ms: u64,
}

impl EngineConfig {
    pub const DEFAULT_TICKS: u32 = 2;
    pub const DEFAULT_TICK_MS: u64 = 500;

    /// Steps complete as soon as they are performed.
    pub const fn instant() -> Self {
        Self {
            transition_ticks: 0,
            tick_ms: Self::DEFAULT_TICK_MS,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            transition_ticks: Self::DEFAULT_TICKS,
            tick_ms: Self::DEFAULT_TICK_MS,
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(String),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tick_ms must be greater than zero")]
    ZeroTickInterval,
}
