//! Terminal visualizer.
//!
//! Provides an interactive terminal front end with:
//! - Register and memory panels with the active element highlighted
//! - A bus lane animating address/data/control transfers
//! - Step banner and explanation
//! - Bus and register reference overlays

mod app;
mod ui;

pub use app::{VisualizerApp, Overlay, run_visualizer};
