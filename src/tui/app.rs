//! Visualizer application state and logic.

use crate::{EngineConfig, StepEngine};
use crate::labels;
use std::time::{Duration, Instant};

/// Reference text shown over the main view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Buses,
    Registers,
}

/// Visualizer application state.
pub struct VisualizerApp {
    /// The engine being visualized.
    pub engine: StepEngine,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    pub overlay: Overlay,
}

impl VisualizerApp {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            engine: StepEngine::with_config(config),
            should_quit: false,
            status: "Ready. Press 'n' for the next step, 'q' to quit.".into(),
            overlay: Overlay::None,
        }
    }

    /// Perform the next micro-step, if the engine accepts it.
    pub fn next_step(&mut self) {
        if self.engine.is_halted() {
            self.status = "Halted. Press 'x' to reset.".into();
            return;
        }

        let step = self.engine.step();
        if self.engine.advance() {
            self.status = labels::step_banner(step);
        }
    }

    /// One animation tick.
    pub fn tick(&mut self) {
        self.engine.tick();
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        self.status = "Reset. Ready.".into();
    }

    pub fn toggle_overlay(&mut self, overlay: Overlay) {
        self.overlay = if self.overlay == overlay { Overlay::None } else { overlay };
    }

    /// Label for the "next step" control.
    pub fn button_label(&self) -> &'static str {
        if self.engine.is_halted() {
            "Halted"
        } else if self.engine.is_busy() {
            "Executing..."
        } else {
            "Next Step"
        }
    }
}

/// Run the visualizer.
pub fn run_visualizer(config: EngineConfig) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let tick_rate = Duration::from_millis(config.tick_ms);
    let mut app = VisualizerApp::new(config);
    let mut last_tick = Instant::now();

    // Main loop
    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('n') | KeyCode::Char(' ') | KeyCode::Enter => app.next_step(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Char('b') => app.toggle_overlay(Overlay::Buses),
                        KeyCode::Char('g') => app.toggle_overlay(Overlay::Registers),
                        KeyCode::Esc => app.overlay = Overlay::None,
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Step;

    #[test]
    fn test_next_step_respects_busy() {
        let mut app = VisualizerApp::new(EngineConfig::default());
        app.next_step();
        assert_eq!(app.button_label(), "Executing...");
        assert!(app.status.starts_with("Fetch → "));

        app.next_step();
        assert_eq!(app.engine.steps(), 1);

        // fetch-pc-to-mar runs for two hops
        for _ in 0..4 {
            app.tick();
        }
        assert_eq!(app.button_label(), "Next Step");
        assert_eq!(app.engine.step(), Step::FetchMarToRam);
    }

    #[test]
    fn test_overlay_toggle() {
        let mut app = VisualizerApp::new(EngineConfig::instant());
        app.toggle_overlay(Overlay::Buses);
        assert_eq!(app.overlay, Overlay::Buses);
        app.toggle_overlay(Overlay::Registers);
        assert_eq!(app.overlay, Overlay::Registers);
        app.toggle_overlay(Overlay::Registers);
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn test_halt_then_reset() {
        let mut app = VisualizerApp::new(EngineConfig::instant());
        while !app.engine.is_halted() {
            app.next_step();
        }
        assert_eq!(app.button_label(), "Halted");
        app.next_step();
        assert!(app.status.starts_with("Halted"));

        app.reset();
        assert_eq!(app.engine.step(), Step::FIRST);
        assert_eq!(app.engine.memory().read(7).unwrap(), "0");
    }
}
