//! The step engine.
//!
//! [`StepEngine`] owns one machine and walks it through the micro-step
//! catalogue, one `advance()` at a time. After each step (except halt) the
//! engine stays busy for `transition_ticks` animation ticks per hop of the
//! step so the viewer can follow the transfer; `advance()` is ignored until
//! then.

use crate::config::EngineConfig;
use crate::cpu::{Memory, Registers};
use crate::cpu::bus::{BusEvent, ComponentId};
use crate::cpu::execute::{self, Fault, Machine};
use crate::cpu::step::{Phase, Step};
use log::{debug, info, warn};
use serde::Serialize;

/// Read-only view of the engine for rendering layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub registers: Registers,
    pub memory: Vec<String>,
    pub step: Step,
    pub phase: Phase,
    pub bus: Option<BusEvent>,
    pub highlights: Vec<ComponentId>,
    pub halted: bool,
    pub busy: bool,
    pub fault: Option<String>,
}

/// Fetch-decode-execute sequencer for a single simulation session.
#[derive(Debug, Clone)]
pub struct StepEngine {
    machine: Machine,
    /// Memory image restored by `reset()`.
    program: Memory,
    config: EngineConfig,
    step: Step,
    /// Step the pointer moves to once the busy window ends.
    pending: Option<Step>,
    busy_ticks: u32,
    /// Length of the current busy window in ticks.
    window: u32,
    halted: bool,
    bus: Option<BusEvent>,
    highlights: Vec<ComponentId>,
    fault: Option<Fault>,
    /// Micro-steps performed since the last reset.
    steps: u64,
}

impl StepEngine {
    /// Engine running the built-in program with default pacing.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_program(Memory::new(), config)
    }

    /// Engine running a custom memory image.
    pub fn with_program(program: Memory, config: EngineConfig) -> Self {
        Self {
            machine: Machine::with_memory(program.clone()),
            program,
            config,
            step: Step::FIRST,
            pending: None,
            busy_ticks: 0,
            window: 0,
            halted: false,
            bus: None,
            highlights: Vec::new(),
            fault: None,
            steps: 0,
        }
    }

    /// Perform the current micro-step.
    ///
    /// Returns `false` without touching anything when the engine is halted
    /// or still busy with the previous step.
    pub fn advance(&mut self) -> bool {
        if self.halted || self.is_busy() {
            return false;
        }

        let t = execute::execute(&mut self.machine, self.step);
        self.steps += 1;

        debug!(
            "{} -> {} pc={} mar={} mdr={} cir={} acc={}",
            t.step,
            t.next,
            self.machine.regs.pc,
            self.machine.regs.mar_text(),
            self.machine.regs.mdr_text(),
            self.machine.regs.cir_text(),
            self.machine.regs.acc,
        );
        if let Some(fault) = &t.fault {
            warn!("{}: {}", t.step, fault);
        }

        self.bus = t.bus;
        self.highlights = t.highlights;
        if t.fault.is_some() {
            self.fault = t.fault;
        }

        if t.halted {
            info!("halted after {} steps, acc={}", self.steps, self.machine.regs.acc);
            self.halted = true;
            self.step = t.next;
            return true;
        }

        let window = self.config.transition_ticks.saturating_mul(t.step.hops());
        if window == 0 {
            self.step = t.next;
        } else {
            self.pending = Some(t.next);
            self.busy_ticks = window;
            self.window = window;
        }
        true
    }

    /// Count down one animation tick. Returns `true` when this tick
    /// completed the pending step.
    pub fn tick(&mut self) -> bool {
        if self.busy_ticks == 0 {
            return false;
        }
        self.busy_ticks -= 1;
        if self.busy_ticks == 0 {
            self.complete();
            return true;
        }
        false
    }

    /// Finish the pending step immediately.
    pub fn settle(&mut self) {
        if self.is_busy() {
            self.busy_ticks = 0;
            self.complete();
        }
    }

    fn complete(&mut self) {
        if let Some(next) = self.pending.take() {
            self.step = next;
        }
    }

    /// Back to the initial program with zeroed registers. Any pending
    /// step completion is dropped.
    pub fn reset(&mut self) {
        self.machine.regs.reset();
        self.machine.mem = self.program.clone();
        self.step = Step::FIRST;
        self.pending = None;
        self.busy_ticks = 0;
        self.window = 0;
        self.halted = false;
        self.bus = None;
        self.highlights.clear();
        self.fault = None;
        self.steps = 0;
        info!("reset");
    }

    /// Advance and settle until halted or `max_steps` is reached.
    ///
    /// Returns the number of steps performed.
    pub fn run_to_halt(&mut self, max_steps: u64) -> u64 {
        let start = self.steps;
        self.settle();
        while !self.halted && self.steps - start < max_steps {
            self.advance();
            self.settle();
        }
        self.steps - start
    }

    // ==================== Observers ====================

    /// The step being performed while busy, otherwise the next one to perform.
    pub fn step(&self) -> Step {
        self.step
    }

    pub fn registers(&self) -> &Registers {
        &self.machine.regs
    }

    pub fn memory(&self) -> &Memory {
        &self.machine.mem
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bus_event(&self) -> Option<&BusEvent> {
        self.bus.as_ref()
    }

    pub fn highlights(&self) -> &[ComponentId] {
        &self.highlights
    }

    /// The highlight to show at this point of the busy window, one per hop.
    pub fn active_highlight(&self) -> Option<ComponentId> {
        let last = self.highlights.len().checked_sub(1)?;
        let index = if self.is_busy() {
            let elapsed = self.window - self.busy_ticks;
            let hop = elapsed / self.config.transition_ticks.max(1);
            (hop as usize).min(last)
        } else {
            last
        };
        self.highlights.get(index).copied()
    }

    /// Most recent fault since the last reset.
    pub fn last_fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_busy(&self) -> bool {
        self.busy_ticks > 0
    }

    /// How far through the busy window we are, from 0.0 to 1.0.
    pub fn progress(&self) -> f32 {
        if !self.is_busy() || self.window == 0 {
            return 1.0;
        }
        let total = self.window as f32;
        (total - self.busy_ticks as f32) / total
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            registers: self.machine.regs.clone(),
            memory: self.machine.mem.cells().to_vec(),
            step: self.step,
            phase: self.step.phase(),
            bus: self.bus,
            highlights: self.highlights.clone(),
            halted: self.halted,
            busy: self.is_busy(),
            fault: self.fault.as_ref().map(|f| f.to_string()),
        }
    }
}

impl Default for StepEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::bus::BusKind;
    use crate::cpu::memory::MEMORY_SIZE;
    use crate::cpu::MemoryError;
    use proptest::prelude::*;

    fn instant() -> StepEngine {
        StepEngine::with_config(EngineConfig::instant())
    }

    fn advance_n(engine: &mut StepEngine, n: usize) {
        for _ in 0..n {
            assert!(engine.advance(), "advance refused at {}", engine.step());
        }
    }

    #[test]
    fn test_fetch_phase_scenario() {
        let mut engine = instant();
        advance_n(&mut engine, 5);

        let regs = engine.registers();
        assert_eq!(regs.mar, Some(0));
        assert_eq!(regs.mdr.as_deref(), Some("LOAD 5"));
        assert_eq!(regs.cir.as_deref(), Some("LOAD 5"));
        assert_eq!(regs.pc, 1);
        assert_eq!(engine.step(), Step::Decode);
    }

    #[test]
    fn test_full_program_scenario() {
        let mut engine = instant();

        // LOAD 5: fetch, decode, 4 execute steps
        advance_n(&mut engine, 10);
        assert_eq!(engine.registers().acc, 10);
        assert_eq!(engine.step(), Step::FetchPcToMar);

        // ADD 6
        advance_n(&mut engine, 10);
        assert_eq!(engine.registers().acc, 15);

        // STORE 7
        advance_n(&mut engine, 10);
        assert_eq!(engine.memory().read(7).unwrap(), "15");
        assert!(!engine.is_halted());

        // HALT: fetch, decode, halt
        advance_n(&mut engine, 7);
        assert!(engine.is_halted());
        assert_eq!(engine.step(), Step::ExecuteHalt);
        assert_eq!(engine.registers().pc, 4);
        assert_eq!(engine.registers().acc, 15);

        let before = engine.snapshot();
        for _ in 0..5 {
            assert!(!engine.advance());
        }
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn test_pc_trace() {
        let mut engine = instant();
        let mut trace = Vec::new();
        while !engine.is_halted() {
            let step = engine.step();
            let pc_before = engine.registers().pc;
            engine.advance();
            let pc_after = engine.registers().pc;
            if step == Step::FetchIncrementPc {
                assert_eq!(pc_after, pc_before + 1);
            } else {
                assert_eq!(pc_after, pc_before, "pc changed during {}", step);
            }
            trace.push(pc_after);
        }
        assert_eq!(&trace[..7], &[0, 0, 0, 0, 1, 1, 1]);
        assert_eq!(engine.steps(), 37);
    }

    #[test]
    fn test_bus_events_table() {
        let mut engine = instant();
        while !engine.is_halted() {
            let step = engine.step();
            engine.advance();
            let bus = engine.bus_event().copied();
            match step {
                Step::FetchMarToRam | Step::ExecuteLoad2 | Step::ExecuteAdd2 | Step::ExecuteStore3 => {
                    let bus = bus.unwrap();
                    assert_eq!(bus.kind, BusKind::Address);
                    assert_eq!(bus.source, ComponentId::Registers);
                    assert_eq!(bus.destination, ComponentId::Ram);
                }
                Step::FetchRamToMdr | Step::ExecuteLoad3 | Step::ExecuteAdd3 => {
                    let bus = bus.unwrap();
                    assert_eq!(bus.kind, BusKind::Data);
                    assert_eq!(bus.source, ComponentId::Ram);
                    assert_eq!(bus.destination, ComponentId::Registers);
                }
                Step::ExecuteStore4 => {
                    let bus = bus.unwrap();
                    assert_eq!(bus.kind, BusKind::Data);
                    assert_eq!(bus.source, ComponentId::Registers);
                    assert_eq!(bus.destination, ComponentId::Ram);
                }
                Step::ExecuteLoad4 | Step::ExecuteAdd4 => {
                    let bus = bus.unwrap();
                    assert_eq!(bus.kind, BusKind::Control);
                    assert_eq!(bus.destination, ComponentId::Alu);
                }
                _ => assert_eq!(bus, None, "unexpected bus event during {}", step),
            }
        }
    }

    #[test]
    fn test_busy_window() {
        let mut engine = StepEngine::with_config(EngineConfig {
            transition_ticks: 2,
            tick_ms: 10,
        });

        assert!(engine.advance());
        assert!(engine.is_busy());
        assert_eq!(engine.step(), Step::FetchPcToMar);
        assert_eq!(engine.active_highlight(), Some(ComponentId::Pc));

        // Double click while busy is ignored
        assert!(!engine.advance());
        assert_eq!(engine.registers().mar, Some(0));

        // Two hops: PC for the first two ticks, MAR for the last two
        assert!(!engine.tick());
        assert_eq!(engine.active_highlight(), Some(ComponentId::Pc));
        assert!(!engine.tick());
        assert_eq!(engine.active_highlight(), Some(ComponentId::Mar));
        assert!((engine.progress() - 0.5).abs() < f32::EPSILON);
        assert!(!engine.tick());
        assert!(engine.tick());
        assert!(!engine.is_busy());
        assert_eq!(engine.step(), Step::FetchMarToRam);

        // Single-hop step
        assert!(engine.advance());
        assert!(engine.bus_event().is_some());
        assert!(!engine.tick());
        assert!(engine.tick());
        assert_eq!(engine.step(), Step::FetchRamToMdr);

        assert!(engine.advance());
        engine.settle();
        assert_eq!(engine.step(), Step::FetchMdrToCir);
    }

    #[test]
    fn test_halt_is_never_busy() {
        let mut engine = StepEngine::new();
        engine.run_to_halt(100);
        assert!(engine.is_halted());
        assert!(!engine.is_busy());
        assert_eq!(engine.memory().read(7).unwrap(), "15");
    }

    #[test]
    fn test_reset_cancels_pending_step() {
        let mut engine = StepEngine::new();
        engine.advance();
        assert!(engine.is_busy());

        engine.reset();
        assert!(!engine.is_busy());
        assert!(!engine.tick());
        assert_eq!(engine.step(), Step::FIRST);
        assert_eq!(engine.snapshot(), StepEngine::new().snapshot());
    }

    #[test]
    fn test_reset_after_store_restores_memory() {
        let mut engine = instant();
        engine.run_to_halt(1000);
        assert_eq!(engine.memory().read(7).unwrap(), "15");

        engine.reset();
        assert_eq!(engine.memory().read(7).unwrap(), "0");
        assert_eq!(engine.snapshot(), instant().snapshot());
    }

    #[test]
    fn test_malformed_program_halts() {
        let program = Memory::from_cells(["LOAD x", "JUMP 0", "-", "-", "-", "-", "-", "-"]);
        let mut engine = StepEngine::with_program(program, EngineConfig::instant());

        // LOAD x falls back to address 0 and reads its own text as data
        advance_n(&mut engine, 7);
        assert_eq!(engine.registers().mar, Some(0));
        assert!(matches!(
            engine.last_fault(),
            Some(Fault::Decode(crate::cpu::DecodeError::InvalidOperand { .. }))
        ));

        advance_n(&mut engine, 3);
        assert_eq!(engine.registers().acc, 0);
        assert_eq!(engine.last_fault(), Some(&Fault::NonNumericData("LOAD x".into())));

        engine.run_to_halt(100);
        assert!(engine.is_halted());
        assert_eq!(engine.registers().pc, 2);
        assert!(engine.snapshot().fault.unwrap().contains("unknown opcode"));
    }

    #[test]
    fn test_pc_past_memory_wraps_to_zero() {
        // No HALT: the PC walks off the end after cell 7
        let program = Memory::from_cells(["STORE 0"; MEMORY_SIZE]);
        let mut engine = StepEngine::with_program(program, EngineConfig::instant());

        advance_n(&mut engine, 10 * MEMORY_SIZE);
        assert_eq!(engine.registers().pc, MEMORY_SIZE);
        assert_eq!(engine.last_fault(), None);

        assert_eq!(engine.step(), Step::FetchPcToMar);
        advance_n(&mut engine, 1);
        let out_of_range = Fault::Memory(MemoryError::AddressOutOfRange(MEMORY_SIZE));
        assert_eq!(engine.registers().mar, Some(0));
        assert_eq!(engine.last_fault(), Some(&out_of_range));

        // Later steps without a fault leave it in place
        advance_n(&mut engine, 2);
        assert_eq!(engine.registers().mdr.as_deref(), Some("0"));
        assert_eq!(engine.last_fault(), Some(&out_of_range));

        engine.reset();
        assert_eq!(engine.last_fault(), None);
    }

    #[test]
    fn test_snapshot_json() {
        let engine = instant();
        let json = serde_json::to_value(engine.snapshot()).unwrap();
        assert_eq!(json["step"], "fetch-pc-to-mar");
        assert_eq!(json["phase"], "Fetch");
        assert_eq!(json["memory"].as_array().unwrap().len(), MEMORY_SIZE);
        assert_eq!(json["registers"]["mar"], serde_json::Value::Null);
        assert_eq!(json["bus"], serde_json::Value::Null);
    }

    #[derive(Debug, Clone)]
    enum Action {
        Advance,
        Tick,
        Settle,
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![Just(Action::Advance), Just(Action::Tick), Just(Action::Settle)]
    }

    proptest! {
        #[test]
        fn prop_reset_restores_initial(actions in prop::collection::vec(action(), 0..120)) {
            let mut engine = StepEngine::new();
            for a in actions {
                match a {
                    Action::Advance => { engine.advance(); }
                    Action::Tick => { engine.tick(); }
                    Action::Settle => engine.settle(),
                }
            }
            engine.reset();
            prop_assert_eq!(engine.snapshot(), StepEngine::new().snapshot());
        }

        #[test]
        fn prop_halted_engine_ignores_input(actions in prop::collection::vec(action(), 0..50)) {
            let mut engine = StepEngine::new();
            engine.run_to_halt(1000);
            let before = engine.snapshot();
            for a in actions {
                match a {
                    Action::Advance => { engine.advance(); }
                    Action::Tick => { engine.tick(); }
                    Action::Settle => engine.settle(),
                }
            }
            prop_assert_eq!(engine.snapshot(), before);
        }
    }
}
