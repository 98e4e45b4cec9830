//! Micro-step execution.
//!
//! [`execute`] performs exactly one micro-step against a [`Machine`] and
//! reports what happened: the step that comes next, the bus transfer (if
//! any), which components to highlight and whether the machine halted.
//! Nothing here knows about timing or animation.

use crate::cpu::{Memory, Registers};
use crate::cpu::bus::{BusEvent, ComponentId};
use crate::cpu::decode::{self, DecodeError, Opcode};
use crate::cpu::memory::MemoryError;
use crate::cpu::step::Step;
use serde::{Serialize, Deserialize};
use thiserror::Error;

// Bus rationales shown next to the animated transfer.
const FETCH_ADDRESS: &str = "The address bus is carrying the memory address from MAR to RAM to specify which memory location to read from.";
const FETCH_DATA: &str = "The data bus is carrying the instruction data from the specified RAM location back to the Memory Data Register (MDR) in the CPU.";
const LOAD_ADDRESS: &str = "The address bus is carrying the memory address from MAR to RAM to specify which memory location to read the data from.";
const LOAD_DATA: &str = "The data bus is carrying the data value from RAM back to the Memory Data Register (MDR) in the CPU.";
const LOAD_CONTROL: &str = "The control bus is carrying control signals to load the value from MDR into the Accumulator (ACC) in the ALU.";
const ADD_ADDRESS: &str = "The address bus is carrying the memory address from MAR to RAM to specify which memory location to read the data from for addition.";
const ADD_DATA: &str = "The data bus is carrying the data value from RAM back to the Memory Data Register (MDR) in the CPU for the addition operation.";
const ADD_CONTROL: &str = "The control bus is carrying control signals to the ALU to add the value from MDR to the current value in the Accumulator (ACC).";
const STORE_ADDRESS: &str = "The address bus is carrying the memory address from MAR to RAM to specify which memory location to write the data to.";
const STORE_DATA: &str = "The data bus is carrying the data value from MDR to be stored at the specified RAM location.";

/// Registers plus memory: everything a micro-step may touch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub regs: Registers,
    pub mem: Memory,
}

impl Machine {
    /// A machine holding the built-in program with zeroed registers.
    pub fn new() -> Self {
        Self::with_memory(Memory::new())
    }

    pub fn with_memory(mem: Memory) -> Self {
        Self {
            regs: Registers::new(),
            mem,
        }
    }
}

/// Something went wrong inside a micro-step and a fallback value was used.
///
/// Faults never abort a step. They are reported so the caller can surface
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("non-numeric data {0:?} sent to the ALU")]
    NonNumericData(String),
}

/// Outcome of one micro-step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The step that was performed.
    pub step: Step,
    /// The step to perform next.
    pub next: Step,
    pub bus: Option<BusEvent>,
    /// Components to highlight, in order.
    pub highlights: Vec<ComponentId>,
    pub halted: bool,
    pub fault: Option<Fault>,
}

impl Transition {
    fn new(step: Step, next: Step) -> Self {
        Self {
            step,
            next,
            bus: None,
            highlights: Vec::new(),
            halted: false,
            fault: None,
        }
    }

    fn bus(mut self, event: BusEvent) -> Self {
        self.bus = Some(event);
        self
    }

    fn highlight(mut self, component: ComponentId) -> Self {
        self.highlights.push(component);
        self
    }

    fn fault(mut self, fault: Option<Fault>) -> Self {
        self.fault = fault;
        self
    }
}

/// Perform `step` on a copy of `machine`, leaving `machine` untouched.
pub fn transition(machine: &Machine, step: Step) -> (Machine, Transition) {
    let mut next = machine.clone();
    let outcome = execute(&mut next, step);
    (next, outcome)
}

/// Perform one micro-step in place.
pub fn execute(machine: &mut Machine, step: Step) -> Transition {
    let Machine { regs, mem } = machine;

    match step {
        // ==================== Fetch ====================

        Step::FetchPcToMar => {
            let (addr, fault) = checked_address(mem, regs.pc);
            regs.mar = Some(addr);
            Transition::new(step, Step::FetchMarToRam)
                .highlight(ComponentId::Pc)
                .highlight(ComponentId::Mar)
                .fault(fault)
        }

        Step::FetchMarToRam => Transition::new(step, Step::FetchRamToMdr)
            .bus(BusEvent::address(FETCH_ADDRESS))
            .highlight(ComponentId::RamCell(regs.mar_index())),

        Step::FetchRamToMdr => {
            let fault = read_into_mdr(regs, mem);
            Transition::new(step, Step::FetchMdrToCir)
                .bus(BusEvent::read(FETCH_DATA))
                .highlight(ComponentId::Mdr)
                .fault(fault)
        }

        Step::FetchMdrToCir => {
            regs.cir = regs.mdr.clone();
            Transition::new(step, Step::FetchIncrementPc).highlight(ComponentId::Cir)
        }

        Step::FetchIncrementPc => {
            regs.advance_pc();
            Transition::new(step, Step::Decode).highlight(ComponentId::Pc)
        }

        // ==================== Decode ====================

        Step::Decode => {
            let (next, fault) = match decode::decode_opcode(regs.cir_text()) {
                Ok(Opcode::Load) => (Step::ExecuteLoad1, None),
                Ok(Opcode::Add) => (Step::ExecuteAdd1, None),
                Ok(Opcode::Store) => (Step::ExecuteStore1, None),
                Ok(Opcode::Halt) => (Step::ExecuteHalt, None),
                Err(e) => (Step::ExecuteHalt, Some(Fault::from(e))),
            };
            Transition::new(step, next).highlight(ComponentId::Cir).fault(fault)
        }

        // ==================== Execute: operand address ====================

        Step::ExecuteLoad1 | Step::ExecuteAdd1 | Step::ExecuteStore1 => {
            let (addr, fault) = resolve_operand(regs, mem);
            regs.mar = Some(addr);
            let next = match step {
                Step::ExecuteLoad1 => Step::ExecuteLoad2,
                Step::ExecuteAdd1 => Step::ExecuteAdd2,
                _ => Step::ExecuteStore2,
            };
            Transition::new(step, next).highlight(ComponentId::Mar).fault(fault)
        }

        // ==================== Execute: LOAD ====================

        Step::ExecuteLoad2 => Transition::new(step, Step::ExecuteLoad3)
            .bus(BusEvent::address(LOAD_ADDRESS))
            .highlight(ComponentId::RamCell(regs.mar_index())),

        Step::ExecuteLoad3 => {
            let fault = read_into_mdr(regs, mem);
            Transition::new(step, Step::ExecuteLoad4)
                .bus(BusEvent::read(LOAD_DATA))
                .highlight(ComponentId::Mdr)
                .fault(fault)
        }

        Step::ExecuteLoad4 => {
            let (value, fault) = mdr_value(regs);
            regs.acc = value;
            Transition::new(step, Step::FIRST)
                .bus(BusEvent::alu(LOAD_CONTROL))
                .highlight(ComponentId::Acc)
                .fault(fault)
        }

        // ==================== Execute: ADD ====================

        Step::ExecuteAdd2 => Transition::new(step, Step::ExecuteAdd3)
            .bus(BusEvent::address(ADD_ADDRESS))
            .highlight(ComponentId::RamCell(regs.mar_index())),

        Step::ExecuteAdd3 => {
            let fault = read_into_mdr(regs, mem);
            Transition::new(step, Step::ExecuteAdd4)
                .bus(BusEvent::read(ADD_DATA))
                .highlight(ComponentId::Mdr)
                .fault(fault)
        }

        Step::ExecuteAdd4 => {
            let (value, fault) = mdr_value(regs);
            regs.acc = regs.acc.wrapping_add(value);
            Transition::new(step, Step::FIRST)
                .bus(BusEvent::alu(ADD_CONTROL))
                .highlight(ComponentId::Acc)
                .fault(fault)
        }

        // ==================== Execute: STORE ====================

        Step::ExecuteStore2 => {
            regs.mdr = Some(regs.acc.to_string());
            Transition::new(step, Step::ExecuteStore3).highlight(ComponentId::Mdr)
        }

        Step::ExecuteStore3 => Transition::new(step, Step::ExecuteStore4)
            .bus(BusEvent::address(STORE_ADDRESS))
            .highlight(ComponentId::RamCell(regs.mar_index())),

        Step::ExecuteStore4 => {
            let value = regs.mdr.clone().unwrap_or_else(|| regs.acc.to_string());
            let fault = mem.write(regs.mar_index(), value).err().map(Fault::from);
            Transition::new(step, Step::FIRST)
                .bus(BusEvent::write(STORE_DATA))
                .fault(fault)
        }

        // ==================== Halt ====================

        Step::ExecuteHalt => {
            let mut t = Transition::new(step, step);
            t.halted = true;
            t
        }
    }
}

/// Use `addr` if it is inside memory, otherwise fall back to cell 0.
fn checked_address(mem: &Memory, addr: usize) -> (usize, Option<Fault>) {
    if mem.contains(addr) {
        (addr, None)
    } else {
        (0, Some(Fault::Memory(MemoryError::AddressOutOfRange(addr))))
    }
}

/// Address operand of the instruction in CIR. Unparsable or out-of-range
/// operands resolve to address 0.
fn resolve_operand(regs: &Registers, mem: &Memory) -> (usize, Option<Fault>) {
    match decode::parse_operand(regs.cir_text()) {
        Ok(addr) => checked_address(mem, addr),
        Err(e) => (0, Some(Fault::from(e))),
    }
}

/// MDR := [MAR].
fn read_into_mdr(regs: &mut Registers, mem: &Memory) -> Option<Fault> {
    match mem.read(regs.mar_index()) {
        Ok(word) => {
            regs.mdr = Some(word.to_string());
            None
        }
        Err(e) => Some(Fault::from(e)),
    }
}

/// MDR as a number for the ALU. Non-numeric contents count as 0.
fn mdr_value(regs: &Registers) -> (i64, Option<Fault>) {
    let text = regs.mdr_text();
    match text.trim().parse::<i64>() {
        Ok(v) => (v, None),
        Err(_) => (0, Some(Fault::NonNumericData(text.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::bus::BusKind;
    use crate::cpu::memory::EMPTY_CELL;

    /// Run steps from `start` until `until` is about to be performed.
    fn run_until(machine: &mut Machine, start: Step, until: Step) -> Step {
        let mut step = start;
        while step != until {
            step = execute(machine, step).next;
        }
        step
    }

    #[test]
    fn test_fetch_sequence() {
        let mut m = Machine::new();

        let t = execute(&mut m, Step::FetchPcToMar);
        assert_eq!(m.regs.mar, Some(0));
        assert_eq!(t.bus, None);
        assert_eq!(t.highlights, vec![ComponentId::Pc, ComponentId::Mar]);

        let t = execute(&mut m, t.next);
        assert_eq!(t.step, Step::FetchMarToRam);
        let bus = t.bus.unwrap();
        assert_eq!(bus.kind, BusKind::Address);
        assert_eq!((bus.source, bus.destination), (ComponentId::Registers, ComponentId::Ram));
        assert_eq!(t.highlights, vec![ComponentId::RamCell(0)]);

        let t = execute(&mut m, t.next);
        assert_eq!(m.regs.mdr.as_deref(), Some("LOAD 5"));
        assert_eq!(t.bus.unwrap().kind, BusKind::Data);

        let t = execute(&mut m, t.next);
        assert_eq!(m.regs.cir.as_deref(), Some("LOAD 5"));
        assert_eq!(t.bus, None);

        let t = execute(&mut m, t.next);
        assert_eq!(m.regs.pc, 1);
        assert_eq!(t.bus, None);
        assert_eq!(t.next, Step::Decode);
    }

    #[test]
    fn test_decode_branches() {
        for (cir, expected) in [
            ("LOAD 5", Step::ExecuteLoad1),
            ("ADD 6", Step::ExecuteAdd1),
            ("STORE 7", Step::ExecuteStore1),
            ("HALT", Step::ExecuteHalt),
        ] {
            let mut m = Machine::new();
            m.regs.cir = Some(cir.into());
            let t = execute(&mut m, Step::Decode);
            assert_eq!(t.next, expected, "decoding {}", cir);
            assert_eq!(t.bus, None);
            assert_eq!(t.fault, None);
        }
    }

    #[test]
    fn test_unknown_opcode_halts() {
        let mut m = Machine::new();
        m.regs.cir = Some(EMPTY_CELL.into());
        let t = execute(&mut m, Step::Decode);
        assert_eq!(t.next, Step::ExecuteHalt);
        assert!(matches!(t.fault, Some(Fault::Decode(DecodeError::UnknownOpcode(_)))));

        let t = execute(&mut m, t.next);
        assert!(t.halted);
    }

    #[test]
    fn test_load_add_store_cycle() {
        let mut m = Machine::new();
        let mut step = run_until(&mut m, Step::FIRST, Step::ExecuteLoad1);
        step = run_until(&mut m, step, Step::FetchIncrementPc);
        assert_eq!(m.regs.acc, 10);

        step = run_until(&mut m, step, Step::ExecuteAdd4);
        let t = execute(&mut m, step);
        assert_eq!(m.regs.acc, 15);
        assert_eq!(t.next, Step::FIRST);

        step = run_until(&mut m, t.next, Step::ExecuteStore4);
        assert_eq!(m.regs.mdr.as_deref(), Some("15"));
        assert_eq!(m.mem.read(7).unwrap(), "0");

        let t = execute(&mut m, step);
        assert_eq!(m.mem.read(7).unwrap(), "15");
        let bus = t.bus.unwrap();
        assert_eq!(bus.kind, BusKind::Data);
        assert_eq!((bus.source, bus.destination), (ComponentId::Registers, ComponentId::Ram));
    }

    #[test]
    fn test_invalid_operand_defaults_to_zero() {
        let mut m = Machine::new();
        m.regs.cir = Some("LOAD five".into());
        let t = execute(&mut m, Step::ExecuteLoad1);
        assert_eq!(m.regs.mar, Some(0));
        assert!(matches!(t.fault, Some(Fault::Decode(DecodeError::InvalidOperand { .. }))));
    }

    #[test]
    fn test_out_of_range_operand_defaults_to_zero() {
        let mut m = Machine::new();
        m.regs.cir = Some("STORE 42".into());
        let t = execute(&mut m, Step::ExecuteStore1);
        assert_eq!(m.regs.mar, Some(0));
        assert_eq!(t.fault, Some(Fault::Memory(MemoryError::AddressOutOfRange(42))));
    }

    #[test]
    fn test_non_numeric_data_counts_as_zero() {
        let mut m = Machine::new();
        m.regs.acc = 3;
        m.regs.mdr = Some(EMPTY_CELL.into());
        let t = execute(&mut m, Step::ExecuteAdd4);
        assert_eq!(m.regs.acc, 3);
        assert_eq!(t.fault, Some(Fault::NonNumericData(EMPTY_CELL.into())));
    }

    #[test]
    fn test_transition_is_pure() {
        let m = Machine::new();
        let (next, t) = transition(&m, Step::FetchPcToMar);
        assert_eq!(m.regs.mar, None);
        assert_eq!(next.regs.mar, Some(0));
        assert_eq!(t.next, Step::FetchMarToRam);
    }
}
