//! Display text for steps, buses and registers.
//!
//! The step lookups take the raw step identifier so front ends can call
//! them with whatever they stored. Unknown identifiers give an empty string.

use crate::cpu::{BusKind, Step};

/// Coarse phase name: `Fetch`, `Decode` or `Execute`.
pub fn describe_phase(id: &str) -> &'static str {
    Step::from_id(id).map(|s| s.phase().name()).unwrap_or("")
}

/// One-line description of a step.
pub fn describe_step(id: &str) -> &'static str {
    Step::from_id(id).map(step_description).unwrap_or("")
}

/// Longer explanation of a step.
pub fn explain_step(id: &str) -> &'static str {
    Step::from_id(id).map(step_explanation).unwrap_or("")
}

/// Banner text, e.g. `"Fetch → The Program Counter's value is ..."`.
pub fn step_banner(step: Step) -> String {
    format!("{} → {}", step.phase(), step_description(step))
}

pub fn step_description(step: Step) -> &'static str {
    match step {
        Step::FetchPcToMar => "The Program Counter's value is copied to the Memory Address Register",
        Step::FetchMarToRam => "The address in MAR is sent to RAM to find the instruction",
        Step::FetchRamToMdr => "The instruction at the specified address is loaded into the MDR",
        Step::FetchMdrToCir => "The instruction in MDR is copied to the Current Instruction Register",
        Step::FetchIncrementPc => "The Program Counter is incremented (the next instruction will now commence)",
        Step::Decode => "The CPU analyzes the instruction to determine what operation to perform",
        Step::ExecuteLoad1 => "The CPU prepares to load by setting the Memory Address Register",
        Step::ExecuteLoad2 => "The CPU sends the address to RAM via the address bus",
        Step::ExecuteLoad3 => "The CPU receives the data from RAM into the MDR",
        Step::ExecuteLoad4 => "The CPU loads the value from MDR into the Accumulator",
        Step::ExecuteAdd1 => "The CPU prepares to add by setting the Memory Address Register",
        Step::ExecuteAdd2 => "The CPU sends the address to RAM via the address bus",
        Step::ExecuteAdd3 => "The CPU receives the data from RAM into the MDR",
        Step::ExecuteAdd4 => "The CPU adds the value from MDR to the Accumulator",
        Step::ExecuteStore1 => "The CPU prepares to store by setting the Memory Address Register",
        Step::ExecuteStore2 => "The CPU copies the Accumulator value to the MDR",
        Step::ExecuteStore3 => "The CPU sends the address to RAM via the address bus",
        Step::ExecuteStore4 => "The CPU sends the data from MDR to RAM via the data bus",
        Step::ExecuteHalt => "The CPU stops execution as instructed by the HALT command",
    }
}

pub fn step_explanation(step: Step) -> &'static str {
    match step {
        Step::FetchPcToMar => "The Program Counter (PC) value is copied to the Memory Address Register (MAR) to specify which memory location to access.",
        Step::FetchMarToRam => "The address stored in the MAR is sent to RAM via the address bus to locate the instruction.",
        Step::FetchRamToMdr => "The instruction at the specified memory address is loaded into the Memory Data Register (MDR) via the data bus.",
        Step::FetchMdrToCir => "The instruction in MDR is transferred to the Current Instruction Register (CIR) for processing.",
        Step::FetchIncrementPc => "The Program Counter is increased by 1 to prepare for the next instruction fetch.",
        Step::Decode => "The Control Unit analyzes the instruction in CIR to determine the operation and operands needed.",
        Step::ExecuteLoad1 => "The CPU extracts the address from the LOAD instruction and places it in the Memory Address Register (MAR).",
        Step::ExecuteLoad2 => "The address in MAR is sent to RAM via the address bus to locate the data to be loaded.",
        Step::ExecuteLoad3 => "The data at the specified memory address is loaded into the Memory Data Register (MDR) via the data bus.",
        Step::ExecuteLoad4 => "The value in MDR is transferred to the Accumulator (ACC) in the ALU via the control bus.",
        Step::ExecuteAdd1 => "The CPU extracts the address from the ADD instruction and places it in the Memory Address Register (MAR).",
        Step::ExecuteAdd2 => "The address in MAR is sent to RAM via the address bus to locate the data to be added.",
        Step::ExecuteAdd3 => "The data at the specified memory address is loaded into the Memory Data Register (MDR) via the data bus.",
        Step::ExecuteAdd4 => "The ALU adds the value in MDR to the current value in the Accumulator (ACC) and stores the result in ACC.",
        Step::ExecuteStore1 => "The CPU extracts the address from the STORE instruction and places it in the Memory Address Register (MAR).",
        Step::ExecuteStore2 => "The current value in the Accumulator (ACC) is copied to the Memory Data Register (MDR) to prepare for storage.",
        Step::ExecuteStore3 => "The address in MAR is sent to RAM via the address bus to specify where to store the data.",
        Step::ExecuteStore4 => "The value in MDR is sent to the specified RAM location via the data bus, completing the store operation.",
        Step::ExecuteHalt => "The HALT instruction stops the CPU execution until the system is reset.",
    }
}

/// What each bus is for.
pub fn describe_bus(kind: BusKind) -> &'static str {
    match kind {
        BusKind::Address => "The Address Bus carries memory addresses from the CPU to memory. It's unidirectional (one-way) and shows which memory location the CPU wants to access.",
        BusKind::Data => "The Data Bus transfers actual data between the CPU and memory. It's bidirectional (two-way), allowing data to flow in both directions.",
        BusKind::Control => "The Control Bus carries signals between the CPU and components (like RAM). These signals decide what kind of operation is being carried out (read/write), the timing, and other operation-specific details. It includes signals like read/write, interrupt requests, and more.",
    }
}

/// Register reference: (name, description), in display order.
pub const REGISTER_INFO: [(&str, &str); 5] = [
    (
        "Program Counter (PC)",
        "The Program Counter holds the memory address of the next instruction to be fetched and executed. It automatically increments after each instruction fetch to point to the next instruction in sequence.",
    ),
    (
        "Memory Address Register (MAR)",
        "The MAR holds the address of the memory location that is going to be accessed (to be read/written to). It connects to the address bus and specifies which memory location to interact with.",
    ),
    (
        "Memory Data Register (MDR)",
        "The MDR temporarily holds data being transferred between memory and the CPU. For a memory read, it receives data from memory; for a memory write, it holds the data to be written to memory.",
    ),
    (
        "Current Instruction Register (CIR)",
        "The CIR holds the instruction currently being executed. After an instruction is fetched from memory, it is stored here while being decoded and executed by the control unit.",
    ),
    (
        "Accumulator (ACC)",
        "The Accumulator is a special register in the ALU that holds the results of arithmetic and logical operations. It acts as a temporary storage for data being processed and the final results of computations.",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_total_over_catalogue() {
        for step in Step::ALL {
            assert!(!describe_phase(step.id()).is_empty(), "{}", step);
            assert!(!describe_step(step.id()).is_empty(), "{}", step);
            assert!(!explain_step(step.id()).is_empty(), "{}", step);
        }
    }

    #[test]
    fn test_unknown_ids_are_empty() {
        for id in ["", "fetch", "execute-load-5", "DECODE", "execute-jump-1"] {
            assert_eq!(describe_phase(id), "");
            assert_eq!(describe_step(id), "");
            assert_eq!(explain_step(id), "");
        }
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(describe_phase("fetch-increment-pc"), "Fetch");
        assert_eq!(describe_phase("decode"), "Decode");
        assert_eq!(describe_phase("execute-halt"), "Execute");
    }

    #[test]
    fn test_banner() {
        assert_eq!(
            step_banner(Step::Decode),
            "Decode → The CPU analyzes the instruction to determine what operation to perform"
        );
    }

    #[test]
    fn test_bus_descriptions() {
        for kind in BusKind::ALL {
            assert!(describe_bus(kind).starts_with(&format!("The {}", kind.name())));
        }
    }
}
