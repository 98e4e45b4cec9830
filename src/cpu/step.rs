//! The micro-step catalogue.
//!
//! Every micro-operation of the fetch-decode-execute cycle has a stable
//! kebab-case identifier. The identifiers are what the labels and the
//! rendering layers key on.

use serde::{Serialize, Deserialize};

/// Coarse phase of the instruction cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Fetch,
    Decode,
    Execute,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Fetch => "Fetch",
            Phase::Decode => "Decode",
            Phase::Execute => "Execute",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One atomic micro-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    // ==================== Fetch ====================
    FetchPcToMar,
    FetchMarToRam,
    FetchRamToMdr,
    FetchMdrToCir,
    FetchIncrementPc,

    // ==================== Decode ====================
    Decode,

    // ==================== Execute ====================
    #[serde(rename = "execute-load-1")]
    ExecuteLoad1,
    #[serde(rename = "execute-load-2")]
    ExecuteLoad2,
    #[serde(rename = "execute-load-3")]
    ExecuteLoad3,
    #[serde(rename = "execute-load-4")]
    ExecuteLoad4,
    #[serde(rename = "execute-add-1")]
    ExecuteAdd1,
    #[serde(rename = "execute-add-2")]
    ExecuteAdd2,
    #[serde(rename = "execute-add-3")]
    ExecuteAdd3,
    #[serde(rename = "execute-add-4")]
    ExecuteAdd4,
    #[serde(rename = "execute-store-1")]
    ExecuteStore1,
    #[serde(rename = "execute-store-2")]
    ExecuteStore2,
    #[serde(rename = "execute-store-3")]
    ExecuteStore3,
    #[serde(rename = "execute-store-4")]
    ExecuteStore4,
    ExecuteHalt,
}

impl Step {
    /// The full catalogue, in cycle order.
    pub const ALL: [Step; 19] = [
        Step::FetchPcToMar,
        Step::FetchMarToRam,
        Step::FetchRamToMdr,
        Step::FetchMdrToCir,
        Step::FetchIncrementPc,
        Step::Decode,
        Step::ExecuteLoad1,
        Step::ExecuteLoad2,
        Step::ExecuteLoad3,
        Step::ExecuteLoad4,
        Step::ExecuteAdd1,
        Step::ExecuteAdd2,
        Step::ExecuteAdd3,
        Step::ExecuteAdd4,
        Step::ExecuteStore1,
        Step::ExecuteStore2,
        Step::ExecuteStore3,
        Step::ExecuteStore4,
        Step::ExecuteHalt,
    ];

    /// The step a fresh machine starts on.
    pub const FIRST: Step = Step::FetchPcToMar;

    /// Stable identifier, e.g. `"fetch-pc-to-mar"`.
    pub fn id(self) -> &'static str {
        match self {
            Step::FetchPcToMar => "fetch-pc-to-mar",
            Step::FetchMarToRam => "fetch-mar-to-ram",
            Step::FetchRamToMdr => "fetch-ram-to-mdr",
            Step::FetchMdrToCir => "fetch-mdr-to-cir",
            Step::FetchIncrementPc => "fetch-increment-pc",
            Step::Decode => "decode",
            Step::ExecuteLoad1 => "execute-load-1",
            Step::ExecuteLoad2 => "execute-load-2",
            Step::ExecuteLoad3 => "execute-load-3",
            Step::ExecuteLoad4 => "execute-load-4",
            Step::ExecuteAdd1 => "execute-add-1",
            Step::ExecuteAdd2 => "execute-add-2",
            Step::ExecuteAdd3 => "execute-add-3",
            Step::ExecuteAdd4 => "execute-add-4",
            Step::ExecuteStore1 => "execute-store-1",
            Step::ExecuteStore2 => "execute-store-2",
            Step::ExecuteStore3 => "execute-store-3",
            Step::ExecuteStore4 => "execute-store-4",
            Step::ExecuteHalt => "execute-halt",
        }
    }

    /// Look up a step by its identifier.
    pub fn from_id(id: &str) -> Option<Step> {
        Step::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn phase(self) -> Phase {
        match self {
            Step::FetchPcToMar
            | Step::FetchMarToRam
            | Step::FetchRamToMdr
            | Step::FetchMdrToCir
            | Step::FetchIncrementPc => Phase::Fetch,
            Step::Decode => Phase::Decode,
            _ => Phase::Execute,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Step::ExecuteHalt
    }

    /// Animation hops the step takes. `fetch-pc-to-mar` lights PC and
    /// then MAR, one hop each.
    pub fn hops(self) -> u32 {
        match self {
            Step::FetchPcToMar => 2,
            _ => 1,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
