//! System bus activity.
//!
//! A [`BusEvent`] is emitted by every micro-step that moves something
//! between the CPU, RAM and the ALU. Rendering layers animate it along a
//! single bus lane with three endpoints: Control Unit, RAM and ALU.

use serde::{Serialize, Deserialize};

/// Which of the three buses carries the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    Address,
    Data,
    Control,
}

impl BusKind {
    pub const ALL: [BusKind; 3] = [BusKind::Address, BusKind::Data, BusKind::Control];

    pub fn name(self) -> &'static str {
        match self {
            BusKind::Address => "Address Bus",
            BusKind::Data => "Data Bus",
            BusKind::Control => "Control Bus",
        }
    }
}

/// Anything that can be highlighted or sit at either end of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentId {
    ControlUnit,
    /// The register file as a whole.
    Registers,
    Pc,
    Mar,
    Mdr,
    Cir,
    Alu,
    Acc,
    Ram,
    RamCell(usize),
}

/// Attachment points on the bus lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusEndpoint {
    ControlUnit,
    Ram,
    Alu,
}

impl BusEndpoint {
    /// Horizontal position along the lane, in percent.
    pub fn position(self) -> u16 {
        match self {
            BusEndpoint::ControlUnit => 15,
            BusEndpoint::Ram => 50,
            BusEndpoint::Alu => 85,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BusEndpoint::ControlUnit => "Control Unit",
            BusEndpoint::Ram => "RAM",
            BusEndpoint::Alu => "ALU",
        }
    }
}

impl ComponentId {
    /// Where this component attaches to the bus lane.
    pub fn endpoint(self) -> BusEndpoint {
        match self {
            ComponentId::Ram | ComponentId::RamCell(_) => BusEndpoint::Ram,
            ComponentId::Alu | ComponentId::Acc => BusEndpoint::Alu,
            ComponentId::ControlUnit
            | ComponentId::Registers
            | ComponentId::Pc
            | ComponentId::Mar
            | ComponentId::Mdr
            | ComponentId::Cir => BusEndpoint::ControlUnit,
        }
    }

    /// Whether the component lives inside the CPU box.
    pub fn is_register(self) -> bool {
        matches!(
            self,
            ComponentId::Pc | ComponentId::Mar | ComponentId::Mdr | ComponentId::Cir | ComponentId::Acc
        )
    }
}

/// A transfer on one of the buses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusEvent {
    pub kind: BusKind,
    pub source: ComponentId,
    pub destination: ComponentId,
    /// Why the transfer happens, for display.
    pub rationale: &'static str,
}

impl BusEvent {
    pub const fn new(
        kind: BusKind,
        source: ComponentId,
        destination: ComponentId,
        rationale: &'static str,
    ) -> Self {
        Self { kind, source, destination, rationale }
    }

    /// Address bus, registers to RAM.
    pub const fn address(rationale: &'static str) -> Self {
        Self::new(BusKind::Address, ComponentId::Registers, ComponentId::Ram, rationale)
    }

    /// Data bus, RAM to registers.
    pub const fn read(rationale: &'static str) -> Self {
        Self::new(BusKind::Data, ComponentId::Ram, ComponentId::Registers, rationale)
    }

    /// Data bus, registers to RAM.
    pub const fn write(rationale: &'static str) -> Self {
        Self::new(BusKind::Data, ComponentId::Registers, ComponentId::Ram, rationale)
    }

    /// Control bus, registers to ALU.
    pub const fn alu(rationale: &'static str) -> Self {
        Self::new(BusKind::Control, ComponentId::Registers, ComponentId::Alu, rationale)
    }

    /// A transfer between components on the same lane endpoint has nothing to animate.
    pub fn is_moving(&self) -> bool {
        self.source.endpoint() != self.destination.endpoint()
    }

    /// Lane position of the moving dot, `progress` in `0.0..=1.0`.
    pub fn position_at(&self, progress: f32) -> u16 {
        let from = self.source.endpoint().position() as f32;
        let to = self.destination.endpoint().position() as f32;
        let t = progress.clamp(0.0, 1.0);
        (from + (to - from) * t).round() as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(ComponentId::Registers.endpoint(), BusEndpoint::ControlUnit);
        assert_eq!(ComponentId::Mdr.endpoint(), BusEndpoint::ControlUnit);
        assert_eq!(ComponentId::RamCell(7).endpoint(), BusEndpoint::Ram);
        assert_eq!(ComponentId::Acc.endpoint(), BusEndpoint::Alu);
    }

    #[test]
    fn test_is_moving() {
        assert!(BusEvent::address("").is_moving());
        assert!(BusEvent::alu("").is_moving());

        let local = BusEvent::new(BusKind::Control, ComponentId::Pc, ComponentId::Mar, "");
        assert!(!local.is_moving());
    }

    #[test]
    fn test_position_interpolation() {
        let read = BusEvent::read("");
        assert_eq!(read.position_at(0.0), 50);
        assert_eq!(read.position_at(1.0), 15);
        assert_eq!(read.position_at(2.0), 15);

        let alu = BusEvent::alu("");
        assert_eq!(alu.position_at(0.5), 50);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(BusEvent::address("why")).unwrap();
        assert_eq!(json["kind"], "address");
        assert_eq!(json["source"], "registers");
        assert_eq!(json["destination"], "ram");
        assert_eq!(json["rationale"], "why");
    }
}
