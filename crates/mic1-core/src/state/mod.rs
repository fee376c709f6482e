//! Architectural state of the datapath.

/// Register file types and storage model.
pub mod registers;

pub use registers::{Register, Registers, C_BUS_TARGETS, MPC_MASK, REGISTER_COUNT};

use crate::MachineFault;

/// ALU condition flip-flops.
///
/// `N` carries "result was nonzero" rather than the sign bit; microprograms
/// depend on that encoding through `JAMN`, so `N == !Z` after every ALU cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Flags {
    /// Nonzero flag.
    pub n: bool,
    /// Zero flag.
    pub z: bool,
}

impl Flags {
    /// `N` as a single bit.
    #[must_use]
    pub const fn n_bit(self) -> u16 {
        self.n as u16
    }

    /// `Z` as a single bit.
    #[must_use]
    pub const fn z_bit(self) -> u16 {
        self.z as u16
    }
}

/// Transient bus latches from the most recent cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Buses {
    /// Value driven onto the B-bus.
    pub b: u32,
    /// Post-shift value distributed on the C-bus.
    pub c: u32,
}

/// Everything the datapath cycle mutates, apart from main memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArchitecturalState {
    /// Register file.
    pub registers: Registers,
    /// `N`/`Z` flip-flops.
    pub flags: Flags,
    /// B and C bus latches.
    pub buses: Buses,
    /// Microinstruction register (36 significant bits).
    pub mir: u64,
}

/// Host-observable execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next cycle.
    #[default]
    Running,
    /// A fatal fault stopped the machine; only a reset clears it.
    FaultLatched(MachineFault),
}

impl RunState {
    /// Returns the latched fault, if any.
    #[must_use]
    pub const fn latched_fault(self) -> Option<MachineFault> {
        match self {
            Self::FaultLatched(fault) => Some(fault),
            Self::Running => None,
        }
    }
}
