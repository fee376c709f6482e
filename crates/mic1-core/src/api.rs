//! Host-facing contracts: configuration, run control, trace and inspector hooks.

use crate::state::{ArchitecturalState, Buses, Flags, Registers};
use crate::{AccessKind, MachineFault, MEMORY_BYTES, PROGRAM_ORIGIN};

/// Immutable configuration for a machine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineConfig {
    /// Size of main memory in bytes.
    pub memory_bytes: usize,
    /// Byte address at which the program body is loaded.
    pub program_origin: usize,
    /// Enables dispatch of [`TraceEvent`]s to the sink passed to
    /// `Machine::step_traced`.
    pub tracing_enabled: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            memory_bytes: MEMORY_BYTES,
            program_origin: PROGRAM_ORIGIN,
            tracing_enabled: false,
        }
    }
}

/// What one completed cycle did to control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleOutcome {
    /// Control-store address that was executed.
    pub mpc: u16,
    /// Microinstruction that was latched into `MIR`.
    pub mir: u64,
    /// Address of the next microinstruction.
    pub next_mpc: u16,
}

/// Upper bound for [`Machine::run`](crate::Machine::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunLimit {
    /// Keep going until the inspector stops the run or a fault occurs.
    #[default]
    Unbounded,
    /// Stop after this many completed cycles.
    Cycles(u64),
}

/// Why a run returned without faulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The [`RunLimit`] was reached.
    CycleLimit,
    /// The inspector asked to stop.
    Inspector,
}

/// Aggregated result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Cycles completed during this run call.
    pub cycles: u64,
    /// Boundary that ended the run.
    pub stop: StopReason,
}

/// Inspector decision returned between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InspectorAction {
    /// Execute the next cycle.
    Continue,
    /// End the run before the next latch.
    Stop,
}

/// Synchronous observer called before every cycle.
///
/// The machine does not advance until `inspect` returns, so implementations
/// may block on operator input.
pub trait Inspector {
    /// Observes the machine between cycles.
    fn inspect(&mut self, machine: &crate::Machine) -> InspectorAction;
}

/// Inspector that never blocks and never stops the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveInspector;

impl Inspector for PassiveInspector {
    fn inspect(&mut self, _machine: &crate::Machine) -> InspectorAction {
        InspectorAction::Continue
    }
}

/// Trace events emitted in datapath order when tracing is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// `MIR` was latched from the control store.
    CycleStart {
        /// Address the microinstruction was read from.
        mpc: u16,
        /// Latched microinstruction.
        mir: u64,
    },
    /// Main memory was accessed by the memory stage.
    MemoryAccess {
        /// Kind of access.
        kind: AccessKind,
        /// Byte address of the first byte accessed.
        addr: u64,
        /// Value fetched, read or written.
        value: u32,
    },
    /// A fatal fault was raised.
    FaultRaised {
        /// The fault.
        fault: MachineFault,
        /// Control-store address executing when the fault occurred.
        mpc: u16,
    },
}

/// Sink for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTraceSink;

impl TraceSink for NoopTraceSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Owned copy of the observable datapath state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MachineSnapshot {
    /// Register file.
    pub registers: Registers,
    /// `N`/`Z` flip-flops.
    pub flags: Flags,
    /// Bus latches from the last cycle.
    pub buses: Buses,
    /// Last latched microinstruction.
    pub mir: u64,
    /// Microinstruction that the next cycle will latch.
    pub upcoming_mir: u64,
    /// Completed cycles since load or reset.
    pub cycles: u64,
}

impl MachineSnapshot {
    /// Builds a snapshot from architectural state and run counters.
    #[must_use]
    pub const fn new(state: &ArchitecturalState, upcoming_mir: u64, cycles: u64) -> Self {
        Self {
            registers: state.registers,
            flags: state.flags,
            buses: state.buses,
            mir: state.mir,
            upcoming_mir,
            cycles,
        }
    }
}
