//! Cycle-accurate Mic-1 datapath emulator core.

/// Main memory model and fixed load layout.
pub mod memory;
pub use memory::{
    validate_byte_access, validate_range, validate_word_access, word_byte_offset, Memory,
    HEADER_BYTES, HEADER_START, MEMORY_BYTES, PROGRAM_ORIGIN, WORD_BYTES,
};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    CycleOutcome, Inspector, InspectorAction, MachineConfig, MachineSnapshot, NoopTraceSink,
    PassiveInspector, RunLimit, RunOutcome, StopReason, TraceEvent, TraceSink,
};

/// Architectural state: registers, flags, bus latches and `MIR`.
pub mod state;
pub use state::{
    ArchitecturalState, Buses, Flags, Register, Registers, RunState, C_BUS_TARGETS, MPC_MASK,
    REGISTER_COUNT,
};

/// Microinstruction field layout and datapath lookup tables.
pub mod encoding;
pub use encoding::{
    AluOperation, BusBSource, CBusMask, JumpBits, MemoryOps, MicroField, Shift,
    ALU_OPERATIONS, ALU_OPERATION_TABLE, BUS_B_SOURCE_TABLE, MICROINSTRUCTION_BITS,
    MICROINSTRUCTION_MASK,
};

/// Microinstruction field extraction.
pub mod decoder;
pub use decoder::{DecodedMicroinstruction, Decoder};

/// The 512-word control store.
pub mod control_store;
pub use control_store::{ControlStore, CONTROL_STORE_BYTES, CONTROL_STORE_SIZE, ROM_RECORD_BYTES};

/// Fatal datapath fault taxonomy.
pub mod fault;
pub use fault::{AccessKind, MachineFault};

/// ROM and program image loading.
pub mod loader;
pub use loader::{
    load_control_store, load_program, read_control_store, read_program, LoadError, ProgramImage,
};

/// The datapath cycle.
pub mod execute;
pub use execute::step_cycle;

/// Machine instance owning state, memory and control store.
pub mod machine;
pub use machine::Machine;

/// Microinstruction disassembly.
pub mod disasm;
pub use disasm::{describe, disassemble_listing, disassemble_range, DisassemblyRow};

/// Status formatting for inspectors.
pub mod inspect;
pub use inspect::{
    format_binary, format_microinstruction, format_microinstruction_flat,
    microinstruction_legend, StatusReport, FLAT_MIR_BREAKS,
};

#[cfg(test)]
use proptest as _;
