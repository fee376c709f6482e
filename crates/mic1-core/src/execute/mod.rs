//! The datapath cycle.
//!
//! One call to [`step_cycle`] performs, in order:
//! 1. Latch `MIR` from the control store at `MPC`
//! 2. Decode; the `NEXT` field replaces `MPC`
//! 3. Drive the B-bus
//! 4. ALU, flags, shifter
//! 5. C-bus fan-out
//! 6. Memory fetch / read / write, using registers written in step 5
//! 7. Apply jump modifiers to `MPC`

mod alu;
mod bus;
mod flags;
mod jump;

pub use alu::{compute as compute_alu, evaluate as evaluate_alu, AluOutput};
pub use bus::{drive_b, fan_out_c};
pub use flags::flags_for;
pub use jump::next_mpc;

use crate::api::{CycleOutcome, TraceEvent, TraceSink};
use crate::decoder::Decoder;
use crate::encoding::MemoryOps;
use crate::memory::word_byte_offset;
use crate::state::ArchitecturalState;
use crate::{AccessKind, ControlStore, MachineFault, Memory, Register};

/// Executes one full microinstruction cycle.
///
/// # Errors
///
/// Returns [`MachineFault::MemoryOutOfBounds`] when the memory stage touches a
/// byte outside `memory`. Registers written earlier in the cycle keep their
/// new values; the machine is expected to stop.
pub fn step_cycle(
    state: &mut ArchitecturalState,
    memory: &mut Memory,
    control_store: &ControlStore,
    trace: &mut dyn TraceSink,
) -> Result<CycleOutcome, MachineFault> {
    let mpc = state.registers.mpc();
    let mir = control_store.get(mpc);
    state.mir = mir;
    trace.on_event(TraceEvent::CycleStart { mpc, mir });

    let decoded = Decoder::decode(mir);
    state.registers.set_mpc(decoded.next_mpc);

    let b = drive_b(&state.registers, decoded.bus_b_source());
    let h = state.registers.get(Register::H);
    let out = compute_alu(decoded.alu_operation(), decoded.shifter(), h, b);
    state.buses.b = b;
    state.buses.c = out.c;
    state.flags = out.flags;

    fan_out_c(&mut state.registers, decoded.c, out.c);

    if let Err(fault) = memory_stage(state, memory, decoded.mem, trace) {
        trace.on_event(TraceEvent::FaultRaised { fault, mpc });
        return Err(fault);
    }

    let next = next_mpc(
        decoded.next_mpc,
        decoded.jump,
        state.flags,
        state.registers.mbr(),
    );
    state.registers.set_mpc(next);

    tracing::trace!(
        mpc,
        mir = format_args!("{mir:09X}"),
        b,
        c = out.c,
        next_mpc = next,
        "micro-cycle"
    );

    Ok(CycleOutcome {
        mpc,
        mir,
        next_mpc: next,
    })
}

/// Fetch, then read, then write. Read-before-write means a cycle with both
/// bits set leaves the loaded word in `MDR` and stores that same word back.
fn memory_stage(
    state: &mut ArchitecturalState,
    memory: &mut Memory,
    ops: MemoryOps,
    trace: &mut dyn TraceSink,
) -> Result<(), MachineFault> {
    if ops.contains(MemoryOps::FETCH) {
        let pc = state.registers.get(Register::Pc);
        let byte = memory.read_byte(pc)?;
        state.registers.set_mbr(byte);
        trace.on_event(TraceEvent::MemoryAccess {
            kind: AccessKind::Fetch,
            addr: u64::from(pc),
            value: u32::from(byte),
        });
    }

    if ops.contains(MemoryOps::READ) {
        let mar = state.registers.get(Register::Mar);
        let word = memory.read_word(mar)?;
        state.registers.set(Register::Mdr, word);
        trace.on_event(TraceEvent::MemoryAccess {
            kind: AccessKind::WordRead,
            addr: word_byte_offset(mar),
            value: word,
        });
    }

    if ops.contains(MemoryOps::WRITE) {
        let mar = state.registers.get(Register::Mar);
        let mdr = state.registers.get(Register::Mdr);
        memory.write_word(mar, mdr)?;
        trace.on_event(TraceEvent::MemoryAccess {
            kind: AccessKind::WordWrite,
            addr: word_byte_offset(mar),
            value: mdr,
        });
    }

    Ok(())
}
