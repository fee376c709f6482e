//! The machine value: architectural state plus the memory and control store it owns.

use std::path::Path;

use crate::api::{
    CycleOutcome, Inspector, InspectorAction, MachineConfig, MachineSnapshot, NoopTraceSink,
    RunLimit, RunOutcome, StopReason, TraceSink,
};
use crate::execute::step_cycle;
use crate::loader::{self, LoadError, ProgramImage};
use crate::state::{ArchitecturalState, RunState};
use crate::{ControlStore, Flags, MachineFault, Memory, Registers};

/// A Mic-1 instance.
///
/// All registers start at zero, so execution begins at control-store address 0.
#[derive(Debug)]
pub struct Machine {
    config: MachineConfig,
    state: ArchitecturalState,
    memory: Memory,
    control_store: ControlStore,
    cycles: u64,
    run_state: RunState,
}

impl Machine {
    /// Creates a machine with zeroed memory sized by `config`.
    #[must_use]
    pub fn new(config: MachineConfig, control_store: ControlStore) -> Self {
        let memory = Memory::new(config.memory_bytes);
        Self {
            config,
            state: ArchitecturalState::default(),
            memory,
            control_store,
            cycles: 0,
            run_state: RunState::Running,
        }
    }

    /// Loads the microprogram ROM and program image from disk.
    ///
    /// # Errors
    ///
    /// Returns the first [`LoadError`] hit by either file.
    pub fn from_files(
        config: MachineConfig,
        rom_path: &Path,
        program_path: &Path,
    ) -> Result<Self, LoadError> {
        let control_store = loader::load_control_store(rom_path)?;
        let mut machine = Self::new(config, control_store);
        machine.load_program(program_path)?;
        Ok(machine)
    }

    /// Copies a program image into memory at the configured origin.
    ///
    /// # Errors
    ///
    /// See [`loader::read_program`].
    pub fn load_program(&mut self, path: &Path) -> Result<ProgramImage, LoadError> {
        loader::load_program(path, &mut self.memory, self.config.program_origin)
    }

    /// Configuration this machine was built with.
    #[must_use]
    pub const fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Registers, flags, buses and `MIR`.
    #[must_use]
    pub const fn state(&self) -> &ArchitecturalState {
        &self.state
    }

    /// Mutable architectural state, for hosts and tests that preset registers.
    pub fn state_mut(&mut self) -> &mut ArchitecturalState {
        &mut self.state
    }

    /// Register file.
    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.state.registers
    }

    /// Mutable register file.
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.state.registers
    }

    /// `N`/`Z` from the last cycle.
    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.state.flags
    }

    /// Main memory.
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable main memory.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Control store.
    #[must_use]
    pub const fn control_store(&self) -> &ControlStore {
        &self.control_store
    }

    /// Completed cycles since construction or the last [`Self::reset`].
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Whether a fault has stopped the machine.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Microinstruction the next cycle will latch, `control_store[MPC]`.
    #[must_use]
    pub fn upcoming_microinstruction(&self) -> u64 {
        self.control_store.get(self.state.registers.mpc())
    }

    /// Executes one cycle.
    ///
    /// # Errors
    ///
    /// Returns the fault raised by this cycle, or the previously latched fault
    /// without executing anything.
    pub fn step(&mut self) -> Result<CycleOutcome, MachineFault> {
        self.step_traced(&mut NoopTraceSink)
    }

    /// Executes one cycle, reporting [`crate::TraceEvent`]s to `sink` when
    /// tracing is enabled in the configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::step`].
    pub fn step_traced(&mut self, sink: &mut dyn TraceSink) -> Result<CycleOutcome, MachineFault> {
        if let Some(fault) = self.run_state.latched_fault() {
            return Err(fault);
        }

        let mut noop = NoopTraceSink;
        let sink: &mut dyn TraceSink = if self.config.tracing_enabled {
            sink
        } else {
            &mut noop
        };

        match step_cycle(&mut self.state, &mut self.memory, &self.control_store, sink) {
            Ok(outcome) => {
                self.cycles += 1;
                Ok(outcome)
            }
            Err(fault) => {
                tracing::warn!(
                    %fault,
                    mpc = self.state.registers.mpc(),
                    cycles = self.cycles,
                    "machine fault"
                );
                self.run_state = RunState::FaultLatched(fault);
                Err(fault)
            }
        }
    }

    /// Runs cycles until `limit` is reached or `inspector` stops the run.
    ///
    /// The inspector is called before every cycle, including the first, and
    /// sees the state left by the previous cycle.
    ///
    /// # Errors
    ///
    /// Returns the first [`MachineFault`]; cycles completed before it remain
    /// counted in [`Self::cycles`].
    pub fn run(
        &mut self,
        limit: RunLimit,
        inspector: &mut dyn Inspector,
    ) -> Result<RunOutcome, MachineFault> {
        let mut completed = 0u64;
        loop {
            if let RunLimit::Cycles(max) = limit {
                if completed >= max {
                    return Ok(RunOutcome {
                        cycles: completed,
                        stop: StopReason::CycleLimit,
                    });
                }
            }
            if inspector.inspect(self) == InspectorAction::Stop {
                return Ok(RunOutcome {
                    cycles: completed,
                    stop: StopReason::Inspector,
                });
            }
            self.step()?;
            completed += 1;
        }
    }

    /// Owned copy of the observable state.
    #[must_use]
    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot::new(&self.state, self.upcoming_microinstruction(), self.cycles)
    }

    /// Zeroes registers, flags, buses, `MIR` and the cycle counter and clears a
    /// latched fault. Memory and the control store are left as they are.
    pub fn reset(&mut self) {
        self.state = ArchitecturalState::default();
        self.cycles = 0;
        self.run_state = RunState::Running;
    }
}

#[cfg(test)]
mod tests {
    use super::Machine;
    use crate::api::{
        Inspector, InspectorAction, MachineConfig, PassiveInspector, RunLimit, RunOutcome,
        StopReason, TraceEvent,
    };
    use crate::decoder::DecodedMicroinstruction;
    use crate::encoding::{CBusMask, MemoryOps};
    use crate::state::RunState;
    use crate::{AccessKind, ControlStore, MachineFault, Register};

    fn small_config() -> MachineConfig {
        MachineConfig {
            memory_bytes: 0x100,
            ..MachineConfig::default()
        }
    }

    /// `H = H + 1; goto 0` at address 0.
    fn counting_store() -> ControlStore {
        ControlStore::from_entries([(
            0,
            DecodedMicroinstruction {
                alu: 57,
                c: CBusMask::H,
                ..DecodedMicroinstruction::default()
            }
            .encode(),
        )])
    }

    struct StopAfter(u32);

    impl Inspector for StopAfter {
        fn inspect(&mut self, _machine: &Machine) -> InspectorAction {
            if self.0 == 0 {
                InspectorAction::Stop
            } else {
                self.0 -= 1;
                InspectorAction::Continue
            }
        }
    }

    #[test]
    fn run_honours_cycle_limit() {
        let mut machine = Machine::new(small_config(), counting_store());
        let outcome = machine
            .run(RunLimit::Cycles(5), &mut PassiveInspector)
            .expect("no fault");
        assert_eq!(
            outcome,
            RunOutcome {
                cycles: 5,
                stop: StopReason::CycleLimit
            }
        );
        assert_eq!(machine.registers().get(Register::H), 5);
        assert_eq!(machine.cycles(), 5);
    }

    #[test]
    fn inspector_can_stop_before_first_cycle() {
        let mut machine = Machine::new(small_config(), counting_store());
        let outcome = machine
            .run(RunLimit::Unbounded, &mut StopAfter(0))
            .expect("no fault");
        assert_eq!(outcome.cycles, 0);
        assert_eq!(outcome.stop, StopReason::Inspector);

        let outcome = machine
            .run(RunLimit::Unbounded, &mut StopAfter(3))
            .expect("no fault");
        assert_eq!(outcome.cycles, 3);
        assert_eq!(machine.registers().get(Register::H), 3);
    }

    #[test]
    fn fault_latches_until_reset() {
        let store = ControlStore::from_entries([(
            0,
            DecodedMicroinstruction {
                b: 7,
                alu: 20,
                c: CBusMask::MAR,
                mem: MemoryOps::READ,
                ..DecodedMicroinstruction::default()
            }
            .encode(),
        )]);
        let mut machine = Machine::new(small_config(), store);
        machine.registers_mut().set(Register::Tos, 0x40);

        let expected = MachineFault::MemoryOutOfBounds {
            kind: AccessKind::WordRead,
            addr: 0x100,
        };
        assert_eq!(machine.step(), Err(expected));
        assert_eq!(machine.run_state(), RunState::FaultLatched(expected));
        assert_eq!(
            machine.run(RunLimit::Cycles(1), &mut PassiveInspector),
            Err(expected)
        );
        assert_eq!(machine.cycles(), 0);

        machine.reset();
        assert_eq!(machine.run_state(), RunState::Running);
        assert_eq!(machine.registers().get(Register::Tos), 0);
        machine.step().expect("TOS is zero after reset");
        assert_eq!(machine.cycles(), 1);
    }

    #[test]
    fn trace_sink_only_receives_events_when_enabled() {
        let mut events: Vec<TraceEvent> = Vec::new();
        let mut machine = Machine::new(small_config(), counting_store());
        machine.step_traced(&mut events).expect("no fault");
        assert!(events.is_empty());

        let config = MachineConfig {
            tracing_enabled: true,
            ..small_config()
        };
        let mut machine = Machine::new(config, counting_store());
        machine.step_traced(&mut events).expect("no fault");
        assert_eq!(
            events,
            vec![TraceEvent::CycleStart {
                mpc: 0,
                mir: counting_store().get(0)
            }]
        );
    }

    #[test]
    fn snapshot_and_reset_cover_observable_state() {
        let mut machine = Machine::new(small_config(), counting_store());
        machine.memory_mut().write_word(1, 0xDEAD_BEEF).expect("in range");
        machine.step().expect("no fault");

        let snap = machine.snapshot();
        assert_eq!(snap.cycles, 1);
        assert_eq!(snap.registers.get(Register::H), 1);
        assert_eq!(snap.mir, counting_store().get(0));
        assert_eq!(snap.upcoming_mir, machine.upcoming_microinstruction());
        assert_eq!(snap.buses.c, 1);

        machine.reset();
        let snap = machine.snapshot();
        assert_eq!(snap.cycles, 0);
        assert_eq!(snap.registers.get(Register::H), 0);
        assert_eq!(snap.mir, 0);
        assert_eq!(snap.buses.c, 0);
        assert_eq!(machine.memory().read_word(1), Ok(0xDEAD_BEEF));
        assert_eq!(machine.control_store().get(0), counting_store().get(0));
    }
}
