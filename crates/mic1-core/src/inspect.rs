//! Human-readable machine status for interactive inspection.

use std::fmt;

use crate::api::MachineSnapshot;
use crate::disasm::describe;
use crate::encoding::{MicroField, MICROINSTRUCTION_BITS};
use crate::Register;

/// Renders the low `width` bits of `value` in binary, most significant first.
///
/// Widths that are a multiple of eight are split into space-separated bytes.
#[must_use]
pub fn format_binary(value: u64, width: u32) -> String {
    let grouped = width % 8 == 0 && width > 8;
    let mut out = String::with_capacity(width as usize + width as usize / 8);
    for bit in (0..width).rev() {
        out.push(if (value >> bit) & 1 == 1 { '1' } else { '0' });
        if grouped && bit != 0 && bit % 8 == 0 {
            out.push(' ');
        }
    }
    out
}

/// Renders a microinstruction in binary with one group per field, from
/// `NEXT` down to `B`.
#[must_use]
pub fn format_microinstruction(mir: u64) -> String {
    MicroField::ALL
        .iter()
        .rev()
        .map(|field| format_binary(field.extract(mir), field.width()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bit positions followed by a space in [`format_microinstruction_flat`].
pub const FLAT_MIR_BREAKS: [u32; 5] = [32, 29, 20, 12, 9];

/// Renders a microinstruction with fixed breaks that do not follow the
/// field boundaries.
#[must_use]
pub fn format_microinstruction_flat(mir: u64) -> String {
    let mut out = String::with_capacity(41);
    for bit in (0..MICROINSTRUCTION_BITS).rev() {
        out.push(if (mir >> bit) & 1 == 1 { '1' } else { '0' });
        if FLAT_MIR_BREAKS.contains(&bit) {
            out.push(' ');
        }
    }
    out
}

/// Field labels aligned over [`format_microinstruction`] output.
#[must_use]
pub fn microinstruction_legend() -> String {
    MicroField::ALL
        .iter()
        .rev()
        .map(|field| format!("{:<width$}", field.label(), width = field.width() as usize))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

/// Status report printed between cycles.
#[derive(Debug, Clone, Copy)]
pub struct StatusReport {
    snapshot: MachineSnapshot,
}

impl StatusReport {
    /// Wraps a snapshot for display.
    #[must_use]
    pub const fn new(snapshot: MachineSnapshot) -> Self {
        Self { snapshot }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snap = &self.snapshot;
        writeln!(f, "==================== MACHINE STATE ====================")?;
        writeln!(f, "CYCLE: {}", snap.cycles)?;
        writeln!(f)?;
        writeln!(f, "REGISTERS:")?;
        for reg in Register::ALL {
            let value = snap.registers.get(reg);
            writeln!(
                f,
                "{:<3}: {} ({value:X})",
                reg.name(),
                format_binary(u64::from(value), reg.bit_width())
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "FLAGS: N={} Z={}",
            u8::from(snap.flags.n),
            u8::from(snap.flags.z)
        )?;
        writeln!(f, "BUSES: B={:08X} C={:08X}", snap.buses.b, snap.buses.c)?;
        writeln!(f)?;
        writeln!(f, "      {}", microinstruction_legend())?;
        writeln!(f, "MIR:  {}", format_microinstruction(snap.mir))?;
        writeln!(f, "RAW:  {}", format_microinstruction_flat(snap.mir))?;
        write!(f, "NEXT: {}", describe(snap.upcoming_mir))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        format_binary, format_microinstruction, format_microinstruction_flat,
        microinstruction_legend, StatusReport,
    };
    use crate::api::MachineSnapshot;
    use crate::decoder::DecodedMicroinstruction;
    use crate::encoding::{CBusMask, MemoryOps};
    use crate::state::ArchitecturalState;
    use crate::Register;

    #[test]
    fn binary_widths() {
        assert_eq!(format_binary(0x1FF, 9), "111111111");
        assert_eq!(format_binary(0x80, 8), "10000000");
        assert_eq!(
            format_binary(0x0102_0304, 32),
            "00000001 00000010 00000011 00000100"
        );
    }

    #[test]
    fn microinstruction_groups_follow_field_layout() {
        let mir = DecodedMicroinstruction {
            b: 1,
            alu: 53,
            c: CBusMask::MAR | CBusMask::PC,
            mem: MemoryOps::FETCH,
            next_mpc: 2,
            ..DecodedMicroinstruction::default()
        }
        .encode();
        assert_eq!(
            format_microinstruction(mir),
            "000000010 000 00 110101 000000101 001 0001"
        );
        assert_eq!(microinstruction_legend(), "NEXT      JAM SH ALU    C         MEM B");
    }

    #[test]
    fn flat_grouping_breaks_after_fixed_bits() {
        assert_eq!(
            format_microinstruction_flat(0x0_1035_0291),
            "0000 000 100000011 01010000 001 010010001"
        );
        assert_eq!(
            format_microinstruction_flat(u64::MAX),
            "1111 111 111111111 11111111 111 111111111"
        );
    }

    #[test]
    fn report_lists_registers_flags_and_upcoming_instruction() {
        let mut state = ArchitecturalState::default();
        state.registers.set(Register::Tos, 0xAB);
        state.registers.set_mbr(0x80);
        state.flags.z = true;
        let report = StatusReport::new(MachineSnapshot::new(&state, 0, 7)).to_string();

        assert!(report.contains("CYCLE: 7"));
        assert!(report.contains("TOS: 00000000 00000000 00000000 10101011 (AB)"));
        assert!(report.contains("MBR: 10000000 (80)"));
        assert!(report.contains("MPC: 000000000 (0)"));
        assert!(report.contains("H  : "));
        assert!(report.contains("FLAGS: N=0 Z=1"));
        assert!(report.contains("RAW:  0000 000 000000000 00000000 000 000000000"));
        assert!(report.ends_with("NEXT: goto 0x000"));
    }
}
