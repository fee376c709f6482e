//! B-bus multiplexer and C-bus fan-out.

use crate::encoding::{BusBSource, CBusMask};
use crate::{Register, Registers};

/// Value driven onto the B-bus by `source`.
///
/// `MBR` is widened here and only here: selector 2 sign-extends from bit 7,
/// selector 3 zero-extends. Undefined selectors float to all ones.
#[must_use]
pub const fn drive_b(registers: &Registers, source: BusBSource) -> u32 {
    match source {
        BusBSource::Mdr => registers.get(Register::Mdr),
        BusBSource::Pc => registers.get(Register::Pc),
        BusBSource::MbrSigned => registers.mbr() as i8 as i32 as u32,
        BusBSource::MbrUnsigned => registers.mbr() as u32,
        BusBSource::Sp => registers.get(Register::Sp),
        BusBSource::Lv => registers.get(Register::Lv),
        BusBSource::Cpp => registers.get(Register::Cpp),
        BusBSource::Tos => registers.get(Register::Tos),
        BusBSource::Opc => registers.get(Register::Opc),
        BusBSource::Undefined => u32::MAX,
    }
}

/// Writes `value` to every register enabled in `mask`.
pub fn fan_out_c(registers: &mut Registers, mask: CBusMask, value: u32) {
    for target in mask.targets() {
        registers.set(target, value);
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{drive_b, fan_out_c};
    use crate::encoding::{BusBSource, CBusMask};
    use crate::{Register, Registers, C_BUS_TARGETS};

    #[rstest]
    #[case(0x80, 0xFFFF_FF80)]
    #[case(0xFF, 0xFFFF_FFFF)]
    #[case(0x7F, 0x0000_007F)]
    #[case(0x00, 0x0000_0000)]
    fn selector_two_sign_extends_mbr(#[case] mbr: u8, #[case] expected: u32) {
        let mut regs = Registers::default();
        regs.set_mbr(mbr);
        assert_eq!(drive_b(&regs, BusBSource::MbrSigned), expected);
    }

    #[test]
    fn selector_three_zero_extends_mbr() {
        let mut regs = Registers::default();
        regs.set_mbr(0x80);
        assert_eq!(drive_b(&regs, BusBSource::MbrUnsigned), 0x0000_0080);
    }

    #[test]
    fn register_sources_and_undefined_lane() {
        let mut regs = Registers::default();
        regs.set(Register::Mdr, 1);
        regs.set(Register::Pc, 2);
        regs.set(Register::Sp, 3);
        regs.set(Register::Lv, 4);
        regs.set(Register::Cpp, 5);
        regs.set(Register::Tos, 6);
        regs.set(Register::Opc, 7);
        let driven: Vec<_> = (0u8..=8)
            .filter(|selector| !matches!(selector, 2 | 3))
            .map(|selector| drive_b(&regs, BusBSource::from_selector(selector)))
            .collect();
        assert_eq!(driven, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(drive_b(&regs, BusBSource::Undefined), 0xFFFF_FFFF);
    }

    #[test]
    fn fan_out_writes_all_enabled_targets_with_same_value() {
        let mut regs = Registers::default();
        fan_out_c(&mut regs, CBusMask::all(), 0xCAFE_F00D);
        for target in C_BUS_TARGETS {
            assert_eq!(regs.get(target), 0xCAFE_F00D, "{}", target.name());
        }
        assert_eq!(regs.mbr(), 0);
        assert_eq!(regs.mpc(), 0);
    }

    #[test]
    fn fan_out_leaves_disabled_targets_untouched() {
        let mut regs = Registers::default();
        regs.set(Register::Sp, 0x55);
        fan_out_c(&mut regs, CBusMask::TOS | CBusMask::H, 9);
        assert_eq!(regs.get(Register::Tos), 9);
        assert_eq!(regs.get(Register::H), 9);
        assert_eq!(regs.get(Register::Sp), 0x55);
        assert_eq!(regs.get(Register::Mar), 0);
    }
}
