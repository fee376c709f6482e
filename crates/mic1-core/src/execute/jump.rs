//! Next-MPC computation.

use crate::encoding::JumpBits;
use crate::state::MPC_MASK;
use crate::Flags;

/// Combines the `NEXT` field with the jump modifiers.
///
/// `JAMN` and `JAMZ` OR the corresponding flag into bit 8, `JMPC` ORs in
/// `MBR`. All three may be set at once. The result always fits in nine bits.
#[must_use]
pub const fn next_mpc(base: u16, jump: JumpBits, flags: Flags, mbr: u8) -> u16 {
    let mut mpc = base & MPC_MASK;
    if jump.contains(JumpBits::JAMN) {
        mpc |= flags.n_bit() << 8;
    }
    if jump.contains(JumpBits::JAMZ) {
        mpc |= flags.z_bit() << 8;
    }
    if jump.contains(JumpBits::JMPC) {
        mpc |= mbr as u16;
    }
    mpc
}

#[cfg(test)]
mod tests {
    use super::next_mpc;
    use crate::encoding::JumpBits;
    use crate::Flags;

    const ZERO: Flags = Flags { n: false, z: true };
    const NONZERO: Flags = Flags { n: true, z: false };

    #[test]
    fn no_modifiers_keeps_next_field() {
        assert_eq!(next_mpc(0x0A, JumpBits::empty(), ZERO, 0xFF), 0x0A);
    }

    #[test]
    fn jamz_sets_bit_eight_on_zero_result() {
        assert_eq!(next_mpc(0x0A, JumpBits::JAMZ, ZERO, 0), 0x10A);
        assert_eq!(next_mpc(0x0A, JumpBits::JAMZ, NONZERO, 0), 0x00A);
    }

    #[test]
    fn jamn_sets_bit_eight_on_nonzero_result() {
        assert_eq!(next_mpc(0x0A, JumpBits::JAMN, NONZERO, 0), 0x10A);
        assert_eq!(next_mpc(0x0A, JumpBits::JAMN, ZERO, 0), 0x00A);
    }

    #[test]
    fn jmpc_ors_mbr_into_low_bits() {
        assert_eq!(next_mpc(0x100, JumpBits::JMPC, ZERO, 0xFF), 0x1FF);
        assert_eq!(next_mpc(0x000, JumpBits::JMPC, ZERO, 0x59), 0x059);
    }

    #[test]
    fn modifiers_combine_by_or() {
        let all = JumpBits::JAMN | JumpBits::JAMZ | JumpBits::JMPC;
        assert_eq!(next_mpc(0x001, all, ZERO, 0x10), 0x111);
    }
}
