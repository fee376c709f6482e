//! Flag derivation from the pre-shift ALU result.

use crate::Flags;

/// Computes `N` and `Z` for an ALU result.
///
/// `Z` is set for a zero result and `N` for any nonzero result, so exactly one
/// of the two is set after every cycle.
#[must_use]
pub const fn flags_for(result: u32) -> Flags {
    Flags {
        n: result != 0,
        z: result == 0,
    }
}
