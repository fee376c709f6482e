//! Microinstruction disassembly.
//!
//! Renders control-store words in a MAL-like notation, for example
//! `MAR = PC = PC + 1; fetch; goto 0x002`. Statements appear in datapath
//! order: assignment, memory operations, then control transfer.

use std::ops::Range;

use crate::control_store::{ControlStore, CONTROL_STORE_SIZE};
use crate::decoder::{DecodedMicroinstruction, Decoder};
use crate::encoding::{JumpBits, MemoryOps, Shift};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled control-store word.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Control-store address.
    pub addr: u16,
    /// Raw 36-bit microinstruction.
    pub mir: u64,
    /// Rendered statement list.
    pub text: String,
}

/// Renders one microinstruction.
#[must_use]
pub fn describe(mir: u64) -> String {
    let decoded = Decoder::decode(mir);
    let mut statements = Vec::with_capacity(3);

    if let Some(assignment) = format_assignment(&decoded) {
        statements.push(assignment);
    }
    statements.extend(format_memory(decoded.mem));
    statements.push(format_jump(&decoded));

    statements.join("; ")
}

/// Disassembles the addresses in `range`, clipped to the control store.
#[must_use]
pub fn disassemble_range(store: &ControlStore, range: Range<u16>) -> Vec<DisassemblyRow> {
    let end = range.end.min(CONTROL_STORE_SIZE as u16);
    (range.start..end).map(|addr| row(store, addr)).collect()
}

/// Disassembles every non-zero word, the populated part of a typical ROM.
#[must_use]
pub fn disassemble_listing(store: &ControlStore) -> Vec<DisassemblyRow> {
    (0u16..)
        .zip(store.words())
        .filter(|(_, mir)| **mir != 0)
        .map(|(addr, mir)| DisassemblyRow {
            addr,
            mir: *mir,
            text: describe(*mir),
        })
        .collect()
}

fn row(store: &ControlStore, addr: u16) -> DisassemblyRow {
    let mir = store.get(addr);
    DisassemblyRow {
        addr,
        mir,
        text: describe(mir),
    }
}

// An assignment with no C-bus targets is still shown when a JAM bit makes
// the flags observable.
fn format_assignment(decoded: &DecodedMicroinstruction) -> Option<String> {
    let targets: Vec<&str> = decoded.c.targets().map(|reg| reg.name()).collect();
    let flags_used = decoded.jump.contains(JumpBits::JAMN) || decoded.jump.contains(JumpBits::JAMZ);
    if targets.is_empty() && !flags_used {
        return None;
    }

    let expr = format_expression(decoded);
    if targets.is_empty() {
        return Some(expr);
    }
    Some(format!("{} = {expr}", targets.join(" = ")))
}

fn format_expression(decoded: &DecodedMicroinstruction) -> String {
    let expr = decoded
        .alu_operation()
        .render(decoded.bus_b_source().operand_name());
    let operand = if expr.contains(' ') {
        format!("({expr})")
    } else {
        expr.clone()
    };
    match decoded.shifter() {
        Shift::None => expr,
        Shift::Left8 => format!("{operand} << 8"),
        Shift::Right1 => format!("{operand} >> 1"),
    }
}

fn format_memory(mem: MemoryOps) -> impl Iterator<Item = String> {
    [
        (MemoryOps::READ, "rd"),
        (MemoryOps::WRITE, "wr"),
        (MemoryOps::FETCH, "fetch"),
    ]
    .into_iter()
    .filter(move |(op, _)| mem.contains(*op))
    .map(|(_, name)| name.to_string())
}

fn format_jump(decoded: &DecodedMicroinstruction) -> String {
    let jump = decoded.jump;
    let target = |base: u16| {
        if !jump.contains(JumpBits::JMPC) {
            format!("0x{base:03X}")
        } else if base == 0 {
            "(MBR)".to_string()
        } else {
            format!("(MBR OR 0x{base:03X})")
        }
    };

    let condition = match (jump.contains(JumpBits::JAMN), jump.contains(JumpBits::JAMZ)) {
        (true, true) => Some("N OR Z"),
        (true, false) => Some("N"),
        (false, true) => Some("Z"),
        (false, false) => None,
    };

    let base = decoded.next_mpc;
    match condition {
        Some(condition) => format!(
            "if ({condition}) goto {}; else goto {}",
            target(base | 0x100),
            target(base)
        ),
        None => format!("goto {}", target(base)),
    }
}

#[cfg(test)]
mod tests {
    use super::{describe, disassemble_listing, disassemble_range};
    use crate::control_store::ControlStore;
    use crate::decoder::DecodedMicroinstruction;
    use crate::encoding::{CBusMask, JumpBits, MemoryOps};

    fn word(decoded: DecodedMicroinstruction) -> u64 {
        decoded.encode()
    }

    #[test]
    fn describe_pc_increment_with_fetch() {
        let mir = word(DecodedMicroinstruction {
            b: 1,
            alu: 53,
            c: CBusMask::MAR | CBusMask::PC,
            mem: MemoryOps::FETCH,
            next_mpc: 2,
            ..DecodedMicroinstruction::default()
        });
        assert_eq!(describe(mir), "MAR = PC = PC + 1; fetch; goto 0x002");
    }

    #[test]
    fn describe_all_zero_word() {
        assert_eq!(describe(0), "goto 0x000");
    }

    #[test]
    fn describe_shifted_expressions() {
        let mir = word(DecodedMicroinstruction {
            b: 3,
            alu: 20,
            shift: 1,
            c: CBusMask::H,
            ..DecodedMicroinstruction::default()
        });
        assert_eq!(describe(mir), "H = MBRU << 8; goto 0x000");

        let mir = word(DecodedMicroinstruction {
            b: 7,
            alu: 60,
            shift: 2,
            c: CBusMask::TOS,
            mem: MemoryOps::READ | MemoryOps::WRITE,
            next_mpc: 0x10,
            ..DecodedMicroinstruction::default()
        });
        assert_eq!(describe(mir), "TOS = (H + TOS) >> 1; rd; wr; goto 0x010");
    }

    #[test]
    fn describe_conditional_branch_shows_flag_expression() {
        let mir = word(DecodedMicroinstruction {
            b: 7,
            alu: 20,
            jump: JumpBits::JAMZ,
            next_mpc: 0x0A,
            ..DecodedMicroinstruction::default()
        });
        assert_eq!(describe(mir), "TOS; if (Z) goto 0x10A; else goto 0x00A");
    }

    #[test]
    fn describe_multiway_branch() {
        let mir = word(DecodedMicroinstruction {
            jump: JumpBits::JMPC,
            ..DecodedMicroinstruction::default()
        });
        assert_eq!(describe(mir), "goto (MBR)");

        let mir = word(DecodedMicroinstruction {
            jump: JumpBits::JMPC,
            next_mpc: 0x100,
            ..DecodedMicroinstruction::default()
        });
        assert_eq!(describe(mir), "goto (MBR OR 0x100)");
    }

    #[test]
    fn describe_undefined_selector_and_opcode() {
        let mir = word(DecodedMicroinstruction {
            b: 12,
            alu: 20,
            c: CBusMask::OPC,
            ..DecodedMicroinstruction::default()
        });
        assert_eq!(describe(mir), "OPC = 0xFFFFFFFF; goto 0x000");

        let mir = word(DecodedMicroinstruction {
            alu: 1,
            c: CBusMask::H,
            ..DecodedMicroinstruction::default()
        });
        assert_eq!(describe(mir), "H = 0; goto 0x000");
    }

    #[test]
    fn listing_skips_empty_words_and_range_clips() {
        let store = ControlStore::from_entries([
            (
                1,
                word(DecodedMicroinstruction {
                    next_mpc: 5,
                    ..DecodedMicroinstruction::default()
                }),
            ),
            (
                511,
                word(DecodedMicroinstruction {
                    alu: 17,
                    c: CBusMask::H,
                    ..DecodedMicroinstruction::default()
                }),
            ),
        ]);
        let listing = disassemble_listing(&store);
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].addr, 1);
        assert_eq!(listing[0].text, "goto 0x005");
        assert_eq!(listing[1].addr, 511);
        assert_eq!(listing[1].text, "H = 1; goto 0x000");

        let rows = disassemble_range(&store, 510..600);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "goto 0x000");
    }
}
