//! Microinstruction decoder.
//!
//! Splits the 36-bit `MIR` into its six named fields by shift-and-mask over
//! the [`MicroField`] layout. Decoding never fails: unassigned selectors and
//! ALU codes are carried through and resolved to fallback lanes later.

use crate::encoding::{
    AluOperation, BusBSource, CBusMask, JumpBits, MemoryOps, MicroField, Shift,
};

/// A microinstruction split into its fields.
///
/// Raw field values are kept so that [`Self::encode`] reproduces the original
/// word bit for bit, including unassigned codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DecodedMicroinstruction {
    /// B-bus selector (4 bits).
    pub b: u8,
    /// Memory operations.
    pub mem: MemoryOps,
    /// C-bus write enables.
    pub c: CBusMask,
    /// ALU code (6 bits).
    pub alu: u8,
    /// Shifter control (2 bits).
    pub shift: u8,
    /// Jump modifiers.
    pub jump: JumpBits,
    /// Base of the next micro-program counter (9 bits).
    pub next_mpc: u16,
}

impl DecodedMicroinstruction {
    /// Resolved B-bus source.
    #[must_use]
    pub const fn bus_b_source(&self) -> BusBSource {
        BusBSource::from_selector(self.b)
    }

    /// Resolved ALU operation.
    #[must_use]
    pub const fn alu_operation(&self) -> AluOperation {
        AluOperation::from_code(self.alu)
    }

    /// Resolved shifter setting.
    #[must_use]
    pub const fn shifter(&self) -> Shift {
        Shift::from_bits(self.shift)
    }

    /// Re-encodes the fields into a 36-bit microinstruction.
    #[must_use]
    pub const fn encode(&self) -> u64 {
        let mut mir = MicroField::B.insert(0, self.b as u64);
        mir = MicroField::Mem.insert(mir, self.mem.bits() as u64);
        mir = MicroField::C.insert(mir, self.c.bits() as u64);
        mir = MicroField::Alu.insert(mir, self.alu as u64);
        mir = MicroField::Shift.insert(mir, self.shift as u64);
        mir = MicroField::Jump.insert(mir, self.jump.bits() as u64);
        MicroField::NextMpc.insert(mir, self.next_mpc as u64)
    }
}

/// Stateless microinstruction decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder;

impl Decoder {
    /// Decodes a microinstruction. Bits above bit 35 are ignored.
    #[must_use]
    pub const fn decode(mir: u64) -> DecodedMicroinstruction {
        DecodedMicroinstruction {
            b: MicroField::B.extract(mir) as u8,
            mem: MemoryOps::from_bits_truncate(MicroField::Mem.extract(mir) as u8),
            c: CBusMask::from_bits_truncate(MicroField::C.extract(mir) as u16),
            alu: MicroField::Alu.extract(mir) as u8,
            shift: MicroField::Shift.extract(mir) as u8,
            jump: JumpBits::from_bits_truncate(MicroField::Jump.extract(mir) as u8),
            next_mpc: MicroField::NextMpc.extract(mir) as u16,
        }
    }
}
