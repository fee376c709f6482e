//! Microinstruction field layout and sparse dispatch tables.
//!
//! [`MicroField`] is the single source of truth for bit positions; decode,
//! encode and the inspector's grouped binary rendering all derive from it.

use bitflags::bitflags;

use crate::state::registers::{Register, C_BUS_TARGETS};

/// Number of significant bits in a microinstruction.
pub const MICROINSTRUCTION_BITS: u32 = 36;
/// Mask of the significant microinstruction bits.
pub const MICROINSTRUCTION_MASK: u64 = (1 << MICROINSTRUCTION_BITS) - 1;

/// Named microinstruction fields in ascending bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MicroField {
    /// B-bus source selector.
    B,
    /// Memory operation bitmask.
    Mem,
    /// C-bus write-enable mask.
    C,
    /// ALU operation code.
    Alu,
    /// Post-ALU shifter control.
    Shift,
    /// Jump modifier bits.
    Jump,
    /// Base of the next micro-program counter.
    NextMpc,
}

impl MicroField {
    /// All fields ordered from bit 0 upwards.
    pub const ALL: [Self; 7] = [
        Self::B,
        Self::Mem,
        Self::C,
        Self::Alu,
        Self::Shift,
        Self::Jump,
        Self::NextMpc,
    ];

    /// Bit offset of the field's least significant bit.
    #[must_use]
    pub const fn offset(self) -> u32 {
        match self {
            Self::B => 0,
            Self::Mem => 4,
            Self::C => 7,
            Self::Alu => 16,
            Self::Shift => 22,
            Self::Jump => 24,
            Self::NextMpc => 27,
        }
    }

    /// Width of the field in bits.
    #[must_use]
    pub const fn width(self) -> u32 {
        match self {
            Self::B => 4,
            Self::Mem | Self::Jump => 3,
            Self::C | Self::NextMpc => 9,
            Self::Alu => 6,
            Self::Shift => 2,
        }
    }

    /// Right-aligned mask for the field value.
    #[must_use]
    pub const fn mask(self) -> u64 {
        (1 << self.width()) - 1
    }

    /// Extracts this field from a microinstruction.
    #[must_use]
    pub const fn extract(self, mir: u64) -> u64 {
        (mir >> self.offset()) & self.mask()
    }

    /// Returns `mir` with this field replaced by `value` (truncated to width).
    #[must_use]
    pub const fn insert(self, mir: u64, value: u64) -> u64 {
        let cleared = mir & !(self.mask() << self.offset());
        cleared | ((value & self.mask()) << self.offset())
    }

    /// Short field label used by listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::B => "B",
            Self::Mem => "MEM",
            Self::C => "C",
            Self::Alu => "ALU",
            Self::Shift => "SH",
            Self::Jump => "JAM",
            Self::NextMpc => "NEXT",
        }
    }
}

const _: () = assert_field_layout();

const fn assert_field_layout() {
    let mut index = 0;
    let mut expected_offset = 0;
    while index < MicroField::ALL.len() {
        let field = MicroField::ALL[index];
        assert!(
            field.offset() == expected_offset,
            "microinstruction fields must be contiguous"
        );
        expected_offset += field.width();
        index += 1;
    }
    assert!(
        expected_offset == MICROINSTRUCTION_BITS,
        "microinstruction fields must cover all significant bits"
    );
}

/// Register (or extension of `MBR`) driven onto the B-bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BusBSource {
    Mdr,
    Pc,
    /// `MBR` sign-extended from bit 7.
    MbrSigned,
    /// `MBR` zero-extended.
    MbrUnsigned,
    Sp,
    Lv,
    Cpp,
    Tos,
    Opc,
    /// Unassigned selector; the bus floats to all ones.
    Undefined,
}

/// Dense B-bus selector table indexed by the 4-bit `B` field.
pub const BUS_B_SOURCE_TABLE: [BusBSource; 16] = [
    BusBSource::Mdr,
    BusBSource::Pc,
    BusBSource::MbrSigned,
    BusBSource::MbrUnsigned,
    BusBSource::Sp,
    BusBSource::Lv,
    BusBSource::Cpp,
    BusBSource::Tos,
    BusBSource::Opc,
    BusBSource::Undefined,
    BusBSource::Undefined,
    BusBSource::Undefined,
    BusBSource::Undefined,
    BusBSource::Undefined,
    BusBSource::Undefined,
    BusBSource::Undefined,
];

impl BusBSource {
    /// Looks up the source for a `B` field value.
    #[must_use]
    pub const fn from_selector(selector: u8) -> Self {
        BUS_B_SOURCE_TABLE[(selector & 0x0F) as usize]
    }

    /// Operand name used in disassembly.
    #[must_use]
    pub const fn operand_name(self) -> &'static str {
        match self {
            Self::Mdr => "MDR",
            Self::Pc => "PC",
            Self::MbrSigned => "MBR",
            Self::MbrUnsigned => "MBRU",
            Self::Sp => "SP",
            Self::Lv => "LV",
            Self::Cpp => "CPP",
            Self::Tos => "TOS",
            Self::Opc => "OPC",
            Self::Undefined => "0xFFFFFFFF",
        }
    }
}

/// ALU function selected by the `ALU` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOperation {
    /// `H AND B`
    And,
    /// Constant `1`.
    One,
    /// Constant `-1`.
    MinusOne,
    /// `B`
    PassB,
    /// `H`
    PassH,
    /// `NOT H`
    NotH,
    /// `H OR B`
    Or,
    /// `NOT B`
    NotB,
    /// `B + 1`
    IncB,
    /// `B - 1`
    DecB,
    /// `H + 1`
    IncH,
    /// `-H`
    NegH,
    /// `H + B`
    Add,
    /// `H + B + 1`
    AddInc,
    /// `B - H`
    SubBH,
    /// Unassigned code; the ALU outputs zero.
    Undefined,
}

/// Assigned ALU codes. Any code not listed here is undefined.
pub const ALU_OPERATIONS: &[(u8, AluOperation)] = &[
    (12, AluOperation::And),
    (17, AluOperation::One),
    (18, AluOperation::MinusOne),
    (20, AluOperation::PassB),
    (24, AluOperation::PassH),
    (26, AluOperation::NotH),
    (28, AluOperation::Or),
    (44, AluOperation::NotB),
    (53, AluOperation::IncB),
    (54, AluOperation::DecB),
    (57, AluOperation::IncH),
    (59, AluOperation::NegH),
    (60, AluOperation::Add),
    (61, AluOperation::AddInc),
    (63, AluOperation::SubBH),
];

/// Dense ALU table indexed by the 6-bit `ALU` field.
pub const ALU_OPERATION_TABLE: [AluOperation; 64] = build_alu_table();

const fn build_alu_table() -> [AluOperation; 64] {
    let mut table = [AluOperation::Undefined; 64];
    let mut index = 0;
    while index < ALU_OPERATIONS.len() {
        let (code, operation) = ALU_OPERATIONS[index];
        table[code as usize] = operation;
        index += 1;
    }
    table
}

impl AluOperation {
    /// Looks up the operation for an `ALU` field value.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        ALU_OPERATION_TABLE[(code & 0x3F) as usize]
    }

    /// Canonical code for this operation, `None` for [`Self::Undefined`].
    #[must_use]
    pub fn code(self) -> Option<u8> {
        ALU_OPERATIONS
            .iter()
            .find_map(|(code, operation)| (*operation == self).then_some(*code))
    }

    /// Renders the operation with `b` as the B-bus operand name.
    #[must_use]
    pub fn render(self, b: &str) -> String {
        match self {
            Self::And => format!("H AND {b}"),
            Self::One => "1".to_string(),
            Self::MinusOne => "-1".to_string(),
            Self::PassB => b.to_string(),
            Self::PassH => "H".to_string(),
            Self::NotH => "NOT H".to_string(),
            Self::Or => format!("H OR {b}"),
            Self::NotB => format!("NOT {b}"),
            Self::IncB => format!("{b} + 1"),
            Self::DecB => format!("{b} - 1"),
            Self::IncH => "H + 1".to_string(),
            Self::NegH => "-H".to_string(),
            Self::Add => format!("H + {b}"),
            Self::AddInc => format!("H + {b} + 1"),
            Self::SubBH => format!("{b} - H"),
            Self::Undefined => "0".to_string(),
        }
    }
}

/// Post-ALU shifter setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shift {
    /// Pass the ALU output through.
    #[default]
    None,
    /// Logical shift left by 8.
    Left8,
    /// Logical shift right by 1.
    Right1,
}

impl Shift {
    /// Decodes the 2-bit field; the unassigned value 3 passes through.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            1 => Self::Left8,
            2 => Self::Right1,
            _ => Self::None,
        }
    }

    /// Applies the shifter to a pre-shift ALU value.
    #[must_use]
    pub const fn apply(self, value: u32) -> u32 {
        match self {
            Self::None => value,
            Self::Left8 => value << 8,
            Self::Right1 => value >> 1,
        }
    }
}

bitflags! {
    /// Memory operations requested by the `MEM` field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
    pub struct MemoryOps: u8 {
        /// `MBR <- memory[PC]`.
        const FETCH = 1 << 0;
        /// `MDR <- word at MAR`.
        const READ = 1 << 1;
        /// `word at MAR <- MDR`.
        const WRITE = 1 << 2;
    }
}

bitflags! {
    /// Jump modifiers requested by the `JAM` field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
    pub struct JumpBits: u8 {
        /// OR `N` into MPC bit 8.
        const JAMN = 1 << 0;
        /// OR `Z` into MPC bit 8.
        const JAMZ = 1 << 1;
        /// OR `MBR` into the low eight MPC bits.
        const JMPC = 1 << 2;
    }
}

bitflags! {
    /// C-bus write enables, one bit per destination register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
    pub struct CBusMask: u16 {
        /// Write `MAR`.
        const MAR = 1 << 0;
        /// Write `MDR`.
        const MDR = 1 << 1;
        /// Write `PC`.
        const PC = 1 << 2;
        /// Write `SP`.
        const SP = 1 << 3;
        /// Write `LV`.
        const LV = 1 << 4;
        /// Write `CPP`.
        const CPP = 1 << 5;
        /// Write `TOS`.
        const TOS = 1 << 6;
        /// Write `OPC`.
        const OPC = 1 << 7;
        /// Write `H`.
        const H = 1 << 8;
    }
}

impl CBusMask {
    /// Returns `true` when `register` is write-enabled.
    #[must_use]
    pub fn enables(self, register: Register) -> bool {
        C_BUS_TARGETS
            .iter()
            .position(|target| *target == register)
            .is_some_and(|bit| self.bits() & (1u16 << bit) != 0)
    }

    /// Enabled destinations in C-bus bit order.
    pub fn targets(self) -> impl Iterator<Item = Register> {
        C_BUS_TARGETS
            .into_iter()
            .enumerate()
            .filter(move |(bit, _)| self.bits() & (1u16 << *bit) != 0)
            .map(|(_, register)| register)
    }
}
