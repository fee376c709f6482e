/// Number of register-like cells in the datapath (`MAR` through `MPC`).
pub const REGISTER_COUNT: usize = 11;
/// Mask of the architecturally valid `MPC` bits (0..=511).
pub const MPC_MASK: u16 = 0x01FF;

/// Datapath register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    Mar,
    Mdr,
    Pc,
    Mbr,
    Sp,
    Lv,
    Cpp,
    Tos,
    Opc,
    H,
    Mpc,
}

/// C-bus destinations in write-enable bit order, LSB first.
pub const C_BUS_TARGETS: [Register; 9] = [
    Register::Mar,
    Register::Mdr,
    Register::Pc,
    Register::Sp,
    Register::Lv,
    Register::Cpp,
    Register::Tos,
    Register::Opc,
    Register::H,
];

impl Register {
    /// Registers in inspector display order.
    pub const ALL: [Self; REGISTER_COUNT] = [
        Self::Mar,
        Self::Mdr,
        Self::Pc,
        Self::Mbr,
        Self::Sp,
        Self::Lv,
        Self::Cpp,
        Self::Tos,
        Self::Opc,
        Self::H,
        Self::Mpc,
    ];

    /// Upper-case mnemonic.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mar => "MAR",
            Self::Mdr => "MDR",
            Self::Pc => "PC",
            Self::Mbr => "MBR",
            Self::Sp => "SP",
            Self::Lv => "LV",
            Self::Cpp => "CPP",
            Self::Tos => "TOS",
            Self::Opc => "OPC",
            Self::H => "H",
            Self::Mpc => "MPC",
        }
    }

    /// Architectural width in bits.
    #[must_use]
    pub const fn bit_width(self) -> u32 {
        match self {
            Self::Mbr => 8,
            Self::Mpc => 9,
            _ => 32,
        }
    }
}

/// The datapath register file.
///
/// `MBR` is stored as a byte and `MPC` is masked to nine bits on every write,
/// so neither can hold out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Registers {
    mar: u32,
    mdr: u32,
    pc: u32,
    mbr: u8,
    sp: u32,
    lv: u32,
    cpp: u32,
    tos: u32,
    opc: u32,
    h: u32,
    mpc: u16,
}

impl Registers {
    /// Reads a register, zero-extended to 32 bits.
    #[must_use]
    pub const fn get(&self, reg: Register) -> u32 {
        match reg {
            Register::Mar => self.mar,
            Register::Mdr => self.mdr,
            Register::Pc => self.pc,
            Register::Mbr => self.mbr as u32,
            Register::Sp => self.sp,
            Register::Lv => self.lv,
            Register::Cpp => self.cpp,
            Register::Tos => self.tos,
            Register::Opc => self.opc,
            Register::H => self.h,
            Register::Mpc => self.mpc as u32,
        }
    }

    /// Writes a register, truncating to its architectural width.
    pub fn set(&mut self, reg: Register, value: u32) {
        match reg {
            Register::Mar => self.mar = value,
            Register::Mdr => self.mdr = value,
            Register::Pc => self.pc = value,
            Register::Mbr => self.mbr = (value & 0xFF) as u8,
            Register::Sp => self.sp = value,
            Register::Lv => self.lv = value,
            Register::Cpp => self.cpp = value,
            Register::Tos => self.tos = value,
            Register::Opc => self.opc = value,
            Register::H => self.h = value,
            Register::Mpc => self.mpc = (value & u32::from(MPC_MASK)) as u16,
        }
    }

    /// Reads `MBR`.
    #[must_use]
    pub const fn mbr(&self) -> u8 {
        self.mbr
    }

    /// Writes `MBR`.
    pub fn set_mbr(&mut self, value: u8) {
        self.mbr = value;
    }

    /// Reads `MPC`.
    #[must_use]
    pub const fn mpc(&self) -> u16 {
        self.mpc
    }

    /// Writes `MPC`, keeping only the low nine bits.
    pub fn set_mpc(&mut self, value: u16) {
        self.mpc = value & MPC_MASK;
    }
}
