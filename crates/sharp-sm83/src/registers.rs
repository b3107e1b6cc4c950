//! SM83 register set.

use crate::flags::FLAG_MASK;

/// Which power-on snapshot to start from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PowerOn {
    /// Everything zero. Execution begins at 0x0000 inside the boot overlay.
    #[default]
    BareMetal,
    /// The state the boot program leaves behind when it hands over to the
    /// cartridge at 0x0100.
    PostBoot,
}

/// SM83 registers snapshot for observation.
///
/// Pairs are formed with the first-named register in the high byte:
/// A is the high byte of AF and F the low byte, B:C, D:E, H:L likewise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    pub sp: u16,
    pub pc: u16,

    /// Interrupt master enable.
    pub ime: bool,
    /// Set by HALT. Cleared by interrupt delivery.
    pub halted: bool,
    /// Set by STOP. Cleared by interrupt delivery.
    pub stopped: bool,
}

impl Registers {
    /// Register file for the given power-on snapshot.
    #[must_use]
    pub const fn power_on(mode: PowerOn) -> Self {
        match mode {
            PowerOn::BareMetal => Self {
                a: 0,
                f: 0,
                b: 0,
                c: 0,
                d: 0,
                e: 0,
                h: 0,
                l: 0,
                sp: 0,
                pc: 0,
                ime: false,
                halted: false,
                stopped: false,
            },
            PowerOn::PostBoot => Self {
                a: 0x01,
                f: 0xB0,
                b: 0x00,
                c: 0x13,
                d: 0x00,
                e: 0xD8,
                h: 0x01,
                l: 0x4D,
                sp: 0xFFFE,
                pc: 0x0100,
                ime: true,
                halted: false,
                stopped: false,
            },
        }
    }

    /// Get AF register pair.
    #[must_use]
    pub const fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f])
    }

    /// Get BC register pair.
    #[must_use]
    pub const fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    /// Get DE register pair.
    #[must_use]
    pub const fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    /// Get HL register pair.
    #[must_use]
    pub const fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    /// Set AF register pair. The low nibble of F is forced to zero.
    pub fn set_af(&mut self, value: u16) {
        let [a, f] = value.to_be_bytes();
        self.a = a;
        self.f = f & FLAG_MASK;
    }

    /// Set BC register pair.
    pub fn set_bc(&mut self, value: u16) {
        [self.b, self.c] = value.to_be_bytes();
    }

    /// Set DE register pair.
    pub fn set_de(&mut self, value: u16) {
        [self.d, self.e] = value.to_be_bytes();
    }

    /// Set HL register pair.
    pub fn set_hl(&mut self, value: u16) {
        [self.h, self.l] = value.to_be_bytes();
    }

    /// Test a flag bit in F.
    #[must_use]
    pub const fn flag(&self, mask: u8) -> bool {
        self.f & mask != 0
    }
}
