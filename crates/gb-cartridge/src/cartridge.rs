//! Cartridge storage and bank-control registers.

use crate::error::CartridgeError;
use crate::header::{self, HEADER_END, MapperKind};

/// Real-time-clock registers of the clock-bearing controller family.
///
/// Held for future use; nothing latches or advances them yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RtcRegisters {
    pub seconds: u8,
    pub minutes: u8,
    pub hours: u8,
    pub day_low: u8,
    pub day_high: u8,
    pub latch: u8,
}

/// A loaded cartridge.
pub struct Cartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
    kind: MapperKind,
    /// Switchable bank shown at 0x4000-0x7FFF. Never 0.
    rom_bank: u8,
    ram_bank: u8,
    ram_enabled: bool,
    /// MBC1 banking-mode select.
    banking_mode: bool,
    rtc: RtcRegisters,
}

impl Cartridge {
    /// Build a cartridge from a raw ROM image.
    ///
    /// The controller family comes from header byte 0x0147 and the external
    /// RAM size from 0x0149.
    pub fn from_rom(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        if rom.is_empty() {
            return Err(CartridgeError::Empty);
        }
        if rom.len() < HEADER_END {
            return Err(CartridgeError::TooSmall { len: rom.len() });
        }

        let kind = header::detect_mapper(header::mapper_code(&rom));
        let ram = vec![0; header::ram_size(header::ram_size_code(&rom))];

        Ok(Self {
            rom,
            ram,
            kind,
            rom_bank: 1,
            ram_bank: 0,
            ram_enabled: false,
            banking_mode: false,
            rtc: RtcRegisters::default(),
        })
    }

    #[must_use]
    pub fn kind(&self) -> MapperKind {
        self.kind
    }

    /// Bank currently mapped at 0x4000-0x7FFF.
    #[must_use]
    pub fn rom_bank(&self) -> u8 {
        self.rom_bank
    }

    #[must_use]
    pub fn ram_bank(&self) -> u8 {
        self.ram_bank
    }

    #[must_use]
    pub fn ram_enabled(&self) -> bool {
        self.ram_enabled
    }

    #[must_use]
    pub fn banking_mode(&self) -> bool {
        self.banking_mode
    }

    #[must_use]
    pub fn rtc(&self) -> &RtcRegisters {
        &self.rtc
    }

    /// Header title, for diagnostics.
    #[must_use]
    pub fn title(&self) -> String {
        header::title(&self.rom)
    }

    #[must_use]
    pub fn rom_len(&self) -> usize {
        self.rom.len()
    }

    #[must_use]
    pub fn ram_len(&self) -> usize {
        self.ram.len()
    }

    /// Read a byte of ROM by absolute offset. Past the end reads 0xFF.
    #[must_use]
    pub fn read_rom(&self, offset: usize) -> u8 {
        self.rom.get(offset).copied().unwrap_or(0xFF)
    }

    /// Read external RAM by offset. Past the end reads 0xFF.
    ///
    /// The RAM-enable gate is the bus's job.
    #[must_use]
    pub fn read_ram(&self, offset: usize) -> u8 {
        self.ram.get(offset).copied().unwrap_or(0xFF)
    }

    /// Write external RAM by offset. Past the end is dropped.
    pub fn write_ram(&mut self, offset: usize, value: u8) {
        if let Some(cell) = self.ram.get_mut(offset) {
            *cell = value;
        }
    }

    /// Handle a write to the control-register space (0x0000-0x7FFF).
    ///
    /// Only RAM enable and the low five ROM bank bits are implemented.
    /// Writes to 0x4000-0x7FFF are accepted and ignored.
    pub fn control_write(&mut self, addr: u16, value: u8) {
        if !self.kind.has_mapper() {
            return;
        }
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            0x2000..=0x3FFF => {
                let bank = value & 0x1F;
                self.rom_bank = if bank == 0 { 1 } else { bank };
            }
            // 0x4000-0x5FFF upper ROM bits / RAM bank, 0x6000-0x7FFF mode.
            // TODO: MBC1 upper bank bits and mode select, MBC3 RTC latch.
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rom(kind_code: u8, banks: usize) -> Vec<u8> {
        let mut rom = vec![0u8; banks * crate::ROM_BANK_SIZE];
        rom[header::MAPPER_OFFSET] = kind_code;
        for bank in 0..banks {
            // Tag each bank with its number at its first byte.
            rom[bank * crate::ROM_BANK_SIZE] = bank as u8;
        }
        rom
    }

    #[test]
    fn rejects_short_images() {
        assert_eq!(
            Cartridge::from_rom(Vec::new()).err(),
            Some(CartridgeError::Empty)
        );
        assert_eq!(
            Cartridge::from_rom(vec![0; 0x100]).err(),
            Some(CartridgeError::TooSmall { len: 0x100 })
        );
    }

    #[test]
    fn starts_on_bank_one() {
        let cart = Cartridge::from_rom(make_rom(0x01, 4)).expect("valid rom");
        assert_eq!(cart.kind(), MapperKind::Mbc1);
        assert_eq!(cart.rom_bank(), 1);
        assert!(!cart.ram_enabled());
        assert_eq!(cart.ram_len(), 0x2000);
    }

    #[test]
    fn bank_zero_is_coerced_to_one() {
        let mut cart = Cartridge::from_rom(make_rom(0x01, 4)).expect("valid rom");
        cart.control_write(0x2000, 0x03);
        assert_eq!(cart.rom_bank(), 3);
        cart.control_write(0x3FFF, 0x00);
        assert_eq!(cart.rom_bank(), 1);
        cart.control_write(0x2100, 0x20);
        assert_eq!(cart.rom_bank(), 1, "only the low five bits count");
        cart.control_write(0x2100, 0xFF);
        assert_eq!(cart.rom_bank(), 0x1F);
    }

    #[test]
    fn ram_enable_needs_low_nibble_a() {
        let mut cart = Cartridge::from_rom(make_rom(0x03, 2)).expect("valid rom");
        cart.control_write(0x0000, 0x0A);
        assert!(cart.ram_enabled());
        cart.control_write(0x1FFF, 0x1A);
        assert!(cart.ram_enabled());
        cart.control_write(0x0000, 0x0B);
        assert!(!cart.ram_enabled());
    }

    #[test]
    fn mapperless_ignores_control_writes() {
        let mut cart = Cartridge::from_rom(make_rom(0x00, 2)).expect("valid rom");
        cart.control_write(0x0000, 0x0A);
        cart.control_write(0x2000, 0x05);
        assert!(!cart.ram_enabled());
        assert_eq!(cart.rom_bank(), 1);
    }

    #[test]
    fn unknown_controller_acts_as_mapperless() {
        let mut cart = Cartridge::from_rom(make_rom(0xFE, 2)).expect("valid rom");
        assert_eq!(cart.kind(), MapperKind::Unknown);
        cart.control_write(0x0000, 0x0A);
        assert!(!cart.ram_enabled());
    }

    #[test]
    fn reserved_ranges_are_accepted() {
        let mut cart = Cartridge::from_rom(make_rom(0x13, 4)).expect("valid rom");
        cart.control_write(0x4000, 0x03);
        cart.control_write(0x6000, 0x01);
        assert_eq!(cart.ram_bank(), 0);
        assert!(!cart.banking_mode());
        assert_eq!(*cart.rtc(), RtcRegisters::default());
    }

    #[test]
    fn rom_and_ram_out_of_range() {
        let mut cart = Cartridge::from_rom(make_rom(0x01, 2)).expect("valid rom");
        assert_eq!(cart.read_rom(crate::ROM_BANK_SIZE), 1);
        assert_eq!(cart.read_rom(cart.rom_len()), 0xFF);
        cart.write_ram(0x2000, 0x55);
        assert_eq!(cart.read_ram(0x2000), 0xFF);
        cart.write_ram(0x1FFF, 0x55);
        assert_eq!(cart.read_ram(0x1FFF), 0x55);
    }

    #[test]
    fn ram_size_from_header() {
        let mut rom = make_rom(0x03, 2);
        rom[0x0149] = 0x03;
        let cart = Cartridge::from_rom(rom).expect("valid rom");
        assert_eq!(cart.ram_len(), 0x8000);
    }
}
