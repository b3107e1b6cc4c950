//! Memory bus: CPU address decoding.
//!
//! Implements `emu_core::Bus`. Every address resolves to exactly one cell.
//! Unbacked addresses read 0xFF and drop writes; nothing here can fail.
//!
//! | Range           | Region                                  |
//! |-----------------|-----------------------------------------|
//! | `0000-00FF`     | Boot overlay while active               |
//! | `0000-3FFF`     | ROM bank 0                              |
//! | `4000-7FFF`     | Switchable ROM bank                     |
//! | `8000-9FFF`     | Video RAM                               |
//! | `A000-BFFF`     | External RAM, gated by RAM enable       |
//! | `C000-DFFF`     | Work RAM                                |
//! | `E000-FDFF`     | Echo of work RAM                        |
//! | `FE00-FE9F`     | OAM                                     |
//! | `FEA0-FEFF`     | Unmapped                                |
//! | `FF00-FF7F`     | I/O registers (`FF50` disables overlay) |
//! | `FF80-FFFE`     | High RAM                                |
//! | `FFFF`          | Interrupt enable                        |
//!
//! Writes below 0x8000 never reach ROM; they go to the cartridge's
//! control registers.

use emu_core::Bus;
use gb_cartridge::{Cartridge, ROM_BANK_SIZE};

use crate::config::BOOT_ROM_SIZE;

/// Writing any value here unmaps the boot overlay for good.
const BOOT_DISABLE: u16 = 0xFF50;

/// Value read from unbacked addresses.
const OPEN_BUS: u8 = 0xFF;

/// The console bus, implementing `emu_core::Bus`.
pub struct GbBus {
    cartridge: Cartridge,
    boot_rom: [u8; BOOT_ROM_SIZE],
    boot_active: bool,
    /// 8K video RAM ($8000-$9FFF).
    vram: Box<[u8; 0x2000]>,
    /// 8K work RAM ($C000-$DFFF, echoed at $E000-$FDFF).
    wram: Box<[u8; 0x2000]>,
    oam: [u8; 0xA0],
    io: [u8; 0x80],
    hram: [u8; 0x7F],
    interrupt_enable: u8,
}

impl GbBus {
    /// Build a bus around a cartridge. The overlay is active only when a
    /// boot image is supplied.
    #[must_use]
    pub fn new(cartridge: Cartridge, boot_rom: Option<[u8; BOOT_ROM_SIZE]>) -> Self {
        Self {
            cartridge,
            boot_active: boot_rom.is_some(),
            boot_rom: boot_rom.unwrap_or([0; BOOT_ROM_SIZE]),
            vram: Box::new([0; 0x2000]),
            wram: Box::new([0; 0x2000]),
            oam: [0; 0xA0],
            io: [0; 0x80],
            hram: [0; 0x7F],
            interrupt_enable: 0,
        }
    }

    /// Whether the boot overlay still shadows 0x0000-0x00FF.
    #[must_use]
    pub fn boot_active(&self) -> bool {
        self.boot_active
    }

    #[must_use]
    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    /// Read a byte without side effects (for observation).
    ///
    /// No region on this bus has read side effects, so this is also the
    /// implementation of [`Bus::read`].
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        let a = addr as usize;
        match addr {
            0x0000..=0x00FF if self.boot_active => self.boot_rom[a],
            0x0000..=0x3FFF => self.cartridge.read_rom(a),
            0x4000..=0x7FFF => {
                let bank = usize::from(self.cartridge.rom_bank());
                self.cartridge.read_rom(bank * ROM_BANK_SIZE + (a - 0x4000))
            }
            0x8000..=0x9FFF => self.vram[a - 0x8000],
            0xA000..=0xBFFF => {
                if self.cartridge.ram_enabled() {
                    self.cartridge.read_ram(a - 0xA000)
                } else {
                    OPEN_BUS
                }
            }
            0xC000..=0xDFFF => self.wram[a - 0xC000],
            0xE000..=0xFDFF => self.wram[a - 0xE000],
            0xFE00..=0xFE9F => self.oam[a - 0xFE00],
            0xFEA0..=0xFEFF | BOOT_DISABLE => OPEN_BUS,
            0xFF00..=0xFF7F => self.io[a - 0xFF00],
            0xFF80..=0xFFFE => self.hram[a - 0xFF80],
            0xFFFF => self.interrupt_enable,
        }
    }
}

impl Bus for GbBus {
    fn read(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        let a = address as usize;
        match address {
            0x0000..=0x7FFF => self.cartridge.control_write(address, value),
            0x8000..=0x9FFF => self.vram[a - 0x8000] = value,
            0xA000..=0xBFFF => {
                if self.cartridge.ram_enabled() {
                    self.cartridge.write_ram(a - 0xA000, value);
                }
            }
            0xC000..=0xDFFF => self.wram[a - 0xC000] = value,
            0xE000..=0xFDFF => self.wram[a - 0xE000] = value,
            0xFE00..=0xFE9F => self.oam[a - 0xFE00] = value,
            0xFEA0..=0xFEFF => {}
            BOOT_DISABLE => self.boot_active = false,
            0xFF00..=0xFF7F => self.io[a - 0xFF00] = value,
            0xFF80..=0xFFFE => self.hram[a - 0xFF80] = value,
            0xFFFF => self.interrupt_enable = value,
        }
    }
}
