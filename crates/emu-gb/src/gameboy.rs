//! Top-level session: one CPU, one bus.

use emu_core::{Bus, Cpu, Observable, Value};
use gb_cartridge::Cartridge;
use sharp_sm83::{CpuError, PowerOn, Sm83, Tracer};

use crate::bus::GbBus;
use crate::config::{BOOT_ROM_SIZE, GbConfig};
use crate::error::LoadError;

/// I/O registers as the boot program leaves them: LCDC, BGP, OBP0, OBP1.
const POST_BOOT_IO: [(u16, u8); 4] = [
    (0xFF40, 0x91),
    (0xFF47, 0xFC),
    (0xFF48, 0xFF),
    (0xFF49, 0xFF),
];

/// An emulated session.
pub struct GameBoy {
    cpu: Sm83,
    bus: GbBus,
    tracer: Option<Box<dyn Tracer>>,
}

impl GameBoy {
    /// Create a session from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the ROM is unusable or the boot image is not
    /// exactly 256 bytes.
    pub fn new(config: &GbConfig) -> Result<Self, LoadError> {
        let cartridge = Cartridge::from_rom(config.rom_data.clone())?;
        let boot_rom = config.boot_rom.as_deref().map(boot_image).transpose()?;

        let power_on = if boot_rom.is_some() {
            PowerOn::BareMetal
        } else {
            PowerOn::PostBoot
        };

        let mut bus = GbBus::new(cartridge, boot_rom);
        if boot_rom.is_none() {
            for (addr, value) in POST_BOOT_IO {
                bus.write(addr, value);
            }
        }

        Ok(Self {
            cpu: Sm83::new(power_on),
            bus,
            tracer: None,
        })
    }

    /// Execute one instruction and return the T-cycles it took.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        match self.tracer.as_mut() {
            Some(tracer) => self.cpu.step_traced(&mut self.bus, tracer.as_mut()),
            None => self.cpu.step(&mut self.bus),
        }
    }

    /// Step until at least `budget` T-cycles have elapsed.
    ///
    /// Returns the cycles actually run, which overshoots by at most one
    /// instruction.
    pub fn run_cycles(&mut self, budget: u64) -> Result<u64, CpuError> {
        let mut elapsed = 0u64;
        while elapsed < budget {
            elapsed += u64::from(self.step()?);
        }
        Ok(elapsed)
    }

    /// Install or remove the per-instruction tracer.
    pub fn set_tracer(&mut self, tracer: Option<Box<dyn Tracer>>) {
        self.tracer = tracer;
    }

    #[must_use]
    pub fn cpu(&self) -> &Sm83 {
        &self.cpu
    }

    /// Mutable CPU access, for interrupt delivery.
    pub fn cpu_mut(&mut self) -> &mut Sm83 {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &GbBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut GbBus {
        &mut self.bus
    }
}

fn boot_image(data: &[u8]) -> Result<[u8; BOOT_ROM_SIZE], LoadError> {
    data.try_into()
        .map_err(|_| LoadError::BootRomSize { len: data.len() })
}

fn parse_address(text: &str) -> Option<u16> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = text.strip_prefix('$') {
        u16::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

impl Observable for GameBoy {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("cart.") {
            let cart = self.bus.cartridge();
            match rest {
                "title" => Some(cart.title().into()),
                "rom_bank" => Some(cart.rom_bank().into()),
                "ram_enabled" => Some(cart.ram_enabled().into()),
                "kind" => Some(format!("{:?}", cart.kind()).into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("memory.") {
            parse_address(rest).map(|a| Value::U8(self.bus.peek(a)))
        } else {
            match path {
                "bus.boot_active" => Some(self.bus.boot_active().into()),
                _ => self.cpu.query(path),
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<sm83_paths>",
            "cart.title",
            "cart.rom_bank",
            "cart.ram_enabled",
            "cart.kind",
            "bus.boot_active",
            "memory.<address>",
        ]
    }
}
