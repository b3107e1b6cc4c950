//! Handheld console core.
//!
//! The CPU runs whole instructions against [`GbBus`], which decodes every
//! 16-bit address to one backing cell: boot overlay, cartridge ROM/RAM,
//! video RAM, work RAM and its echo, OAM, the I/O register file, high RAM
//! and the interrupt-enable byte.
//!
//! Video, timers and audio are not emulated here. They see the I/O window
//! as plain memory and pace themselves from the cycle counts returned by
//! [`GameBoy::step`].

mod bus;
mod config;
mod error;
mod gameboy;

pub use bus::GbBus;
pub use config::{BOOT_ROM_SIZE, GbConfig};
pub use error::LoadError;
pub use gameboy::GameBoy;
