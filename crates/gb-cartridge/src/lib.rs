//! Cartridge model: ROM/RAM storage, header decoding and the bank-control
//! register protocol.
//!
//! The cartridge does no address decoding of its own. The bus asks it for
//! the current ROM bank, forwards control writes below 0x8000, and reads
//! or writes external RAM by offset.

mod cartridge;
mod error;
mod header;

pub use cartridge::{Cartridge, RtcRegisters};
pub use error::CartridgeError;
pub use header::{HEADER_END, MAPPER_OFFSET, MapperKind, detect_mapper, ram_size};

/// Size of one switchable ROM bank.
pub const ROM_BANK_SIZE: usize = 0x4000;

/// Size of one external RAM bank.
pub const RAM_BANK_SIZE: usize = 0x2000;
