//! Cartridge header fields.

use crate::RAM_BANK_SIZE;

/// Offset of the cartridge-type byte.
pub const MAPPER_OFFSET: usize = 0x0147;

/// Offset of the external RAM size byte.
const RAM_SIZE_OFFSET: usize = 0x0149;

/// Title field, NUL padded.
const TITLE: std::ops::Range<usize> = 0x0134..0x0144;

/// First byte after the header. Smaller images are rejected.
pub const HEADER_END: usize = 0x0150;

/// Bank controller family.
///
/// Several cartridge-type codes share one family; the variants only differ
/// in whether RAM or a battery is fitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MapperKind {
    /// ROM only, no bank controller.
    #[default]
    None,
    Mbc1,
    Mbc2,
    /// Clock-bearing family.
    Mbc3,
    Mbc5,
    /// A known controller this core does not emulate. Treated as no mapper.
    Unknown,
}

impl MapperKind {
    /// Whether the control-register protocol is honoured.
    #[must_use]
    pub const fn has_mapper(self) -> bool {
        matches!(self, Self::Mbc1 | Self::Mbc2 | Self::Mbc3 | Self::Mbc5)
    }
}

/// Map a cartridge-type code to its family.
///
/// Unrecognised codes fall back to [`MapperKind::None`].
#[must_use]
pub const fn detect_mapper(code: u8) -> MapperKind {
    match code {
        0x01..=0x03 => MapperKind::Mbc1,
        0x05 | 0x06 => MapperKind::Mbc2,
        0x0F..=0x13 => MapperKind::Mbc3,
        0x19..=0x1E => MapperKind::Mbc5,
        // MMM01, MBC6, MBC7, camera, TAMA5, HuC3, HuC1
        0x0B..=0x0D | 0x20 | 0x22 | 0xFC..=0xFF => MapperKind::Unknown,
        _ => MapperKind::None,
    }
}

/// External RAM size in bytes for a header RAM-size code.
///
/// Codes without a defined size (including "no RAM") get one bank, so the
/// RAM window is always backed.
#[must_use]
pub const fn ram_size(code: u8) -> usize {
    match code {
        0x03 => 4 * RAM_BANK_SIZE,
        0x04 => 16 * RAM_BANK_SIZE,
        0x05 => 8 * RAM_BANK_SIZE,
        _ => RAM_BANK_SIZE,
    }
}

pub(crate) fn ram_size_code(rom: &[u8]) -> u8 {
    rom.get(RAM_SIZE_OFFSET).copied().unwrap_or(0)
}

pub(crate) fn mapper_code(rom: &[u8]) -> u8 {
    rom.get(MAPPER_OFFSET).copied().unwrap_or(0)
}

pub(crate) fn title(rom: &[u8]) -> String {
    let raw = rom.get(TITLE).unwrap_or(&[]);
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    raw[..end]
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect::<String>()
        .trim_end()
        .to_string()
}
