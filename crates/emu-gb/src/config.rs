//! Session configuration.

use std::fs;
use std::path::Path;

use crate::error::LoadError;

/// Size of the boot overlay image.
pub const BOOT_ROM_SIZE: usize = 0x100;

/// Images a session starts from.
///
/// With a boot ROM the CPU starts from the bare-metal state at 0x0000 with
/// the overlay mapped. Without one it starts from the post-boot state at
/// 0x0100.
#[derive(Debug, Clone, Default)]
pub struct GbConfig {
    /// Cartridge ROM image.
    pub rom_data: Vec<u8>,
    /// 256-byte boot program.
    pub boot_rom: Option<Vec<u8>>,
}

impl GbConfig {
    /// Read the images from disk.
    pub fn from_files(rom: &Path, boot_rom: Option<&Path>) -> Result<Self, LoadError> {
        let rom_data = read(rom)?;
        let boot_rom = boot_rom.map(read).transpose()?;
        Ok(Self { rom_data, boot_rom })
    }
}

fn read(path: &Path) -> Result<Vec<u8>, LoadError> {
    fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_path() {
        let path = Path::new("/nonexistent/cart.gb");
        let err = GbConfig::from_files(path, None).expect_err("file does not exist");
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/cart.gb"));
    }

    #[test]
    fn reads_images() {
        let dir = std::env::temp_dir();
        let rom_path = dir.join(format!("emu-gb-config-{}.gb", std::process::id()));
        let boot_path = dir.join(format!("emu-gb-config-{}.bin", std::process::id()));
        fs::write(&rom_path, [0xC3, 0x00, 0x02]).expect("write rom");
        fs::write(&boot_path, [0x31; BOOT_ROM_SIZE]).expect("write boot rom");

        let config = GbConfig::from_files(&rom_path, Some(&boot_path)).expect("both files exist");
        let _ = fs::remove_file(&rom_path);
        let _ = fs::remove_file(&boot_path);

        assert_eq!(config.rom_data, vec![0xC3, 0x00, 0x02]);
        assert_eq!(config.boot_rom.map(|b| b.len()), Some(BOOT_ROM_SIZE));
    }
}
