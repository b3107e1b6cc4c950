use std::io;
use std::path::PathBuf;

use gb_cartridge::CartridgeError;
use thiserror::Error;

/// Failure to build a session from its images.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),
    #[error("boot ROM must be 256 bytes, got {len}")]
    BootRomSize { len: usize },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
