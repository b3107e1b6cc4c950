use thiserror::Error;

/// Problems with a ROM image, reported at load time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartridgeError {
    #[error("ROM image is empty")]
    Empty,
    #[error("ROM image is {len} bytes, too short to hold a cartridge header")]
    TooSmall { len: usize },
}
