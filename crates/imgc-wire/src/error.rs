/// Errors raised while reading or writing IMGC byte layouts.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Fewer than 0x521 bytes were available for the image header.
    #[error("truncated image header: need at least 0x521 bytes, got {len:#x}")]
    TruncatedHeader { len: usize },

    /// Block header tag matched neither `"omg!"` nor `"lol!"`.
    #[error("unknown block magic {found:02X?} ({})", String::from_utf8_lossy(.found))]
    UnknownBlockMagic { found: [u8; 4] },

    /// Fewer bytes were available than a block header or payload requires.
    #[error("truncated block: expected {expected} bytes, {available} available")]
    TruncatedBlock { expected: usize, available: usize },

    /// The block size field is smaller than the 8-byte block header it includes.
    #[error("block size {size} is smaller than the block header")]
    UndersizedBlock { size: u32 },

    /// A length-prefixed string cannot hold more than 255 bytes.
    #[error("string of {len} bytes does not fit a 255-byte header field")]
    PascalTooLong { len: usize },

    /// Output buffer too small for the layout being written.
    #[error("buffer of {len} bytes is too small, need {needed}")]
    BufferTooSmall { needed: usize, len: usize },

    /// A length does not fit the wire field that stores it.
    #[error("length {len} exceeds the field maximum {max}")]
    LengthOverflow { len: usize, max: usize },
}
