use imgc_wire::WireError;

/// Errors that can occur while decoding an IMGC image.
///
/// Every error is terminal for the operation that raised it. Nothing is
/// retried or skipped; the one tolerated mismatch (a stream producing more
/// bytes than its size prefix declares) is handled by truncation in the
/// codec and never surfaces here.
///
/// ```text
///   DecodeError
///   ├── InvalidHeader(WireError)   ← image header shorter than 0x521 bytes
///   ├── Wire(WireError)            ← unknown block magic, truncated block
///   ├── MalformedStream            ← LZO instruction stream is invalid
///   ├── BlockTooLarge              ← block exceeds a DecoderConfig limit
///   └── Io(std::io::Error)         ← from the underlying reader or writer
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The image header failed to parse.
    #[error("invalid image header: {0}")]
    InvalidHeader(WireError),

    /// A block header or payload failed to parse.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The compressed stream hit an invalid instruction, ran out of input
    /// mid-instruction, or referenced bytes before the start of the output.
    ///
    /// `offset` is relative to the start of the instruction stream (after
    /// the size prefix).
    #[error("malformed compressed stream at offset {offset}: {reason}")]
    MalformedStream { offset: usize, reason: &'static str },

    /// A block payload or its decoded length exceeds the configured limit.
    #[error("block of {size} bytes exceeds limit {limit}")]
    BlockTooLarge { size: usize, limit: usize },

    /// An I/O error from the underlying reader or writer.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
