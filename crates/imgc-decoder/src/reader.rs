use std::io::{self, Read};

use imgc_wire::block_frame::BLOCK_HEADER_SIZE;
use imgc_wire::header::{HEADER_SIZE, ImageHeader};
use imgc_wire::{BlockHeader, WireError};

use crate::block::{Block, decode_payload};
use crate::config::DecoderConfig;
use crate::error::DecodeError;

/// Pull-based reader over an IMGC image from any [`Read`] source.
///
/// The image header is read and parsed in [`new`](Self::new); blocks are
/// then decoded one at a time by [`next_block`](Self::next_block) or the
/// [`Iterator`] impl. Only one block payload is held in memory at a time.
///
/// ```text
///   ┌──────────────────┬─────────┬─────────┬─────┐
///   │ header (0x1000)  │ block 0 │ block 1 │ ... │  EOF
///   └──────────────────┴─────────┴─────────┴─────┘
///            new()       next_block() ────────►    None
/// ```
///
/// The image ends cleanly only when EOF falls exactly on a block boundary.
/// EOF inside a block header or payload is [`WireError::TruncatedBlock`].
/// After any error the reader yields nothing further.
pub struct ImageReader<R> {
    reader: R,
    header: ImageHeader,
    config: DecoderConfig,
    /// Offset of the next block header from the start of the image.
    offset: u64,
    /// Reused across blocks.
    payload: Vec<u8>,
    done: bool,
}

impl<R: Read> ImageReader<R> {
    /// Read the image header from `reader` using default limits.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidHeader`] if fewer than 0x521 bytes are
    /// available, or [`DecodeError::Io`] if the read fails.
    pub fn new(reader: R) -> Result<Self, DecodeError> {
        Self::with_config(reader, DecoderConfig::default())
    }

    /// Read the image header from `reader` with explicit limits.
    ///
    /// An image shorter than the full 0x1000-byte header region is accepted
    /// as long as the data fields are present; it simply has no blocks.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_config(mut reader: R, config: DecoderConfig) -> Result<Self, DecodeError> {
        let mut buf = vec![0u8; HEADER_SIZE];
        let n = read_full(&mut reader, &mut buf)?;
        let header = ImageHeader::read_from(&buf[..n]).map_err(DecodeError::InvalidHeader)?;

        tracing::debug!(
            sectors = header.sector_count,
            sector_size = header.sector_size,
            "read image header"
        );

        Ok(Self {
            reader,
            header,
            config,
            offset: HEADER_SIZE as u64,
            payload: Vec::new(),
            done: n < HEADER_SIZE,
        })
    }

    /// The parsed image header.
    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    /// The limits this reader enforces.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Read and decode the next block.
    ///
    /// Returns `Ok(None)` at a clean end of image.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Wire`] for an unknown magic, an undersized or
    ///   truncated block, or a cut-off size prefix.
    /// - [`DecodeError::BlockTooLarge`] if the payload or its decoded size
    ///   exceeds the configured limit.
    /// - [`DecodeError::MalformedStream`] from the decompressor.
    /// - [`DecodeError::Io`] if the underlying read fails.
    pub fn next_block(&mut self) -> Result<Option<Block>, DecodeError> {
        if self.done {
            return Ok(None);
        }
        let result = self.read_block();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    /// Consume the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_block(&mut self) -> Result<Option<Block>, DecodeError> {
        let mut frame = [0u8; BLOCK_HEADER_SIZE];
        let n = read_full(&mut self.reader, &mut frame)?;
        if n == 0 {
            return Ok(None);
        }
        // A partial frame fails here with TruncatedBlock.
        let header = BlockHeader::read_from(&frame[..n])?;
        let payload_len = header.payload_len()?;
        if payload_len > self.config.max_block_payload_len {
            return Err(DecodeError::BlockTooLarge {
                size: payload_len,
                limit: self.config.max_block_payload_len,
            });
        }

        self.payload.clear();
        self.payload.resize(payload_len, 0);
        let got = read_full(&mut self.reader, &mut self.payload)?;
        if got < payload_len {
            return Err(WireError::TruncatedBlock {
                expected: payload_len,
                available: got,
            }
            .into());
        }

        let content = decode_payload(&header, &self.payload, &self.config)?;
        let block = Block {
            offset: self.offset,
            header,
            content,
        };
        tracing::trace!(
            offset = block.offset,
            kind = ?block.header.kind,
            decoded = block.content.len(),
            "decoded block"
        );
        self.offset += u64::from(header.declared_size);
        Ok(Some(block))
    }
}

impl<R: Read> Iterator for ImageReader<R> {
    type Item = Result<Block, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}

impl<R: Read> std::iter::FusedIterator for ImageReader<R> {}

/// Fill `buf` from `reader` until it is full or the reader hits EOF.
///
/// Returns the number of bytes read. Unlike [`Read::read_exact`], a short
/// read is not an error, so callers can tell a clean EOF (0 bytes) from a
/// truncated record.
pub(crate) fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
