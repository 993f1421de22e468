use imgc_wire::block_frame::BLOCK_HEADER_SIZE;
use imgc_wire::header::{HEADER_SIZE, ImageHeader};
use imgc_wire::{BlockHeader, WireError};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::block::{Block, decode_payload};
use crate::config::DecoderConfig;
use crate::error::DecodeError;

/// Events emitted by the streaming decoder.
///
/// The stream yields a `Header` event first, then one `Block` event per
/// block, and ends when the reader reaches EOF on a block boundary.
///
/// ```text
///   Header(ImageHeader)
///   Block(Block)
///   Block(Block)
///   ... (stream ends at EOF)
/// ```
#[derive(Clone, Debug)]
pub enum DecoderEvent {
    /// The image header has been parsed.
    Header(ImageHeader),

    /// A block has been fully read and decoded.
    Block(Block),
}

/// Asynchronous streaming decoder that yields blocks one at a time.
///
/// The async counterpart of [`ImageReader`](crate::ImageReader), for
/// images arriving over a socket or read from a tokio file. The next
/// block is only read when the caller awaits [`next`](Self::next), so
/// a slow consumer applies backpressure to the source.
///
/// # Example
///
/// ```rust,no_run
/// use imgc_decoder::{DecoderEvent, StreamingDecoder};
/// use tokio::io::AsyncRead;
///
/// async fn count_blocks(reader: impl AsyncRead + Unpin) -> usize {
///     let mut stream = StreamingDecoder::new(reader);
///     let mut blocks = 0;
///     while let Some(Ok(event)) = stream.next().await {
///         if let DecoderEvent::Block(_) = event {
///             blocks += 1;
///         }
///     }
///     blocks
/// }
/// ```
pub struct StreamingDecoder<R> {
    reader: R,
    config: DecoderConfig,
    state: StreamState,
    offset: u64,
    /// Block payloads are read into this buffer, reused across blocks.
    buf: Vec<u8>,
}

/// ```text
///   ReadHeader → ReadBlocks → Done
/// ```
///
/// Any error moves straight to `Done`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreamState {
    ReadHeader,
    ReadBlocks,
    Done,
}

impl<R: AsyncRead + Unpin> StreamingDecoder<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(reader: R, config: DecoderConfig) -> Self {
        Self {
            reader,
            config,
            state: StreamState::ReadHeader,
            offset: 0,
            buf: Vec::new(),
        }
    }

    /// Read the next event from the stream.
    ///
    /// The first call yields [`DecoderEvent::Header`] or the header error.
    /// Later calls yield blocks until `None`. After an error, every further
    /// call returns `None`.
    pub async fn next(&mut self) -> Option<Result<DecoderEvent, DecodeError>> {
        let result = match self.state {
            StreamState::ReadHeader => self.read_header().await.map(Some),
            StreamState::ReadBlocks => self.read_block().await,
            StreamState::Done => return None,
        };
        match result {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.state = StreamState::Done;
                None
            }
            Err(e) => {
                self.state = StreamState::Done;
                Some(Err(e))
            }
        }
    }

    /// Consume the decoder, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    async fn read_header(&mut self) -> Result<DecoderEvent, DecodeError> {
        let mut buf = vec![0u8; HEADER_SIZE];
        let n = read_full(&mut self.reader, &mut buf).await?;
        let header = ImageHeader::read_from(&buf[..n]).map_err(DecodeError::InvalidHeader)?;

        self.offset = HEADER_SIZE as u64;
        self.state = if n < HEADER_SIZE {
            StreamState::Done
        } else {
            StreamState::ReadBlocks
        };
        Ok(DecoderEvent::Header(header))
    }

    async fn read_block(&mut self) -> Result<Option<DecoderEvent>, DecodeError> {
        let mut frame = [0u8; BLOCK_HEADER_SIZE];
        let n = read_full(&mut self.reader, &mut frame).await?;
        if n == 0 {
            return Ok(None);
        }
        let header = BlockHeader::read_from(&frame[..n])?;
        let payload_len = header.payload_len()?;
        if payload_len > self.config.max_block_payload_len {
            return Err(DecodeError::BlockTooLarge {
                size: payload_len,
                limit: self.config.max_block_payload_len,
            });
        }

        self.buf.clear();
        self.buf.resize(payload_len, 0);
        let got = read_full(&mut self.reader, &mut self.buf).await?;
        if got < payload_len {
            return Err(WireError::TruncatedBlock {
                expected: payload_len,
                available: got,
            }
            .into());
        }

        let content = decode_payload(&header, &self.buf, &self.config)?;
        let block = Block {
            offset: self.offset,
            header,
            content,
        };
        self.offset += u64::from(header.declared_size);
        Ok(Some(DecoderEvent::Block(block)))
    }
}

/// Async twin of [`crate::reader::read_full`].
async fn read_full<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
