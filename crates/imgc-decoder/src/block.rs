use std::io::{self, Read as _, Write};

use imgc_wire::block_frame::{decoded_length, zero_run_length};
use imgc_wire::{BlockHeader, BlockKind};

use crate::config::DecoderConfig;
use crate::decompression;
use crate::error::DecodeError;

/// The bytes one block expands to.
///
/// Zero runs are kept as a count: a single zero block can describe
/// gigabytes of empty sectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedBlock {
    /// This many zero bytes.
    Zero(u64),
    /// Decompressed bytes, exactly as long as the block's size prefix says.
    Data(Vec<u8>),
}

impl DecodedBlock {
    /// Number of bytes this block contributes to the image.
    pub fn len(&self) -> u64 {
        match self {
            Self::Zero(n) => *n,
            Self::Data(bytes) => bytes.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the expanded bytes to `w`, returning how many were written.
    ///
    /// Zero runs are streamed from [`io::repeat`], so their size is not
    /// bounded by memory.
    ///
    /// # Errors
    ///
    /// Propagates any error from `w`.
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<u64> {
        match self {
            Self::Zero(n) => io::copy(&mut io::repeat(0).take(*n), w),
            Self::Data(bytes) => {
                w.write_all(bytes)?;
                Ok(bytes.len() as u64)
            }
        }
    }
}

/// A decoded block and where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// Offset of the block header from the start of the image.
    pub offset: u64,
    pub header: BlockHeader,
    pub content: DecodedBlock,
}

/// Decode one block payload (the bytes after its 8-byte header).
///
/// Compressed payloads are decoded into a buffer of exactly the length
/// their size prefix declares. If the stream produces fewer bytes, the
/// rest of the buffer stays zero; if it would produce more, the excess is
/// dropped.
///
/// A compressed payload too short to hold its size prefix decodes to an
/// empty block.
///
/// # Errors
///
/// - [`DecodeError::Wire`] if the zero-run length is cut off.
/// - [`DecodeError::BlockTooLarge`] if the declared decoded length exceeds
///   `config.max_decoded_block_len`.
/// - [`DecodeError::MalformedStream`] from the decompressor.
pub fn decode_payload(
    header: &BlockHeader,
    payload: &[u8],
    config: &DecoderConfig,
) -> Result<DecodedBlock, DecodeError> {
    match header.kind {
        BlockKind::Zero => Ok(DecodedBlock::Zero(zero_run_length(payload)?)),
        BlockKind::Compressed => {
            let prefix = decoded_length(payload);
            if prefix.decoded_len > config.max_decoded_block_len {
                return Err(DecodeError::BlockTooLarge {
                    size: prefix.decoded_len,
                    limit: config.max_decoded_block_len,
                });
            }
            let mut out = vec![0u8; prefix.decoded_len];
            decompression::decompress_into(&payload[prefix.consumed..], &mut out)?;
            Ok(DecodedBlock::Data(out))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgc_wire::WireError;

    fn header(kind: BlockKind, payload: &[u8]) -> BlockHeader {
        BlockHeader::for_payload(kind, payload.len()).unwrap()
    }

    #[test]
    fn zero_payload_is_a_count() {
        let payload = 5000u64.to_le_bytes();
        let block = decode_payload(
            &header(BlockKind::Zero, &payload),
            &payload,
            &DecoderConfig::default(),
        )
        .unwrap();
        assert_eq!(block, DecodedBlock::Zero(5000));
        assert_eq!(block.len(), 5000);
    }

    #[test]
    fn zero_block_writes_exact_count_across_chunks() {
        // larger than any internal copy buffer
        let n = 3 * 8192 + 17;
        let mut out = Vec::new();
        let written = DecodedBlock::Zero(n).write_to(&mut out).unwrap();
        assert_eq!(written, n);
        assert_eq!(out.len() as u64, n);
        assert!(out.iter().all(|&b| b == 0));

        let mut empty = Vec::new();
        assert_eq!(DecodedBlock::Zero(0).write_to(&mut empty).unwrap(), 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn compressed_payload_skips_short_prefix() {
        // prefix 5, then literal "hello"
        let payload = [0x05, 0x00, 22, b'h', b'e', b'l', b'l', b'o'];
        let block = decode_payload(
            &header(BlockKind::Compressed, &payload),
            &payload,
            &DecoderConfig::default(),
        )
        .unwrap();
        assert_eq!(block, DecodedBlock::Data(b"hello".to_vec()));
    }

    #[test]
    fn compressed_payload_skips_long_prefix() {
        // long-form prefix for 3 bytes
        let payload = [0x03, 0x80, 0x00, 0x00, 20, b'a', b'b', b'c'];
        let block = decode_payload(
            &header(BlockKind::Compressed, &payload),
            &payload,
            &DecoderConfig::default(),
        )
        .unwrap();
        assert_eq!(block, DecodedBlock::Data(b"abc".to_vec()));
    }

    #[test]
    fn short_stream_is_zero_padded() {
        let payload = [0x06, 0x00, 19, b'o', b'k'];
        let block = decode_payload(
            &header(BlockKind::Compressed, &payload),
            &payload,
            &DecoderConfig::default(),
        )
        .unwrap();
        assert_eq!(block, DecodedBlock::Data(vec![b'o', b'k', 0, 0, 0, 0]));
    }

    #[test]
    fn long_stream_is_truncated() {
        let payload = [0x02, 0x00, 20, b'a', b'b', b'c'];
        let block = decode_payload(
            &header(BlockKind::Compressed, &payload),
            &payload,
            &DecoderConfig::default(),
        )
        .unwrap();
        assert_eq!(block, DecodedBlock::Data(b"ab".to_vec()));
    }

    #[test]
    fn decoded_length_limit() {
        let payload = [0xFF, 0x7F, 18, 0];
        let config = DecoderConfig {
            max_decoded_block_len: 0x1000,
            ..DecoderConfig::default()
        };
        let frame = header(BlockKind::Compressed, &payload);
        let err = decode_payload(&frame, &payload, &config).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::BlockTooLarge {
                size: 0x7FFF,
                limit: 0x1000
            }
        ));
    }

    #[test]
    fn truncated_zero_payload() {
        let config = DecoderConfig::default();
        let zero = [0u8; 4];
        assert!(matches!(
            decode_payload(&header(BlockKind::Zero, &zero), &zero, &config),
            Err(DecodeError::Wire(WireError::TruncatedBlock { .. }))
        ));
    }

    #[test]
    fn cut_off_prefix_is_an_empty_block() {
        let config = DecoderConfig::default();
        let cases: [&[u8]; 3] = [&[], &[0x01], &[0x00, 0x80, 0x01]];
        for payload in cases {
            let frame = header(BlockKind::Compressed, payload);
            let block = decode_payload(&frame, payload, &config).unwrap();
            assert_eq!(block, DecodedBlock::Data(Vec::new()), "payload {payload:?}");
        }
    }
}
