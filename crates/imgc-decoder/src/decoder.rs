use std::io::{self, Write};

use imgc_wire::ImageHeader;

use crate::block::Block;
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::reader::ImageReader;

/// The result of decoding a complete IMGC image held in memory.
///
/// ```text
/// ┌──────────────────────────────────────────────────┐
/// │ DecodedImage                                     │
/// │   header: ImageHeader ← strings, sector geometry │
/// │   blocks: Vec<Block>  ← wire order               │
/// └──────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub header: ImageHeader,
    pub blocks: Vec<Block>,
}

impl DecodedImage {
    /// Total bytes the blocks expand to.
    pub fn decoded_len(&self) -> u64 {
        self.blocks.iter().map(|b| b.content.len()).sum()
    }

    /// Write the decoded disk contents to `w`.
    ///
    /// # Errors
    ///
    /// Propagates any error from `w`.
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<u64> {
        let mut written = 0;
        for block in &self.blocks {
            written += block.content.write_to(w)?;
        }
        Ok(written)
    }

    /// Decoded disk contents as one buffer, zero runs included.
    ///
    /// Only sensible for small images; use [`write_to`](Self::write_to)
    /// or [`Extractor`](crate::Extractor) otherwise.
    ///
    /// # Errors
    ///
    /// None in practice: writing into a `Vec` does not fail. The `Result`
    /// is passed through from [`write_to`](Self::write_to).
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let hint = usize::try_from(self.decoded_len()).unwrap_or(0);
        let mut out = Vec::with_capacity(hint);
        self.write_to(&mut out)?;
        Ok(out)
    }
}

/// Synchronous decoder for an image already in memory.
///
/// A thin wrapper over [`ImageReader`] that collects every block. Prefer
/// [`ImageReader`] or [`Extractor`](crate::Extractor) for files, since
/// those never hold more than one block.
///
/// # Example
///
/// ```rust,no_run
/// use imgc_decoder::ImgcDecoder;
///
/// let bytes = std::fs::read("disk.imgc")?;
/// let image = ImgcDecoder::decode(&bytes)?;
/// println!("{} blocks, {} bytes", image.blocks.len(), image.decoded_len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ImgcDecoder;

impl ImgcDecoder {
    /// Decode a complete image with default limits.
    ///
    /// # Errors
    ///
    /// Any error [`ImageReader`] can return.
    pub fn decode(image: &[u8]) -> Result<DecodedImage, DecodeError> {
        Self::decode_with_config(image, DecoderConfig::default())
    }

    /// Decode a complete image with explicit limits.
    ///
    /// # Errors
    ///
    /// Any error [`ImageReader`] can return.
    pub fn decode_with_config(
        image: &[u8],
        config: DecoderConfig,
    ) -> Result<DecodedImage, DecodeError> {
        let mut reader = ImageReader::with_config(image, config)?;
        let mut blocks = Vec::new();
        while let Some(block) = reader.next_block()? {
            blocks.push(block);
        }
        Ok(DecodedImage {
            header: reader.header().clone(),
            blocks,
        })
    }
}

#[cfg(test)]
mod tests {
    use imgc_wire::header::HEADER_SIZE;
    use imgc_wire::{PascalString, WireError};

    use super::*;
    use crate::block::DecodedBlock;

    fn header() -> ImageHeader {
        let mut header = ImageHeader {
            sector_count: 1,
            sector_size: 16,
            unknown3: 0x5A,
            ..ImageHeader::default()
        };
        header.software.name = PascalString::from_bytes(b"HDD Raw Copy Tool").unwrap();
        header.volume.serial = PascalString::from_bytes(b"WD-123").unwrap();
        header
    }

    fn image(blocks: &[u8]) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_SIZE];
        header().write_to(&mut buf).unwrap();
        buf.extend_from_slice(blocks);
        buf
    }

    #[test]
    fn decode_collects_header_and_blocks() {
        let mut blocks = b"lol!".to_vec();
        blocks.extend_from_slice(&15u32.to_le_bytes());
        // prefix 10, literal "ab", M2 match len 8 dist 2
        blocks.extend_from_slice(&[10, 0, 19, b'a', b'b', 0xE4, 0x00]);
        blocks.extend_from_slice(b"omg!");
        blocks.extend_from_slice(&16u32.to_le_bytes());
        blocks.extend_from_slice(&6u64.to_le_bytes());

        let decoded = ImgcDecoder::decode(&image(&blocks)).unwrap();
        assert_eq!(decoded.header, header());
        assert_eq!(decoded.blocks.len(), 2);
        assert_eq!(
            decoded.blocks[0].content,
            DecodedBlock::Data(b"ababababab".to_vec())
        );
        assert_eq!(decoded.decoded_len(), 16);
        assert_eq!(decoded.to_bytes().unwrap(), b"ababababab\0\0\0\0\0\0");
    }

    #[test]
    fn decode_propagates_block_errors() {
        let mut blocks = b"omg!".to_vec();
        blocks.extend_from_slice(&16u32.to_le_bytes());
        blocks.extend_from_slice(&[0u8; 3]);
        let err = ImgcDecoder::decode(&image(&blocks)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Wire(WireError::TruncatedBlock { .. })
        ));
    }

    #[test]
    fn decode_rejects_short_input() {
        let err = ImgcDecoder::decode(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidHeader(_)));
    }

    #[test]
    fn header_only_image() {
        let decoded = ImgcDecoder::decode(&image(&[])).unwrap();
        assert!(decoded.blocks.is_empty());
        assert_eq!(decoded.decoded_len(), 0);
        assert!(decoded.to_bytes().unwrap().is_empty());
    }
}
