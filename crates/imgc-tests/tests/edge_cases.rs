//! Edge cases across the whole decode path:
//!
//! - **Truncation**: cutting an image at any byte either ends cleanly (on a
//!   block boundary or inside the header padding) or fails with a typed
//!   error. It never panics and never yields a partial block.
//! - **Corruption**: overwriting any payload byte yields `Ok` or an error,
//!   never a panic or an out-of-bounds write.
//! - **Limits**: `DecoderConfig` caps are enforced before allocation.

use imgc_decoder::{DecodeError, DecodedBlock, DecoderConfig, ImageReader, ImgcDecoder};
use imgc_tests::{ImageBuilder, sample_text};
use imgc_wire::WireError;
use imgc_wire::header::{HEADER_SIZE, MIN_HEADER_LEN};

fn small_image() -> ImageBuilder {
    ImageBuilder::new()
        .software("HDD Raw Copy Tool", "1.10")
        .zero_block(10)
        .compressed_block(b"hello world, hello world, hello world")
}

#[test]
fn every_truncation_point() {
    let bytes = small_image().build();
    let first_end = HEADER_SIZE + 16;
    let boundaries = [HEADER_SIZE, first_end, bytes.len()];

    for cut in 0..=bytes.len() {
        let result = ImgcDecoder::decode(&bytes[..cut]);
        match result {
            Ok(image) => {
                assert!(
                    (MIN_HEADER_LEN..HEADER_SIZE).contains(&cut) || boundaries.contains(&cut),
                    "cut at {cut} decoded cleanly"
                );
                let expected_blocks = match cut {
                    c if c < first_end => 0,
                    c if c < bytes.len() => 1,
                    _ => 2,
                };
                assert_eq!(image.blocks.len(), expected_blocks, "cut at {cut}");
            }
            Err(DecodeError::InvalidHeader(WireError::TruncatedHeader { len })) => {
                assert!(cut < MIN_HEADER_LEN);
                assert_eq!(len, cut);
            }
            Err(DecodeError::Wire(WireError::TruncatedBlock { .. })) => {
                assert!(cut > HEADER_SIZE && !boundaries.contains(&cut), "cut at {cut}");
            }
            Err(other) => panic!("cut at {cut}: unexpected {other:?}"),
        }
    }
}

#[test]
fn corrupted_payload_never_panics() {
    let bytes = ImageBuilder::new()
        .compressed_block(&sample_text(2000, 4))
        .build();
    let payload_start = HEADER_SIZE + 8;
    let config = DecoderConfig {
        max_decoded_block_len: 1 << 20,
        ..DecoderConfig::default()
    };

    for pos in payload_start..bytes.len() {
        for value in [0x00, 0x01, 0x0F, 0x10, 0x11, 0x1F, 0x20, 0x3F, 0x40, 0xFF] {
            let mut damaged = bytes.clone();
            damaged[pos] = value;
            if let Ok(image) = ImgcDecoder::decode_with_config(&damaged, config.clone()) {
                let len = image.decoded_len();
                assert!(len <= 1 << 20, "decoded {len} bytes");
            }
        }
    }
}

#[test]
fn decoded_size_limit() {
    let bytes = small_image().build();
    let config = DecoderConfig {
        max_decoded_block_len: 16,
        ..DecoderConfig::default()
    };
    let err = ImgcDecoder::decode_with_config(&bytes, config).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::BlockTooLarge { size: 37, limit: 16 }
    ));
}

#[test]
fn payload_size_limit() {
    let bytes = small_image().build();
    let config = DecoderConfig {
        max_block_payload_len: 8,
        ..DecoderConfig::default()
    };
    let mut reader = ImageReader::with_config(bytes.as_slice(), config).unwrap();
    assert!(reader.next_block().unwrap().is_some());
    assert!(matches!(
        reader.next_block(),
        Err(DecodeError::BlockTooLarge { limit: 8, .. })
    ));
    assert!(reader.next_block().unwrap().is_none());
}

#[test]
fn zero_payload_extra_bytes_ignored() {
    // A zero block whose payload is longer than the 8-byte count.
    let mut block = b"omg!".to_vec();
    block.extend_from_slice(&20u32.to_le_bytes());
    block.extend_from_slice(&5u64.to_le_bytes());
    block.extend_from_slice(&[0xEE; 4]);
    let bytes = ImageBuilder::new().raw_bytes(&block).build();
    let image = ImgcDecoder::decode(&bytes).unwrap();
    assert_eq!(image.to_bytes().unwrap(), [0u8; 5]);
}

#[test]
fn undersized_block_size_field() {
    let mut block = b"omg!".to_vec();
    block.extend_from_slice(&7u32.to_le_bytes());
    let bytes = ImageBuilder::new().raw_bytes(&block).build();
    assert!(matches!(
        ImgcDecoder::decode(&bytes),
        Err(DecodeError::Wire(WireError::UndersizedBlock { size: 7 }))
    ));
}

#[test]
fn empty_compressed_block() {
    let bytes = ImageBuilder::new().raw_compressed_block(0, &[], &[]).build();
    let image = ImgcDecoder::decode(&bytes).unwrap();
    assert_eq!(image.blocks.len(), 1);
    assert_eq!(image.decoded_len(), 0);
}

#[test]
fn back_reference_before_start() {
    // A far match as the very first instruction has nothing to copy from.
    let bytes = ImageBuilder::new()
        .raw_compressed_block(4, &[0x11, 0x00, 0x00], &[0; 4])
        .build();
    let err = ImgcDecoder::decode(&bytes).unwrap_err();
    assert!(
        matches!(err, DecodeError::MalformedStream { offset: 0, .. }),
        "{err:?}"
    );
}

#[test]
fn cut_off_size_prefix_decodes_to_nothing() {
    // Each payload is too short for the prefix it starts; decoding goes on.
    let payloads: [&[u8]; 3] = [&[], &[0x01], &[0x00, 0x80, 0x01]];
    let mut image = ImageBuilder::new().compressed_block(b"before");
    for payload in payloads {
        let mut block = b"lol!".to_vec();
        block.extend_from_slice(&u32::try_from(payload.len() + 8).unwrap().to_le_bytes());
        block.extend_from_slice(payload);
        image = image.raw_bytes(&block);
    }
    let bytes = image.zero_block(4).build();

    let decoded = ImgcDecoder::decode(&bytes).unwrap();
    assert_eq!(decoded.blocks.len(), 5);
    for block in &decoded.blocks[1..4] {
        assert_eq!(block.content, DecodedBlock::Data(Vec::new()));
    }
    assert_eq!(decoded.to_bytes().unwrap(), b"before\0\0\0\0");
}
