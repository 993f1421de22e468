//! Conformance tests: checked-in images decoded and compared to known output.
//!
//! Fixtures live in `tests/golden/`:
//!
//! ```text
//! ┌────────────────┬──────────────────────────────────────────────────────┐
//! │ File           │ Contents                                             │
//! ├────────────────┼──────────────────────────────────────────────────────┤
//! │ basic.imgc     │ 3 blocks: text (16 KiB), zero run (8 KiB), mixed     │
//! │                │ 40 KiB block with far matches and a 4-byte prefix    │
//! │ basic.img      │ the 64 KiB raw disk basic.imgc decodes to            │
//! │ truncated.imgc │ basic.imgc minus its last 5 bytes                    │
//! │ bad_magic.imgc │ one valid block, then a block tagged "xyz!"          │
//! └────────────────┴──────────────────────────────────────────────────────┘
//! ```
//!
//! The block listing is checked with an inline `insta` snapshot; a change
//! there means the wire parsing moved.

use std::io::Cursor;

use imgc_decoder::{
    DecodeError, DecodedBlock, DecoderEvent, ExtractSummary, Extractor, ImageReader, ImgcDecoder,
    StreamingDecoder,
};
use imgc_tests::golden;
use imgc_wire::{BlockKind, WireError};

fn listing(bytes: &[u8]) -> String {
    ImageReader::new(bytes)
        .unwrap()
        .enumerate()
        .map(|(idx, block)| {
            let block = block.unwrap();
            let kind = match block.header.kind {
                BlockKind::Compressed => "compressed",
                BlockKind::Zero => "zero",
            };
            format!(
                "Block {idx} @ 0x{:x}: {kind} size={} decoded={}",
                block.offset,
                block.header.declared_size,
                block.content.len()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── basic.imgc ────────────────────────────────────────────────────────────────

#[test]
fn basic_header_fields() {
    let image = ImgcDecoder::decode(&golden("basic.imgc")).unwrap();
    let h = &image.header;
    assert_eq!(h.software.name.as_bytes(), b"HDD Raw Copy Tool");
    assert_eq!(h.software.version.as_bytes(), b"1.10");
    assert_eq!(h.volume.model.as_bytes(), b"WDC WD5000AAKX-00ERMA0");
    assert_eq!(h.volume.revision.as_bytes(), b"15.01H15");
    assert_eq!(h.volume.serial.as_bytes(), b"WD-WCC2EKX12345");
    assert_eq!(h.sector_count, 128);
    assert_eq!(h.sector_size, 512);
    assert_eq!(h.image_size(), 65536);
    assert_eq!(h.unknown1, 0x0000_0001_0000_0002);
    assert_eq!(h.unknown2, 0x20);
    assert_eq!(h.unknown3, 0x01);
}

#[test]
fn basic_block_listing() {
    insta::assert_snapshot!(listing(&golden("basic.imgc")), @r"
    Block 0 @ 0x1000: compressed size=3684 decoded=16384
    Block 1 @ 0x1e64: zero size=16 decoded=8192
    Block 2 @ 0x1e74: compressed size=21130 decoded=40960
    ");
}

#[test]
fn basic_decodes_to_raw_disk() {
    let image = ImgcDecoder::decode(&golden("basic.imgc")).unwrap();
    let raw = golden("basic.img");
    assert_eq!(image.decoded_len(), raw.len() as u64);
    assert_eq!(image.to_bytes().unwrap(), raw);
    assert_eq!(image.blocks[1].content, DecodedBlock::Zero(8192));
}

#[test]
fn basic_extracts_to_raw_disk() {
    let mut out = Vec::new();
    let summary = Extractor::new()
        .extract(Cursor::new(golden("basic.imgc")), &mut out)
        .unwrap();
    assert_eq!(
        summary,
        ExtractSummary {
            blocks: 3,
            zero_blocks: 1,
            compressed_blocks: 2,
            bytes_written: 65536,
        }
    );
    assert_eq!(out, golden("basic.img"));
}

#[tokio::test]
async fn basic_streams_to_raw_disk() {
    let mut stream = StreamingDecoder::new(Cursor::new(golden("basic.imgc")));
    let mut out = Vec::new();
    let mut headers = 0;
    while let Some(event) = stream.next().await {
        match event.unwrap() {
            DecoderEvent::Header(h) => {
                headers += 1;
                assert_eq!(h.sector_count, 128);
            }
            DecoderEvent::Block(block) => {
                block.content.write_to(&mut out).unwrap();
            }
        }
    }
    assert_eq!(headers, 1);
    assert_eq!(out, golden("basic.img"));
}

// ── Damaged fixtures ──────────────────────────────────────────────────────────

#[test]
fn truncated_fixture_fails_on_last_block() {
    let bytes = golden("truncated.imgc");
    let mut reader = ImageReader::new(bytes.as_slice()).unwrap();
    assert!(reader.next_block().unwrap().is_some());
    assert!(reader.next_block().unwrap().is_some());
    let err = reader.next_block().unwrap_err();
    assert!(
        matches!(
            err,
            DecodeError::Wire(WireError::TruncatedBlock {
                expected: 21122,
                available: 21117
            })
        ),
        "{err:?}"
    );
}

#[test]
fn truncated_fixture_keeps_earlier_output() {
    let mut out = Vec::new();
    let err = Extractor::new()
        .extract(Cursor::new(golden("truncated.imgc")), &mut out)
        .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Wire(WireError::TruncatedBlock { .. })
    ));
    assert_eq!(out, golden("basic.img")[..16384 + 8192]);
}

#[test]
fn bad_magic_fixture() {
    let err = ImgcDecoder::decode(&golden("bad_magic.imgc")).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Wire(WireError::UnknownBlockMagic { found }) if &found == b"xyz!"
    ));
    assert_eq!(
        err.to_string(),
        "unknown block magic [78, 79, 7A, 21] (xyz!)"
    );
}
