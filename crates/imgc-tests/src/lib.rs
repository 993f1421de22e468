//! Fixture builders for the IMGC integration tests, benches and fuzz seeds.
//!
//! [`ImageBuilder`] assembles a complete image in memory and records the
//! raw bytes it should decode to, so tests can compare the two directly:
//!
//! ```rust
//! use imgc_decoder::ImgcDecoder;
//! use imgc_tests::ImageBuilder;
//!
//! let builder = ImageBuilder::new()
//!     .compressed_block(b"boot sector boot sector boot sector")
//!     .zero_block(512);
//! let image = ImgcDecoder::decode(&builder.build()).unwrap();
//! assert_eq!(image.to_bytes().unwrap(), builder.expected());
//! ```

pub mod compress;

use std::path::Path;

use imgc_wire::header::HEADER_SIZE;
use imgc_wire::{BlockHeader, BlockKind, ImageHeader, PascalString, SizePrefix};

pub use compress::compress;

/// Builds IMGC images block by block.
#[derive(Clone, Debug)]
pub struct ImageBuilder {
    header: ImageHeader,
    blocks: Vec<u8>,
    expected: Vec<u8>,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    /// An image with a 512-byte sector size and empty strings.
    pub fn new() -> Self {
        Self {
            header: ImageHeader {
                sector_size: 512,
                ..ImageHeader::default()
            },
            blocks: Vec::new(),
            expected: Vec::new(),
        }
    }

    pub fn software(mut self, name: &str, version: &str) -> Self {
        self.header.software.name = pascal(name);
        self.header.software.version = pascal(version);
        self
    }

    pub fn volume(mut self, model: &str, revision: &str, serial: &str) -> Self {
        self.header.volume.model = pascal(model);
        self.header.volume.revision = pascal(revision);
        self.header.volume.serial = pascal(serial);
        self
    }

    pub fn geometry(mut self, sector_count: u64, sector_size: u64) -> Self {
        self.header.sector_count = sector_count;
        self.header.sector_size = sector_size;
        self
    }

    pub fn unknowns(mut self, unknown1: u64, unknown2: u64, unknown3: u8) -> Self {
        self.header.unknown1 = unknown1;
        self.header.unknown2 = unknown2;
        self.header.unknown3 = unknown3;
        self
    }

    /// Set the sector count so the header's declared size matches the
    /// blocks added so far (rounded up to whole sectors).
    pub fn fit_geometry(mut self) -> Self {
        let size = self.header.sector_size.max(1);
        self.header.sector_count = (self.expected.len() as u64).div_ceil(size);
        self
    }

    /// Append a zero block of `n` bytes.
    pub fn zero_block(mut self, n: u64) -> Self {
        let mut payload = n.to_le_bytes().to_vec();
        self.push_block(BlockKind::Zero, &mut payload);
        let len = usize::try_from(n).expect("zero run fits in memory");
        self.expected.resize(self.expected.len() + len, 0);
        self
    }

    /// Append a compressed block holding `data`.
    pub fn compressed_block(mut self, data: &[u8]) -> Self {
        let stream = compress(data);
        self.push_compressed(data.len(), &stream);
        self.expected.extend_from_slice(data);
        self
    }

    /// Append a compressed block holding `data` as literals only.
    pub fn literal_block(mut self, data: &[u8]) -> Self {
        let stream = literal_stream(data);
        self.push_compressed(data.len(), &stream);
        self.expected.extend_from_slice(data);
        self
    }

    /// Append a compressed block with a hand-written instruction stream.
    ///
    /// `decodes_to` is what the decoder should produce for it, already
    /// padded or truncated to `decoded_len`.
    pub fn raw_compressed_block(
        mut self,
        decoded_len: usize,
        stream: &[u8],
        decodes_to: &[u8],
    ) -> Self {
        assert_eq!(decodes_to.len(), decoded_len);
        self.push_compressed(decoded_len, stream);
        self.expected.extend_from_slice(decodes_to);
        self
    }

    /// Append arbitrary bytes after the blocks, e.g. a corrupt block.
    pub fn raw_bytes(mut self, bytes: &[u8]) -> Self {
        self.blocks.extend_from_slice(bytes);
        self
    }

    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    /// The raw disk contents the image decodes to.
    pub fn expected(&self) -> &[u8] {
        &self.expected
    }

    /// Serialize the header and blocks.
    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_SIZE];
        self.header.write_to(&mut out).expect("header buffer is full size");
        out.extend_from_slice(&self.blocks);
        out
    }

    fn push_compressed(&mut self, decoded_len: usize, stream: &[u8]) {
        let mut payload = Vec::with_capacity(stream.len() + 4);
        SizePrefix::write_to(decoded_len, &mut payload).expect("decoded length fits the prefix");
        payload.extend_from_slice(stream);
        self.push_block(BlockKind::Compressed, &mut payload);
    }

    fn push_block(&mut self, kind: BlockKind, payload: &mut Vec<u8>) {
        let header = BlockHeader::for_payload(kind, payload.len()).expect("block fits a u32 size");
        let mut frame = [0u8; 8];
        header.write_to(&mut frame).expect("frame is 8 bytes");
        self.blocks.extend_from_slice(&frame);
        self.blocks.append(payload);
    }
}

/// Instruction stream that stores `data` as plain literals.
pub fn literal_stream(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 8);
    match data.len() {
        0 => {}
        n @ 1..=238 => out.push(17 + u8::try_from(n).expect("checked range")),
        n @ 239.. => {
            out.push(0);
            let mut rest = n - 18;
            while rest > 255 {
                out.push(0);
                rest -= 255;
            }
            out.push(u8::try_from(rest).expect("rest is at most 255"));
        }
    }
    out.extend_from_slice(data);
    out
}

/// Deterministic incompressible bytes (xorshift32).
pub fn noise(len: usize, seed: u32) -> Vec<u8> {
    let mut x = seed.max(1);
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x.to_le_bytes()[0]
        })
        .collect()
}

/// Text-like bytes that compress well.
pub fn sample_text(len: usize, seed: u32) -> Vec<u8> {
    const WORDS: [&[u8]; 8] = [
        b"sector ",
        b"cylinder ",
        b"partition ",
        b"boot ",
        b"journal ",
        b"superblock ",
        b"inode ",
        b"cluster\n",
    ];
    let picks = noise(len, seed);
    let mut out = Vec::with_capacity(len + 16);
    let mut i = 0;
    while out.len() < len {
        out.extend_from_slice(WORDS[usize::from(picks[i % picks.len()] & 7)]);
        i += 1;
    }
    out.truncate(len);
    out
}

/// Read a checked-in fixture from `tests/golden/`.
pub fn golden(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/golden").join(name);
    std::fs::read(&path)
        .unwrap_or_else(|e| panic!("failed to read golden fixture {}: {e}", path.display()))
}

fn pascal(s: &str) -> PascalString {
    PascalString::from_bytes(s.as_bytes()).expect("header strings are at most 255 bytes")
}
