use std::borrow::Cow;
use std::fmt;

use crate::error::WireError;

/// Size of the header region at the start of every image. Blocks start here.
pub const HEADER_SIZE: usize = 0x1000;

/// Bytes of the header that carry data; the rest is padding.
pub const MIN_HEADER_LEN: usize = 0x521;

/// Width of each length-prefixed string field.
pub const PASCAL_FIELD_SIZE: usize = 0x100;

/// Maximum content length of a length-prefixed string.
pub const PASCAL_MAX_LEN: usize = PASCAL_FIELD_SIZE - 1;

const SOFTWARE_NAME: usize = 0x000;
const SOFTWARE_VERSION: usize = 0x100;
const VOLUME_MODEL: usize = 0x200;
const VOLUME_REVISION: usize = 0x300;
const VOLUME_SERIAL: usize = 0x400;
const SECTOR_COUNT: usize = 0x500;
const SECTOR_SIZE: usize = 0x508;
const UNKNOWN1: usize = 0x510;
const UNKNOWN2: usize = 0x518;
const UNKNOWN3: usize = 0x520;

/// A length-prefixed string as stored in the header.
///
/// The first byte of the 0x100-byte field is the length, the remaining
/// 255 bytes hold the content. Only the first `length` bytes mean anything;
/// the source bytes are not null-terminated and are not guaranteed to be
/// UTF-8.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PascalString(Vec<u8>);

impl PascalString {
    /// Build from raw content bytes.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::PascalTooLong`] if `bytes` is longer than 255.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() > PASCAL_MAX_LEN {
            return Err(WireError::PascalTooLong { len: bytes.len() });
        }
        Ok(Self(bytes.to_vec()))
    }

    /// The meaningful content bytes (exactly `length` of them).
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Content as text, replacing invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse one 0x100-byte field. The caller guarantees the width.
    fn read_field(field: &[u8]) -> Self {
        let len = usize::from(field[0]);
        Self(field[1..=len].to_vec())
    }

    fn write_field(&self, field: &mut [u8]) {
        field.fill(0);
        // from_bytes caps the length at 255
        #[allow(clippy::cast_possible_truncation)]
        let len = self.0.len() as u8;
        field[0] = len;
        field[1..=self.0.len()].copy_from_slice(&self.0);
    }
}

impl fmt::Display for PascalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// The program that produced the image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SoftwareInfo {
    /// e.g. "HDD Raw Copy Tool"
    pub name: PascalString,
    /// e.g. "1.10"
    pub version: PascalString,
}

/// The device the image was taken from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VolumeInfo {
    pub model: PascalString,
    pub revision: PascalString,
    pub serial: PascalString,
}

/// IMGC image header, the first 0x1000 bytes of every image.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────────┐
/// │ Offset │ Size    │ Description                          │
/// ├────────┼─────────┼──────────────────────────────────────┤
/// │ 0x000  │ 0x100   │ Software name (pascal string)        │
/// │ 0x100  │ 0x100   │ Software version                     │
/// │ 0x200  │ 0x100   │ Volume model                         │
/// │ 0x300  │ 0x100   │ Volume revision                      │
/// │ 0x400  │ 0x100   │ Volume serial                        │
/// │ 0x500  │ 8       │ Sector count (u64 LE)                │
/// │ 0x508  │ 8       │ Sector size (u64 LE)                 │
/// │ 0x510  │ 8       │ Unknown (u64 LE)                     │
/// │ 0x518  │ 8       │ Unknown (u64 LE)                     │
/// │ 0x520  │ 1       │ Unknown                              │
/// │ 0x521  │ ...     │ Padding up to 0x1000                 │
/// └────────┴─────────┴──────────────────────────────────────┘
/// ```
///
/// The three unknown fields have no known meaning. They are kept as-is so
/// they can be displayed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageHeader {
    pub software: SoftwareInfo,
    pub volume: VolumeInfo,
    pub sector_count: u64,
    pub sector_size: u64,
    pub unknown1: u64,
    pub unknown2: u64,
    pub unknown3: u8,
}

impl ImageHeader {
    /// Total image size as declared by the header.
    ///
    /// Advisory only: it is used for progress reporting and is never
    /// checked against the number of bytes actually decoded.
    pub fn image_size(&self) -> u64 {
        self.sector_count.saturating_mul(self.sector_size)
    }

    /// Parse the header from the start of `buf`.
    ///
    /// Only the first [`MIN_HEADER_LEN`] bytes are read; padding up to
    /// [`HEADER_SIZE`] may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::TruncatedHeader`] if `buf` is shorter than
    /// [`MIN_HEADER_LEN`].
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < MIN_HEADER_LEN {
            return Err(WireError::TruncatedHeader { len: buf.len() });
        }

        let field =
            |offset: usize| PascalString::read_field(&buf[offset..offset + PASCAL_FIELD_SIZE]);

        Ok(Self {
            software: SoftwareInfo {
                name: field(SOFTWARE_NAME),
                version: field(SOFTWARE_VERSION),
            },
            volume: VolumeInfo {
                model: field(VOLUME_MODEL),
                revision: field(VOLUME_REVISION),
                serial: field(VOLUME_SERIAL),
            },
            sector_count: read_u64_le(buf, SECTOR_COUNT),
            sector_size: read_u64_le(buf, SECTOR_SIZE),
            unknown1: read_u64_le(buf, UNKNOWN1),
            unknown2: read_u64_le(buf, UNKNOWN2),
            unknown3: buf[UNKNOWN3],
        })
    }

    /// Write the header layout into `buf`, zeroing the padding up to
    /// [`HEADER_SIZE`] if `buf` is that long.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::BufferTooSmall`] if `buf` is shorter than
    /// [`MIN_HEADER_LEN`].
    pub fn write_to(&self, buf: &mut [u8]) -> Result<(), WireError> {
        if buf.len() < MIN_HEADER_LEN {
            return Err(WireError::BufferTooSmall {
                needed: MIN_HEADER_LEN,
                len: buf.len(),
            });
        }

        let end = buf.len().min(HEADER_SIZE);
        buf[..end].fill(0);

        let strings = [
            (SOFTWARE_NAME, &self.software.name),
            (SOFTWARE_VERSION, &self.software.version),
            (VOLUME_MODEL, &self.volume.model),
            (VOLUME_REVISION, &self.volume.revision),
            (VOLUME_SERIAL, &self.volume.serial),
        ];
        for (offset, s) in strings {
            s.write_field(&mut buf[offset..offset + PASCAL_FIELD_SIZE]);
        }

        buf[SECTOR_COUNT..SECTOR_COUNT + 8].copy_from_slice(&self.sector_count.to_le_bytes());
        buf[SECTOR_SIZE..SECTOR_SIZE + 8].copy_from_slice(&self.sector_size.to_le_bytes());
        buf[UNKNOWN1..UNKNOWN1 + 8].copy_from_slice(&self.unknown1.to_le_bytes());
        buf[UNKNOWN2..UNKNOWN2 + 8].copy_from_slice(&self.unknown2.to_le_bytes());
        buf[UNKNOWN3] = self.unknown3;

        Ok(())
    }
}

fn read_u64_le(buf: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_le_bytes(raw)
}
