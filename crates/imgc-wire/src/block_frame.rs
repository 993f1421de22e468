use crate::error::WireError;

/// Size of the block header preceding every payload.
pub const BLOCK_HEADER_SIZE: usize = 8;

/// Size of a zero block's payload: one u64 run length.
pub const ZERO_PAYLOAD_SIZE: usize = 8;

/// Magic tag of a zero-fill block.
pub const ZERO_MAGIC: [u8; 4] = *b"omg!";

/// Magic tag of an LZO-compressed block.
pub const COMPRESSED_MAGIC: [u8; 4] = *b"lol!";

/// Largest length a 2-byte size prefix can express.
pub const SHORT_PREFIX_MAX: usize = 0x7FFF;

/// Largest length a 4-byte size prefix can express (15 + 16 bits).
pub const LONG_PREFIX_MAX: usize = 0x7FFF_FFFF;

/// What a block's payload holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    /// Payload is a u64 count of zero bytes to emit.
    Zero,
    /// Payload is a size prefix followed by an LZO-variant stream.
    Compressed,
}

impl BlockKind {
    pub fn magic(self) -> [u8; 4] {
        match self {
            Self::Zero => ZERO_MAGIC,
            Self::Compressed => COMPRESSED_MAGIC,
        }
    }

    pub fn from_magic(magic: [u8; 4]) -> Option<Self> {
        match magic {
            ZERO_MAGIC => Some(Self::Zero),
            COMPRESSED_MAGIC => Some(Self::Compressed),
            _ => None,
        }
    }
}

/// Block header, the 8 bytes in front of every block.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────────┐
/// │ Offset │ Size    │ Description                          │
/// ├────────┼─────────┼──────────────────────────────────────┤
/// │ 0x00   │ 4 bytes │ Magic: "omg!" (zero) / "lol!" (lzo)  │
/// │ 0x04   │ 4 bytes │ Block size (u32 LE), header included │
/// └────────┴─────────┴──────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub kind: BlockKind,

    /// Size field as stored on the wire. It counts the 8 header bytes,
    /// see [`payload_len`](Self::payload_len).
    pub declared_size: u32,
}

impl BlockHeader {
    /// Header for a block carrying `payload_len` bytes after the header.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::LengthOverflow`] if the total size does not fit
    /// the u32 size field.
    pub fn for_payload(kind: BlockKind, payload_len: usize) -> Result<Self, WireError> {
        let declared_size = payload_len
            .checked_add(BLOCK_HEADER_SIZE)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(WireError::LengthOverflow {
                len: payload_len.saturating_add(BLOCK_HEADER_SIZE),
                max: u32::MAX as usize,
            })?;
        Ok(Self {
            kind,
            declared_size,
        })
    }

    /// Number of payload bytes that follow this header.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UndersizedBlock`] if the size field is smaller
    /// than the header itself.
    pub fn payload_len(&self) -> Result<usize, WireError> {
        (self.declared_size as usize)
            .checked_sub(BLOCK_HEADER_SIZE)
            .ok_or(WireError::UndersizedBlock {
                size: self.declared_size,
            })
    }

    /// Parse a block header from the first 8 bytes of `buf`.
    ///
    /// # Errors
    ///
    /// - [`WireError::TruncatedBlock`] if `buf` is shorter than 8 bytes.
    /// - [`WireError::UnknownBlockMagic`] if the tag is not a known one.
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < BLOCK_HEADER_SIZE {
            return Err(WireError::TruncatedBlock {
                expected: BLOCK_HEADER_SIZE,
                available: buf.len(),
            });
        }

        let magic = [buf[0], buf[1], buf[2], buf[3]];
        let kind =
            BlockKind::from_magic(magic).ok_or(WireError::UnknownBlockMagic { found: magic })?;
        let declared_size = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);

        Ok(Self {
            kind,
            declared_size,
        })
    }

    /// Write the 8-byte header into `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::BufferTooSmall`] if `buf` is shorter than 8 bytes.
    pub fn write_to(&self, buf: &mut [u8]) -> Result<(), WireError> {
        if buf.len() < BLOCK_HEADER_SIZE {
            return Err(WireError::BufferTooSmall {
                needed: BLOCK_HEADER_SIZE,
                len: buf.len(),
            });
        }
        buf[0..4].copy_from_slice(&self.kind.magic());
        buf[4..8].copy_from_slice(&self.declared_size.to_le_bytes());
        Ok(())
    }
}

/// Decoded-length prefix at the start of a compressed payload.
///
/// ```text
/// w0 = u16 LE at payload[0..2]
/// if w0 & 0x8000 == 0:  decoded_len = w0                              (2 bytes)
/// else:                 decoded_len = (w0 & 0x7FFF) | (w1 << 15)     (4 bytes)
///                       with w1 = u16 LE at payload[2..4]
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizePrefix {
    /// Number of bytes the compressed stream decodes to.
    pub decoded_len: usize,
    /// Prefix bytes consumed (2 or 4); the stream starts after them.
    pub consumed: usize,
}

impl SizePrefix {
    /// Encode `decoded_len` using the short form when it fits.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::LengthOverflow`] if `decoded_len` exceeds
    /// [`LONG_PREFIX_MAX`].
    // Both halves are masked to 16 bits before the cast.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_to(decoded_len: usize, out: &mut Vec<u8>) -> Result<usize, WireError> {
        if decoded_len > LONG_PREFIX_MAX {
            return Err(WireError::LengthOverflow {
                len: decoded_len,
                max: LONG_PREFIX_MAX,
            });
        }
        if decoded_len <= SHORT_PREFIX_MAX {
            out.extend_from_slice(&(decoded_len as u16).to_le_bytes());
            Ok(2)
        } else {
            let low = (decoded_len & 0x7FFF) as u16 | 0x8000;
            let high = (decoded_len >> 15) as u16;
            out.extend_from_slice(&low.to_le_bytes());
            out.extend_from_slice(&high.to_le_bytes());
            Ok(4)
        }
    }
}

/// Read the size prefix of a compressed payload without decoding it.
///
/// A payload too short for the prefix it announces (under 2 bytes, or
/// under 4 with the long-form flag set) has a decoded length of 0 and
/// consumes the whole payload, so the block contributes no bytes.
pub fn decoded_length(payload: &[u8]) -> SizePrefix {
    let empty = SizePrefix {
        decoded_len: 0,
        consumed: payload.len(),
    };

    let Some(&[b0, b1]) = payload.get(0..2) else {
        return empty;
    };
    let low = u16::from_le_bytes([b0, b1]);
    if low & 0x8000 == 0 {
        return SizePrefix {
            decoded_len: usize::from(low),
            consumed: 2,
        };
    }

    let Some(&[b2, b3]) = payload.get(2..4) else {
        return empty;
    };
    let high = u16::from_le_bytes([b2, b3]);
    SizePrefix {
        decoded_len: usize::from(low & 0x7FFF) | (usize::from(high) << 15),
        consumed: 4,
    }
}

/// Read the number of zero bytes a zero block expands to.
///
/// Bytes past the first 8 are ignored.
///
/// # Errors
///
/// Returns [`WireError::TruncatedBlock`] if the payload is shorter than
/// 8 bytes.
pub fn zero_run_length(payload: &[u8]) -> Result<u64, WireError> {
    let raw = payload
        .get(..ZERO_PAYLOAD_SIZE)
        .ok_or(WireError::TruncatedBlock {
            expected: ZERO_PAYLOAD_SIZE,
            available: payload.len(),
        })?;
    let mut bytes = [0u8; ZERO_PAYLOAD_SIZE];
    bytes.copy_from_slice(raw);
    Ok(u64::from_le_bytes(bytes))
}
