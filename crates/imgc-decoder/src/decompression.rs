//! LZO-variant decompressor used by IMGC compressed blocks.
//!
//! The stream is a sequence of byte-oriented instructions. Each one either
//! copies a run of literal bytes from the input, or copies earlier output
//! (a back-reference) followed by up to three literal bytes. How many
//! literal bytes follow a back-reference is carried into the next
//! instruction as the literal state.
//!
//! ```text
//!   instr         shape      length                distance
//!   ───────────── ────────── ───────────────────── ─────────────────────────────
//!   first > 17    literals   instr - 17            -
//!   0LLDDDSS+     M2  (1 B)  ((instr>>5)&7) + 1    (next<<3) + D + 1
//!   001LLLLL      M3  (LE16) ext(5 bits) + 2       (w>>2) + 1
//!   0001HLLL      M4  (LE16) ext(3 bits) + 2       (H<<14) + (w>>2) + 0x4000
//!   0000LLLL      literals   ext(4 bits) + 3       -         (only when idle)
//! ```
//!
//! This is not reference LZO1X. There is no end-of-stream instruction,
//! a short instruction after a literal run is rejected instead of being a
//! match, and copies are clamped to the output capacity instead of
//! failing. Decoding stops when the input is exhausted.

use crate::error::DecodeError;

/// Literal bookkeeping carried from one instruction to the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LiteralState {
    /// Nothing pending: start of stream, or a match that carried no
    /// literals. Only here may a `0000LLLL` literal run appear.
    Idle,
    /// The current match is followed by this many (1..=3) literal bytes.
    Trailing(u8),
    /// A literal run was just copied.
    AfterLiteralRun,
}

impl LiteralState {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Self::Idle,
            n => Self::Trailing(n),
        }
    }
}

/// Read side of the decoder: a position in the instruction stream.
struct Input<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Input<'a> {
    fn is_exhausted(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn byte(&mut self) -> Result<u8, DecodeError> {
        let b = *self.buf.get(self.pos).ok_or_else(|| exhausted(self.pos))?;
        self.pos += 1;
        Ok(b)
    }

    fn le16(&mut self) -> Result<u16, DecodeError> {
        let raw = self.take(2)?;
        Ok(u16::from_le_bytes([raw[0], raw[1]]))
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| exhausted(self.pos))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

/// Write side of the decoder: a fixed buffer that never grows.
struct Output<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Output<'_> {
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Append literal bytes, dropping whatever does not fit.
    fn push_literals(&mut self, bytes: &[u8]) {
        let n = bytes.len().min(self.remaining());
        self.buf[self.pos..self.pos + n].copy_from_slice(&bytes[..n]);
        self.pos += n;
    }

    /// Copy `length` bytes starting `distance` bytes back.
    ///
    /// The copy runs one byte at a time so that a source range overlapping
    /// the destination (`distance < length`) repeats the bytes just
    /// written. `copy_within` has memmove semantics and would read the
    /// stale bytes instead.
    fn copy_match(&mut self, distance: usize, length: usize) -> Result<(), &'static str> {
        let length = length.min(self.remaining());
        if length == 0 {
            return Ok(());
        }
        if distance > self.pos {
            return Err("back-reference before start of output");
        }
        for i in self.pos..self.pos + length {
            self.buf[i] = self.buf[i - distance];
        }
        self.pos += length;
        Ok(())
    }
}

fn exhausted(offset: usize) -> DecodeError {
    DecodeError::MalformedStream {
        offset,
        reason: "input ended mid-instruction",
    }
}

/// Decode `input` into `output`, returning the number of bytes written.
///
/// `output` is the full capacity available; the decoder never writes past
/// it and silently drops any literal or match bytes that would. A stream
/// that produces fewer bytes than `output.len()` leaves the tail untouched.
///
/// # Errors
///
/// Returns [`DecodeError::MalformedStream`] if an instruction is invalid
/// in the current literal state, the input ends mid-instruction, or a
/// back-reference points before the start of the output.
pub fn decompress_into(input: &[u8], output: &mut [u8]) -> Result<usize, DecodeError> {
    let mut src = Input { buf: input, pos: 0 };
    let mut dst = Output { buf: output, pos: 0 };
    let mut state = LiteralState::Idle;

    // The first byte is special: above 17 it is a literal run of
    // `first - 17` bytes, whatever its bit pattern.
    if let Some(&first) = input.first()
        && first > 17
    {
        src.pos = 1;
        let run = src.take(usize::from(first - 17))?;
        dst.push_literals(run);
        state = LiteralState::AfterLiteralRun;
    }

    while !src.is_exhausted() {
        state = step(&mut src, &mut dst, state)?;
    }

    Ok(dst.pos)
}

/// Decode `input` into a new buffer of at most `capacity` bytes.
///
/// The returned vector holds only the bytes the stream produced.
///
/// # Errors
///
/// Same as [`decompress_into`].
pub fn decompress(input: &[u8], capacity: usize) -> Result<Vec<u8>, DecodeError> {
    let mut out = vec![0u8; capacity];
    let written = decompress_into(input, &mut out)?;
    out.truncate(written);
    Ok(out)
}

/// Decode one instruction and return the literal state it leaves behind.
fn step(
    src: &mut Input<'_>,
    dst: &mut Output<'_>,
    state: LiteralState,
) -> Result<LiteralState, DecodeError> {
    let start = src.pos;
    let instr = src.byte()?;

    let (length, distance, next) = match instr {
        64..=255 => {
            let follow = src.byte()?;
            let length = usize::from((instr >> 5) & 0x7) + 1;
            let distance = (usize::from(follow) << 3) + usize::from((instr >> 2) & 0x7) + 1;
            (length, distance, LiteralState::from_bits(instr))
        }
        32..=63 => {
            let length = extended_length(src, instr, 5)?.saturating_add(2);
            let follow = src.le16()?;
            let distance = usize::from(follow >> 2) + 1;
            (length, distance, LiteralState::from_bits(follow.to_le_bytes()[0]))
        }
        16..=31 => {
            let length = extended_length(src, instr, 3)?.saturating_add(2);
            let follow = src.le16()?;
            let distance =
                (usize::from((instr >> 3) & 0x1) << 14) + usize::from(follow >> 2) + 0x4000;
            (length, distance, LiteralState::from_bits(follow.to_le_bytes()[0]))
        }
        0..=15 => {
            if state != LiteralState::Idle {
                return Err(DecodeError::MalformedStream {
                    offset: start,
                    reason: "literal run while a previous instruction is pending",
                });
            }
            let length = extended_length(src, instr, 4)?.saturating_add(3);
            let run = src.take(length)?;
            dst.push_literals(run);
            return Ok(LiteralState::AfterLiteralRun);
        }
    };

    dst.copy_match(distance, length)
        .map_err(|reason| DecodeError::MalformedStream {
            offset: start,
            reason,
        })?;

    if let LiteralState::Trailing(n) = next {
        let literals = src.take(usize::from(n))?;
        dst.push_literals(literals);
    }

    Ok(next)
}

/// Length field of an instruction, before the instruction's base is added.
///
/// The low `bits` of `instr` hold the length directly. When they are all
/// zero the length continues in the following bytes: each zero byte adds
/// 255, and the first non-zero byte adds its value plus the field mask.
fn extended_length(src: &mut Input<'_>, instr: u8, bits: u32) -> Result<usize, DecodeError> {
    let mask = (1u8 << bits) - 1;
    let immediate = instr & mask;
    if immediate != 0 {
        return Ok(usize::from(immediate));
    }

    let mut total = 0usize;
    loop {
        let b = src.byte()?;
        if b != 0 {
            return Ok(total.saturating_add(usize::from(b) + usize::from(mask)));
        }
        total = total.saturating_add(255);
    }
}
