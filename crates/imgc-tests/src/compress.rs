//! Greedy compressor producing streams the IMGC decoder accepts.
//!
//! Only used to build fixtures. It finds matches through a 3-byte hash
//! chain and emits every instruction shape the decoder knows, so that
//! round-trips through it exercise short, medium and far matches, long
//! length extensions and trailing literals.

use std::collections::HashMap;

/// Farthest back-reference the far-match instruction can express.
const MAX_DISTANCE: usize = 0x4000 + 0x7FFF;

/// Cap on a single match so length extensions stay a few bytes long.
const MAX_MATCH: usize = 2000;

/// Candidate positions examined per hash bucket.
const CHAIN: usize = 16;

#[derive(Clone, Copy, Debug)]
struct Match {
    length: usize,
    distance: usize,
}

/// Literal bytes, then optionally a match.
struct Token<'a> {
    literals: &'a [u8],
    matched: Option<Match>,
}

/// Compress `data` into an instruction stream (without the size prefix).
pub fn compress(data: &[u8]) -> Vec<u8> {
    let tokens = tokenize(data);
    let mut out = Vec::with_capacity(data.len() / 2 + 16);

    for (k, token) in tokens.iter().enumerate() {
        let lits = token.literals;
        if k == 0 {
            if (1..=238).contains(&lits.len()) {
                out.push(17 + len_u8(lits.len()));
                out.extend_from_slice(lits);
            } else if !lits.is_empty() {
                literal_run(&mut out, lits.len());
                out.extend_from_slice(lits);
            }
        } else if lits.len() > 3 {
            literal_run(&mut out, lits.len());
            out.extend_from_slice(lits);
        }
        // Up to three literals ride along with the previous match.

        if let Some(m) = token.matched {
            let next = tokens.get(k + 1).map_or(&[][..], |t| t.literals);
            let trailing = if next.len() <= 3 { next.len() } else { 0 };
            match_instruction(&mut out, m, trailing);
            out.extend_from_slice(&next[..trailing]);
        }
    }
    out
}

fn tokenize(data: &[u8]) -> Vec<Token<'_>> {
    let n = data.len();
    let key = |k: usize| [data[k], data[k + 1], data[k + 2]];
    let mut table: HashMap<[u8; 3], Vec<usize>> = HashMap::new();
    let mut tokens = Vec::new();
    let (mut i, mut lit) = (0, 0);

    while i < n {
        let mut best: Option<Match> = None;
        if i > 0
            && i + 3 <= n
            && let Some(candidates) = table.get(&key(i))
        {
            for &p in candidates.iter().rev().take(CHAIN) {
                let distance = i - p;
                if distance > MAX_DISTANCE {
                    continue;
                }
                let mut length = 0;
                while i + length < n
                    && length < MAX_MATCH
                    && data[p + length] == data[i + length]
                {
                    length += 1;
                }
                if length >= 3 && best.is_none_or(|b| length > b.length) {
                    best = Some(Match { length, distance });
                }
            }
        }

        if let Some(m) = best {
            tokens.push(Token {
                literals: &data[lit..i],
                matched: Some(m),
            });
            for k in i..i + m.length {
                if k + 3 <= n {
                    table.entry(key(k)).or_default().push(k);
                }
            }
            i += m.length;
            lit = i;
        } else {
            if i + 3 <= n {
                table.entry(key(i)).or_default().push(i);
            }
            i += 1;
        }
    }
    tokens.push(Token {
        literals: &data[lit..],
        matched: None,
    });
    tokens
}

fn len_u8(n: usize) -> u8 {
    u8::try_from(n).unwrap_or(u8::MAX)
}

/// Length field: `value` in the low bits if it fits in `1..=mask`,
/// otherwise zero there followed by the extension bytes.
fn length_field(out: &mut Vec<u8>, head: u8, value: usize, mask: usize) {
    if (1..=mask).contains(&value) {
        out.push(head | len_u8(value));
        return;
    }
    out.push(head);
    let mut rest = value - mask;
    while rest > 255 {
        out.push(0);
        rest -= 255;
    }
    out.push(len_u8(rest));
}

/// Literal run instruction (`0000LLLL`) for `len >= 4` bytes.
fn literal_run(out: &mut Vec<u8>, len: usize) {
    assert!(len >= 4, "literal runs carry at least four bytes");
    length_field(out, 0x00, len - 3, 15);
}

fn match_instruction(out: &mut Vec<u8>, m: Match, trailing: usize) {
    let t = len_u8(trailing);
    if (3..=8).contains(&m.length) && m.distance <= 2048 {
        let d = m.distance - 1;
        out.push(len_u8((m.length - 1) << 5) | len_u8((d & 7) << 2) | t);
        out.push(len_u8(d >> 3));
    } else if m.distance <= 0x4000 {
        length_field(out, 0x20, m.length - 2, 31);
        let w = ((m.distance - 1) << 2) | trailing;
        out.extend_from_slice(&[len_u8(w & 0xFF), len_u8(w >> 8)]);
    } else {
        let far = m.distance - 0x4000;
        let head = 0x10 | len_u8((far >> 14) << 3);
        length_field(out, head, m.length - 2, 7);
        let w = ((far & 0x3FFF) << 2) | trailing;
        out.extend_from_slice(&[len_u8(w & 0xFF), len_u8(w >> 8)]);
    }
}
