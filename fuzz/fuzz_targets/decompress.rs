#![no_main]

use libfuzzer_sys::fuzz_target;
use imgc_decoder::decompression::decompress_into;

// Fuzz target: the LZO-variant decompressor on its own.
//
// Input format:
//   bytes 0..2: output capacity (u16 LE)
//   bytes 2..:  instruction stream
//
// Catches bugs in:
// - Length extensions running off the end of the input
// - Back-references before the start of the output
// - Literal and match copies past the output capacity
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let capacity = usize::from(u16::from_le_bytes([data[0], data[1]]));
    let mut out = vec![0u8; capacity];
    if let Ok(written) = decompress_into(&data[2..], &mut out) {
        assert!(written <= capacity);
    }
});
