#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: ImageHeader::read_from with arbitrary bytes.
//
// Catches bugs in:
// - Minimum length enforcement
// - Length-prefixed string fields with out-of-range lengths
fuzz_target!(|data: &[u8]| {
    let _ = imgc_wire::ImageHeader::read_from(data);
});
