#![no_main]

use libfuzzer_sys::fuzz_target;
use imgc_decoder::{DecoderConfig, ImgcDecoder};

// Fuzz target: full in-memory decoder entry point.
//
// Limits are lowered so that size fields from the fuzzer cannot force
// large allocations.
//
// Catches bugs in:
// - Header parsing and short header regions
// - Block framing (magic, undersized and truncated blocks)
// - Size prefix handling and per-block decompression
fuzz_target!(|data: &[u8]| {
    let config = DecoderConfig {
        max_block_payload_len: 1 << 20,
        max_decoded_block_len: 1 << 20,
    };
    let _ = ImgcDecoder::decode_with_config(data, config);
});
