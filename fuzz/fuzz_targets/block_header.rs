#![no_main]

use libfuzzer_sys::fuzz_target;
use imgc_wire::block_frame::{decoded_length, zero_run_length};
use imgc_wire::BlockHeader;

// Fuzz target: block header, size prefix and zero-run parsing.
//
// The same bytes are fed to all three parsers; none may panic on short or
// inconsistent input, and the size prefix never claims more bytes than exist.
fuzz_target!(|data: &[u8]| {
    if let Ok(header) = BlockHeader::read_from(data) {
        let _ = header.payload_len();
    }
    assert!(decoded_length(data).consumed <= data.len());
    let _ = zero_run_length(data);
});
