#![no_main]

use libfuzzer_sys::fuzz_target;
use imgc_decoder::ImgcDecoder;
use imgc_tests::ImageBuilder;

// Fuzz target: build an image from arbitrary data and decode it back.
//
// The input is split in two: the first half becomes a compressed block,
// the second a literal-only block, with a zero run between them.
fuzz_target!(|data: &[u8]| {
    let (a, b) = data.split_at(data.len() / 2);
    let builder = ImageBuilder::new()
        .compressed_block(a)
        .zero_block(data.len() as u64 % 4096)
        .literal_block(b);

    let image = ImgcDecoder::decode(&builder.build()).unwrap();
    assert_eq!(image.to_bytes().unwrap(), builder.expected());
});
