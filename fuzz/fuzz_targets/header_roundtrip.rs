#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use imgc_wire::header::HEADER_SIZE;
use imgc_wire::{ImageHeader, PascalString};

#[derive(Arbitrary, Debug)]
struct Input {
    name: Vec<u8>,
    serial: Vec<u8>,
    sector_count: u64,
    sector_size: u64,
    unknown1: u64,
    unknown3: u8,
}

// Fuzz target: ImageHeader write->read roundtrip.
//
// Strings longer than 255 bytes must be rejected by PascalString; all
// others must survive the roundtrip unchanged.
fuzz_target!(|input: Input| {
    let (Ok(name), Ok(serial)) = (
        PascalString::from_bytes(&input.name),
        PascalString::from_bytes(&input.serial),
    ) else {
        assert!(input.name.len() > 255 || input.serial.len() > 255);
        return;
    };

    let mut header = ImageHeader {
        sector_count: input.sector_count,
        sector_size: input.sector_size,
        unknown1: input.unknown1,
        unknown3: input.unknown3,
        ..ImageHeader::default()
    };
    header.software.name = name;
    header.volume.serial = serial;

    let mut buf = vec![0u8; HEADER_SIZE];
    header.write_to(&mut buf).unwrap();
    let parsed = ImageHeader::read_from(&buf).unwrap();
    assert_eq!(parsed, header);
});
