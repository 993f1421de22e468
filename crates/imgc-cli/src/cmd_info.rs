/// Implementation of `unimgc info`.
///
/// Only the header region is read; blocks are not touched.
///
/// # Output format
///
/// ```text
/// volume metadata:
///   model: WDC WD5000AAKX
///   revision: 15.01H15
///   serial number: WD-WCC2E1234567
/// software metadata:
///   name: HDD Raw Copy Tool
///   version: 1.10
/// image metadata:
///   size: 465.76 GiB (976773168 sectors * 512 bytes)
///   unk1: 0000000000000000
///   unk2: 0000000000000000
///   unk3: 00
/// ```
use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use imgc_decoder::ImageReader;
use imgc_wire::ImageHeader;

use crate::InfoArgs;

/// Run the `unimgc info` command.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or the header is too
/// short.
pub fn run(args: &InfoArgs) -> Result<()> {
    let file =
        File::open(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let reader = ImageReader::new(BufReader::new(file))
        .with_context(|| format!("failed to decode {}", args.file.display()))?;
    print!("{}", render_header(reader.header()));
    Ok(())
}

/// Multi-line description of an image header. Shared with `extract -v`.
pub fn render_header(header: &ImageHeader) -> String {
    let (size, unit) = human_size(header.image_size());
    format!(
        "volume metadata:\n  \
         model: {}\n  \
         revision: {}\n  \
         serial number: {}\n\
         software metadata:\n  \
         name: {}\n  \
         version: {}\n\
         image metadata:\n  \
         size: {size:.2} {unit} ({} sectors * {} bytes)\n  \
         unk1: {:016x}\n  \
         unk2: {:016x}\n  \
         unk3: {:02x}\n",
        header.volume.model,
        header.volume.revision,
        header.volume.serial,
        header.software.name,
        header.software.version,
        header.sector_count,
        header.sector_size,
        header.unknown1,
        header.unknown2,
        header.unknown3,
    )
}

/// Scale `n` to the largest binary unit it strictly exceeds.
#[allow(clippy::cast_precision_loss)]
fn human_size(n: u64) -> (f64, &'static str) {
    const UNITS: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
    for (i, unit) in UNITS.iter().enumerate().rev() {
        let div = 1u64 << (10 * (i + 1));
        if n > div {
            return (n as f64 / div as f64, unit);
        }
    }
    (n as f64, "B")
}

#[cfg(test)]
mod tests {
    use imgc_wire::PascalString;

    use super::*;

    #[test]
    fn human_size_units() {
        assert_eq!(human_size(0), (0.0, "B"));
        assert_eq!(human_size(1024), (1024.0, "B"));
        assert_eq!(human_size(1536), (1.5, "KiB"));
        assert_eq!(human_size(1 << 30), (1024.0, "MiB"));
        assert_eq!(human_size(3 << 30), (3.0, "GiB"));
        assert_eq!(human_size(u64::MAX).1, "EiB");
    }

    #[test]
    fn header_rendering() {
        let mut header = ImageHeader {
            sector_count: 4096,
            sector_size: 512,
            unknown1: 0xDEAD_BEEF,
            unknown2: 1,
            unknown3: 0xA5,
            ..ImageHeader::default()
        };
        header.volume.model = PascalString::from_bytes(b"TESTDISK").unwrap();
        header.software.name = PascalString::from_bytes(b"HDD Raw Copy Tool").unwrap();

        let text = render_header(&header);
        assert_eq!(
            text,
            "volume metadata:\n\
             \x20 model: TESTDISK\n\
             \x20 revision: \n\
             \x20 serial number: \n\
             software metadata:\n\
             \x20 name: HDD Raw Copy Tool\n\
             \x20 version: \n\
             image metadata:\n\
             \x20 size: 2.00 MiB (4096 sectors * 512 bytes)\n\
             \x20 unk1: 00000000deadbeef\n\
             \x20 unk2: 0000000000000001\n\
             \x20 unk3: a5\n"
        );
    }
}
