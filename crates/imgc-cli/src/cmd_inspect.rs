/// Implementation of `unimgc inspect`.
///
/// Walks every block of the image, decoding each one, and prints one line
/// per block. When `--block N` is given only that block is printed, but
/// the blocks before it are still decoded.
///
/// # Output format
///
/// ```text
/// Image: HDD Raw Copy Tool 1.10, 976773168 sectors * 512 bytes
/// Block 0 @ 0x1000: compressed size=23512 decoded=65536
/// Block 1 @ 0x6bd8: zero size=16 decoded=1048576
/// ---
/// 2 blocks (1 compressed, 1 zero), 1114112 bytes decoded
/// ```
use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use imgc_decoder::{Block, ImageReader};
use imgc_wire::BlockKind;

use crate::InspectArgs;

/// Run the `unimgc inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any block fails to
/// decode. Lines for blocks before the failure are already printed.
pub fn run(args: &InspectArgs) -> Result<()> {
    let file =
        File::open(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let reader = ImageReader::new(BufReader::new(file))
        .with_context(|| format!("failed to decode {}", args.file.display()))?;

    let header = reader.header();
    println!(
        "Image: {} {}, {} sectors * {} bytes",
        header.software.name, header.software.version, header.sector_count, header.sector_size
    );

    let (mut compressed, mut zero, mut decoded) = (0u64, 0u64, 0u64);
    for (idx, block) in reader.enumerate() {
        let block = block.with_context(|| format!("block {idx} is corrupt"))?;
        match block.header.kind {
            BlockKind::Compressed => compressed += 1,
            BlockKind::Zero => zero += 1,
        }
        decoded += block.content.len();

        if let Some(target) = args.block
            && idx != target
        {
            continue;
        }
        println!("{}", block_line(idx, &block));
        if args.block.is_some() {
            return Ok(());
        }
    }

    if let Some(target) = args.block {
        anyhow::bail!("image has no block {target}");
    }

    println!("---");
    println!(
        "{} block{} ({compressed} compressed, {zero} zero), {decoded} bytes decoded",
        compressed + zero,
        if compressed + zero == 1 { "" } else { "s" }
    );
    Ok(())
}

fn kind_label(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Compressed => "compressed",
        BlockKind::Zero => "zero",
    }
}

fn block_line(idx: usize, block: &Block) -> String {
    format!(
        "Block {idx} @ 0x{:x}: {} size={} decoded={}",
        block.offset,
        kind_label(block.header.kind),
        block.header.declared_size,
        block.content.len()
    )
}
