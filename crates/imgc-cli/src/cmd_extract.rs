/// Implementation of `unimgc extract`.
///
/// Streams the image from IN to OUT one block at a time. With `-v` the
/// header is printed to stderr and a progress line is kept updated:
///
/// ```text
/// 42.17% (226395750400 / 536870912000 bytes)...
/// ```
///
/// From `-vv` on, per-block log lines take the place of the progress line.
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use imgc_decoder::{ExtractProgress, Extractor, ImageReader};

use crate::ExtractArgs;
use crate::cmd_info::render_header;

/// Run the `unimgc extract` command.
///
/// # Errors
///
/// Returns an error if either file cannot be opened, or on the first
/// decode or write failure. Output written before the failure is left in
/// place.
pub fn run(args: &ExtractArgs) -> Result<()> {
    let input = open_input(args.input.as_deref())?;
    let output = open_output(args.output.as_deref())?;
    let mut output = BufWriter::new(output);

    let mut reader = ImageReader::new(input).context("cannot read image header")?;
    if args.verbose >= 1 {
        eprint!("{}", render_header(reader.header()));
    }

    let mut extractor = Extractor::new();
    if shows_progress(args.verbose) {
        extractor = extractor.on_progress(|_, p| eprint!("\r{}", progress_line(p)));
    }
    let summary = extractor
        .extract_blocks(&mut reader, &mut output)
        .with_context(|| format!("extraction failed ({})", describe(args.input.as_deref())))?;

    if shows_progress(args.verbose) {
        eprintln!();
    }
    tracing::info!(
        blocks = summary.blocks,
        zero_blocks = summary.zero_blocks,
        compressed_blocks = summary.compressed_blocks,
        bytes = summary.bytes_written,
        "done"
    );
    Ok(())
}

/// `None`, an empty path and `-` all mean standard input or output.
fn file_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty() && p.as_os_str() != "-")
}

fn describe(path: Option<&Path>) -> String {
    file_path(path).map_or_else(|| "standard input".to_string(), |p| p.display().to_string())
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    let Some(path) = file_path(path) else {
        return Ok(Box::new(io::stdin().lock()));
    };
    let file = File::open(path).with_context(|| format!("cannot open input {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let Some(path) = file_path(path) else {
        return Ok(Box::new(io::stdout().lock()));
    };
    let file =
        File::create(path).with_context(|| format!("cannot open output {}", path.display()))?;
    Ok(Box::new(file))
}

/// The `\r` progress line only stays readable while nothing else is
/// logged to stderr.
fn shows_progress(verbose: u8) -> bool {
    verbose == 1
}

#[allow(clippy::cast_precision_loss)]
fn progress_line(p: ExtractProgress) -> String {
    let pct = if p.total == 0 {
        0.0
    } else {
        100.0 * p.written as f64 / p.total as f64
    };
    format!("{pct:.2}% ({} / {} bytes)...", p.written, p.total)
}
