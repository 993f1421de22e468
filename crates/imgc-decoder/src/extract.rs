use std::io::{Read, Write};

use imgc_wire::BlockKind;

use crate::block::Block;
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::reader::ImageReader;

/// Running totals handed to a progress callback after each block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractProgress {
    /// Bytes written so far, including the block just written.
    pub written: u64,
    /// Image size declared by the header. Advisory; may be zero or wrong.
    pub total: u64,
}

/// What an extraction wrote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub blocks: u64,
    pub zero_blocks: u64,
    pub compressed_blocks: u64,
    pub bytes_written: u64,
}

type ProgressFn<'a> = Box<dyn FnMut(&Block, ExtractProgress) + 'a>;

/// Decodes an image and writes the raw disk contents to a sink.
///
/// Blocks are written in order as they are decoded; nothing beyond the
/// current block is buffered. Zero runs are streamed without allocating
/// the run.
///
/// # Example
///
/// ```rust,no_run
/// use std::fs::File;
/// use std::io::BufWriter;
///
/// use imgc_decoder::Extractor;
///
/// let input = File::open("disk.imgc")?;
/// let mut output = BufWriter::new(File::create("disk.img")?);
/// let summary = Extractor::new()
///     .on_progress(|_, p| eprint!("\r{} / {}", p.written, p.total))
///     .extract(input, &mut output)?;
/// eprintln!("\n{} blocks", summary.blocks);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Extractor<'a> {
    config: DecoderConfig,
    progress: Option<ProgressFn<'a>>,
}

impl Default for Extractor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Extractor<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Call `f` after each block is written.
    #[must_use]
    pub fn on_progress(mut self, f: impl FnMut(&Block, ExtractProgress) + 'a) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    /// Read an image from `input` and write its decoded contents to
    /// `output`.
    ///
    /// `output` is flushed on success. On error, whatever was written
    /// before the failing block stays written.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`] from parsing or decoding, or
    /// [`DecodeError::Io`] if writing fails.
    pub fn extract<R: Read, W: Write>(
        &mut self,
        input: R,
        output: &mut W,
    ) -> Result<ExtractSummary, DecodeError> {
        let mut reader = ImageReader::with_config(input, self.config.clone())?;
        self.extract_blocks(&mut reader, output)
    }

    /// Write every remaining block of an already-opened reader.
    ///
    /// # Errors
    ///
    /// Same as [`extract`](Self::extract).
    pub fn extract_blocks<R: Read, W: Write>(
        &mut self,
        reader: &mut ImageReader<R>,
        output: &mut W,
    ) -> Result<ExtractSummary, DecodeError> {
        let total = reader.header().image_size();
        let mut summary = ExtractSummary::default();

        tracing::debug!(image_size = total, "extracting image");

        while let Some(block) = reader.next_block()? {
            let n = block.content.write_to(output)?;
            summary.blocks += 1;
            summary.bytes_written += n;
            match block.header.kind {
                BlockKind::Zero => summary.zero_blocks += 1,
                BlockKind::Compressed => summary.compressed_blocks += 1,
            }
            tracing::debug!(
                offset = block.offset,
                kind = ?block.header.kind,
                bytes = n,
                "wrote block"
            );

            if let Some(progress) = self.progress.as_mut() {
                progress(
                    &block,
                    ExtractProgress {
                        written: summary.bytes_written,
                        total,
                    },
                );
            }
        }
        output.flush()?;

        if summary.bytes_written != total {
            tracing::warn!(
                written = summary.bytes_written,
                declared = total,
                "decoded size differs from header"
            );
        }
        tracing::debug!(
            blocks = summary.blocks,
            bytes = summary.bytes_written,
            "extraction complete"
        );
        Ok(summary)
    }
}
