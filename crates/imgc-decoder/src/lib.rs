#![warn(clippy::pedantic)]

pub mod block;
pub mod config;
pub mod decoder;
pub mod decompression;
pub mod error;
pub mod extract;
pub mod reader;
pub mod streaming;

pub use block::{Block, DecodedBlock};
pub use config::DecoderConfig;
pub use decoder::{DecodedImage, ImgcDecoder};
pub use error::DecodeError;
pub use extract::{ExtractProgress, ExtractSummary, Extractor};
pub use reader::ImageReader;
pub use streaming::{DecoderEvent, StreamingDecoder};
