#![warn(clippy::pedantic)]

pub mod block_frame;
pub mod error;
pub mod header;

pub use block_frame::{BlockHeader, BlockKind, SizePrefix};
pub use error::WireError;
pub use header::{ImageHeader, PascalString};
