/// Default cap on a single block's payload and decoded size: 256 MiB.
pub const DEFAULT_BLOCK_LIMIT: usize = 256 * 1024 * 1024;

/// Limits applied by every decoder in this crate.
///
/// ```text
/// ┌───────────────────────┬─────────────────────────────────────────────┐
/// │ Field                 │ Purpose                                     │
/// ├───────────────────────┼─────────────────────────────────────────────┤
/// │ max_block_payload_len │ Largest payload read into memory per block  │
/// │ max_decoded_block_len │ Largest output buffer allocated per block   │
/// └───────────────────────┴─────────────────────────────────────────────┘
/// ```
///
/// Both guard allocations driven by untrusted size fields. Zero blocks
/// are never materialized, so their run length is not limited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    pub max_block_payload_len: usize,
    pub max_decoded_block_len: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_block_payload_len: DEFAULT_BLOCK_LIMIT,
            max_decoded_block_len: DEFAULT_BLOCK_LIMIT,
        }
    }
}
