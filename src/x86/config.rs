//! Configuration for the instruction decoder.

use crate::stream::DEFAULT_CHUNK_SIZE;

/// Configuration for a [`crate::x86::Decoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Bytes requested from the source per lookahead refill (default: 16, minimum 1).
    pub chunk_size: usize,

    /// Stream offset reported for the first byte of the source (default: 0).
    ///
    /// Instruction offsets and branch targets are reported relative to this address.
    pub base_address: u64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            base_address: 0,
        }
    }
}

impl DecoderConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the refill chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Sets the address of the first byte.
    #[must_use]
    pub fn with_base_address(mut self, base_address: u64) -> Self {
        self.base_address = base_address;
        self
    }
}
