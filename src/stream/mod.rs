//! Byte-source plumbing for the streaming decoder.
//!
//! This module contains the pieces the decoder reads through:
//!
//! - [`RingBuffer`] - bounded double-ended circular buffer
//! - [`LookaheadReader`] - chunked read-ahead with a rollback-capable cursor
//! - [`LeBytes`] / [`read_le`] - little-endian integer decoding
//!
//! None of these know anything about x86; they are usable for any byte-oriented format that
//! needs speculative reads over a non-seekable source.

mod io;
mod lookahead;
mod ringbuffer;

pub use io::{read_le, LeBytes};
pub use lookahead::{Checkpoint, LookaheadReader, DEFAULT_CHUNK_SIZE};
pub use ringbuffer::RingBuffer;
