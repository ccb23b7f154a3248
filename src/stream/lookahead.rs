//! Buffered byte lookahead over an arbitrary [`std::io::Read`] source.
//!
//! [`LookaheadReader`] lets the decoder read ahead of what it has committed to. Bytes are
//! pulled from the source in fixed-size chunks into a [`RingBuffer`], and a read cursor
//! walks over the buffered bytes. Nothing leaves the buffer until [`LookaheadReader::commit`]
//! is called, so any speculative read can be rolled back with a [`Checkpoint`].
//!
//! # Cursor model
//!
//! ```text
//!  position()                 cursor()           buffered()
//!     │                          │                   │
//!     ▼                          ▼                   ▼
//!     [ committed-on-success ... | not yet examined ]  ← refilled from source on demand
//! ```
//!
//! # Example
//!
//! ```rust
//! use x86scope::stream::LookaheadReader;
//!
//! let mut reader = LookaheadReader::new(&[0x66, 0x05, 0x01, 0x00][..]);
//!
//! let start = reader.checkpoint();
//! assert_eq!(reader.next_byte()?, Some(0x66));
//! assert_eq!(reader.next_byte()?, Some(0x05));
//! reader.restore(start)?;
//! assert_eq!(reader.peek()?, Some(0x66));
//!
//! reader.advance()?;
//! reader.commit(reader.cursor())?;
//! assert_eq!(reader.position(), 1);
//! assert_eq!(reader.peek()?, Some(0x05));
//! # Ok::<(), x86scope::Error>(())
//! ```

use std::io::{ErrorKind, Read};

use log::debug;

use crate::{stream::RingBuffer, Result};

/// Default number of bytes requested from the source per refill.
pub const DEFAULT_CHUNK_SIZE: usize = 16;

/// A saved cursor position, created by [`LookaheadReader::checkpoint`].
///
/// Checkpoints are only meaningful until the next [`LookaheadReader::commit`], which
/// shifts the buffer underneath them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Read-ahead buffer with a movable cursor over a byte source.
pub struct LookaheadReader<R> {
    source: R,
    buffer: RingBuffer<u8>,
    /// Reusable chunk used for refills
    scratch: Vec<u8>,
    /// Index of the next unread byte, relative to the buffer front
    cursor: usize,
    /// Stream offset of the buffer front
    position: u64,
    exhausted: bool,
}

impl<R: Read> LookaheadReader<R> {
    /// Wrap `source`, refilling in [`DEFAULT_CHUNK_SIZE`] chunks.
    pub fn new(source: R) -> Self {
        Self::with_chunk_size(source, DEFAULT_CHUNK_SIZE)
    }

    /// Wrap `source`, refilling in chunks of `chunk_size` bytes (at least one).
    pub fn with_chunk_size(source: R, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);

        LookaheadReader {
            source,
            buffer: RingBuffer::with_capacity(chunk_size * 2),
            scratch: vec![0; chunk_size],
            cursor: 0,
            position: 0,
            exhausted: false,
        }
    }

    /// Report stream offsets starting at `position` instead of zero.
    #[must_use]
    pub fn with_position(mut self, position: u64) -> Self {
        self.position = position;
        self
    }

    /// Stream offset of the first uncommitted byte.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Number of bytes read past the last commit.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of bytes currently held in the buffer.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` once the source has reported end of input.
    ///
    /// Buffered bytes may still be available after this turns `true`.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Pull chunks from the source until at least `needed` bytes are buffered or the
    /// source runs dry.
    fn fill(&mut self, needed: usize) -> Result<()> {
        while self.buffer.len() < needed && !self.exhausted {
            let chunk_size = self.scratch.len();
            if self.buffer.free() < chunk_size {
                let capacity = (self.buffer.capacity() * 2).max(self.buffer.len() + chunk_size);
                self.buffer.grow(capacity);
            }

            let read = loop {
                match self.source.read(&mut self.scratch) {
                    Ok(read) => break read,
                    Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                    Err(error) => return Err(error.into()),
                }
            };

            if read == 0 {
                debug!(
                    "byte source exhausted at offset {:#x} with {} bytes buffered",
                    self.position + self.buffer.len() as u64,
                    self.buffer.len()
                );
                self.exhausted = true;
                break;
            }

            for &byte in &self.scratch[..read] {
                self.buffer.push_back(byte)?;
            }
        }

        Ok(())
    }

    /// Peek at the byte `offset` positions past the cursor without moving it.
    ///
    /// Returns `Ok(None)` if the source ends before that byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if a refill fails.
    pub fn peek_byte(&mut self, offset: usize) -> Result<Option<u8>> {
        let index = self.cursor + offset;
        self.fill(index + 1)?;

        if index < self.buffer.len() {
            Ok(Some(self.buffer.get(index)?))
        } else {
            Ok(None)
        }
    }

    /// Peek at the byte under the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if a refill fails.
    pub fn peek(&mut self) -> Result<Option<u8>> {
        self.peek_byte(0)
    }

    /// Read the byte under the cursor and move past it.
    ///
    /// The cursor does not move if the source is exhausted.
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if a refill fails.
    pub fn next_byte(&mut self) -> Result<Option<u8>> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.cursor += 1;
        }
        Ok(byte)
    }

    /// Returns `true` if at least one byte is available under the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if a refill fails.
    pub fn has_data(&mut self) -> Result<bool> {
        Ok(self.peek()?.is_some())
    }

    /// Move the cursor one byte forward over buffered data.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if no byte is available under the cursor.
    pub fn advance(&mut self) -> Result<()> {
        if self.peek()?.is_none() {
            return Err(out_of_bounds_error!());
        }

        self.cursor += 1;
        Ok(())
    }

    /// Move the cursor one byte back, un-reading the last byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the cursor is at the last commit point.
    pub fn retreat(&mut self) -> Result<()> {
        if self.cursor == 0 {
            return Err(out_of_bounds_error!());
        }

        self.cursor -= 1;
        Ok(())
    }

    /// Remember the current cursor position.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.cursor)
    }

    /// Move the cursor back (or forward) to a saved position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the checkpoint lies past the buffered data,
    /// which happens when it was taken before a commit.
    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<()> {
        if checkpoint.0 > self.buffer.len() {
            return Err(out_of_bounds_error!());
        }

        self.cursor = checkpoint.0;
        Ok(())
    }

    /// Copies of the bytes between the last commit and the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the buffer state is inconsistent.
    pub fn pending(&self) -> Result<Vec<u8>> {
        self.buffer.to_vec(0..self.cursor)
    }

    /// Permanently drop the first `count` buffered bytes and reset the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `count` bytes are buffered.
    pub fn commit(&mut self, count: usize) -> Result<()> {
        self.buffer.discard_front(count)?;
        self.position += count as u64;
        self.cursor = 0;
        Ok(())
    }
}
