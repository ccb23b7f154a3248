use thiserror::Error;

macro_rules! malformed_interval {
    // Single string version
    ($text:expr, $msg:expr) => {
        crate::Error::MalformedInterval {
            text: $text.to_string(),
            message: $msg.to_string(),
        }
    };

    // Format string with arguments version
    ($text:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::MalformedInterval {
            text: $text.to_string(),
            message: format!($fmt, $($arg)*),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Instruction Decoding Errors
/// - [`Error::UnexpectedEndOfStream`] - The byte source ended in the middle of an instruction
/// - [`Error::UnrecognizedOpcode`] - The bytes do not form any known encoding
/// - [`Error::Io`] - The underlying byte source failed
///
/// ## Buffer Errors
/// - [`Error::BufferFull`] - A bounded ring buffer rejected a push
/// - [`Error::OutOfBounds`] - Indexed access, cursor movement or commit past the buffered data
///
/// ## Interval Errors
/// - [`Error::MalformedInterval`] - Interval text could not be parsed
/// - [`Error::InvalidInterval`] - Strict interval construction was given bounds that describe no value
///
/// # Examples
///
/// ```rust
/// use x86scope::{x86::decode_single, Error};
///
/// match decode_single(&[0x89], 0) {
///     Err(Error::UnexpectedEndOfStream { offset, bytes }) => {
///         assert_eq!(offset, 0);
///         assert_eq!(bytes, vec![0x89]);
///     }
///     other => panic!("unexpected result {:?}", other),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Decoding errors
    /// The byte source ended before the instruction starting at `offset` was complete.
    ///
    /// Nothing has been committed: the bytes listed in `bytes` are still buffered and the
    /// next decode attempt starts at `offset` again.
    ///
    /// # Fields
    ///
    /// * `offset` - Stream offset of the first byte of the truncated instruction
    /// * `bytes` - The bytes read in the failed attempt
    #[error("Unexpected end of stream at {offset:#x} after {bytes:02x?}")]
    UnexpectedEndOfStream {
        /// Stream offset of the instruction start
        offset: u64,
        /// Bytes read before the source ran dry
        bytes: Vec<u8>,
    },

    /// The bytes at `offset` do not match any supported encoding.
    ///
    /// # Fields
    ///
    /// * `offset` - Stream offset of the first byte of the attempt
    /// * `bytes` - Prefix, opcode and (for group opcodes) ModRM bytes that were examined
    #[error("Unrecognized opcode at {offset:#x}: {bytes:02x?}")]
    UnrecognizedOpcode {
        /// Stream offset of the instruction start
        offset: u64,
        /// The offending bytes
        bytes: Vec<u8>,
    },

    /// The underlying byte source reported an I/O failure.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    // Buffer errors
    /// A push was attempted on a ring buffer that is at capacity.
    #[error("Ring buffer is full - capacity {capacity}")]
    BufferFull {
        /// The fixed capacity of the buffer
        capacity: usize,
    },

    /// An out of bound access was attempted on buffered data.
    ///
    /// Raised for indexed access past the end of a buffer, for moving a read cursor
    /// before the start or past the end of buffered data, and for committing more
    /// bytes than are buffered.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    // Interval errors
    /// Interval text did not form a valid interval.
    ///
    /// # Fields
    ///
    /// * `text` - The rejected input
    /// * `message` - What was wrong with it
    #[error("Malformed interval '{text}': {message}")]
    MalformedInterval {
        /// The rejected input
        text: String,
        /// Description of the problem
        message: String,
    },

    /// An interval was constructed strictly from bounds that describe no value.
    #[error("Invalid interval - {message}")]
    InvalidInterval {
        /// Description of the offending bounds
        message: String,
    },
}

impl Error {
    /// Returns `true` for errors caused by the byte source running dry mid-instruction.
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        matches!(self, Error::UnexpectedEndOfStream { .. })
    }

    /// Returns the bytes of a failed decode attempt, if this is a decoding error.
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Error::UnexpectedEndOfStream { bytes, .. } | Error::UnrecognizedOpcode { bytes, .. } => {
                Some(bytes)
            }
            _ => None,
        }
    }
}
