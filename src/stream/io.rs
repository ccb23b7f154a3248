//! Little-endian fixed-width integer decoding.
//!
//! The [`LeBytes`] trait provides a unified interface for turning a little-endian byte
//! sequence into one of the integer types that appear in x86 encodings (immediates,
//! displacements and relative branch offsets). [`read_le`] applies it to a slice.
//!
//! Whether a field is interpreted as signed or unsigned is decided by the caller through
//! the choice of `T`: the decoder reads signed types for displacements and branch offsets
//! and picks per opcode for immediates.
//!
//! # Example
//!
//! ```rust
//! use x86scope::stream::read_le;
//!
//! let value: i16 = read_le(&[0xFE, 0xFF])?;
//! assert_eq!(value, -2);
//!
//! let value: u16 = read_le(&[0xFE, 0xFF])?;
//! assert_eq!(value, 0xFFFE);
//! # Ok::<(), x86scope::Error>(())
//! ```

use crate::Result;

/// Trait for integer types that can be decoded from little-endian bytes.
///
/// Each implementation names the fixed-size byte array it is built from; the array length
/// doubles as the number of bytes the decoder has to consume.
pub trait LeBytes: Sized + Copy {
    /// Byte array holding exactly one encoded value.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Number of bytes one encoded value occupies.
    const SIZE: usize;

    /// Decode `Self` from a little-endian byte array.
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Widen to `i64`, sign-extending signed types and zero-extending unsigned ones.
    fn widen(self) -> i64;
}

macro_rules! impl_le_bytes {
    ($($ty:ty),* $(,)?) => {
        $(
            impl LeBytes for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn widen(self) -> i64 {
                    i64::from(self)
                }
            }
        )*
    };
}

impl_le_bytes!(u8, i8, u16, i16, u32, i32);

/// Decode a `T` from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than `T::SIZE`.
pub fn read_le<T: LeBytes>(data: &[u8]) -> Result<T> {
    if data.len() < T::SIZE {
        return Err(out_of_bounds_error!());
    }

    let Ok(bytes) = data[..T::SIZE].try_into() else {
        return Err(out_of_bounds_error!());
    };

    Ok(T::from_le_bytes(bytes))
}
