// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # x86scope
//!
//! A streaming 32-bit x86 instruction decoder and a generic interval algebra, in pure Rust.
//!
//! ## Features
//!
//! - **Streaming decoding** - Pull instructions one at a time from any [`std::io::Read`]
//!   source; bytes are buffered in small chunks and only committed once a whole
//!   instruction has been recognised
//! - **Typed operands** - Registers, immediates with explicit width and signedness, memory
//!   operands with base, scaled index and displacement, relative branch offsets
//! - **Precise errors** - Truncated and unrecognized encodings are reported with their
//!   offset and bytes instead of panicking
//! - **Interval algebra** - Intervals with inclusive, exclusive and unbounded endpoints,
//!   normalising interval sets and interval-keyed maps with combine-on-overlap insertion
//!
//! ## Quick Start
//!
//! ### Using the Prelude
//!
//! ```rust
//! use x86scope::prelude::*;
//!
//! // push ebp; mov ebp, esp; sub esp, 0x10
//! let code: &[u8] = &[0x55, 0x89, 0xE5, 0x83, 0xEC, 0x10];
//!
//! for decoded in Decoder::new(code) {
//!     let decoded = decoded?;
//!     println!("{:#06x}: {} ({} bytes)", decoded.offset, decoded.instruction.mnemonic(), decoded.length);
//! }
//! # Ok::<(), x86scope::Error>(())
//! ```
//!
//! ### Intervals
//!
//! ```rust
//! use x86scope::interval::{Interval, IntervalSet};
//!
//! let mut set: IntervalSet<i32> = "(-oo;5] U (7;9) U [12;16]".parse()?;
//! set.add(Interval::singleton(6));
//!
//! assert!(set.contains(&6));
//! assert!(!set.contains(&7));
//! # Ok::<(), x86scope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`x86`] - Instruction model and the streaming decoder
//! - [`interval`] - Intervals, interval sets and interval maps
//! - [`stream`] - Lookahead buffering over non-seekable byte sources
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`](Result):
//!
//! ```rust
//! use x86scope::{x86::decode_single, Error};
//!
//! match decode_single(&[0x0F, 0xFF], 0x1000) {
//!     Ok(decoded) => println!("{:?}", decoded.instruction),
//!     Err(Error::UnexpectedEndOfStream { offset, .. }) => println!("truncated at {:#x}", offset),
//!     Err(Error::UnrecognizedOpcode { bytes, .. }) => println!("unknown encoding {:02x?}", bytes),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! ### Fuzzing
//!
//! ```bash
//! # Install fuzzing tools
//! cargo install cargo-fuzz
//!
//! # Run fuzzers
//! cargo +nightly fuzz run decoder --release
//! cargo +nightly fuzz run interval_parse --release
//! ```
//!
//! ### Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```
#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use x86scope::prelude::*;
///
/// let decoded = decode_single(&[0x50], 0)?;
/// assert_eq!(decoded.instruction, Instruction::Push { src: Operand::Register(Register::Eax) });
/// # Ok::<(), x86scope::Error>(())
/// ```
pub mod prelude;

/// Byte-source plumbing: ring buffer, lookahead reader and little-endian decoding.
///
/// # Key Types
///
/// - [`stream::LookaheadReader`] - Chunked read-ahead with checkpoint / restore and commit
/// - [`stream::RingBuffer`] - Bounded double-ended circular buffer
pub mod stream;

/// 32-bit x86 instruction model and streaming decoder
///
/// # Key Types
///
/// - [`x86::Decoder`] - Streaming decoder over a byte source
/// - [`x86::Instruction`] - One variant per supported mnemonic
/// - [`x86::Operand`] - Registers, immediates, memory operands and branch offsets
///
/// # Examples
///
/// ```rust
/// use x86scope::x86::{decode_single, Instruction};
///
/// let decoded = decode_single(&[0x0F, 0xA2], 0)?;
/// assert_eq!(decoded.instruction, Instruction::Cpuid);
/// assert_eq!(decoded.length, 2);
/// # Ok::<(), x86scope::Error>(())
/// ```
pub mod x86;

/// Generic interval algebra over ordered value types
///
/// # Key Types
///
/// - [`interval::Interval`] - A range with inclusive, exclusive or unbounded endpoints
/// - [`interval::IntervalSet`] - A normalised union of disjoint intervals
/// - [`interval::IntervalMap`] - Disjoint interval keys with combine-on-overlap values
pub mod interval;

/// `x86scope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `x86scope` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;
