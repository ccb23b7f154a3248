//! # x86scope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the
//! x86scope library. Import it to get quick access to the decoder, the instruction and
//! operand model, and the interval containers.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all x86scope operations
pub use crate::Error;

/// The result type used throughout x86scope
pub use crate::Result;

// ================================================================================================
// Instruction Decoding
// ================================================================================================

/// Streaming decoder and its configuration
pub use crate::x86::{Decoder, DecoderConfig};

/// Slice and parallel decoding helpers
pub use crate::x86::{decode_all, decode_regions, decode_single};

/// Decoded instructions and their discriminant
pub use crate::x86::{DecodedInstruction, Instruction, Mnemonic};

/// Operand model
pub use crate::x86::{
    Address, Condition, Constant, DataWidth, Indirect, Operand, Register, ScaledIndex,
    Signedness,
};

/// Prefix bytes recorded for an instruction
pub use crate::x86::{PrefixFlags, Prefixes};

// ================================================================================================
// Interval Algebra
// ================================================================================================

/// Intervals and their containers
pub use crate::interval::{Bound, Interval, IntervalFormat, IntervalMap, IntervalSet};
