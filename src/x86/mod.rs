//! 32-bit x86 instruction decoding.
//!
//! The decoder covers the protected-mode one-byte opcode map, the `0F` two-byte map and a
//! handful of `0F 01 xx` three-byte forms. Operands are fully typed: registers, immediates
//! with their encoded width and signedness, memory operands with base, scaled index and
//! displacement, and relative branch offsets.
//!
//! # Key Types
//!
//! - [`Decoder`] - streaming decoder over any [`std::io::Read`] source
//! - [`DecodedInstruction`] - an [`Instruction`] with its offset, length and prefixes
//! - [`Operand`], [`Address`], [`Constant`], [`Register`] - the operand model
//! - [`Mnemonic`] - operand-free instruction discriminant
//!
//! # Main Functions
//!
//! - [`decode_single`] - decode one instruction from a slice
//! - [`decode_all`] - decode a whole slice
//! - [`decode_regions`] - decode independent regions in parallel

mod condition;
mod config;
mod decoder;
mod instruction;
mod modrm;
mod opcodes;
mod opcodes_0f;
mod operand;
pub mod prefix;
mod register;

pub use condition::{Condition, CONDITIONS};
pub use config::DecoderConfig;
pub use decoder::{decode_all, decode_regions, decode_single, Decoder};
pub use instruction::{DecodedInstruction, Instruction, Mnemonic};
pub use modrm::{ModRm, Sib};
pub use operand::{Address, Constant, Indirect, Operand, ScaledIndex, Signedness};
pub use prefix::{PrefixFlags, Prefixes};
pub use register::{DataWidth, Register, REGISTERS_16, REGISTERS_32, REGISTERS_8};
