//! Instruction operands.
//!
//! The operand model mirrors what x86 encodings can express in 32-bit mode:
//!
//! - [`Operand::Register`] - a general-purpose register
//! - [`Operand::Constant`] - an immediate value with its encoded width and signedness
//! - [`Operand::Indirect`] - a memory access of a known width at an [`Address`]
//! - [`Operand::Address`] - a bare effective address (LEA, prefetch and friends)
//! - [`Operand::CodeOffset`] - a branch displacement relative to the next instruction
//!
//! # Addressing Modes
//!
//! An [`Address`] is `[base + index*scale + displacement]` with every part optional:
//!
//! - `[disp]` - absolute (no base, no index)
//! - `[base]` - register indirect
//! - `[base + disp]` - base plus displacement
//! - `[base + index*scale + disp]` - full SIB addressing
//! - `[index*scale + disp]` - SIB without base

use crate::x86::{DataWidth, Register};

/// How the bytes of an immediate are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signedness {
    /// Two's complement, sign-extended when widened
    Signed,
    /// Zero-extended when widened
    Unsigned,
}

/// An immediate value.
///
/// `width` is the width the value was encoded with, which is narrower than the operation
/// width for the sign-extended `imm8` forms (`83 /x`, `6B`, `6A`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constant {
    /// The value, already sign- or zero-extended according to `signedness`
    pub value: i64,
    /// Encoded width
    pub width: DataWidth,
    /// How the encoded bytes were interpreted
    pub signedness: Signedness,
}

impl Constant {
    /// Creates a signed constant.
    #[must_use]
    pub fn signed(value: i64, width: DataWidth) -> Self {
        Constant {
            value,
            width,
            signedness: Signedness::Signed,
        }
    }

    /// Creates an unsigned constant.
    #[must_use]
    pub fn unsigned(value: i64, width: DataWidth) -> Self {
        Constant {
            value,
            width,
            signedness: Signedness::Unsigned,
        }
    }

    /// Returns the encoded bit pattern, truncated to the encoded width.
    #[must_use]
    pub fn bits(&self) -> u32 {
        match self.width {
            DataWidth::Byte => u32::from(self.value as u8),
            DataWidth::Word => u32::from(self.value as u16),
            DataWidth::Dword => self.value as u32,
        }
    }
}

/// Index register of a SIB address together with its scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScaledIndex {
    /// Index register
    pub register: Register,
    /// Scale factor: 1, 2, 4 or 8
    pub scale: u8,
}

/// An effective address `[base + index*scale + displacement]`.
///
/// # Examples
///
/// ```rust
/// use x86scope::x86::{Address, Register, ScaledIndex};
///
/// // [eax + ecx*4 + 8]
/// let element = Address::base(Register::Eax)
///     .with_index(ScaledIndex { register: Register::Ecx, scale: 4 })
///     .with_displacement(8);
/// assert_eq!(element.displacement, Some(8));
///
/// // [0x401000]
/// let global = Address::absolute(0x40_1000);
/// assert!(global.base.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    /// Base register, absent for absolute and index-only addressing
    pub base: Option<Register>,
    /// Scaled index register from a SIB byte
    pub index: Option<ScaledIndex>,
    /// Signed displacement, absent when the encoding carries none
    pub displacement: Option<i32>,
}

impl Address {
    /// Creates a `[base]` address.
    #[must_use]
    pub fn base(base: Register) -> Self {
        Address {
            base: Some(base),
            index: None,
            displacement: None,
        }
    }

    /// Creates a `[disp]` address.
    #[must_use]
    pub fn absolute(displacement: i32) -> Self {
        Address {
            base: None,
            index: None,
            displacement: Some(displacement),
        }
    }

    /// Adds a scaled index register.
    #[must_use]
    pub fn with_index(mut self, index: ScaledIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Sets the displacement.
    #[must_use]
    pub fn with_displacement(mut self, displacement: i32) -> Self {
        self.displacement = Some(displacement);
        self
    }
}

/// A memory access of a known width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Indirect {
    /// Where the access happens
    pub address: Address,
    /// How many bytes are accessed
    pub width: DataWidth,
}

/// Operand of an x86 instruction.
///
/// # Examples
///
/// ```rust
/// use x86scope::x86::{Operand, Register};
///
/// let reg = Operand::Register(Register::Eax);
/// assert!(reg.is_register());
/// assert_eq!(reg.as_register(), Some(Register::Eax));
/// assert!(!reg.is_memory());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Register operand (e.g., `eax`, `cl`)
    Register(Register),
    /// Immediate constant
    Constant(Constant),
    /// Memory access (e.g., `dword [esp+8]`)
    Indirect(Indirect),
    /// Effective address that is computed but not dereferenced
    Address(Address),
    /// Branch displacement relative to the end of the instruction
    CodeOffset(i32),
}

impl Operand {
    /// Returns the data width of this operand, if it has one.
    #[must_use]
    pub fn width(&self) -> Option<DataWidth> {
        match self {
            Operand::Register(register) => Some(register.width()),
            Operand::Constant(constant) => Some(constant.width),
            Operand::Indirect(indirect) => Some(indirect.width),
            Operand::Address(_) | Operand::CodeOffset(_) => None,
        }
    }

    /// Returns true if this is a register operand.
    #[must_use]
    pub fn is_register(&self) -> bool {
        matches!(self, Operand::Register(_))
    }

    /// Returns true if this is an immediate operand.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self, Operand::Constant(_))
    }

    /// Returns true if this operand dereferences memory.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        matches!(self, Operand::Indirect(_))
    }

    /// Returns the register if this is a register operand.
    #[must_use]
    pub fn as_register(&self) -> Option<Register> {
        match self {
            Operand::Register(register) => Some(*register),
            _ => None,
        }
    }

    /// Returns the constant if this is an immediate operand.
    #[must_use]
    pub fn as_constant(&self) -> Option<Constant> {
        match self {
            Operand::Constant(constant) => Some(*constant),
            _ => None,
        }
    }

    /// Returns the effective address of a memory or address operand.
    #[must_use]
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Operand::Indirect(indirect) => Some(&indirect.address),
            Operand::Address(address) => Some(address),
            _ => None,
        }
    }

    /// Returns the displacement if this is a branch offset.
    #[must_use]
    pub fn as_code_offset(&self) -> Option<i32> {
        match self {
            Operand::CodeOffset(offset) => Some(*offset),
            _ => None,
        }
    }
}

impl From<Register> for Operand {
    fn from(register: Register) -> Self {
        Operand::Register(register)
    }
}

impl From<Constant> for Operand {
    fn from(constant: Constant) -> Self {
        Operand::Constant(constant)
    }
}

impl From<Indirect> for Operand {
    fn from(indirect: Indirect) -> Self {
        Operand::Indirect(indirect)
    }
}
