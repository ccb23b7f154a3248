//! General-purpose registers and operand widths of 32-bit x86.
//!
//! Registers are numbered the way the encoding numbers them: the three-bit register fields
//! of opcode bytes, ModRM and SIB bytes index into [`REGISTERS_8`], [`REGISTERS_16`] and
//! [`REGISTERS_32`] depending on the operand width in effect.

use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// Size of a data access.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumCount,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum DataWidth {
    /// 8 bits
    Byte,
    /// 16 bits
    Word,
    /// 32 bits
    Dword,
}

impl DataWidth {
    /// Returns the width in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            DataWidth::Byte => 1,
            DataWidth::Word => 2,
            DataWidth::Dword => 4,
        }
    }

    /// Returns the width in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        (self.size() * 8) as u32
    }
}

/// x86 general-purpose register (32-bit protected mode).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumCount,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Register {
    /// 32-bit accumulator register (EAX)
    Eax,
    /// 32-bit counter register (ECX)
    Ecx,
    /// 32-bit data register (EDX)
    Edx,
    /// 32-bit base register (EBX)
    Ebx,
    /// 32-bit stack pointer (ESP)
    Esp,
    /// 32-bit base pointer (EBP)
    Ebp,
    /// 32-bit source index (ESI)
    Esi,
    /// 32-bit destination index (EDI)
    Edi,

    /// 16-bit accumulator register (AX)
    Ax,
    /// 16-bit counter register (CX)
    Cx,
    /// 16-bit data register (DX)
    Dx,
    /// 16-bit base register (BX)
    Bx,
    /// 16-bit stack pointer (SP)
    Sp,
    /// 16-bit base pointer (BP)
    Bp,
    /// 16-bit source index (SI)
    Si,
    /// 16-bit destination index (DI)
    Di,

    /// 8-bit low accumulator (AL)
    Al,
    /// 8-bit low counter (CL)
    Cl,
    /// 8-bit low data (DL)
    Dl,
    /// 8-bit low base (BL)
    Bl,
    /// 8-bit high accumulator (AH)
    Ah,
    /// 8-bit high counter (CH)
    Ch,
    /// 8-bit high data (DH)
    Dh,
    /// 8-bit high base (BH)
    Bh,
}

/// 8-bit registers in encoding order.
pub static REGISTERS_8: [Register; 8] = [
    Register::Al,
    Register::Cl,
    Register::Dl,
    Register::Bl,
    Register::Ah,
    Register::Ch,
    Register::Dh,
    Register::Bh,
];

/// 16-bit registers in encoding order.
pub static REGISTERS_16: [Register; 8] = [
    Register::Ax,
    Register::Cx,
    Register::Dx,
    Register::Bx,
    Register::Sp,
    Register::Bp,
    Register::Si,
    Register::Di,
];

/// 32-bit registers in encoding order.
pub static REGISTERS_32: [Register; 8] = [
    Register::Eax,
    Register::Ecx,
    Register::Edx,
    Register::Ebx,
    Register::Esp,
    Register::Ebp,
    Register::Esi,
    Register::Edi,
];

impl Register {
    /// Looks up the register a three-bit encoding field names at the given width.
    ///
    /// Only the low three bits of `number` are used.
    #[must_use]
    pub fn from_number(number: u8, width: DataWidth) -> Register {
        let index = usize::from(number & 0x07);
        match width {
            DataWidth::Byte => REGISTERS_8[index],
            DataWidth::Word => REGISTERS_16[index],
            DataWidth::Dword => REGISTERS_32[index],
        }
    }

    /// Returns the width of this register.
    #[inline]
    #[must_use]
    pub fn width(self) -> DataWidth {
        match self {
            Register::Al
            | Register::Cl
            | Register::Dl
            | Register::Bl
            | Register::Ah
            | Register::Ch
            | Register::Dh
            | Register::Bh => DataWidth::Byte,
            Register::Ax
            | Register::Cx
            | Register::Dx
            | Register::Bx
            | Register::Sp
            | Register::Bp
            | Register::Si
            | Register::Di => DataWidth::Word,
            Register::Eax
            | Register::Ecx
            | Register::Edx
            | Register::Ebx
            | Register::Esp
            | Register::Ebp
            | Register::Esi
            | Register::Edi => DataWidth::Dword,
        }
    }

    /// Returns the three-bit number this register is encoded as.
    #[inline]
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Register::Al | Register::Ax | Register::Eax => 0,
            Register::Cl | Register::Cx | Register::Ecx => 1,
            Register::Dl | Register::Dx | Register::Edx => 2,
            Register::Bl | Register::Bx | Register::Ebx => 3,
            Register::Ah | Register::Sp | Register::Esp => 4,
            Register::Ch | Register::Bp | Register::Ebp => 5,
            Register::Dh | Register::Si | Register::Esi => 6,
            Register::Bh | Register::Di | Register::Edi => 7,
        }
    }

    /// Returns the 32-bit register this register is part of.
    ///
    /// The high byte registers map to their containing register (`ah` is part of `eax`).
    #[must_use]
    pub fn full(self) -> Register {
        match self {
            Register::Ah => Register::Eax,
            Register::Ch => Register::Ecx,
            Register::Dh => Register::Edx,
            Register::Bh => Register::Ebx,
            other => REGISTERS_32[usize::from(other.number())],
        }
    }

    /// Returns true if this is the stack pointer register.
    #[inline]
    #[must_use]
    pub fn is_stack_pointer(self) -> bool {
        matches!(self, Register::Sp | Register::Esp)
    }
}
