//! ModRM and SIB byte decoding.
//!
//! The ModRM byte is `[mode:2][reg:3][rm:3]`. When `mode != 11` and `rm == 100` a SIB byte
//! `[scale:2][index:3][base:3]` follows. Displacement presence depends on both:
//!
//! | mode | rm / SIB base          | displacement | base            |
//! |------|------------------------|--------------|-----------------|
//! | 00   | rm = 101               | disp32       | none            |
//! | 00   | SIB, base = 101        | disp32       | none            |
//! | 00   | otherwise              | none         | register        |
//! | 01   | any                    | disp8        | register        |
//! | 10   | any                    | disp32       | register        |
//! | 11   | any                    | none         | (register operand) |
//!
//! A SIB index of `100` means no index register.

/// Decoded ModRM byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModRm {
    /// Addressing mode (bits 7-6)
    pub mode: u8,
    /// Register or opcode extension (bits 5-3)
    pub reg: u8,
    /// Register or memory operand (bits 2-0)
    pub rm: u8,
}

impl ModRm {
    /// Splits a ModRM byte into its fields.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        ModRm {
            mode: byte >> 6,
            reg: (byte >> 3) & 0x07,
            rm: byte & 0x07,
        }
    }

    /// Returns true if the r/m field names a register directly (mode `11`).
    #[must_use]
    pub const fn is_register(&self) -> bool {
        self.mode == 0b11
    }

    /// Returns true if a SIB byte follows.
    #[must_use]
    pub const fn has_sib(&self) -> bool {
        self.mode != 0b11 && self.rm == 0b100
    }

    /// Returns true for the `[disp32]` form (mode `00`, r/m `101`).
    #[must_use]
    pub const fn is_absolute(&self) -> bool {
        self.mode == 0b00 && self.rm == 0b101
    }
}

/// Decoded SIB byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sib {
    /// Scale exponent (bits 7-6), factor `1 << scale`
    pub scale: u8,
    /// Index register number (bits 5-3)
    pub index: u8,
    /// Base register number (bits 2-0)
    pub base: u8,
}

impl Sib {
    /// Splits a SIB byte into its fields.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Sib {
            scale: byte >> 6,
            index: (byte >> 3) & 0x07,
            base: byte & 0x07,
        }
    }

    /// Returns the scale factor: 1, 2, 4 or 8.
    #[must_use]
    pub const fn factor(&self) -> u8 {
        1 << self.scale
    }

    /// Returns false for index `100`, which encodes no index register.
    #[must_use]
    pub const fn has_index(&self) -> bool {
        self.index != 0b100
    }

    /// Returns false for base `101` under ModRM mode `00`, where a disp32 replaces the base.
    #[must_use]
    pub const fn has_base(&self, mode: u8) -> bool {
        !(self.base == 0b101 && mode == 0b00)
    }
}
