//! Legacy instruction prefixes.
//!
//! The decoder records up to [`MAX_PREFIXES`] prefix bytes in front of an opcode. Only the
//! operand-size override changes how the rest of the instruction is decoded (16-bit operand
//! width, 16-bit near-branch offsets). `LOCK`, `REPNE` and `REP` are recorded and handed to
//! the caller with the decoded instruction; `REP NOP` (`F3 90`) decodes as `pause`.

use bitflags::bitflags;

/// Operand-size override prefix.
pub const OPERAND_SIZE_OVERRIDE: u8 = 0x66;
/// `LOCK` prefix.
pub const LOCK: u8 = 0xF0;
/// `REPNE` / `REPNZ` prefix.
pub const REPNE: u8 = 0xF2;
/// `REP` / `REPE` / `REPZ` prefix.
pub const REP: u8 = 0xF3;

/// Maximum number of prefix bytes recorded for one instruction.
pub const MAX_PREFIXES: usize = 4;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Kinds of prefixes present on an instruction
    pub struct PrefixFlags : u8 {
        /// `0x66` operand-size override
        const OPERAND_SIZE = 0x01;
        /// `0xF0` bus lock
        const LOCK = 0x02;
        /// `0xF2` repeat while not equal
        const REPNE = 0x04;
        /// `0xF3` repeat while equal
        const REP = 0x08;
    }
}

impl PrefixFlags {
    /// Returns the flag a prefix byte sets, or `None` if the byte is no recognised prefix.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<PrefixFlags> {
        match byte {
            OPERAND_SIZE_OVERRIDE => Some(PrefixFlags::OPERAND_SIZE),
            LOCK => Some(PrefixFlags::LOCK),
            REPNE => Some(PrefixFlags::REPNE),
            REP => Some(PrefixFlags::REP),
            _ => None,
        }
    }
}

/// Prefix bytes recorded in front of one instruction, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Prefixes {
    bytes: [u8; MAX_PREFIXES],
    len: usize,
    flags: PrefixFlags,
}

impl Prefixes {
    /// Returns true if `byte` is a prefix this decoder records.
    #[must_use]
    pub fn is_prefix(byte: u8) -> bool {
        PrefixFlags::from_byte(byte).is_some()
    }

    /// Records a prefix byte.
    ///
    /// Returns `false` without recording anything if `byte` is not a prefix or
    /// [`MAX_PREFIXES`] bytes are already recorded.
    pub fn push(&mut self, byte: u8) -> bool {
        let Some(flag) = PrefixFlags::from_byte(byte) else {
            return false;
        };
        if self.is_full() {
            return false;
        }

        self.bytes[self.len] = byte;
        self.len += 1;
        self.flags |= flag;
        true
    }

    /// Returns true if `byte` was recorded.
    #[must_use]
    pub fn has(&self, byte: u8) -> bool {
        self.as_bytes().contains(&byte)
    }

    /// Returns true if the operand-size override is present.
    #[must_use]
    pub fn operand_size_override(&self) -> bool {
        self.flags.contains(PrefixFlags::OPERAND_SIZE)
    }

    /// Returns the kinds of prefixes present.
    #[must_use]
    pub fn flags(&self) -> PrefixFlags {
        self.flags
    }

    /// Returns the recorded bytes in encoding order.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Number of recorded prefix bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no prefix was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if no further prefix can be recorded.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == MAX_PREFIXES
    }
}
