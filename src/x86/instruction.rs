//! The instruction catalogue.
//!
//! [`Instruction`] is a closed sum type with one variant per mnemonic the decoder
//! understands. Variants carry their operands as named fields, so dispatch sites get
//! exhaustiveness checking and callers never have to guess operand order.
//!
//! # Instruction Categories
//!
//! - **Data Movement**: `Mov`, `Movzx`, `Movsx`, `Lea`, `Push`, `Pop`, `Xchg`, `Cmovcc`, `Bswap`
//! - **Arithmetic**: `Add`, `Adc`, `Sub`, `Sbb`, `Imul`, `Mul`, `Div`, `Idiv`, `Neg`, `Inc`, `Dec`
//! - **Bitwise**: `And`, `Or`, `Xor`, `Not`, shifts, rotates, bit tests and scans
//! - **Comparison**: `Cmp`, `Test`, `Setcc`, `Cmpxchg`
//! - **Control Flow**: `Jmp`, `Jcc`, `Call`, `Ret`, `Loop`, `Jecxz`, `Int`
//! - **Strings**: `Movs`, `Cmps`, `Stos`, `Lods`, `Scas` in byte, word and dword forms
//! - **System**: `Cpuid`, `Rdtsc`, `Rdmsr`, fences, prefetches, ...
//!
//! The [`Mnemonic`] enum is the operand-free discriminant of [`Instruction`], generated by
//! strum. It prints and parses lowercase mnemonic names.

use strum::{Display, EnumCount, EnumDiscriminants, EnumIter, EnumString, IntoStaticStr};

use crate::x86::{Address, Condition, Operand, Prefixes, Register};

/// A decoded x86 instruction.
///
/// Two-operand forms name their operands `dst` and `src` in Intel order; comparisons name
/// them `left` and `right` because neither is written.
///
/// # Examples
///
/// ```rust
/// use x86scope::x86::{Instruction, Mnemonic, Operand, Register};
///
/// let mov = Instruction::Mov {
///     dst: Operand::Register(Register::Ecx),
///     src: Operand::Register(Register::Eax),
/// };
/// assert_eq!(mov.mnemonic(), Mnemonic::Mov);
/// assert_eq!(mov.mnemonic().to_string(), "mov");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumDiscriminants)]
#[strum_discriminants(name(Mnemonic))]
#[strum_discriminants(derive(Display, EnumIter, EnumCount, EnumString, IntoStaticStr, Hash))]
#[strum_discriminants(strum(serialize_all = "lowercase"))]
#[strum_discriminants(allow(missing_docs))]
pub enum Instruction {
    // Arithmetic and logic
    /// Addition: `add dst, src`
    Add {
        /// Destination operand (receives result)
        dst: Operand,
        /// Source operand
        src: Operand,
    },
    /// Bitwise or: `or dst, src`
    Or {
        /// Destination operand (receives result)
        dst: Operand,
        /// Source operand
        src: Operand,
    },
    /// Add with carry: `adc dst, src`
    Adc {
        /// Destination operand (receives result)
        dst: Operand,
        /// Source operand
        src: Operand,
    },
    /// Subtract with borrow: `sbb dst, src`
    Sbb {
        /// Destination operand (receives result)
        dst: Operand,
        /// Source operand
        src: Operand,
    },
    /// Bitwise and: `and dst, src`
    And {
        /// Destination operand (receives result)
        dst: Operand,
        /// Source operand
        src: Operand,
    },
    /// Subtraction: `sub dst, src`
    Sub {
        /// Destination operand (receives result)
        dst: Operand,
        /// Source operand
        src: Operand,
    },
    /// Bitwise exclusive or: `xor dst, src`
    Xor {
        /// Destination operand (receives result)
        dst: Operand,
        /// Source operand
        src: Operand,
    },
    /// Compare: `cmp left, right` (computes `left - right`, sets flags)
    Cmp {
        /// Left operand
        left: Operand,
        /// Right operand
        right: Operand,
    },
    /// Logical compare: `test left, right` (computes `left & right`, sets flags)
    Test {
        /// Left operand
        left: Operand,
        /// Right operand
        right: Operand,
    },
    /// Increment by one: `inc dst`
    Inc {
        /// Operand to increment
        dst: Operand,
    },
    /// Decrement by one: `dec dst`
    Dec {
        /// Operand to decrement
        dst: Operand,
    },
    /// Two's complement negation: `neg dst`
    Neg {
        /// Operand to negate
        dst: Operand,
    },
    /// One's complement: `not dst`
    Not {
        /// Operand to invert
        dst: Operand,
    },
    /// Signed multiply, two or three operand form: `imul dst, src[, src2]`
    Imul {
        /// Destination register
        dst: Operand,
        /// First source operand
        src: Operand,
        /// Immediate multiplier of the three-operand form
        src2: Option<Operand>,
    },
    /// Signed multiply into the accumulator pair: `imul src`
    ImulAcc {
        /// Multiplier
        src: Operand,
    },
    /// Unsigned multiply into the accumulator pair: `mul src`
    Mul {
        /// Multiplier
        src: Operand,
    },
    /// Unsigned divide of the accumulator pair: `div src`
    Div {
        /// Divisor
        src: Operand,
    },
    /// Signed divide of the accumulator pair: `idiv src`
    Idiv {
        /// Divisor
        src: Operand,
    },
    /// Decimal adjust after addition
    Daa,
    /// Decimal adjust after subtraction
    Das,
    /// ASCII adjust after addition
    Aaa,
    /// ASCII adjust after subtraction
    Aas,

    // Shifts and rotates
    /// Rotate left: `rol dst, count`
    Rol {
        /// Operand to rotate
        dst: Operand,
        /// Rotate count (`1`, `cl` or an immediate)
        count: Operand,
    },
    /// Rotate right: `ror dst, count`
    Ror {
        /// Operand to rotate
        dst: Operand,
        /// Rotate count
        count: Operand,
    },
    /// Rotate left through carry: `rcl dst, count`
    Rcl {
        /// Operand to rotate
        dst: Operand,
        /// Rotate count
        count: Operand,
    },
    /// Rotate right through carry: `rcr dst, count`
    Rcr {
        /// Operand to rotate
        dst: Operand,
        /// Rotate count
        count: Operand,
    },
    /// Shift left: `shl dst, count`
    Shl {
        /// Operand to shift
        dst: Operand,
        /// Shift count
        count: Operand,
    },
    /// Logical shift right: `shr dst, count`
    Shr {
        /// Operand to shift
        dst: Operand,
        /// Shift count
        count: Operand,
    },
    /// Arithmetic shift right: `sar dst, count`
    Sar {
        /// Operand to shift
        dst: Operand,
        /// Shift count
        count: Operand,
    },
    /// Double precision shift left: `shld dst, src, count`
    Shld {
        /// Operand to shift
        dst: Operand,
        /// Register supplying the bits shifted in
        src: Operand,
        /// Shift count
        count: Operand,
    },
    /// Double precision shift right: `shrd dst, src, count`
    Shrd {
        /// Operand to shift
        dst: Operand,
        /// Register supplying the bits shifted in
        src: Operand,
        /// Shift count
        count: Operand,
    },

    // Bit operations
    /// Bit test: `bt base, bit`
    Bt {
        /// Bit string
        base: Operand,
        /// Bit index (register or immediate)
        bit: Operand,
    },
    /// Bit test and set: `bts base, bit`
    Bts {
        /// Bit string
        base: Operand,
        /// Bit index
        bit: Operand,
    },
    /// Bit test and reset: `btr base, bit`
    Btr {
        /// Bit string
        base: Operand,
        /// Bit index
        bit: Operand,
    },
    /// Bit test and complement: `btc base, bit`
    Btc {
        /// Bit string
        base: Operand,
        /// Bit index
        bit: Operand,
    },
    /// Bit scan forward: `bsf dst, src`
    Bsf {
        /// Receives the index of the lowest set bit
        dst: Operand,
        /// Scanned operand
        src: Operand,
    },
    /// Bit scan reverse: `bsr dst, src`
    Bsr {
        /// Receives the index of the highest set bit
        dst: Operand,
        /// Scanned operand
        src: Operand,
    },
    /// Byte swap: `bswap dst`
    Bswap {
        /// 32-bit register to swap
        dst: Register,
    },

    // Data movement
    /// Move data: `mov dst, src`
    Mov {
        /// Destination operand
        dst: Operand,
        /// Source operand
        src: Operand,
    },
    /// Move with zero extension: `movzx dst, src`
    Movzx {
        /// Destination register
        dst: Operand,
        /// Source operand (smaller size, zero-extended)
        src: Operand,
    },
    /// Move with sign extension: `movsx dst, src`
    Movsx {
        /// Destination register
        dst: Operand,
        /// Source operand (smaller size, sign-extended)
        src: Operand,
    },
    /// Load effective address: `lea dst, [mem]`
    Lea {
        /// Destination register
        dst: Register,
        /// Address computed but not dereferenced
        src: Address,
    },
    /// Exchange: `xchg dst, src`
    Xchg {
        /// First operand to exchange
        dst: Operand,
        /// Second operand to exchange
        src: Operand,
    },
    /// Exchange and add: `xadd dst, src`
    Xadd {
        /// Receives the sum
        dst: Operand,
        /// Receives the original destination value
        src: Operand,
    },
    /// Compare and exchange with the accumulator: `cmpxchg dst, src`
    Cmpxchg {
        /// Compared with the accumulator, replaced by `src` on match
        dst: Operand,
        /// Replacement value
        src: Operand,
    },
    /// Conditional move: `cmovcc dst, src`
    Cmovcc {
        /// Condition that enables the move
        condition: Condition,
        /// Destination register
        dst: Operand,
        /// Source operand
        src: Operand,
    },
    /// Set byte on condition: `setcc dst`
    Setcc {
        /// Condition to materialise
        condition: Condition,
        /// Byte operand receiving 0 or 1
        dst: Operand,
    },
    /// Push onto stack: `push src`
    Push {
        /// Value to push onto the stack
        src: Operand,
    },
    /// Pop from stack: `pop dst`
    Pop {
        /// Destination for popped value
        dst: Operand,
    },
    /// Push all 16-bit registers
    Pusha,
    /// Push all 32-bit registers
    Pushad,
    /// Pop all 16-bit registers
    Popa,
    /// Pop all 32-bit registers
    Popad,
    /// Push the 16-bit flags register
    Pushf,
    /// Push the 32-bit flags register
    Pushfd,
    /// Pop the 16-bit flags register
    Popf,
    /// Pop the 32-bit flags register
    Popfd,
    /// Store AH into flags
    Sahf,
    /// Load flags into AH
    Lahf,
    /// Sign-extend AL into AX
    Cbw,
    /// Sign-extend AX into EAX
    Cwde,
    /// Sign-extend AX into DX:AX
    Cwd,
    /// Sign-extend EAX into EDX:EAX
    Cdq,

    // Strings
    /// Move byte string
    Movsb,
    /// Move word string
    Movsw,
    /// Move dword string
    Movsd,
    /// Compare byte strings
    Cmpsb,
    /// Compare word strings
    Cmpsw,
    /// Compare dword strings
    Cmpsd,
    /// Store byte string
    Stosb,
    /// Store word string
    Stosw,
    /// Store dword string
    Stosd,
    /// Load byte string
    Lodsb,
    /// Load word string
    Lodsw,
    /// Load dword string
    Lodsd,
    /// Scan byte string
    Scasb,
    /// Scan word string
    Scasw,
    /// Scan dword string
    Scasd,

    // Control flow
    /// Unconditional jump: `jmp target`
    Jmp {
        /// Relative offset, register or memory operand
        target: Operand,
    },
    /// Conditional jump: `jcc target`
    Jcc {
        /// Condition to test
        condition: Condition,
        /// Relative offset
        target: Operand,
    },
    /// Call procedure: `call target`
    Call {
        /// Relative offset, register or memory operand
        target: Operand,
    },
    /// Return from procedure
    Ret,
    /// Return from procedure and release stack bytes: `ret bytes`
    RetN {
        /// Number of argument bytes to pop
        bytes: Operand,
    },
    /// Decrement ECX and jump if not zero: `loop target`
    Loop {
        /// Relative offset
        target: Operand,
    },
    /// Decrement ECX and jump if not zero and ZF=1: `loope target`
    Loope {
        /// Relative offset
        target: Operand,
    },
    /// Decrement ECX and jump if not zero and ZF=0: `loopne target`
    Loopne {
        /// Relative offset
        target: Operand,
    },
    /// Jump if ECX is zero: `jecxz target`
    Jecxz {
        /// Relative offset
        target: Operand,
    },
    /// Create a stack frame: `enter size, level`
    Enter {
        /// Bytes of locals to allocate
        size: Operand,
        /// Lexical nesting level
        level: Operand,
    },
    /// Release a stack frame
    Leave,
    /// Breakpoint trap
    Int3,
    /// Software interrupt: `int vector`
    Int {
        /// Interrupt vector
        vector: Operand,
    },

    // Flags and processor control
    /// No operation
    Nop,
    /// Multi-byte no operation: `nop src`
    LongNop {
        /// Ignored operand that pads the encoding
        src: Operand,
    },
    /// Spin-loop hint
    Pause,
    /// Halt
    Hlt,
    /// Complement carry flag
    Cmc,
    /// Clear carry flag
    Clc,
    /// Set carry flag
    Stc,
    /// Clear interrupt flag
    Cli,
    /// Set interrupt flag
    Sti,
    /// Clear direction flag
    Cld,
    /// Set direction flag
    Std,

    // System
    /// Undefined instruction
    Ud2,
    /// CPU identification
    Cpuid,
    /// Read time-stamp counter
    Rdtsc,
    /// Read time-stamp counter and processor ID
    Rdtscp,
    /// Read model specific register
    Rdmsr,
    /// Write model specific register
    Wrmsr,
    /// Read performance monitoring counter
    Rdpmc,
    /// Fast system call
    Sysenter,
    /// Invalidate caches
    Invd,
    /// Write back and invalidate caches
    Wbinvd,
    /// Empty MMX state
    Emms,
    /// Set up a monitor address
    Monitor,
    /// Wait on a monitor address
    Mwait,
    /// Read extended control register
    Xgetbv,
    /// Prefetch into all cache levels, non-temporal
    Prefetchnta {
        /// Prefetched address
        src: Address,
    },
    /// Prefetch into all cache levels
    Prefetcht0 {
        /// Prefetched address
        src: Address,
    },
    /// Prefetch into level 2 and higher
    Prefetcht1 {
        /// Prefetched address
        src: Address,
    },
    /// Prefetch into level 3 and higher
    Prefetcht2 {
        /// Prefetched address
        src: Address,
    },
    /// Load fence
    Lfence,
    /// Memory fence
    Mfence,
    /// Store fence
    Sfence,
    /// Flush cache line: `clflush [mem]`
    Clflush {
        /// Address inside the flushed line
        src: Address,
    },
    /// Load MXCSR: `ldmxcsr dword [mem]`
    Ldmxcsr {
        /// 32-bit memory operand
        src: Operand,
    },
    /// Store MXCSR: `stmxcsr dword [mem]`
    Stmxcsr {
        /// 32-bit memory operand
        dst: Operand,
    },
    /// Save x87/SSE state: `fxsave [mem]`
    Fxsave {
        /// 512-byte save area
        dst: Address,
    },
    /// Restore x87/SSE state: `fxrstor [mem]`
    Fxrstor {
        /// 512-byte save area
        src: Address,
    },
}

impl Instruction {
    /// Returns the operand-free mnemonic of this instruction.
    #[must_use]
    pub fn mnemonic(&self) -> Mnemonic {
        Mnemonic::from(self)
    }

    /// Returns true if this instruction transfers control flow.
    #[must_use]
    pub fn is_control_flow(&self) -> bool {
        matches!(
            self,
            Instruction::Jmp { .. }
                | Instruction::Jcc { .. }
                | Instruction::Call { .. }
                | Instruction::Ret
                | Instruction::RetN { .. }
                | Instruction::Loop { .. }
                | Instruction::Loope { .. }
                | Instruction::Loopne { .. }
                | Instruction::Jecxz { .. }
                | Instruction::Int3
                | Instruction::Int { .. }
        )
    }

    /// Returns true if execution never falls through to the next instruction.
    #[must_use]
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Jmp { .. }
                | Instruction::Ret
                | Instruction::RetN { .. }
                | Instruction::Hlt
                | Instruction::Ud2
        )
    }

    /// Returns the relative displacement of a direct branch, call or loop.
    ///
    /// Indirect forms (`jmp eax`, `call [mem]`) have no static displacement.
    #[must_use]
    pub fn relative_target(&self) -> Option<i32> {
        match self {
            Instruction::Jmp { target }
            | Instruction::Jcc { target, .. }
            | Instruction::Call { target }
            | Instruction::Loop { target }
            | Instruction::Loope { target }
            | Instruction::Loopne { target }
            | Instruction::Jecxz { target } => target.as_code_offset(),
            _ => None,
        }
    }

    /// Returns true if any operand of this instruction dereferences memory.
    #[must_use]
    pub fn accesses_memory(&self) -> bool {
        self.operands().iter().any(|operand| operand.is_memory())
    }

    /// Returns the [`Operand`]-typed operands in encoding order.
    ///
    /// Register-only (`bswap`) and address-only (`lea`, `prefetch`, `clflush`, ...)
    /// fields are not included; use the variant fields directly for those.
    #[must_use]
    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            Instruction::Add { dst, src }
            | Instruction::Or { dst, src }
            | Instruction::Adc { dst, src }
            | Instruction::Sbb { dst, src }
            | Instruction::And { dst, src }
            | Instruction::Sub { dst, src }
            | Instruction::Xor { dst, src }
            | Instruction::Mov { dst, src }
            | Instruction::Movzx { dst, src }
            | Instruction::Movsx { dst, src }
            | Instruction::Xchg { dst, src }
            | Instruction::Xadd { dst, src }
            | Instruction::Cmpxchg { dst, src }
            | Instruction::Bsf { dst, src }
            | Instruction::Bsr { dst, src }
            | Instruction::Cmovcc { dst, src, .. } => vec![dst, src],
            Instruction::Cmp { left, right } | Instruction::Test { left, right } => {
                vec![left, right]
            }
            Instruction::Rol { dst, count }
            | Instruction::Ror { dst, count }
            | Instruction::Rcl { dst, count }
            | Instruction::Rcr { dst, count }
            | Instruction::Shl { dst, count }
            | Instruction::Shr { dst, count }
            | Instruction::Sar { dst, count } => vec![dst, count],
            Instruction::Shld { dst, src, count } | Instruction::Shrd { dst, src, count } => {
                vec![dst, src, count]
            }
            Instruction::Bt { base, bit }
            | Instruction::Bts { base, bit }
            | Instruction::Btr { base, bit }
            | Instruction::Btc { base, bit } => vec![base, bit],
            Instruction::Imul { dst, src, src2 } => {
                let mut operands = vec![dst, src];
                operands.extend(src2.as_ref());
                operands
            }
            Instruction::Inc { dst }
            | Instruction::Dec { dst }
            | Instruction::Neg { dst }
            | Instruction::Not { dst }
            | Instruction::Pop { dst }
            | Instruction::Setcc { dst, .. }
            | Instruction::Stmxcsr { dst } => vec![dst],
            Instruction::ImulAcc { src }
            | Instruction::Mul { src }
            | Instruction::Div { src }
            | Instruction::Idiv { src }
            | Instruction::Push { src }
            | Instruction::LongNop { src }
            | Instruction::Ldmxcsr { src } => vec![src],
            Instruction::Jmp { target }
            | Instruction::Jcc { target, .. }
            | Instruction::Call { target }
            | Instruction::Loop { target }
            | Instruction::Loope { target }
            | Instruction::Loopne { target }
            | Instruction::Jecxz { target } => vec![target],
            Instruction::RetN { bytes } => vec![bytes],
            Instruction::Int { vector } => vec![vector],
            Instruction::Enter { size, level } => vec![size, level],
            _ => Vec::new(),
        }
    }
}

/// A decoded instruction with its location metadata.
///
/// # Example
///
/// ```rust
/// use x86scope::x86::{decode_single, Instruction};
///
/// // jmp short -2
/// let decoded = decode_single(&[0xEB, 0xFE], 0x1000)?;
/// assert_eq!(decoded.offset, 0x1000);
/// assert_eq!(decoded.length, 2);
/// assert_eq!(decoded.end_offset(), 0x1002);
/// assert_eq!(decoded.branch_target(), Some(0x1000));
/// # Ok::<(), x86scope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    /// Stream offset of the first byte (prefixes included).
    pub offset: u64,
    /// Number of bytes the instruction occupies (prefixes included).
    pub length: usize,
    /// Prefix bytes that preceded the opcode.
    pub prefixes: Prefixes,
    /// The decoded instruction.
    pub instruction: Instruction,
}

impl DecodedInstruction {
    /// Returns the stream offset immediately after this instruction.
    #[inline]
    #[must_use]
    pub fn end_offset(&self) -> u64 {
        self.offset + self.length as u64
    }

    /// Returns the absolute target of a direct branch, call or loop.
    ///
    /// Relative displacements count from the end of the instruction. The result wraps
    /// around the 32-bit address space the way the processor does.
    #[must_use]
    pub fn branch_target(&self) -> Option<u64> {
        let displacement = self.instruction.relative_target()?;
        let target = self.end_offset().wrapping_add_signed(i64::from(displacement));
        Some(target & 0xFFFF_FFFF)
    }

    /// Splits into the instruction and its encoded length.
    #[must_use]
    pub fn into_parts(self) -> (Instruction, usize) {
        (self.instruction, self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x86::{Constant, DataWidth, Indirect};
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn mnemonic_names() {
        assert_eq!(Mnemonic::Cpuid.to_string(), "cpuid");
        assert_eq!(Mnemonic::RetN.to_string(), "retn");
        assert_eq!(Mnemonic::LongNop.to_string(), "longnop");
        assert_eq!("movzx".parse::<Mnemonic>().unwrap(), Mnemonic::Movzx);

        let name: &'static str = Mnemonic::Prefetchnta.into();
        assert_eq!(name, "prefetchnta");
        assert_eq!(Mnemonic::iter().count(), Mnemonic::COUNT);
    }

    #[test]
    fn mnemonic_names_parse_back() {
        for mnemonic in Mnemonic::iter() {
            let name = mnemonic.to_string();
            assert_eq!(name.parse::<Mnemonic>().unwrap(), mnemonic, "{name}");
        }
        assert_eq!("retn".parse::<Mnemonic>().unwrap(), Mnemonic::RetN);
        assert_eq!("ret".parse::<Mnemonic>().unwrap(), Mnemonic::Ret);
    }

    #[test]
    fn operands_in_encoding_order() {
        let imul = Instruction::Imul {
            dst: Operand::Register(Register::Eax),
            src: Operand::Register(Register::Ecx),
            src2: Some(Operand::Constant(Constant::signed(10, DataWidth::Byte))),
        };
        assert_eq!(imul.operands().len(), 3);
        assert!(!imul.accesses_memory());

        let inc = Instruction::Inc {
            dst: Operand::Indirect(Indirect {
                address: Address::base(Register::Eax),
                width: DataWidth::Dword,
            }),
        };
        assert!(inc.accesses_memory());
        assert!(Instruction::Cpuid.operands().is_empty());
    }

    #[test]
    fn control_flow_classification() {
        let jcc = Instruction::Jcc {
            condition: Condition::E,
            target: Operand::CodeOffset(5),
        };
        assert!(jcc.is_control_flow());
        assert!(!jcc.is_terminator());
        assert_eq!(jcc.relative_target(), Some(5));

        let indirect = Instruction::Jmp {
            target: Operand::Register(Register::Eax),
        };
        assert!(indirect.is_terminator());
        assert_eq!(indirect.relative_target(), None);
        assert!(!Instruction::Nop.is_control_flow());
    }

    #[test]
    fn branch_target_wraps_in_32_bits() {
        let decoded = DecodedInstruction {
            offset: 0,
            length: 5,
            prefixes: Prefixes::default(),
            instruction: Instruction::Call {
                target: Operand::CodeOffset(-10),
            },
        };
        assert_eq!(decoded.branch_target(), Some(0xFFFF_FFFB));

        let (instruction, length) = decoded.into_parts();
        assert_eq!(length, 5);
        assert_eq!(instruction.mnemonic(), Mnemonic::Call);
    }
}
