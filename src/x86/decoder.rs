//! Streaming x86 instruction decoding.
//!
//! [`Decoder`] pulls bytes from any [`std::io::Read`] source through a
//! [`LookaheadReader`] and turns them into [`DecodedInstruction`]s one at a time. Each
//! attempt reads prefixes, the opcode (and escape bytes), the ModRM / SIB / displacement
//! bytes and immediates speculatively; only a fully recognised instruction commits its
//! bytes. A failed attempt rolls the cursor back to the instruction start, so the source
//! position never moves past an instruction that could not be decoded.
//!
//! # Example: Decoding a Stream
//!
//! ```rust
//! use x86scope::x86::{Decoder, Instruction, Operand, Register};
//!
//! // push ebp; mov ebp, esp; ret
//! let code: &[u8] = &[0x55, 0x89, 0xE5, 0xC3];
//! let mut decoder = Decoder::new(code);
//!
//! let push = decoder.decode_next()?.unwrap();
//! assert_eq!(push.length, 1);
//! assert_eq!(push.instruction, Instruction::Push { src: Operand::Register(Register::Ebp) });
//!
//! let mov = decoder.decode_next()?.unwrap();
//! assert_eq!((mov.offset, mov.length), (1, 2));
//!
//! let ret = decoder.decode_next()?.unwrap();
//! assert_eq!(ret.instruction, Instruction::Ret);
//! assert!(decoder.decode_next()?.is_none());
//! # Ok::<(), x86scope::Error>(())
//! ```
//!
//! # Example: Decoding a Slice
//!
//! ```rust
//! use x86scope::x86::decode_all;
//!
//! // nop; cpuid; ret
//! let instructions = decode_all(&[0x90, 0x0F, 0xA2, 0xC3], 0x40_1000)?;
//! assert_eq!(instructions.len(), 3);
//! assert_eq!(instructions[2].offset, 0x40_1003);
//! # Ok::<(), x86scope::Error>(())
//! ```

use std::{io::Read, iter::FusedIterator};

use log::{debug, trace};
use rayon::prelude::*;

use crate::{
    stream::{read_le, LeBytes, LookaheadReader},
    x86::{
        Address, Constant, DataWidth, DecodedInstruction, DecoderConfig, Indirect, Instruction,
        ModRm, Operand, Prefixes, Register, ScaledIndex, Sib, Signedness, REGISTERS_32,
    },
    Error, Result,
};

/// A streaming decoder over a byte source.
///
/// The decoder owns its lookahead buffer and is not meant to be shared; decode independent
/// byte ranges on independent decoders (see [`decode_regions`]).
pub struct Decoder<R> {
    reader: LookaheadReader<R>,
    /// Set once iteration hit the end of the source or an error
    finished: bool,
}

impl<R: Read> Decoder<R> {
    /// Creates a decoder with the default [`DecoderConfig`].
    pub fn new(source: R) -> Self {
        Self::with_config(source, &DecoderConfig::default())
    }

    /// Creates a decoder with an explicit configuration.
    pub fn with_config(source: R, config: &DecoderConfig) -> Self {
        Decoder {
            reader: LookaheadReader::with_chunk_size(source, config.chunk_size)
                .with_position(config.base_address),
            finished: false,
        }
    }

    /// Stream offset of the next instruction to decode.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Decodes the next instruction.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(_))` - an instruction; its bytes are consumed
    /// * `Ok(None)` - the source is exhausted at an instruction boundary
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedEndOfStream`] if the source ends inside an instruction,
    /// [`Error::UnrecognizedOpcode`] if the bytes match no supported encoding and
    /// [`Error::Io`] if reading the source fails. Nothing is consumed on error, so
    /// calling again reports the same failure.
    pub fn decode_next(&mut self) -> Result<Option<DecodedInstruction>> {
        if !self.reader.has_data()? {
            return Ok(None);
        }

        let start = self.reader.checkpoint();
        let offset = self.reader.position();

        let mut session = Session::new(&mut self.reader, offset);
        let decoded = session.decode();
        let prefixes = session.prefixes;

        match decoded {
            Ok(instruction) => {
                let length = self.reader.cursor();
                self.reader.commit(length)?;
                trace!(
                    "decoded {} at {:#x} ({} bytes)",
                    instruction.mnemonic(),
                    offset,
                    length
                );

                Ok(Some(DecodedInstruction {
                    offset,
                    length,
                    prefixes,
                    instruction,
                }))
            }
            Err(error) => {
                debug!("decoding failed at {:#x}: {}", offset, error);
                self.reader.restore(start)?;
                Err(error)
            }
        }
    }
}

impl<R: Read> Iterator for Decoder<R> {
    type Item = Result<DecodedInstruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.decode_next() {
            Ok(Some(decoded)) => Some(Ok(decoded)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(error) => {
                self.finished = true;
                Some(Err(error))
            }
        }
    }
}

impl<R: Read> FusedIterator for Decoder<R> {}

/// State of a single decode attempt.
///
/// Every byte read goes through the shared [`LookaheadReader`] cursor; the owning
/// [`Decoder`] commits or rolls back once the attempt is over.
pub(super) struct Session<'a, R> {
    reader: &'a mut LookaheadReader<R>,
    /// Stream offset of the instruction start
    offset: u64,
    pub(super) prefixes: Prefixes,
}

impl<'a, R: Read> Session<'a, R> {
    fn new(reader: &'a mut LookaheadReader<R>, offset: u64) -> Self {
        Session {
            reader,
            offset,
            prefixes: Prefixes::default(),
        }
    }

    fn decode(&mut self) -> Result<Instruction> {
        self.read_prefixes()?;
        let opcode = self.byte()?;
        self.one_byte(opcode)
    }

    /// Record prefix bytes until a non-prefix byte or the prefix limit is reached.
    fn read_prefixes(&mut self) -> Result<()> {
        while !self.prefixes.is_full() {
            match self.reader.peek()? {
                Some(byte) if Prefixes::is_prefix(byte) => {
                    self.reader.advance()?;
                    self.prefixes.push(byte);
                }
                _ => break,
            }
        }

        Ok(())
    }

    /// Consume the next byte of the instruction.
    pub(super) fn byte(&mut self) -> Result<u8> {
        match self.reader.next_byte()? {
            Some(byte) => Ok(byte),
            None => Err(self.truncated()),
        }
    }

    fn pending(&self) -> Vec<u8> {
        self.reader.pending().unwrap_or_default()
    }

    pub(super) fn truncated(&self) -> Error {
        let bytes = self.pending();
        debug!(
            "source ended inside instruction at {:#x}: {:02x?}",
            self.offset, bytes
        );

        Error::UnexpectedEndOfStream {
            offset: self.offset,
            bytes,
        }
    }

    pub(super) fn unrecognized(&self) -> Error {
        let bytes = self.pending();
        debug!("unrecognized opcode at {:#x}: {:02x?}", self.offset, bytes);

        Error::UnrecognizedOpcode {
            offset: self.offset,
            bytes,
        }
    }

    pub(super) fn has_prefix(&self, byte: u8) -> bool {
        self.prefixes.has(byte)
    }

    /// Width of the word/dword forms: `Word` under the operand-size override.
    pub(super) fn operand_width(&self) -> DataWidth {
        if self.prefixes.operand_size_override() {
            DataWidth::Word
        } else {
            DataWidth::Dword
        }
    }

    pub(super) fn modrm(&mut self) -> Result<ModRm> {
        Ok(ModRm::from_byte(self.byte()?))
    }

    /// Register named by the `reg` field of a ModRM byte.
    pub(super) fn reg(modrm: ModRm, width: DataWidth) -> Operand {
        Operand::Register(Register::from_number(modrm.reg, width))
    }

    /// Register encoded in the low three bits of an opcode byte.
    pub(super) fn register_in(opcode: u8, width: DataWidth) -> Operand {
        Operand::Register(Register::from_number(opcode, width))
    }

    /// Decode the memory address a ModRM byte describes, reading SIB and displacement bytes.
    ///
    /// Register-direct encodings (mode `11`) are not addresses and are rejected as
    /// unrecognized; callers that accept either use [`Session::rm`].
    pub(super) fn address(&mut self, modrm: ModRm) -> Result<Address> {
        if modrm.is_register() {
            return Err(self.unrecognized());
        }

        let mut address = Address {
            base: None,
            index: None,
            displacement: None,
        };
        let mut needs_disp32 = false;

        if modrm.has_sib() {
            let sib = Sib::from_byte(self.byte()?);
            if sib.has_index() {
                address.index = Some(ScaledIndex {
                    register: REGISTERS_32[usize::from(sib.index)],
                    scale: sib.factor(),
                });
            }
            if sib.has_base(modrm.mode) {
                address.base = Some(REGISTERS_32[usize::from(sib.base)]);
            } else {
                needs_disp32 = true;
            }
        } else if modrm.is_absolute() {
            needs_disp32 = true;
        } else {
            address.base = Some(REGISTERS_32[usize::from(modrm.rm)]);
        }

        address.displacement = match modrm.mode {
            0b01 => Some(i32::from(self.read::<i8>()?)),
            0b10 => Some(self.read::<i32>()?),
            _ if needs_disp32 => Some(self.read::<i32>()?),
            _ => None,
        };

        Ok(address)
    }

    /// Decode the r/m operand of a ModRM byte as a register or a memory access of `width`.
    pub(super) fn rm(&mut self, modrm: ModRm, width: DataWidth) -> Result<Operand> {
        if modrm.is_register() {
            return Ok(Operand::Register(Register::from_number(modrm.rm, width)));
        }

        let address = self.address(modrm)?;
        Ok(Operand::Indirect(Indirect { address, width }))
    }

    /// Read a little-endian immediate of `width` bytes.
    pub(super) fn immediate(&mut self, width: DataWidth, signedness: Signedness) -> Result<Operand> {
        let value = match (width, signedness) {
            (DataWidth::Byte, Signedness::Signed) => self.read::<i8>()?.widen(),
            (DataWidth::Byte, Signedness::Unsigned) => self.read::<u8>()?.widen(),
            (DataWidth::Word, Signedness::Signed) => self.read::<i16>()?.widen(),
            (DataWidth::Word, Signedness::Unsigned) => self.read::<u16>()?.widen(),
            (DataWidth::Dword, Signedness::Signed) => self.read::<i32>()?.widen(),
            (DataWidth::Dword, Signedness::Unsigned) => self.read::<u32>()?.widen(),
        };

        Ok(Operand::Constant(Constant {
            value,
            width,
            signedness,
        }))
    }

    /// Read a signed branch displacement of `width` bytes.
    pub(super) fn code_offset(&mut self, width: DataWidth) -> Result<Operand> {
        let offset = match width {
            DataWidth::Byte => i32::from(self.read::<i8>()?),
            DataWidth::Word => i32::from(self.read::<i16>()?),
            DataWidth::Dword => self.read::<i32>()?,
        };

        Ok(Operand::CodeOffset(offset))
    }

    /// Read a `moffs` absolute address operand.
    pub(super) fn memory_offset(&mut self, width: DataWidth) -> Result<Operand> {
        let displacement = self.read::<i32>()?;
        Ok(Operand::Indirect(Indirect {
            address: Address::absolute(displacement),
            width,
        }))
    }

    fn read<T: LeBytes>(&mut self) -> Result<T> {
        let mut bytes = [0_u8; 4];
        for slot in bytes.iter_mut().take(T::SIZE) {
            *slot = self.byte()?;
        }

        read_le(&bytes[..T::SIZE])
    }
}

/// Decodes a single instruction from the start of a byte slice.
///
/// # Arguments
///
/// * `bytes` - Encoded instruction bytes; trailing bytes are ignored
/// * `address` - Address of the first byte
///
/// # Errors
///
/// Returns [`Error::UnexpectedEndOfStream`] if `bytes` is empty or ends inside the
/// instruction, or [`Error::UnrecognizedOpcode`] for an unsupported encoding.
///
/// # Examples
///
/// ```rust
/// use x86scope::x86::{decode_single, Instruction};
///
/// let decoded = decode_single(&[0x0F, 0xA2, 0xC3], 0)?;
/// assert_eq!(decoded.instruction, Instruction::Cpuid);
/// assert_eq!(decoded.length, 2);
/// # Ok::<(), x86scope::Error>(())
/// ```
pub fn decode_single(bytes: &[u8], address: u64) -> Result<DecodedInstruction> {
    let config = DecoderConfig::default().with_base_address(address);
    let mut decoder = Decoder::with_config(bytes, &config);

    match decoder.decode_next()? {
        Some(decoded) => Ok(decoded),
        None => Err(Error::UnexpectedEndOfStream {
            offset: address,
            bytes: Vec::new(),
        }),
    }
}

/// Decodes a byte slice into instructions until it is exhausted.
///
/// # Arguments
///
/// * `bytes` - Encoded instruction stream
/// * `address` - Address of the first byte
///
/// # Errors
///
/// Returns the first decoding error; instructions before it are discarded.
pub fn decode_all(bytes: &[u8], address: u64) -> Result<Vec<DecodedInstruction>> {
    let config = DecoderConfig::default().with_base_address(address);
    Decoder::with_config(bytes, &config).collect()
}

/// Decodes independent code regions in parallel.
///
/// Each `(address, bytes)` region gets its own decoder; results are returned in input
/// order, one per region.
///
/// # Examples
///
/// ```rust
/// use x86scope::x86::decode_regions;
///
/// let first: &[u8] = &[0x90, 0xC3];
/// let second: &[u8] = &[0x0F];
/// let results = decode_regions(&[(0x1000, first), (0x2000, second)]);
///
/// assert_eq!(results[0].as_ref().map(Vec::len).ok(), Some(2));
/// assert!(results[1].is_err());
/// ```
pub fn decode_regions(regions: &[(u64, &[u8])]) -> Vec<Result<Vec<DecodedInstruction>>> {
    regions
        .par_iter()
        .map(|(address, bytes)| decode_all(bytes, *address))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x86::prefix::{LOCK, OPERAND_SIZE_OVERRIDE};

    fn register(register: Register) -> Operand {
        Operand::Register(register)
    }

    #[test]
    fn single_instruction_then_end_of_stream() {
        let mut decoder = Decoder::new(&[0x50_u8][..]);

        let decoded = decoder.decode_next().unwrap().unwrap();
        assert_eq!(
            decoded.instruction,
            Instruction::Push {
                src: register(Register::Eax)
            }
        );
        assert_eq!(decoded.length, 1);
        assert!(decoder.decode_next().unwrap().is_none());
        assert!(decoder.decode_next().unwrap().is_none());
    }

    #[test]
    fn operand_size_override_changes_immediate_width() {
        let decoded = decode_single(&[0x66, 0x05, 0x34, 0x12], 0).unwrap();
        assert_eq!(decoded.length, 4);
        assert_eq!(
            decoded.instruction,
            Instruction::Add {
                dst: register(Register::Ax),
                src: Operand::Constant(Constant::signed(0x1234, DataWidth::Word)),
            }
        );
        assert_eq!(decoded.prefixes.as_bytes(), &[OPERAND_SIZE_OVERRIDE]);

        let decoded = decode_single(&[0x05, 0x78, 0x56, 0x34, 0x12], 0).unwrap();
        assert_eq!(decoded.length, 5);
        assert_eq!(
            decoded.instruction,
            Instruction::Add {
                dst: register(Register::Eax),
                src: Operand::Constant(Constant::signed(0x1234_5678, DataWidth::Dword)),
            }
        );
    }

    #[test]
    fn modrm_register_direct() {
        let decoded = decode_single(&[0x89, 0xC1], 0).unwrap();
        assert_eq!(decoded.length, 2);
        assert_eq!(
            decoded.instruction,
            Instruction::Mov {
                dst: register(Register::Ecx),
                src: register(Register::Eax),
            }
        );
    }

    #[test]
    fn two_byte_escape() {
        let decoded = decode_single(&[0x0F, 0xA2], 0).unwrap();
        assert_eq!(decoded.instruction, Instruction::Cpuid);
        assert_eq!(decoded.length, 2);
    }

    #[test]
    fn truncation_is_an_error_and_consumes_nothing() {
        let mut decoder = Decoder::new(&[0x89_u8][..]);

        for _ in 0..2 {
            match decoder.decode_next() {
                Err(Error::UnexpectedEndOfStream { offset, bytes }) => {
                    assert_eq!(offset, 0);
                    assert_eq!(bytes, vec![0x89]);
                }
                other => panic!("unexpected result {:?}", other),
            }
        }
        assert_eq!(decoder.position(), 0);
    }

    #[test]
    fn truncated_prefix_only() {
        let error = decode_single(&[0x66, 0x66], 0x10).unwrap_err();
        assert!(error.is_truncation());
        assert_eq!(error.bytes(), Some(&[0x66, 0x66][..]));
    }

    #[test]
    fn fifth_prefix_is_an_opcode() {
        let error = decode_single(&[0x66, 0x66, 0x66, 0x66, 0x66, 0x90], 0).unwrap_err();
        assert!(matches!(error, Error::UnrecognizedOpcode { .. }));
        assert_eq!(error.bytes(), Some(&[0x66, 0x66, 0x66, 0x66, 0x66][..]));

        let decoded = decode_single(&[0x66, 0x66, 0x66, 0x66, 0x90], 0).unwrap();
        assert_eq!(decoded.length, 5);
        assert_eq!(decoded.instruction, Instruction::Nop);
    }

    #[test]
    fn lock_prefix_is_recorded() {
        // lock add dword [eax], ecx
        let decoded = decode_single(&[LOCK, 0x01, 0x08], 0).unwrap();
        assert!(decoded.prefixes.has(LOCK));
        assert_eq!(decoded.length, 3);
    }

    #[test]
    fn sib_without_index_or_base() {
        // mov eax, [esp]
        let decoded = decode_single(&[0x8B, 0x04, 0x24], 0).unwrap();
        assert_eq!(
            decoded.instruction,
            Instruction::Mov {
                dst: register(Register::Eax),
                src: Operand::Indirect(Indirect {
                    address: Address::base(Register::Esp),
                    width: DataWidth::Dword,
                }),
            }
        );

        // mov eax, [ecx*4 + 0x1000]
        let decoded = decode_single(&[0x8B, 0x04, 0x8D, 0x00, 0x10, 0x00, 0x00], 0).unwrap();
        assert_eq!(decoded.length, 7);
        assert_eq!(
            decoded.instruction,
            Instruction::Mov {
                dst: register(Register::Eax),
                src: Operand::Indirect(Indirect {
                    address: Address {
                        base: None,
                        index: Some(ScaledIndex {
                            register: Register::Ecx,
                            scale: 4,
                        }),
                        displacement: Some(0x1000),
                    },
                    width: DataWidth::Dword,
                }),
            }
        );
    }

    #[test]
    fn displacement_forms() {
        // mov eax, [ebp - 4]
        let decoded = decode_single(&[0x8B, 0x45, 0xFC], 0).unwrap();
        assert_eq!(
            decoded.instruction,
            Instruction::Mov {
                dst: register(Register::Eax),
                src: Operand::Indirect(Indirect {
                    address: Address::base(Register::Ebp).with_displacement(-4),
                    width: DataWidth::Dword,
                }),
            }
        );

        // mov eax, [0x00401000]
        let decoded = decode_single(&[0x8B, 0x05, 0x00, 0x10, 0x40, 0x00], 0).unwrap();
        assert_eq!(decoded.length, 6);
        assert_eq!(
            decoded.instruction,
            Instruction::Mov {
                dst: register(Register::Eax),
                src: Operand::Indirect(Indirect {
                    address: Address::absolute(0x40_1000),
                    width: DataWidth::Dword,
                }),
            }
        );

        // mov eax, [ebx + esi*2 + 0x12345678]
        let decoded =
            decode_single(&[0x8B, 0x84, 0x73, 0x78, 0x56, 0x34, 0x12], 0).unwrap();
        assert_eq!(decoded.length, 7);
        let Instruction::Mov { src, .. } = decoded.instruction else {
            panic!("expected mov");
        };
        let address = src.as_address().unwrap();
        assert_eq!(address.base, Some(Register::Ebx));
        assert_eq!(
            address.index,
            Some(ScaledIndex {
                register: Register::Esi,
                scale: 2
            })
        );
        assert_eq!(address.displacement, Some(0x1234_5678));
    }

    #[test]
    fn truncated_displacement_reports_all_bytes_read() {
        let error = decode_single(&[0x8B, 0x85, 0x00, 0x10], 0x20).unwrap_err();
        match error {
            Error::UnexpectedEndOfStream { offset, bytes } => {
                assert_eq!(offset, 0x20);
                assert_eq!(bytes, vec![0x8B, 0x85, 0x00, 0x10]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn small_chunks_decode_identically() {
        let code = [
            0x55, 0x89, 0xE5, 0x83, 0xEC, 0x10, 0x8B, 0x45, 0x08, 0x0F, 0xAF, 0xC1, 0xC9, 0xC3,
        ];
        let expected = decode_all(&code, 0).unwrap();

        for chunk_size in 1..=5 {
            let config = DecoderConfig::new().with_chunk_size(chunk_size);
            let decoded = Decoder::with_config(&code[..], &config)
                .collect::<Result<Vec<_>>>()
                .unwrap();
            assert_eq!(decoded, expected);
        }
        assert_eq!(expected.len(), 7);
    }

    #[test]
    fn iterator_fuses_after_error() {
        let mut decoder = Decoder::new(&[0x90_u8, 0x0F, 0xFF, 0x90][..]);
        assert!(matches!(decoder.next(), Some(Ok(_))));
        assert!(matches!(decoder.next(), Some(Err(Error::UnrecognizedOpcode { .. }))));
        assert!(decoder.next().is_none());
        assert!(decoder.next().is_none());
    }

    #[test]
    fn base_address_offsets() {
        let decoded = decode_all(&[0x90, 0xE8, 0x00, 0x00, 0x00, 0x00], 0x40_1000).unwrap();
        assert_eq!(decoded[1].offset, 0x40_1001);
        assert_eq!(decoded[1].end_offset(), 0x40_1006);
        assert_eq!(decoded[1].branch_target(), Some(0x40_1006));
    }

    #[test]
    fn empty_slice() {
        assert!(decode_all(&[], 0).unwrap().is_empty());
        assert!(decode_single(&[], 0).unwrap_err().is_truncation());
    }

    #[test]
    fn regions_decode_independently() {
        let first: &[u8] = &[0x90, 0xC3];
        let second: &[u8] = &[0x89];
        let third: &[u8] = &[0x0F, 0x0B];
        let results = decode_regions(&[(0x1000, first), (0x2000, second), (0x3000, third)]);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap()[1].offset, 0x1001);
        assert!(results[1].as_ref().unwrap_err().is_truncation());
        assert_eq!(
            results[2].as_ref().unwrap()[0].instruction,
            Instruction::Ud2
        );
    }

    /// A source that fails once with `Interrupted` before every read.
    struct Interrupting<'a> {
        data: &'a [u8],
        interrupt: bool,
    }

    impl Read for Interrupting<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(std::io::ErrorKind::Interrupted.into());
            }
            self.data.read(buf)
        }
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let source = Interrupting {
            data: &[0x0F, 0x31],
            interrupt: false,
        };
        let decoded: Vec<_> = Decoder::new(source).collect::<Result<_>>().unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].instruction, Instruction::Rdtsc);
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn io_errors_propagate() {
        let mut decoder = Decoder::new(Broken);
        assert!(matches!(decoder.decode_next(), Err(Error::Io(_))));
    }
}
