//! Two-byte (`0F xx`) and three-byte (`0F 01 xx`) opcode maps.

use std::io::Read;

use crate::{
    x86::{
        decoder::Session,
        opcodes::{Binary, Unary},
        Condition, DataWidth, Instruction, Operand, Register, Signedness,
    },
    Result,
};

/// Bit-test operation selected by bits 3-4 of `0F A3 / AB / B3 / BB` and by the `reg`
/// field (4-7) of group 8 (`0F BA`).
fn bit_test_group(operation: u8) -> Binary {
    match operation & 0x03 {
        0 => |base, bit| Instruction::Bt { base, bit },
        1 => |base, bit| Instruction::Bts { base, bit },
        2 => |base, bit| Instruction::Btr { base, bit },
        _ => |base, bit| Instruction::Btc { base, bit },
    }
}

impl<R: Read> Session<'_, R> {
    /// Decodes the instruction following a `0F` escape byte.
    pub(super) fn two_byte(&mut self) -> Result<Instruction> {
        let opcode = self.byte()?;
        let width = self.operand_width();

        match opcode {
            0x01 => self.three_byte(),
            0x08 => Ok(Instruction::Invd),
            0x09 => Ok(Instruction::Wbinvd),
            0x0B => Ok(Instruction::Ud2),
            0x18 => self.prefetch(),
            0x1F => {
                let modrm = self.modrm()?;
                if modrm.reg != 0 {
                    return Err(self.unrecognized());
                }
                Ok(Instruction::LongNop {
                    src: self.rm(modrm, width)?,
                })
            }
            0x30 => Ok(Instruction::Wrmsr),
            0x31 => Ok(Instruction::Rdtsc),
            0x32 => Ok(Instruction::Rdmsr),
            0x33 => Ok(Instruction::Rdpmc),
            0x34 => Ok(Instruction::Sysenter),
            0x40..=0x4F => {
                let modrm = self.modrm()?;
                Ok(Instruction::Cmovcc {
                    condition: Condition::from_code(opcode),
                    src: self.rm(modrm, width)?,
                    dst: Self::reg(modrm, width),
                })
            }
            0x77 => Ok(Instruction::Emms),
            0x80..=0x8F => Ok(Instruction::Jcc {
                condition: Condition::from_code(opcode),
                target: self.code_offset(self.operand_width())?,
            }),
            0x90..=0x9F => {
                let modrm = self.modrm()?;
                Ok(Instruction::Setcc {
                    condition: Condition::from_code(opcode),
                    dst: self.rm(modrm, DataWidth::Byte)?,
                })
            }
            0xA2 => Ok(Instruction::Cpuid),
            0xA3 | 0xAB | 0xB3 | 0xBB => {
                let build = bit_test_group(opcode >> 3);
                let modrm = self.modrm()?;
                let base = self.rm(modrm, width)?;
                Ok(build(base, Self::reg(modrm, width)))
            }
            0xA4 | 0xA5 | 0xAC | 0xAD => {
                let modrm = self.modrm()?;
                let dst = self.rm(modrm, width)?;
                let src = Self::reg(modrm, width);
                let count = if opcode & 0x01 == 0 {
                    self.immediate(DataWidth::Byte, Signedness::Unsigned)?
                } else {
                    Operand::Register(Register::Cl)
                };

                if opcode < 0xAC {
                    Ok(Instruction::Shld { dst, src, count })
                } else {
                    Ok(Instruction::Shrd { dst, src, count })
                }
            }
            0xAE => self.group15(),
            0xAF => {
                let modrm = self.modrm()?;
                Ok(Instruction::Imul {
                    src: self.rm(modrm, width)?,
                    dst: Self::reg(modrm, width),
                    src2: None,
                })
            }
            0xB0 | 0xB1 => {
                let width = if opcode == 0xB0 { DataWidth::Byte } else { width };
                let modrm = self.modrm()?;
                Ok(Instruction::Cmpxchg {
                    dst: self.rm(modrm, width)?,
                    src: Self::reg(modrm, width),
                })
            }
            0xB6 | 0xB7 | 0xBE | 0xBF => {
                let source_width = if opcode & 0x01 == 0 {
                    DataWidth::Byte
                } else {
                    DataWidth::Word
                };
                let modrm = self.modrm()?;
                let src = self.rm(modrm, source_width)?;
                let dst = Self::reg(modrm, width);

                if opcode < 0xBE {
                    Ok(Instruction::Movzx { dst, src })
                } else {
                    Ok(Instruction::Movsx { dst, src })
                }
            }
            0xBA => {
                let modrm = self.modrm()?;
                if modrm.reg < 4 {
                    return Err(self.unrecognized());
                }
                let build = bit_test_group(modrm.reg);
                let base = self.rm(modrm, width)?;
                let bit = self.immediate(DataWidth::Byte, Signedness::Unsigned)?;
                Ok(build(base, bit))
            }
            0xBC | 0xBD => {
                let modrm = self.modrm()?;
                let src = self.rm(modrm, width)?;
                let dst = Self::reg(modrm, width);

                if opcode == 0xBC {
                    Ok(Instruction::Bsf { dst, src })
                } else {
                    Ok(Instruction::Bsr { dst, src })
                }
            }
            0xC0 | 0xC1 => {
                let width = if opcode == 0xC0 { DataWidth::Byte } else { width };
                let modrm = self.modrm()?;
                Ok(Instruction::Xadd {
                    dst: self.rm(modrm, width)?,
                    src: Self::reg(modrm, width),
                })
            }
            0xC8..=0xCF => Ok(Instruction::Bswap {
                dst: Register::from_number(opcode, DataWidth::Dword),
            }),

            _ => Err(self.unrecognized()),
        }
    }

    /// `0F 01 xx`: the register-form system instructions.
    fn three_byte(&mut self) -> Result<Instruction> {
        match self.byte()? {
            0xC8 => Ok(Instruction::Monitor),
            0xC9 => Ok(Instruction::Mwait),
            0xD0 => Ok(Instruction::Xgetbv),
            0xF9 => Ok(Instruction::Rdtscp),
            _ => Err(self.unrecognized()),
        }
    }

    /// `0F 18`: prefetch hints, memory operands only.
    fn prefetch(&mut self) -> Result<Instruction> {
        let modrm = self.modrm()?;
        if modrm.reg > 3 {
            return Err(self.unrecognized());
        }

        let src = self.address(modrm)?;
        Ok(match modrm.reg {
            0 => Instruction::Prefetchnta { src },
            1 => Instruction::Prefetcht0 { src },
            2 => Instruction::Prefetcht1 { src },
            _ => Instruction::Prefetcht2 { src },
        })
    }

    /// `0F AE`: fences in register form, state save / restore and `clflush` in memory form.
    fn group15(&mut self) -> Result<Instruction> {
        let modrm = self.modrm()?;

        if modrm.is_register() {
            return match modrm.reg {
                5 => Ok(Instruction::Lfence),
                6 => Ok(Instruction::Mfence),
                7 => Ok(Instruction::Sfence),
                _ => Err(self.unrecognized()),
            };
        }

        match modrm.reg {
            0 => Ok(Instruction::Fxsave {
                dst: self.address(modrm)?,
            }),
            1 => Ok(Instruction::Fxrstor {
                src: self.address(modrm)?,
            }),
            2 | 3 => {
                let build: Unary = if modrm.reg == 2 {
                    |src| Instruction::Ldmxcsr { src }
                } else {
                    |dst| Instruction::Stmxcsr { dst }
                };
                Ok(build(self.rm(modrm, DataWidth::Dword)?))
            }
            7 => Ok(Instruction::Clflush {
                src: self.address(modrm)?,
            }),
            _ => Err(self.unrecognized()),
        }
    }
}
