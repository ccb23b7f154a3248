//! One-byte opcode map.
//!
//! Dispatch for the primary x86 opcode table. Register-coded opcodes take their register
//! from the low three opcode bits, ModRM-bearing opcodes read their r/m operand through
//! [`Session::rm`], and group opcodes select the operation from the ModRM `reg` field.
//! Group members with no valid operation are reported as unrecognized before any operand
//! bytes are read.

use std::io::Read;

use crate::{
    x86::{
        decoder::Session,
        prefix::REP,
        Condition, Constant, DataWidth, Instruction, Operand, Register, Signedness,
    },
    Result,
};

/// Constructor for a two-operand instruction variant.
pub(super) type Binary = fn(Operand, Operand) -> Instruction;

/// Constructor for a one-operand instruction variant.
pub(super) type Unary = fn(Operand) -> Instruction;

/// ALU operation selected by bits 3-5 of `00`-`3D` opcodes and by the `reg` field of
/// group 1 (`80 81 83`).
fn alu_group(operation: u8) -> Binary {
    match operation & 0x07 {
        0 => |dst, src| Instruction::Add { dst, src },
        1 => |dst, src| Instruction::Or { dst, src },
        2 => |dst, src| Instruction::Adc { dst, src },
        3 => |dst, src| Instruction::Sbb { dst, src },
        4 => |dst, src| Instruction::And { dst, src },
        5 => |dst, src| Instruction::Sub { dst, src },
        6 => |dst, src| Instruction::Xor { dst, src },
        _ => |left, right| Instruction::Cmp { left, right },
    }
}

/// Bitwise operations take unsigned immediates, arithmetic ones signed.
fn alu_signedness(operation: u8) -> Signedness {
    match operation & 0x07 {
        1 | 4 | 6 => Signedness::Unsigned,
        _ => Signedness::Signed,
    }
}

/// Shift / rotate operation of group 2 (`C0 C1 D0-D3`).
fn shift_group(operation: u8) -> Option<Binary> {
    match operation {
        0 => Some(|dst, count| Instruction::Rol { dst, count }),
        1 => Some(|dst, count| Instruction::Ror { dst, count }),
        2 => Some(|dst, count| Instruction::Rcl { dst, count }),
        3 => Some(|dst, count| Instruction::Rcr { dst, count }),
        4 => Some(|dst, count| Instruction::Shl { dst, count }),
        5 => Some(|dst, count| Instruction::Shr { dst, count }),
        7 => Some(|dst, count| Instruction::Sar { dst, count }),
        _ => None,
    }
}

/// Width of the byte / word-or-dword opcode pairs, selected by the lowest opcode bit.
fn pair_width<R: Read>(session: &Session<'_, R>, opcode: u8) -> DataWidth {
    if opcode & 0x01 == 0 {
        DataWidth::Byte
    } else {
        session.operand_width()
    }
}

impl<R: Read> Session<'_, R> {
    /// Decodes the instruction introduced by a primary opcode byte.
    pub(super) fn one_byte(&mut self, opcode: u8) -> Result<Instruction> {
        let width = self.operand_width();

        match opcode {
            0x00..=0x3F if opcode & 0x07 < 6 => self.alu(opcode),
            0x0F => self.two_byte(),
            0x27 => Ok(Instruction::Daa),
            0x2F => Ok(Instruction::Das),
            0x37 => Ok(Instruction::Aaa),
            0x3F => Ok(Instruction::Aas),

            0x40..=0x47 => Ok(Instruction::Inc {
                dst: Self::register_in(opcode, width),
            }),
            0x48..=0x4F => Ok(Instruction::Dec {
                dst: Self::register_in(opcode, width),
            }),
            0x50..=0x57 => Ok(Instruction::Push {
                src: Self::register_in(opcode, width),
            }),
            0x58..=0x5F => Ok(Instruction::Pop {
                dst: Self::register_in(opcode, width),
            }),
            0x60 if width == DataWidth::Word => Ok(Instruction::Pusha),
            0x60 => Ok(Instruction::Pushad),
            0x61 if width == DataWidth::Word => Ok(Instruction::Popa),
            0x61 => Ok(Instruction::Popad),
            0x68 => Ok(Instruction::Push {
                src: self.immediate(width, Signedness::Signed)?,
            }),
            0x6A => Ok(Instruction::Push {
                src: self.immediate(DataWidth::Byte, Signedness::Signed)?,
            }),
            0x69 | 0x6B => {
                let modrm = self.modrm()?;
                let src = self.rm(modrm, width)?;
                let multiplier_width = if opcode == 0x69 {
                    width
                } else {
                    DataWidth::Byte
                };
                let src2 = self.immediate(multiplier_width, Signedness::Signed)?;

                Ok(Instruction::Imul {
                    dst: Self::reg(modrm, width),
                    src,
                    src2: Some(src2),
                })
            }
            0x70..=0x7F => Ok(Instruction::Jcc {
                condition: Condition::from_code(opcode),
                target: self.code_offset(DataWidth::Byte)?,
            }),

            0x80 | 0x81 | 0x83 => self.group1(opcode),
            0x84 | 0x85 => {
                let width = pair_width(self, opcode);
                let modrm = self.modrm()?;
                Ok(Instruction::Test {
                    left: self.rm(modrm, width)?,
                    right: Self::reg(modrm, width),
                })
            }
            0x86 | 0x87 => {
                let width = pair_width(self, opcode);
                let modrm = self.modrm()?;
                Ok(Instruction::Xchg {
                    dst: self.rm(modrm, width)?,
                    src: Self::reg(modrm, width),
                })
            }
            0x88 | 0x89 => {
                let width = pair_width(self, opcode);
                let modrm = self.modrm()?;
                Ok(Instruction::Mov {
                    dst: self.rm(modrm, width)?,
                    src: Self::reg(modrm, width),
                })
            }
            0x8A | 0x8B => {
                let width = pair_width(self, opcode);
                let modrm = self.modrm()?;
                Ok(Instruction::Mov {
                    src: self.rm(modrm, width)?,
                    dst: Self::reg(modrm, width),
                })
            }
            0x8D => {
                let modrm = self.modrm()?;
                Ok(Instruction::Lea {
                    src: self.address(modrm)?,
                    dst: Register::from_number(modrm.reg, width),
                })
            }
            0x8F => {
                let modrm = self.modrm()?;
                if modrm.reg != 0 {
                    return Err(self.unrecognized());
                }
                Ok(Instruction::Pop {
                    dst: self.rm(modrm, width)?,
                })
            }

            0x90 if self.has_prefix(REP) => Ok(Instruction::Pause),
            0x90 => Ok(Instruction::Nop),
            0x91..=0x97 => Ok(Instruction::Xchg {
                dst: Operand::Register(Register::from_number(0, width)),
                src: Self::register_in(opcode, width),
            }),
            0x98 if width == DataWidth::Word => Ok(Instruction::Cbw),
            0x98 => Ok(Instruction::Cwde),
            0x99 if width == DataWidth::Word => Ok(Instruction::Cwd),
            0x99 => Ok(Instruction::Cdq),
            0x9C if width == DataWidth::Word => Ok(Instruction::Pushf),
            0x9C => Ok(Instruction::Pushfd),
            0x9D if width == DataWidth::Word => Ok(Instruction::Popf),
            0x9D => Ok(Instruction::Popfd),
            0x9E => Ok(Instruction::Sahf),
            0x9F => Ok(Instruction::Lahf),

            0xA0..=0xA3 => {
                let width = pair_width(self, opcode);
                let accumulator = Operand::Register(Register::from_number(0, width));
                let memory = self.memory_offset(width)?;
                if opcode < 0xA2 {
                    Ok(Instruction::Mov {
                        dst: accumulator,
                        src: memory,
                    })
                } else {
                    Ok(Instruction::Mov {
                        dst: memory,
                        src: accumulator,
                    })
                }
            }
            0xA4 => Ok(Instruction::Movsb),
            0xA5 if width == DataWidth::Word => Ok(Instruction::Movsw),
            0xA5 => Ok(Instruction::Movsd),
            0xA6 => Ok(Instruction::Cmpsb),
            0xA7 if width == DataWidth::Word => Ok(Instruction::Cmpsw),
            0xA7 => Ok(Instruction::Cmpsd),
            0xA8 | 0xA9 => {
                let width = pair_width(self, opcode);
                Ok(Instruction::Test {
                    left: Operand::Register(Register::from_number(0, width)),
                    right: self.immediate(width, Signedness::Unsigned)?,
                })
            }
            0xAA => Ok(Instruction::Stosb),
            0xAB if width == DataWidth::Word => Ok(Instruction::Stosw),
            0xAB => Ok(Instruction::Stosd),
            0xAC => Ok(Instruction::Lodsb),
            0xAD if width == DataWidth::Word => Ok(Instruction::Lodsw),
            0xAD => Ok(Instruction::Lodsd),
            0xAE => Ok(Instruction::Scasb),
            0xAF if width == DataWidth::Word => Ok(Instruction::Scasw),
            0xAF => Ok(Instruction::Scasd),

            0xB0..=0xB7 => Ok(Instruction::Mov {
                dst: Self::register_in(opcode, DataWidth::Byte),
                src: self.immediate(DataWidth::Byte, Signedness::Unsigned)?,
            }),
            0xB8..=0xBF => Ok(Instruction::Mov {
                dst: Self::register_in(opcode, width),
                src: self.immediate(width, Signedness::Unsigned)?,
            }),

            0xC0 | 0xC1 | 0xD0..=0xD3 => self.group2(opcode),
            0xC2 => Ok(Instruction::RetN {
                bytes: self.immediate(DataWidth::Word, Signedness::Unsigned)?,
            }),
            0xC3 => Ok(Instruction::Ret),
            0xC6 | 0xC7 => {
                let width = pair_width(self, opcode);
                let modrm = self.modrm()?;
                if modrm.reg != 0 {
                    return Err(self.unrecognized());
                }
                Ok(Instruction::Mov {
                    dst: self.rm(modrm, width)?,
                    src: self.immediate(width, Signedness::Unsigned)?,
                })
            }
            0xC8 => Ok(Instruction::Enter {
                size: self.immediate(DataWidth::Word, Signedness::Unsigned)?,
                level: self.immediate(DataWidth::Byte, Signedness::Unsigned)?,
            }),
            0xC9 => Ok(Instruction::Leave),
            0xCC => Ok(Instruction::Int3),
            0xCD => Ok(Instruction::Int {
                vector: self.immediate(DataWidth::Byte, Signedness::Unsigned)?,
            }),

            0xE0 => Ok(Instruction::Loopne {
                target: self.code_offset(DataWidth::Byte)?,
            }),
            0xE1 => Ok(Instruction::Loope {
                target: self.code_offset(DataWidth::Byte)?,
            }),
            0xE2 => Ok(Instruction::Loop {
                target: self.code_offset(DataWidth::Byte)?,
            }),
            0xE3 => Ok(Instruction::Jecxz {
                target: self.code_offset(DataWidth::Byte)?,
            }),
            0xE8 => Ok(Instruction::Call {
                target: self.code_offset(self.operand_width())?,
            }),
            0xE9 => Ok(Instruction::Jmp {
                target: self.code_offset(self.operand_width())?,
            }),
            0xEB => Ok(Instruction::Jmp {
                target: self.code_offset(DataWidth::Byte)?,
            }),

            0xF4 => Ok(Instruction::Hlt),
            0xF5 => Ok(Instruction::Cmc),
            0xF6 | 0xF7 => self.group3(opcode),
            0xF8 => Ok(Instruction::Clc),
            0xF9 => Ok(Instruction::Stc),
            0xFA => Ok(Instruction::Cli),
            0xFB => Ok(Instruction::Sti),
            0xFC => Ok(Instruction::Cld),
            0xFD => Ok(Instruction::Std),
            0xFE | 0xFF => self.group45(opcode),

            _ => Err(self.unrecognized()),
        }
    }

    /// `00`-`3D`: the six encodings of the eight ALU operations.
    fn alu(&mut self, opcode: u8) -> Result<Instruction> {
        let operation = opcode >> 3;
        let build = alu_group(operation);
        let width = pair_width(self, opcode);

        match opcode & 0x07 {
            0 | 1 => {
                let modrm = self.modrm()?;
                let dst = self.rm(modrm, width)?;
                Ok(build(dst, Self::reg(modrm, width)))
            }
            2 | 3 => {
                let modrm = self.modrm()?;
                let src = self.rm(modrm, width)?;
                Ok(build(Self::reg(modrm, width), src))
            }
            _ => {
                let accumulator = Operand::Register(Register::from_number(0, width));
                let src = self.immediate(width, alu_signedness(operation))?;
                Ok(build(accumulator, src))
            }
        }
    }

    /// `80 81 83`: ALU operation with an immediate.
    fn group1(&mut self, opcode: u8) -> Result<Instruction> {
        let width = pair_width(self, opcode);
        let modrm = self.modrm()?;
        let build = alu_group(modrm.reg);
        let dst = self.rm(modrm, width)?;

        let src = if opcode == 0x83 {
            self.immediate(DataWidth::Byte, Signedness::Signed)?
        } else {
            self.immediate(width, alu_signedness(modrm.reg))?
        };

        Ok(build(dst, src))
    }

    /// `C0 C1 D0-D3`: shifts and rotates by an immediate, by one or by `cl`.
    fn group2(&mut self, opcode: u8) -> Result<Instruction> {
        let width = pair_width(self, opcode);
        let modrm = self.modrm()?;
        let Some(build) = shift_group(modrm.reg) else {
            return Err(self.unrecognized());
        };
        let dst = self.rm(modrm, width)?;

        let count = match opcode {
            0xC0 | 0xC1 => self.immediate(DataWidth::Byte, Signedness::Unsigned)?,
            0xD0 | 0xD1 => Operand::Constant(Constant::unsigned(1, DataWidth::Byte)),
            _ => Operand::Register(Register::Cl),
        };

        Ok(build(dst, count))
    }

    /// `F6 F7`: test, not, neg, mul, imul, div, idiv.
    fn group3(&mut self, opcode: u8) -> Result<Instruction> {
        let width = pair_width(self, opcode);
        let modrm = self.modrm()?;
        let build: Unary = match modrm.reg {
            0 => {
                let left = self.rm(modrm, width)?;
                let right = self.immediate(width, Signedness::Unsigned)?;
                return Ok(Instruction::Test { left, right });
            }
            2 => |dst| Instruction::Not { dst },
            3 => |dst| Instruction::Neg { dst },
            4 => |src| Instruction::Mul { src },
            5 => |src| Instruction::ImulAcc { src },
            6 => |src| Instruction::Div { src },
            7 => |src| Instruction::Idiv { src },
            _ => return Err(self.unrecognized()),
        };

        Ok(build(self.rm(modrm, width)?))
    }

    /// `FE FF`: inc, dec, and (`FF` only) near call, near jmp and push.
    fn group45(&mut self, opcode: u8) -> Result<Instruction> {
        let width = pair_width(self, opcode);
        let modrm = self.modrm()?;
        let build: Unary = match (opcode, modrm.reg) {
            (_, 0) => |dst| Instruction::Inc { dst },
            (_, 1) => |dst| Instruction::Dec { dst },
            (0xFF, 2) => |target| Instruction::Call { target },
            (0xFF, 4) => |target| Instruction::Jmp { target },
            (0xFF, 6) => |src| Instruction::Push { src },
            _ => return Err(self.unrecognized()),
        };

        Ok(build(self.rm(modrm, width)?))
    }
}
