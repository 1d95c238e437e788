// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Variable instruction fields
//!
//! This module provides data types holding the variable fields of the
//! instruction encoding variants relevant for dependency tracking: the base
//! R-, I- and R4-type formats defined in The RISC-V Instruction Set Manual
//! Volume I [^spec] section 2.2 and the vector arithmetic, vector
//! configuration and vector memory formats defined in section 31.6 "Vector
//! Instruction Formats".
//!
//! Each type comes with a [`From`] impl extracting the fields from an
//! instruction represented as an [`u32`]. Immediates are only extracted where
//! they influence the register footprint of an instruction.
//!
//! [^spec]: found here: <https://riscv.org/specifications/ratified/>

use crate::location::Register;

/// Variable fields in R-type instructions
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeR {
    /// Destination register
    pub rd: Register,
    /// Source register 1
    pub rs1: Register,
    /// Source register 2
    pub rs2: Register,
    /// Minor opcode
    pub funct3: u8,
    /// Upper minor opcode
    pub funct7: u8,
}

impl From<u32> for TypeR {
    fn from(insn: u32) -> Self {
        Self {
            rd: rd_from(insn),
            rs1: rs1_from(insn),
            rs2: rs2_from(insn),
            funct3: funct3(insn),
            funct7: (insn >> 25) as u8,
        }
    }
}

/// Variable fields in R4-type instructions (fused multiply-add)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeR4 {
    /// Destination register
    pub rd: Register,
    /// Source register 1
    pub rs1: Register,
    /// Source register 2
    pub rs2: Register,
    /// Source register 3
    pub rs3: Register,
}

impl From<u32> for TypeR4 {
    fn from(insn: u32) -> Self {
        Self {
            rd: rd_from(insn),
            rs1: rs1_from(insn),
            rs2: rs2_from(insn),
            rs3: (insn >> 27) as u8,
        }
    }
}

/// Variable fields in I-type instructions
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeI {
    /// Destination register
    pub rd: Register,
    /// Source register 1
    pub rs1: Register,
    /// Minor opcode
    pub funct3: u8,
    /// Immediate
    ///
    /// The raw, unsigned 12bit immediate field. For CSR instructions, this is
    /// the CSR address.
    pub imm: u16,
}

impl From<u32> for TypeI {
    fn from(insn: u32) -> Self {
        Self {
            rd: rd_from(insn),
            rs1: rs1_from(insn),
            funct3: funct3(insn),
            imm: (insn >> 20) as u16,
        }
    }
}

/// Variable fields in vector arithmetic instructions (`OP-V`)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeV {
    /// Destination register `vd` or scalar destination `rd`
    pub vd: Register,
    /// Source field `vs1`, `rs1` or `imm`
    pub vs1: Register,
    /// Source register `vs2`
    pub vs2: Register,
    /// Mask enable bit
    ///
    /// `true` if the instruction is unmasked. If `false`, the instruction is
    /// either masked by `v0` or uses `v0` as a carry or merge operand.
    pub vm: bool,
    /// Operand category
    pub funct3: u8,
    /// Operation
    pub funct6: u8,
}

impl TypeV {
    /// Retrieve the `vs1` field as sign-extended 5bit immediate
    pub fn simm5(&self) -> i8 {
        ((self.vs1 << 3) as i8) >> 3
    }
}

impl From<u32> for TypeV {
    fn from(insn: u32) -> Self {
        Self {
            vd: rd_from(insn),
            vs1: rs1_from(insn),
            vs2: rs2_from(insn),
            vm: (insn >> 25) & 1 == 1,
            funct3: funct3(insn),
            funct6: (insn >> 26) as u8,
        }
    }
}

/// Variable fields in vector configuration instructions
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeVset {
    /// `vsetvli rd, rs1, vtypei`
    Vsetvli {
        rd: Register,
        rs1: Register,
        zimm: u16,
    },
    /// `vsetivli rd, uimm, vtypei`
    Vsetivli { rd: Register, uimm: u8, zimm: u16 },
    /// `vsetvl rd, rs1, rs2`
    Vsetvl {
        rd: Register,
        rs1: Register,
        rs2: Register,
    },
}

impl TryFrom<u32> for TypeVset {
    type Error = u32;

    /// Extract fields of an `OP-V` instruction with the `OPCFG` category
    ///
    /// Fails for reserved encodings.
    fn try_from(insn: u32) -> Result<Self, Self::Error> {
        let rd = rd_from(insn);
        let rs1 = rs1_from(insn);
        match insn >> 30 {
            0b00 | 0b01 => Ok(Self::Vsetvli {
                rd,
                rs1,
                zimm: ((insn >> 20) & 0x7ff) as u16,
            }),
            0b11 => Ok(Self::Vsetivli {
                rd,
                uimm: rs1,
                zimm: ((insn >> 20) & 0x3ff) as u16,
            }),
            _ if (insn >> 25) & 0x1f == 0 => Ok(Self::Vsetvl {
                rd,
                rs1,
                rs2: rs2_from(insn),
            }),
            _ => Err(insn),
        }
    }
}

/// Variable fields in vector loads and stores
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeVMem {
    /// Destination register `vd` (loads) or store data register `vs3`
    pub vd: Register,
    /// Base address register
    pub rs1: Register,
    /// Stride register `rs2`, index register `vs2` or `lumop`/`sumop`
    pub rs2: Register,
    /// Width field (`funct3`)
    pub width: u8,
    /// Mask enable bit
    pub vm: bool,
    /// Memory addressing mode
    pub mop: u8,
    /// Extended memory element width bit
    pub mew: bool,
    /// Number of fields minus one
    pub nf: u8,
}

impl From<u32> for TypeVMem {
    fn from(insn: u32) -> Self {
        Self {
            vd: rd_from(insn),
            rs1: rs1_from(insn),
            rs2: rs2_from(insn),
            width: funct3(insn),
            vm: (insn >> 25) & 1 == 1,
            mop: ((insn >> 26) & 0b11) as u8,
            mew: (insn >> 28) & 1 == 1,
            nf: (insn >> 29) as u8,
        }
    }
}

/// Extract the `funct3` field
pub fn funct3(insn: u32) -> u8 {
    ((insn >> 12) & 0b111) as u8
}

fn rd_from(insn: u32) -> Register {
    ((insn >> 7) & 0x1f) as Register
}

fn rs1_from(insn: u32) -> Register {
    ((insn >> 15) & 0x1f) as Register
}

fn rs2_from(insn: u32) -> Register {
    ((insn >> 20) & 0x1f) as Register
}
