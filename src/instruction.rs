// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Instruction encodings
//!
//! This module provides the raw [`Bits`] of traced instructions, the major
//! [`OpCode`] used for dispatching decode rules, the variable instruction
//! [`format`] fields and the [`vtype`] configuration they are interpreted
//! under.

pub mod format;
pub mod vtype;

#[cfg(test)]
mod tests;

use core::fmt;

/// Bits from which traced instructions are decoded
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bits {
    Bit16(u16),
    Bit32(u32),
}

impl TryFrom<u64> for Bits {
    type Error = u64;

    /// Interpret an encoding according to the Base Instruction-Length Encoding
    ///
    /// Only 16bit and 32bit instructions are supported. Wider encodings or
    /// values with non-zero bits beyond the instruction's length are
    /// rejected.
    fn try_from(num: u64) -> Result<Self, Self::Error> {
        if num & 0b11 != 0b11 {
            u16::try_from(num).map(Self::Bit16).map_err(|_| num)
        } else if num & 0b11100 != 0b11100 {
            u32::try_from(num).map(Self::Bit32).map_err(|_| num)
        } else {
            Err(num)
        }
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bit16(v) => write!(f, "{v:04x}"),
            Self::Bit32(v) => write!(f, "{v:08x}"),
        }
    }
}

/// Major opcodes of 32bit instructions
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OpCode {
    Load = 0b0000011,
    LoadFp = 0b0000111,
    MiscMem = 0b0001111,
    OpImm = 0b0010011,
    Auipc = 0b0010111,
    OpImm32 = 0b0011011,
    Store = 0b0100011,
    StoreFp = 0b0100111,
    Amo = 0b0101111,
    Op = 0b0110011,
    Lui = 0b0110111,
    Op32 = 0b0111011,
    Madd = 0b1000011,
    Msub = 0b1000111,
    Nmsub = 0b1001011,
    Nmadd = 0b1001111,
    OpFp = 0b1010011,
    OpV = 0b1010111,
    Branch = 0b1100011,
    Jalr = 0b1100111,
    Jal = 0b1101111,
    System = 0b1110011,
    Unknown,
}

impl From<u32> for OpCode {
    fn from(value: u32) -> Self {
        use OpCode::*;

        const MASK: u32 = 0x7F;
        match value & MASK {
            x if x == Load as u32 => Load,
            x if x == LoadFp as u32 => LoadFp,
            x if x == MiscMem as u32 => MiscMem,
            x if x == OpImm as u32 => OpImm,
            x if x == Auipc as u32 => Auipc,
            x if x == OpImm32 as u32 => OpImm32,
            x if x == Store as u32 => Store,
            x if x == StoreFp as u32 => StoreFp,
            x if x == Amo as u32 => Amo,
            x if x == Op as u32 => Op,
            x if x == Lui as u32 => Lui,
            x if x == Op32 as u32 => Op32,
            x if x == Madd as u32 => Madd,
            x if x == Msub as u32 => Msub,
            x if x == Nmsub as u32 => Nmsub,
            x if x == Nmadd as u32 => Nmadd,
            x if x == OpFp as u32 => OpFp,
            x if x == OpV as u32 => OpV,
            x if x == Branch as u32 => Branch,
            x if x == Jalr as u32 => Jalr,
            x if x == Jal as u32 => Jal,
            x if x == System as u32 => System,
            _ => Unknown,
        }
    }
}
