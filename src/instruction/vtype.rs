// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Vector type configuration
//!
//! The `vtype` CSR determines the selected element width ([`Sew`]), the
//! register group multiplier ([`Lmul`]) and the tail and mask policies that
//! govern how vector instructions are interpreted.

use core::fmt;

/// Selected element width
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sew {
    E8,
    E16,
    E32,
    E64,
}

impl Sew {
    /// Create from the `vsew` field
    pub fn from_vsew(vsew: u8) -> Option<Self> {
        match vsew {
            0 => Some(Self::E8),
            1 => Some(Self::E16),
            2 => Some(Self::E32),
            3 => Some(Self::E64),
            _ => None,
        }
    }

    /// Retrieve the width in bits
    pub fn bits(self) -> u16 {
        match self {
            Self::E8 => 8,
            Self::E16 => 16,
            Self::E32 => 32,
            Self::E64 => 64,
        }
    }

    fn vsew(self) -> u64 {
        match self {
            Self::E8 => 0,
            Self::E16 => 1,
            Self::E32 => 2,
            Self::E64 => 3,
        }
    }
}

/// Register group multiplier
///
/// Represents both the `LMUL` configured via `vtype` and effective
/// multipliers (`EMUL`) of individual operands. Fractional multipliers down
/// to 1/8 are supported.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Lmul(u8);

impl Lmul {
    /// Multiplier for operands occupying exactly one register
    pub const M1: Self = Self(8);

    /// Create from the `vlmul` field
    pub fn from_vlmul(vlmul: u8) -> Option<Self> {
        match vlmul {
            0 => Some(Self(8)),
            1 => Some(Self(16)),
            2 => Some(Self(32)),
            3 => Some(Self(64)),
            5 => Some(Self(1)),
            6 => Some(Self(2)),
            7 => Some(Self(4)),
            _ => None,
        }
    }

    /// Create a multiplier spanning the given number of whole registers
    ///
    /// Returns `None` unless `registers` is 1, 2, 4 or 8.
    pub fn from_registers(registers: u8) -> Option<Self> {
        matches!(registers, 1 | 2 | 4 | 8).then_some(Self(registers * 8))
    }

    /// Scale this multiplier by `num / den`
    ///
    /// Returns `None` if the result is not a legal multiplier in the range
    /// 1/8 to 8.
    pub fn scale(self, num: u16, den: u16) -> Option<Self> {
        let eighths = u16::from(self.0) * num;
        if den == 0 || eighths % den != 0 {
            return None;
        }
        u8::try_from(eighths / den)
            .ok()
            .filter(|e| matches!(e, 1 | 2 | 4 | 8 | 16 | 32 | 64))
            .map(Self)
    }

    /// Number of registers an operand with this multiplier occupies
    pub fn registers(self) -> u8 {
        (self.0 / 8).max(1)
    }

    /// Check whether this multiplier is smaller than one
    pub fn is_fractional(self) -> bool {
        self.0 < 8
    }

    fn vlmul(self) -> u64 {
        match self.0 {
            1 => 5,
            2 => 6,
            4 => 7,
            16 => 1,
            32 => 2,
            64 => 3,
            _ => 0,
        }
    }
}

impl fmt::Display for Lmul {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fractional() {
            write!(f, "mf{}", 8 / self.0)
        } else {
            write!(f, "m{}", self.0 / 8)
        }
    }
}

/// Decoded `vtype` value
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vtype {
    /// Selected element width
    pub sew: Sew,
    /// Register group multiplier
    pub lmul: Lmul,
    /// Tail agnostic
    pub vta: bool,
    /// Mask agnostic
    pub vma: bool,
    /// Illegal value
    ///
    /// If set, the configuration requested last was not supported and any
    /// vector instruction depending on `vtype` is illegal.
    pub vill: bool,
}

impl Vtype {
    /// `vtype` value with `vill` set
    pub const ILLEGAL: Self = Self {
        sew: Sew::E8,
        lmul: Lmul::M1,
        vta: false,
        vma: false,
        vill: true,
    };

    /// Create a new, legal `vtype`
    pub fn new(sew: Sew, lmul: Lmul, vta: bool, vma: bool) -> Self {
        Self {
            sew,
            lmul,
            vta,
            vma,
            vill: false,
        }
    }

    /// Decode the immediate of a `vsetvli` or `vsetivli` instruction
    ///
    /// Reserved values result in a `vtype` with `vill` set, which is what
    /// implementations write to `vtype` for unsupported configurations.
    pub fn from_zimm(zimm: u16) -> Self {
        Self::try_from(u64::from(zimm)).unwrap_or(Self::ILLEGAL)
    }

    /// Compute `VLMAX` for the given `VLEN` in bits
    pub fn vlmax(&self, vlen: u32) -> u64 {
        u64::from(vlen) * u64::from(self.lmul.0) / (8 * u64::from(self.sew.bits()))
    }

    /// Retrieve the raw (RV64) CSR value
    pub fn bits(&self) -> u64 {
        if self.vill {
            return 1 << 63;
        }
        u64::from(self.vma) << 7
            | u64::from(self.vta) << 6
            | self.sew.vsew() << 3
            | self.lmul.vlmul()
    }
}

impl TryFrom<u64> for Vtype {
    type Error = u64;

    /// Decode a raw `vtype` CSR value
    ///
    /// The `vill` bit is recognized both at bit 63 (RV64) and bit 31 (RV32).
    /// Fails for values with reserved bits set or reserved `vsew`/`vlmul`
    /// encodings.
    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        if raw >> 63 == 1 || raw >> 31 == 1 {
            return Ok(Self::ILLEGAL);
        }
        if raw >> 8 != 0 {
            return Err(raw);
        }
        let sew = Sew::from_vsew(((raw >> 3) & 0b111) as u8).ok_or(raw)?;
        let lmul = Lmul::from_vlmul((raw & 0b111) as u8).ok_or(raw)?;
        Ok(Self::new(sew, lmul, (raw >> 6) & 1 == 1, (raw >> 7) & 1 == 1))
    }
}

impl From<Vtype> for u64 {
    fn from(vtype: Vtype) -> Self {
        vtype.bits()
    }
}

impl fmt::Display for Vtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vill {
            return write!(f, "vill");
        }
        let ta = if self.vta { "ta" } else { "tu" };
        let ma = if self.vma { "ma" } else { "mu" };
        write!(f, "e{},{},{ta},{ma}", self.sew.bits(), self.lmul)
    }
}
