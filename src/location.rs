// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Architectural locations
//!
//! A [`Location`] identifies a single piece of architectural state an
//! instruction may read or write. Vector register groups are always expanded
//! into their constituent registers, so that partially overlapping groups
//! alias correctly.

use core::fmt;
use core::str::FromStr;

/// Register number
pub type Register = u8;

/// Readable and writable architectural state element
///
/// Register numbers are taken modulo 32. The vector mask register is vector
/// register `v0`, there is no separate location for it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    /// Scalar integer register `x1` to `x31`
    Scalar(Register),
    /// Scalar floating point register
    Float(Register),
    /// Single vector register
    Vector(Register),
    /// Vector length CSR
    Vl,
    /// Vector type CSR
    Vtype,
}

impl Location {
    /// The vector mask register `v0`
    pub const MASK: Self = Self::Vector(0);

    /// Number of distinct locations
    pub const COUNT: usize = 3 * 32 + 2;

    /// Create a scalar integer register location
    ///
    /// Returns `None` for `x0`, which is hardwired to zero and thus never
    /// carries a dependency.
    pub fn scalar(register: Register) -> Option<Self> {
        (register & 0x1f != 0).then_some(Self::Scalar(register & 0x1f))
    }

    /// Iterate over the registers of a vector register group
    ///
    /// The group starts at `base` and spans `registers` consecutive registers.
    pub fn group(base: Register, registers: u8) -> impl Iterator<Item = Self> {
        (base..base.saturating_add(registers)).map(Self::Vector)
    }

    /// Retrieve this location's dense index in `0..Self::COUNT`
    pub fn index(self) -> usize {
        match self {
            Self::Scalar(n) => usize::from(n & 0x1f),
            Self::Float(n) => 32 + usize::from(n & 0x1f),
            Self::Vector(n) => 64 + usize::from(n & 0x1f),
            Self::Vl => 96,
            Self::Vtype => 97,
        }
    }

    /// Check whether this is a vector register
    pub fn is_vector(self) -> bool {
        matches!(self, Self::Vector(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(n) => write!(f, "x{n}"),
            Self::Float(n) => write!(f, "f{n}"),
            Self::Vector(n) => write!(f, "v{n}"),
            Self::Vl => write!(f, "vl"),
            Self::Vtype => write!(f, "vtype"),
        }
    }
}

/// Error returned when parsing a [`Location`] fails
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError(pub String);

impl core::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Not a location: '{}'", self.0)
    }
}

impl FromStr for Location {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseError(s.into());
        match s {
            "vl" => return Ok(Self::Vl),
            "vtype" => return Ok(Self::Vtype),
            _ => (),
        }

        let (kind, num) = s.split_at_checked(1).ok_or_else(err)?;
        let num: Register = num.parse().map_err(|_| err())?;
        if num >= 32 {
            return Err(err());
        }
        match kind {
            "x" => Self::scalar(num).ok_or_else(err),
            "f" => Ok(Self::Float(num)),
            "v" => Ok(Self::Vector(num)),
            _ => Err(err()),
        }
    }
}

impl serde::Serialize for Location {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Location {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
