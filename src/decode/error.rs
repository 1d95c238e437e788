// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Decode-specific error types

use core::fmt;

use crate::instruction::vtype::Vtype;
use crate::location::Register;

/// Error decoding a single trace record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    /// Sequence index of the offending record
    pub index: Option<u64>,
    /// Raw instruction encoding of the offending record
    pub raw: Option<u64>,
    /// Cause
    pub kind: Kind,
}

impl Error {
    /// Create an error for the given record
    pub fn new(index: Option<u64>, raw: Option<u64>, kind: Kind) -> Self {
        Self { index, raw, kind }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "record {index}")?,
            None => write!(f, "record")?,
        }
        if let Some(raw) = self.raw {
            write!(f, " ({raw:#010x})")?;
        }
        write!(f, ": {}", self.kind)
    }
}

/// Cause of a decode [`Error`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    /// The record lacks a required field or carries an invalid one
    MalformedTraceRecord(&'static str),
    /// There is no rule for decoding the given encoding
    UnsupportedInstruction(u64),
    /// The instruction conflicts with the vector state it executes under
    InconsistentState(Inconsistency),
}

impl core::error::Error for Kind {}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedTraceRecord(field) => write!(f, "missing or invalid field '{field}'"),
            Self::UnsupportedInstruction(raw) => write!(f, "unsupported instruction {raw:#x}"),
            Self::InconsistentState(i) => write!(f, "inconsistent vector state: {i}"),
        }
    }
}

/// Conflicts between an instruction and the vector state
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    /// No `vtype` was established before a vector instruction
    NoVtype,
    /// The active `vtype` has `vill` set
    IllegalVtype,
    /// A register group does not start at a multiple of its size
    Misaligned { register: Register, registers: u8 },
    /// A register group extends beyond `v31`
    GroupOverflow { register: Register, registers: u8 },
    /// The effective multiplier of some operand is out of range
    InvalidMultiplier,
    /// The record's `vtype` snapshot differs from the tracked `vtype`
    SnapshotMismatch { active: Vtype, snapshot: Vtype },
    /// The record's `vtype` snapshot has reserved bits or encodings set
    ReservedVtype(u64),
}

impl From<Inconsistency> for Kind {
    fn from(value: Inconsistency) -> Self {
        Self::InconsistentState(value)
    }
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoVtype => write!(f, "no vtype established"),
            Self::IllegalVtype => write!(f, "vtype has vill set"),
            Self::Misaligned {
                register,
                registers,
            } => write!(f, "v{register} is not aligned to a group of {registers}"),
            Self::GroupOverflow {
                register,
                registers,
            } => write!(f, "group of {registers} at v{register} exceeds v31"),
            Self::InvalidMultiplier => write!(f, "effective multiplier out of range"),
            Self::SnapshotMismatch { active, snapshot } => {
                write!(f, "active vtype {active} differs from snapshot {snapshot}")
            }
            Self::ReservedVtype(raw) => write!(f, "reserved vtype {raw:#x}"),
        }
    }
}
