// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Instruction footprint decoding
//!
//! This module provides [`decode`], which determines the architectural
//! [`Location`]s a traced instruction reads and writes. Vector register
//! groups are expanded into their constituent registers according to the
//! effective multiplier of each operand, which in turn depends on the `vtype`
//! active when the instruction executed. That state is carried from record
//! to record in a [`Context`].
//!
//! Vector instructions are decoded exhaustively. Scalar instructions are
//! only decoded as far as needed to determine which registers they touch.

pub mod error;
mod memory;
mod scalar;
mod vector;
mod vset;


use core::fmt;

pub use error::{Error, Inconsistency, Kind};

use crate::config::Parameters;
use crate::instruction::vtype::Vtype;
use crate::instruction::{Bits, OpCode, format};
use crate::location::{Location, Register};
use crate::trace::{Record, Type};

/// Decode the footprint of a single record
///
/// The record must carry its raw instruction encoding. The [`Context`] is
/// updated with any vector state the record establishes or reveals, so
/// records must be decoded in trace order.
pub fn decode(record: &Record, ctx: &mut Context) -> Result<Effect, Error> {
    let err = |kind| Error::new(record.number, record.instruction, kind);
    let raw = record
        .instruction
        .ok_or_else(|| err(Kind::MalformedTraceRecord("instruction")))?;

    ctx.observe(record);
    let effect = dispatch(raw, record, ctx).map_err(err)?;

    if record.kind.is_some() && record.record_type() != effect.class.record_type() {
        tracing::debug!(
            index = ?record.number,
            tag = ?record.kind,
            class = ?effect.class,
            "record type differs from decoded instruction class"
        );
    }
    Ok(effect)
}

fn dispatch(raw: u64, record: &Record, ctx: &mut Context) -> Result<Effect, Kind> {
    let insn = match Bits::try_from(raw).map_err(Kind::UnsupportedInstruction)? {
        Bits::Bit16(_) => return Ok(scalar::compressed(record)),
        Bits::Bit32(insn) => insn,
    };
    match OpCode::from(insn) {
        OpCode::OpV if format::funct3(insn) == 0b111 => vset::decode(insn, record, ctx),
        OpCode::OpV => vector::decode(insn, record, ctx),
        OpCode::LoadFp | OpCode::StoreFp if memory::is_vector(insn) => {
            memory::decode(insn, record, ctx)
        }
        OpCode::Unknown => Err(Kind::UnsupportedInstruction(raw)),
        opcode => scalar::decode(opcode, insn, record),
    }
}

/// Vector state carried from record to record
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    /// Active `vtype`, if known
    pub vtype: Option<Vtype>,
    /// Active `vl`, if known
    pub vl: Option<u64>,
    /// `VLEN` in bits, if known
    pub vlen: Option<u32>,
    /// See [`Parameters::mask_agnostic_overwrites`]
    pub mask_agnostic_overwrites: bool,
}

impl Context {
    /// Create a context without any known state
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the initial state from [`Parameters`]
    ///
    /// A reserved initial `vtype` is treated like one with `vill` set.
    pub fn with_params(self, params: &Parameters) -> Self {
        Self {
            vtype: params
                .initial_vtype
                .map(|raw| Vtype::try_from(raw).unwrap_or(Vtype::ILLEGAL)),
            vl: params.initial_vl,
            vlen: params.vlen,
            mask_agnostic_overwrites: params.mask_agnostic_overwrites,
        }
    }

    /// Compute `VLMAX` under the given `vtype`, if `VLEN` is known
    pub fn vlmax(&self, vtype: Vtype) -> Option<u64> {
        self.vlen.map(|vlen| vtype.vlmax(vlen))
    }

    /// Adopt the `VLEN` and `vl` snapshots of a record
    fn observe(&mut self, record: &Record) {
        let vlen = record
            .vlenb
            .and_then(|b| b.checked_mul(8))
            .and_then(|b| u32::try_from(b).ok());
        if vlen.is_some() {
            self.vlen = vlen;
        }
        if record.vl.is_some() {
            self.vl = record.vl;
        }
    }

    /// Determine the `vtype` an instruction executes under
    ///
    /// A `vtype` snapshot in the record must agree with the tracked state. If
    /// no state is tracked yet, the snapshot is adopted.
    fn active(&mut self, record: &Record) -> Result<Vtype, Inconsistency> {
        let snapshot = record
            .vtype
            .map(|raw| Vtype::try_from(raw).map_err(Inconsistency::ReservedVtype))
            .transpose()?;
        let vtype = match (self.vtype, snapshot) {
            (Some(active), Some(snapshot)) if active != snapshot => {
                return Err(Inconsistency::SnapshotMismatch { active, snapshot });
            }
            (Some(active), _) => active,
            (None, Some(snapshot)) => {
                self.vtype = Some(snapshot);
                snapshot
            }
            (None, None) => return Err(Inconsistency::NoVtype),
        };
        if vtype.vill {
            return Err(Inconsistency::IllegalVtype);
        }
        Ok(vtype)
    }
}

/// Register footprint of a single instruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Effect {
    /// Mnemonic, e.g. `vadd.vv`
    pub mnemonic: String,
    /// Operands in assembly syntax
    pub operands: String,
    /// Instruction class
    pub class: Class,
    /// Locations read, without duplicates
    pub reads: Vec<Location>,
    /// Locations written, without duplicates
    pub writes: Vec<Location>,
    /// Whether the writes may leave parts of the destination untouched
    ///
    /// Previous writers of a location written by a masked write stay live.
    pub masked: bool,
}

impl Effect {
    /// Create an effect without any reads or writes
    pub fn new(mnemonic: impl Into<String>, class: Class) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            operands: String::new(),
            class,
            reads: Vec::new(),
            writes: Vec::new(),
            masked: false,
        }
    }

    /// Add a location to the read set
    pub fn read(&mut self, location: Location) {
        if !self.reads.contains(&location) {
            self.reads.push(location);
        }
    }

    /// Add a location to the write set
    pub fn write(&mut self, location: Location) {
        if !self.writes.contains(&location) {
            self.writes.push(location);
        }
    }

    pub fn read_all(&mut self, locations: impl IntoIterator<Item = Location>) {
        locations.into_iter().for_each(|l| self.read(l))
    }

    pub fn write_all(&mut self, locations: impl IntoIterator<Item = Location>) {
        locations.into_iter().for_each(|l| self.write(l))
    }

    /// Read an integer register, ignoring `x0`
    fn read_scalar(&mut self, register: Register) {
        self.read_all(Location::scalar(register))
    }

    /// Write an integer register, ignoring `x0`
    fn write_scalar(&mut self, register: Register) {
        self.write_all(Location::scalar(register))
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operands.is_empty() {
            write!(f, "{}", self.mnemonic)
        } else {
            write!(f, "{} {}", self.mnemonic, self.operands)
        }
    }
}

/// Instruction class
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Class {
    /// `vset*` instructions
    Configuration,
    /// Element-wise vector arithmetic, moves and conversions
    Arithmetic,
    /// Comparisons and carry-outs producing a mask
    MaskCompare,
    /// Operations on mask registers
    Mask,
    /// Reductions
    Reduction,
    /// Gathers, slides and compression
    Permute,
    /// Vector loads
    Load,
    /// Vector stores
    Store,
    /// Scalar instructions
    Scalar,
}

impl Class {
    /// Retrieve the record [`Type`] a tracer would tag this class with
    pub fn record_type(self) -> Option<Type> {
        match self {
            Self::Configuration => Some(Type::Configuration),
            Self::Load | Self::Store => Some(Type::Memory),
            Self::Scalar => None,
            _ => Some(Type::Register),
        }
    }
}

/// Expand a register group of `count` registers aligned to `align`
fn span(
    register: Register,
    align: u8,
    count: u8,
) -> Result<impl Iterator<Item = Location>, Inconsistency> {
    if register % align.max(1) != 0 {
        return Err(Inconsistency::Misaligned {
            register,
            registers: align,
        });
    }
    if u16::from(register) + u16::from(count) > 32 {
        return Err(Inconsistency::GroupOverflow {
            register,
            registers: count,
        });
    }
    Ok(Location::group(register, count))
}

/// Expand a register group of `registers` registers
fn group(
    register: Register,
    registers: u8,
) -> Result<impl Iterator<Item = Location>, Inconsistency> {
    span(register, registers, registers)
}
