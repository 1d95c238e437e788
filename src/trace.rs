// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Execution trace records
//!
//! A trace is a JSON array of [`Record`]s, one per retired instruction, in
//! the order in which they retired. Numeric fields may be given as integers
//! or as strings, and `"N/A"` marks a value as absent.

use crate::config::serde_utils::{Dec, Hex};
use crate::location::Register;

/// A single retired instruction
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Record {
    /// Sequence number
    ///
    /// If present, sequence numbers must increase by exactly one from record
    /// to record.
    #[serde(with = "Dec")]
    pub number: Option<u64>,
    /// Program counter
    #[serde(with = "Hex")]
    pub pc: Option<u64>,
    /// Raw instruction encoding
    #[serde(with = "Hex")]
    pub instruction: Option<u64>,
    /// Disassembly as provided by the tracer
    pub mnemonic: Option<String>,
    /// Record type tag, see [`Type`]
    #[serde(rename = "type")]
    pub kind: Option<u8>,
    pub vd: Option<Register>,
    pub vs1: Option<Register>,
    pub vs2: Option<Register>,
    pub rd: Option<Register>,
    pub rs1: Option<Register>,
    pub rs2: Option<Register>,
    #[serde(with = "Hex")]
    pub rd_value: Option<u64>,
    #[serde(with = "Hex")]
    pub rs1_value: Option<u64>,
    #[serde(with = "Hex")]
    pub rs2_value: Option<u64>,
    pub vd_data: Option<String>,
    pub vs1_data: Option<String>,
    pub vs2_data: Option<String>,
    /// `vl` after retirement
    #[serde(with = "Dec")]
    pub vl: Option<u64>,
    /// `vtype` after retirement
    #[serde(with = "Hex")]
    pub vtype: Option<u64>,
    #[serde(with = "Dec")]
    pub vstart: Option<u64>,
    #[serde(with = "Hex")]
    pub vcsr: Option<u64>,
    /// `VLEN` in bytes
    #[serde(with = "Dec")]
    pub vlenb: Option<u64>,
}

impl Record {
    /// Create a record for the given instruction encoding
    pub fn new(number: u64, instruction: u64) -> Self {
        Self {
            number: Some(number),
            instruction: Some(instruction),
            ..Default::default()
        }
    }

    /// Retrieve the record's [`Type`], if tagged with a known one
    pub fn record_type(&self) -> Option<Type> {
        self.kind.and_then(|k| Type::try_from(k).ok())
    }
}

/// Operand values and vector CSR state of a record
///
/// None of these affect dependencies. They are kept with each graph node so
/// that viewers may display them.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Values {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rd: Option<Register>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rs1: Option<Register>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rs2: Option<Register>,
    #[serde(with = "Hex", skip_serializing_if = "Option::is_none")]
    pub rd_value: Option<u64>,
    #[serde(with = "Hex", skip_serializing_if = "Option::is_none")]
    pub rs1_value: Option<u64>,
    #[serde(with = "Hex", skip_serializing_if = "Option::is_none")]
    pub rs2_value: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vd: Option<Register>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vs1: Option<Register>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vs2: Option<Register>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vd_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vs1_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vs2_data: Option<String>,
    #[serde(with = "Dec", skip_serializing_if = "Option::is_none")]
    pub vstart: Option<u64>,
    #[serde(with = "Hex", skip_serializing_if = "Option::is_none")]
    pub vcsr: Option<u64>,
    #[serde(with = "Dec", skip_serializing_if = "Option::is_none")]
    pub vlenb: Option<u64>,
}

impl Values {
    /// Check whether no value is present
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&Record> for Values {
    fn from(record: &Record) -> Self {
        Self {
            rd: record.rd,
            rs1: record.rs1,
            rs2: record.rs2,
            rd_value: record.rd_value,
            rs1_value: record.rs1_value,
            rs2_value: record.rs2_value,
            vd: record.vd,
            vs1: record.vs1,
            vs2: record.vs2,
            vd_data: record.vd_data.clone(),
            vs1_data: record.vs1_data.clone(),
            vs2_data: record.vs2_data.clone(),
            vstart: record.vstart,
            vcsr: record.vcsr,
            vlenb: record.vlenb,
        }
    }
}

/// Record type
///
/// Tracers tag records with the broad category of the retired instruction.
/// Scalar instructions carry no tag.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// Vector instruction operating on registers only
    Register = 1,
    /// Vector configuration or CSR access
    Configuration = 2,
    /// Vector load or store
    Memory = 3,
}

impl TryFrom<u8> for Type {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Register),
            2 => Ok(Self::Configuration),
            3 => Ok(Self::Memory),
            unknown => Err(unknown),
        }
    }
}

impl From<Type> for u8 {
    fn from(value: Type) -> Self {
        value as u8
    }
}

/// Read a trace from a JSON array
pub fn from_reader(reader: impl std::io::Read) -> serde_json::Result<Vec<Record>> {
    serde_json::from_reader(reader)
}

/// Read a trace from a JSON array held in memory
pub fn from_slice(data: &[u8]) -> serde_json::Result<Vec<Record>> {
    serde_json::from_slice(data)
}
