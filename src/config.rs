// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Configuration and utilities

pub mod serde_utils;

/// Analysis parameters
///
/// Parameters influence how records are decoded and how graphs are
/// aggregated. They may be (de)serialized, e.g. from a TOML file. Missing
/// fields take their value from [`PARAMETERS`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Width of a vector register in bits (`VLEN`)
    ///
    /// Used for computing `VLMAX` if records do not carry a `vlenb`
    /// snapshot. If neither is known, tails are never considered.
    pub vlen: Option<u32>,
    /// Raw `vtype` assumed active before the first configuration instruction
    pub initial_vtype: Option<u64>,
    /// `vl` assumed active before the first configuration instruction
    pub initial_vl: Option<u64>,
    /// Treat mask-agnostic masked writes as writes to all elements
    ///
    /// By default, any masked write leaves the previous writer of its
    /// destination live.
    pub mask_agnostic_overwrites: bool,
    /// Maximum window length considered during aggregation
    pub max_window: usize,
    /// Aggregation strategy
    pub aggregation: Aggregation,
}

/// See [`PARAMETERS`] for default values of individual fields
impl Default for Parameters {
    fn default() -> Self {
        PARAMETERS
    }
}

/// Default [`Parameters`]
pub const PARAMETERS: Parameters = Parameters {
    vlen: None,
    initial_vtype: None,
    initial_vl: None,
    mask_agnostic_overwrites: false,
    max_window: 64,
    aggregation: Aggregation::Window,
};

/// Aggregation strategy
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Collapse consecutively repeated windows of structurally identical nodes
    #[default]
    Window,
    /// Collapse all dynamic instances of the same static instruction
    Pc,
}
