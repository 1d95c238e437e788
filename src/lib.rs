// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0

//! # Data-dependency graphs for RISC-V vector extension execution traces
//!
//! This crate reconstructs the true data dependencies between the
//! instructions of a retired-instruction trace of a program using the RISC-V
//! vector extension (RVV). Each instruction is decoded to the set of
//! architectural locations it reads and writes, taking the active `vtype` into
//! account for expanding vector register groups. A single pass over the trace
//! then connects every read to the instructions which produced the value.
//!
//! See [decode] for the instruction footprint decoder and [graph] for the
//! construction of graphs.
//!
//! # Graphs
//! - the computational graph with read-after-write edges only
//! - an aggregated graph collapsing repeated instruction windows
//! - an execution graph with additional program order edges
//!
//! All graphs may be written in a Cytoscape-style JSON format via [export].
//!
//! # Example
//!
//! The following example demonstrates building the graphs for a trace held in
//! memory.
//!
//! ```
//! use rvv_depgraph::{graph, trace};
//!
//! let trace = br#"[
//!     {"number": 0, "pc": "0x80000000", "instruction": "0x0d0572d7", "type": 2, "vl": 4},
//!     {"number": 1, "pc": "0x80000004", "instruction": "0x02056407", "type": 3},
//!     {"number": 2, "pc": "0x80000008", "instruction": "0x02840457", "type": 1},
//!     {"number": 3, "pc": "0x8000000c", "instruction": "0xc20022f3"}
//! ]"#;
//! let records = trace::from_slice(trace).unwrap();
//!
//! let params = Default::default();
//! let graphs = graph::build_graphs(&records, &params, Default::default()).unwrap();
//! let computational = graphs.computational.unwrap();
//! for edge in computational.edges() {
//!     println!("{} -> {} ({:?})", edge.source, edge.target, edge.location);
//! }
//! assert_eq!(computational.nodes().len(), 4);
//! ```

pub mod config;
pub mod decode;
pub mod export;
pub mod graph;
pub mod instruction;
pub mod location;
pub mod trace;
pub mod tracker;


pub use config::Parameters;
pub use location::Location;
