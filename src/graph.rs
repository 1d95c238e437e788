// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Dependency graphs
//!
//! This module provides the [`ComputationalGraph`], which holds one [`Node`]
//! per retired instruction and one read-after-write [`Edge`] per producer of
//! each location read. Graphs are constructed via a [`Builder`]. Derived
//! views of a computational graph are provided by the [`aggregate`] and
//! [`execution`] submodules.
//!
//! # Example
//!
//! ```
//! use rvv_depgraph::graph;
//! use rvv_depgraph::trace::Record;
//!
//! let records = [
//!     // vsetvli x5, x10, e32,m1,ta,ma
//!     Record::new(0, 0x0d0572d7),
//!     // vadd.vv v8, v4, v2
//!     Record::new(1, 0x02410457),
//! ];
//! let graph = graph::builder().build(&records).unwrap();
//! assert_eq!(graph.nodes().len(), 2);
//! assert!(graph.edges().iter().all(|e| e.source == 0 && e.target == 1));
//! ```

pub mod aggregate;
pub mod builder;
pub mod execution;

#[cfg(test)]
mod tests;

use core::fmt;

pub use aggregate::AggregatedGraph;
pub use builder::{Builder, builder};
pub use execution::{ExecutionGraph, build_execution_view};

use crate::config::{Aggregation, Parameters};
use crate::decode::{self, Effect};
use crate::instruction::vtype::Vtype;
use crate::location::Location;
use crate::trace::{Record, Type, Values};

/// Node identifier
///
/// Identifiers of [`ComputationalGraph`] nodes are trace sequence indices.
pub type NodeId = usize;

/// A single retired instruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Trace sequence index
    pub id: NodeId,
    /// Program counter, if traced
    pub pc: Option<u64>,
    /// Raw instruction encoding
    pub instruction: u64,
    /// Record type, either as tagged by the tracer or derived from the
    /// decoded instruction class
    pub kind: Option<Type>,
    /// Registers read and written
    pub effect: Effect,
    /// `vl` active after the instruction retired, if known
    pub vl: Option<u64>,
    /// `vtype` active after the instruction retired, if known
    pub vtype: Option<Vtype>,
    /// Operand values and further vector state as traced
    pub values: Values,
}

impl Node {
    /// Retrieve the node's mnemonic
    pub fn mnemonic(&self) -> &str {
        &self.effect.mnemonic
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.effect)
    }
}

/// Directed dependency from a producer to a consumer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Producing node
    pub source: NodeId,
    /// Consuming node
    pub target: NodeId,
    /// Location carrying the dependency, `None` for [`EdgeKind::Sequential`]
    pub location: Option<Location>,
    pub kind: EdgeKind,
}

impl Edge {
    /// Create a read-after-write edge
    pub fn raw(source: NodeId, target: NodeId, location: Location) -> Self {
        Self {
            source,
            target,
            location: Some(location),
            kind: EdgeKind::Raw,
        }
    }

    /// Create an edge between instructions retiring one after another
    pub fn sequential(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            target,
            location: None,
            kind: EdgeKind::Sequential,
        }
    }
}

/// Classification of an [`Edge`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Read after write
    Raw,
    /// Write after read
    War,
    /// Write after write
    Waw,
    /// Program order
    Sequential,
}

/// Read-after-write dependencies between retired instructions
///
/// Nodes are held in trace order, i.e. a node's [`id`][Node::id] equals its
/// position. Every edge points from an earlier to a later node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComputationalGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl ComputationalGraph {
    /// Create a graph from its parts
    ///
    /// Callers must uphold the graph's invariants.
    pub(crate) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Retrieve all nodes in trace order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Retrieve all edges
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Retrieve the node with the given id
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Retrieve all edges ending in the given node
    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.target == id)
    }
}

/// Selection of graphs to produce
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub computational: bool,
    pub aggregated: bool,
    pub execution: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            computational: true,
            aggregated: true,
            execution: true,
        }
    }
}

/// Graphs produced from a single trace
#[derive(Clone, Debug, Default)]
pub struct Graphs {
    pub computational: Option<ComputationalGraph>,
    pub aggregated: Option<AggregatedGraph>,
    pub execution: Option<ExecutionGraph>,
}

/// Build the selected graphs for a trace
///
/// The [`ComputationalGraph`] is always constructed, since the other graphs
/// are derived from it. The [`AggregatedGraph`] is constructed using the
/// [`Aggregation`] strategy set in the [`Parameters`]. The [`ExecutionGraph`]
/// follows trace order.
pub fn build_graphs(
    records: &[Record],
    params: &Parameters,
    selection: Selection,
) -> Result<Graphs, decode::Error> {
    let graph = builder().with_params(params).build(records)?;

    let aggregated = selection.aggregated.then(|| match params.aggregation {
        Aggregation::Window => aggregate::aggregate_within(&graph, params.max_window),
        Aggregation::Pc => aggregate::aggregate_by_pc(&graph),
    });
    let execution = selection.execution.then(|| {
        let order: Vec<_> = graph.nodes().iter().map(|n| n.id).collect();
        build_execution_view(&graph, &order)
    });
    Ok(Graphs {
        computational: selection.computational.then_some(graph),
        aggregated,
        execution,
    })
}
