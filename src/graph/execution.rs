// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Execution order view

use super::{ComputationalGraph, Edge, EdgeKind, Node, NodeId};

/// [`ComputationalGraph`] with additional program order edges
///
/// Nodes are held in execution order. In addition to all read-after-write
/// edges, each node is connected to its successor through an
/// [`EdgeKind::Sequential`] edge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl ExecutionGraph {
    pub(crate) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Retrieve all nodes in execution order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Retrieve all edges
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Retrieve the program order edges
    pub fn sequential(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Sequential)
    }
}

impl From<&ComputationalGraph> for ExecutionGraph {
    fn from(graph: &ComputationalGraph) -> Self {
        let order: Vec<_> = graph.nodes().iter().map(|n| n.id).collect();
        build_execution_view(graph, &order)
    }
}

/// Build an [`ExecutionGraph`] for the given execution order
///
/// Ids not present in the graph are ignored.
pub fn build_execution_view(graph: &ComputationalGraph, order: &[NodeId]) -> ExecutionGraph {
    let nodes: Vec<Node> = order
        .iter()
        .filter_map(|&id| graph.node(id))
        .cloned()
        .collect();
    let mut edges: Vec<_> = graph
        .edges()
        .iter()
        .filter(|e| e.kind == EdgeKind::Raw)
        .copied()
        .collect();
    let raw = edges.len();
    edges.extend(
        nodes
            .windows(2)
            .map(|pair| Edge::sequential(pair[0].id, pair[1].id)),
    );

    tracing::debug!(
        nodes = nodes.len(),
        raw,
        sequential = edges.len() - raw,
        "built execution graph"
    );
    ExecutionGraph { nodes, edges }
}
