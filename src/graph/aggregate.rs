// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Aggregation of repeated instruction sequences
//!
//! Loops in a program show up in a [`ComputationalGraph`] as runs of
//! structurally identical windows of nodes. This module collapses such runs
//! into a single aggregated [`Node`] each.
//!
//! Two windows of the same length match if the nodes at every offset share
//! their mnemonic and their dependencies on producers within the window,
//! relative to the window's start. Dependencies on producers outside the
//! window are not considered.

use std::collections::{HashMap, HashSet};

use crate::config::PARAMETERS;
use crate::decode::Effect;
use crate::location::Location;

use super::{ComputationalGraph, Edge, EdgeKind, NodeId};

/// Node of an [`AggregatedGraph`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Position of the node in the [`AggregatedGraph`]
    pub id: NodeId,
    /// Id of the first constituent in the [`ComputationalGraph`]
    pub representative: NodeId,
    /// Effect of the representative
    pub effect: Effect,
    /// Summary of the mnemonics of the aggregated window
    pub mnemonic: String,
    /// Mnemonics of the aggregated window
    pub body: Vec<String>,
    /// Number of times the window repeats
    pub repetitions: usize,
    /// Ids of all aggregated nodes in the [`ComputationalGraph`]
    pub constituents: Vec<NodeId>,
}

impl Node {
    /// Check whether this node stands for a single original node
    pub fn is_singleton(&self) -> bool {
        self.constituents.len() == 1
    }
}

/// Graph with repeated windows collapsed
///
/// Every node of the underlying [`ComputationalGraph`] is a constituent of
/// exactly one [`Node`]. Edges between constituents of the same node are
/// dropped. Other edges are re-homed to the aggregated nodes and appear only
/// once per pair of nodes and location.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregatedGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl AggregatedGraph {
    /// Retrieve all nodes
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

    /// Retrieve the aggregated node the given original node belongs to
    pub fn owner(&self, original: NodeId) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.constituents.contains(&original))
    }
}

/// Aggregate with the default maximum window length
pub fn aggregate(graph: &ComputationalGraph) -> AggregatedGraph {
    aggregate_within(graph, PARAMETERS.max_window)
}

/// Aggregate repeated windows of at most `max_window` nodes
///
/// At each position, all window lengths up to `max_window` are tried. The
/// candidate run covering the most nodes wins, with ties going to the shorter
/// window. A run is rejected if a run starting later within its span covers
/// more nodes. Nodes not covered by any run are kept as singletons.
pub fn aggregate_within(graph: &ComputationalGraph, max_window: usize) -> AggregatedGraph {
    let mut matcher = Matcher::new(graph, max_window);
    let len = graph.nodes().len();
    let mut groups = Vec::new();
    let mut start = 0;
    while start < len {
        let run = matcher
            .best(start)
            .filter(|run| !matcher.overshadowed(start, *run));
        match run {
            Some(run) => {
                let covered = run.coverage();
                groups.push(Group {
                    constituents: (start..start + covered).collect(),
                    length: run.length,
                    repetitions: run.repetitions,
                });
                start += covered;
            }
            None => {
                groups.push(Group::singleton(start));
                start += 1;
            }
        }
    }
    assemble(graph, groups)
}

/// Aggregate all dynamic instances of the same static instruction
///
/// Nodes are grouped by program counter and encoding. Nodes without a
/// program counter are kept as singletons. Aggregated nodes appear in the
/// order of their first instance.
pub fn aggregate_by_pc(graph: &ComputationalGraph) -> AggregatedGraph {
    let mut groups: Vec<Group> = Vec::new();
    let mut known = HashMap::new();
    for node in graph.nodes() {
        let Some(pc) = node.pc else {
            groups.push(Group::singleton(node.id));
            continue;
        };
        match known.get(&(pc, node.instruction)) {
            Some(&slot) => {
                let group: &mut Group = &mut groups[slot];
                group.constituents.push(node.id);
                group.repetitions += 1;
            }
            None => {
                known.insert((pc, node.instruction), groups.len());
                groups.push(Group::singleton(node.id));
            }
        }
    }
    assemble(graph, groups)
}

/// Nodes to be aggregated into a single [`Node`]
#[derive(Clone, Debug)]
struct Group {
    constituents: Vec<NodeId>,
    /// Length of the repeated window
    length: usize,
    repetitions: usize,
}

impl Group {
    fn singleton(id: NodeId) -> Self {
        Self {
            constituents: vec![id],
            length: 1,
            repetitions: 1,
        }
    }
}

fn assemble(graph: &ComputationalGraph, groups: Vec<Group>) -> AggregatedGraph {
    let mut owner = vec![None; graph.nodes().len()];
    let mut nodes = Vec::with_capacity(groups.len());
    for group in groups {
        let Some(representative) = group.constituents.first().and_then(|&c| graph.node(c)) else {
            continue;
        };
        let id = nodes.len();
        for &c in &group.constituents {
            if let Some(o) = owner.get_mut(c) {
                *o = Some(id);
            }
        }

        let body: Vec<String> = group
            .constituents
            .iter()
            .take(group.length)
            .filter_map(|&c| graph.node(c))
            .map(|n| n.mnemonic().to_string())
            .collect();
        let mnemonic = match (body.as_slice(), group.repetitions) {
            ([single], 1) => single.clone(),
            ([single], n) => format!("{single} x{n}"),
            (body, n) => format!("[{}] x{n}", body.join("; ")),
        };
        nodes.push(Node {
            id,
            representative: representative.id,
            effect: representative.effect.clone(),
            mnemonic,
            body,
            repetitions: group.repetitions,
            constituents: group.constituents,
        });
    }

    let mut seen = HashSet::new();
    let edges: Vec<_> = graph
        .edges()
        .iter()
        .filter(|e| e.kind == EdgeKind::Raw)
        .filter_map(|e| {
            let source = (*owner.get(e.source)?)?;
            let target = (*owner.get(e.target)?)?;
            (source != target).then_some(Edge {
                source,
                target,
                ..*e
            })
        })
        .filter(|e| seen.insert((e.source, e.target, e.location)))
        .collect();

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        runs = nodes.iter().filter(|n| !n.is_singleton()).count(),
        "aggregated graph"
    );
    AggregatedGraph { nodes, edges }
}

/// Repeated window
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Run {
    length: usize,
    repetitions: usize,
}

impl Run {
    fn coverage(self) -> usize {
        self.length * self.repetitions
    }
}

/// Window matcher
///
/// Finds the best [`Run`] starting at any given position, caching results.
struct Matcher<'g> {
    mnemonics: Vec<&'g str>,
    /// Producers and locations of the dependencies of each node, sorted
    incoming: Vec<Vec<(NodeId, Location)>>,
    max_window: usize,
    best: Vec<Option<Option<Run>>>,
}

impl<'g> Matcher<'g> {
    fn new(graph: &'g ComputationalGraph, max_window: usize) -> Self {
        let len = graph.nodes().len();
        let mut incoming = vec![Vec::new(); len];
        for edge in graph.edges().iter().filter(|e| e.kind == EdgeKind::Raw) {
            if let (Some(deps), Some(location)) = (incoming.get_mut(edge.target), edge.location) {
                deps.push((edge.source, location));
            }
        }
        incoming.iter_mut().for_each(|deps: &mut Vec<_>| {
            deps.sort_unstable();
            deps.dedup();
        });
        Self {
            mnemonics: graph.nodes().iter().map(|n| n.mnemonic()).collect(),
            incoming,
            max_window,
            best: vec![None; len],
        }
    }

    /// Retrieve the run covering the most nodes starting at `start`
    fn best(&mut self, start: usize) -> Option<Run> {
        if let Some(run) = self.best[start] {
            return run;
        }
        let len = self.mnemonics.len();
        let mut best: Option<Run> = None;
        let mut length = 1;
        while length <= self.max_window && start + 2 * length <= len {
            let mut repetitions = 1;
            while start + (repetitions + 1) * length <= len
                && self.matches(start, start + repetitions * length, length)
            {
                repetitions += 1;
            }
            let run = Run {
                length,
                repetitions,
            };
            if repetitions >= 2 && best.is_none_or(|b| run.coverage() > b.coverage()) {
                best = Some(run);
            }
            length += 1;
        }
        self.best[start] = Some(best);
        best
    }

    /// Check whether a run starting later within the given one covers more
    fn overshadowed(&mut self, start: usize, run: Run) -> bool {
        let covered = run.coverage();
        // A later run cannot cover more nodes than remain after its start
        let end = (start + covered).min(self.mnemonics.len().saturating_sub(covered));
        (start + 1..end).any(|t| self.best(t).is_some_and(|r| r.coverage() > covered))
    }

    /// Check whether the windows of the given length at `a` and `b` match
    fn matches(&self, a: usize, b: usize, length: usize) -> bool {
        (0..length).all(|k| {
            self.mnemonics[a + k] == self.mnemonics[b + k]
                && self.internal(a, a + k).eq(self.internal(b, b + k))
        })
    }

    /// Dependencies of `node` on producers at or after `start`
    ///
    /// Producers are given relative to `start`.
    fn internal(&self, start: usize, node: NodeId) -> impl Iterator<Item = (usize, Location)> + '_ {
        self.incoming[node]
            .iter()
            .filter(move |(p, _)| *p >= start)
            .map(move |&(p, l)| (p - start, l))
    }
}
