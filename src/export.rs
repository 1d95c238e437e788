// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Graph interchange
//!
//! Graphs are exchanged as Cytoscape-style element lists:
//!
//! ```json
//! {"elements": [{"data": {"id": "0", ...}}, {"data": {"id": "e0", "source": "0", "target": "1", ...}}]}
//! ```
//!
//! Node ids are the decimal [`NodeId`]s. Edge ids are `e` followed by the
//! edge's position. Elements carrying a `source` and a `target` are edges,
//! all others are nodes. Operand values and vector state traced with a node
//! are nested under its `values` key.

pub mod error;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::io::{Read, Write};

pub use error::Error;

use crate::config::serde_utils::{Dec, Hex};
use crate::decode::{Class, Effect};
use crate::graph::aggregate::{self, AggregatedGraph};
use crate::graph::{ComputationalGraph, Edge, EdgeKind, ExecutionGraph, Node, NodeId};
use crate::instruction::vtype::Vtype;
use crate::location::Location;
use crate::trace::{Type, Values};

#[derive(serde::Serialize, serde::Deserialize)]
struct Document<N> {
    elements: Vec<Element<N>>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct Element<N> {
    data: Data<N>,
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum Data<N> {
    Edge(EdgeData),
    Node(N),
}

#[derive(serde::Serialize, serde::Deserialize)]
struct EdgeData {
    id: String,
    source: String,
    target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
    kind: EdgeKind,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct NodeData {
    id: String,
    mnemonic: String,
    #[serde(default)]
    operands: String,
    #[serde(default, with = "Hex")]
    pc: Option<u64>,
    #[serde(default, with = "Hex")]
    instruction: Option<u64>,
    class: Class,
    #[serde(default, rename = "type")]
    kind: Option<u8>,
    #[serde(default, with = "Dec")]
    vl: Option<u64>,
    #[serde(default, with = "Hex")]
    vtype: Option<u64>,
    #[serde(default)]
    reads: Vec<Location>,
    #[serde(default)]
    writes: Vec<Location>,
    #[serde(default)]
    masked: bool,
    #[serde(default, skip_serializing_if = "Values::is_empty")]
    values: Values,
}

#[derive(serde::Serialize)]
struct AggregateData<'a> {
    id: String,
    mnemonic: &'a str,
    operands: &'a str,
    class: Class,
    repetitions: usize,
    constituents: &'a [NodeId],
    representative: String,
    body: &'a [String],
}

/// Write a [`ComputationalGraph`]
pub fn write_computational(graph: &ComputationalGraph, writer: impl Write) -> Result<(), Error> {
    write(writer, graph.nodes().iter().map(node_data), graph.edges())
}

/// Write an [`ExecutionGraph`]
pub fn write_execution(graph: &ExecutionGraph, writer: impl Write) -> Result<(), Error> {
    write(writer, graph.nodes().iter().map(node_data), graph.edges())
}

/// Write an [`AggregatedGraph`]
pub fn write_aggregated(graph: &AggregatedGraph, writer: impl Write) -> Result<(), Error> {
    write(writer, graph.nodes().iter().map(aggregate_data), graph.edges())
}

/// Read a [`ComputationalGraph`]
///
/// Node ids must be dense and appear in order. Only read-after-write edges
/// pointing from an earlier to a later node are accepted.
pub fn read_computational(reader: impl Read) -> Result<ComputationalGraph, Error> {
    let (nodes, edges) = read(reader)?;
    for (pos, node) in nodes.iter().enumerate() {
        if node.id != pos {
            return Err(Error::Schema(format!("node {} at position {pos}", node.id)));
        }
    }
    for edge in &edges {
        if edge.kind != EdgeKind::Raw || edge.source >= edge.target {
            return Err(Error::Schema(format!(
                "unexpected {:?} edge from {} to {}",
                edge.kind, edge.source, edge.target
            )));
        }
    }
    Ok(ComputationalGraph::from_parts(nodes, edges))
}

/// Read an [`ExecutionGraph`]
///
/// Nodes are kept in document order, which is taken as execution order.
pub fn read_execution(reader: impl Read) -> Result<ExecutionGraph, Error> {
    let (nodes, edges) = read(reader)?;
    if let Some(edge) = edges
        .iter()
        .find(|e| !matches!(e.kind, EdgeKind::Raw | EdgeKind::Sequential))
    {
        return Err(Error::Schema(format!("unexpected {:?} edge", edge.kind)));
    }
    Ok(ExecutionGraph::from_parts(nodes, edges))
}

fn write<N: serde::Serialize>(
    mut writer: impl Write,
    nodes: impl Iterator<Item = N>,
    edges: &[Edge],
) -> Result<(), Error> {
    let mut elements: Vec<_> = nodes.map(|n| Element { data: Data::Node(n) }).collect();
    elements.extend(edges.iter().enumerate().map(|(i, e)| Element {
        data: Data::Edge(edge_data(i, e)),
    }));
    serde_json::to_writer_pretty(&mut writer, &Document { elements })?;
    writer.flush()?;
    Ok(())
}

/// Read nodes and edges, checking that ids are unique and edges connect them
fn read(reader: impl Read) -> Result<(Vec<Node>, Vec<Edge>), Error> {
    let document: Document<NodeData> = serde_json::from_reader(reader)?;
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for element in document.elements {
        match element.data {
            Data::Node(data) => nodes.push(node(data)?),
            Data::Edge(data) => edges.push(edge(data)?),
        }
    }

    let mut ids = HashSet::new();
    if let Some(node) = nodes.iter().find(|n| !ids.insert(n.id)) {
        return Err(Error::Schema(format!("duplicate node {}", node.id)));
    }
    if let Some(edge) = edges
        .iter()
        .find(|e| !ids.contains(&e.source) || !ids.contains(&e.target))
    {
        return Err(Error::Schema(format!(
            "edge from {} to {} references unknown node",
            edge.source, edge.target
        )));
    }
    Ok((nodes, edges))
}

fn node_data(node: &Node) -> NodeData {
    NodeData {
        id: node.id.to_string(),
        mnemonic: node.effect.mnemonic.clone(),
        operands: node.effect.operands.clone(),
        pc: node.pc,
        instruction: Some(node.instruction),
        class: node.effect.class,
        kind: node.kind.map(u8::from),
        vl: node.vl,
        vtype: node.vtype.map(u64::from),
        reads: node.effect.reads.clone(),
        writes: node.effect.writes.clone(),
        masked: node.effect.masked,
        values: node.values.clone(),
    }
}

fn aggregate_data(node: &aggregate::Node) -> AggregateData<'_> {
    AggregateData {
        id: node.id.to_string(),
        mnemonic: &node.mnemonic,
        operands: &node.effect.operands,
        class: node.effect.class,
        repetitions: node.repetitions,
        constituents: &node.constituents,
        representative: node.representative.to_string(),
        body: &node.body,
    }
}

fn edge_data(index: usize, edge: &Edge) -> EdgeData {
    EdgeData {
        id: format!("e{index}"),
        source: edge.source.to_string(),
        target: edge.target.to_string(),
        location: edge.location,
        kind: edge.kind,
    }
}

fn node(data: NodeData) -> Result<Node, Error> {
    let id = parse_id(&data.id)?;
    let instruction = data
        .instruction
        .ok_or_else(|| Error::Schema(format!("node {id} lacks an instruction")))?;
    let vtype = data
        .vtype
        .map(|raw| {
            Vtype::try_from(raw)
                .map_err(|raw| Error::Schema(format!("node {id} has reserved vtype {raw:#x}")))
        })
        .transpose()?;
    let effect = Effect {
        mnemonic: data.mnemonic,
        operands: data.operands,
        class: data.class,
        reads: data.reads,
        writes: data.writes,
        masked: data.masked,
    };
    Ok(Node {
        id,
        pc: data.pc,
        instruction,
        kind: data.kind.and_then(|k| Type::try_from(k).ok()),
        effect,
        vl: data.vl,
        vtype,
        values: data.values,
    })
}

fn edge(data: EdgeData) -> Result<Edge, Error> {
    let source = parse_id(&data.source)?;
    let target = parse_id(&data.target)?;
    if data.kind != EdgeKind::Sequential && data.location.is_none() {
        return Err(Error::Schema(format!("edge {} lacks a location", data.id)));
    }
    Ok(Edge {
        source,
        target,
        location: data.location,
        kind: data.kind,
    })
}

fn parse_id(id: &str) -> Result<NodeId, Error> {
    id.parse()
        .map_err(|_| Error::Schema(format!("invalid node id '{id}'")))
}
