// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
use super::*;

use crate::decode::Kind;

use crate::location::Location::Vector;

fn opv(funct6: u32, vm: bool, vs2: u32, vs1: u32, funct3: u32, vd: u32) -> u64 {
    u64::from(
        funct6 << 26 | u32::from(vm) << 25 | vs2 << 20 | vs1 << 15 | funct3 << 12 | vd << 7 | 0x57,
    )
}

fn vadd(vd: u32, vs2: u32, vs1: u32) -> u64 {
    opv(0, true, vs2, vs1, 0, vd)
}

fn vadd_masked(vd: u32, vs2: u32, vs1: u32) -> u64 {
    opv(0, false, vs2, vs1, 0, vd)
}

fn vmul(vd: u32, vs2: u32, vs1: u32) -> u64 {
    opv(0b100101, true, vs2, vs1, 0b010, vd)
}

/// vle32.v vd, (rs1)
fn vle32(vd: u32, rs1: u32) -> u64 {
    u64::from(1 << 25 | rs1 << 15 | 0b110 << 12 | vd << 7 | 0x07)
}

/// vse32.v vs3, (rs1)
fn vse32(vs3: u32, rs1: u32) -> u64 {
    u64::from(1 << 25 | rs1 << 15 | 0b110 << 12 | vs3 << 7 | 0x27)
}

/// vsetvli x5, x10, e32,m1,ta,ma
const VSETVLI: u64 = 0x0d0572d7;
/// csrr x5, vl
const CSRR_VL: u64 = 0xc20022f3;

fn records(raw: &[u64]) -> Vec<Record> {
    raw.iter()
        .enumerate()
        .map(|(i, &r)| Record::new(i as u64, r))
        .collect()
}

fn params(vtype: u64) -> Parameters {
    Parameters {
        initial_vtype: Some(vtype),
        vlen: Some(128),
        ..Default::default()
    }
}

fn build(raw: &[u64]) -> ComputationalGraph {
    builder()
        .with_params(&params(0xd0))
        .build(&records(raw))
        .expect("Could not build graph")
}

fn triples(edges: &[Edge]) -> Vec<(NodeId, NodeId, Option<Location>)> {
    let mut triples: Vec<_> = edges
        .iter()
        .map(|e| (e.source, e.target, e.location))
        .collect();
    triples.sort();
    triples
}

/// A 3x repeated window of four instructions between two unique ones
fn looped() -> Vec<u64> {
    let mut raw = vec![VSETVLI];
    for _ in 0..3 {
        raw.extend([vle32(8, 10), vadd(12, 8, 4), vmul(16, 12, 12), vse32(16, 11)]);
    }
    raw.push(CSRR_VL);
    raw
}

#[test]
fn dense_ids() {
    let graph = build(&looped());
    let ids: Vec<_> = graph.nodes().iter().map(|n| n.id).collect();
    assert_eq!(ids, (0..14).collect::<Vec<_>>());
    assert_eq!(graph.node(2).map(Node::mnemonic), Some("vadd.vv"));
}

#[test]
fn producers_precede_consumers() {
    // vmacc.vv v8, v2, v4 reads its own destination
    let vmacc = opv(0b101101, true, 4, 2, 0b010, 8);
    let graph = build(&[vadd(8, 2, 4), vmacc, vmacc, vadd(1, 8, 8)]);
    assert!(graph.edges().iter().all(|e| e.source < e.target));
    assert_eq!(
        graph.edges(),
        &[
            Edge::raw(0, 1, Vector(8)),
            Edge::raw(1, 2, Vector(8)),
            Edge::raw(2, 3, Vector(8)),
        ]
    );
}

#[test]
fn write_then_read() {
    let graph = build(&[vadd(1, 2, 3), vadd(4, 1, 1)]);
    assert_eq!(graph.edges(), &[Edge::raw(0, 1, Vector(1))]);
    assert_eq!(graph.edges()[0].kind, EdgeKind::Raw);
    assert_eq!(graph.incoming(1).count(), 1);
}

#[test]
fn write_clears_previous() {
    let graph = build(&[vadd(1, 2, 3), vadd(1, 4, 5), vadd(6, 1, 1)]);
    assert_eq!(graph.edges(), &[Edge::raw(1, 2, Vector(1))]);
}

#[test]
fn masked_writes_accumulate() {
    let graph = build(&[
        vadd_masked(1, 2, 3),
        vadd_masked(1, 4, 5),
        vadd(6, 1, 1),
        vadd(1, 2, 3),
        vadd(7, 1, 1),
    ]);
    assert_eq!(
        graph.edges(),
        &[
            Edge::raw(0, 2, Vector(1)),
            Edge::raw(1, 2, Vector(1)),
            Edge::raw(3, 4, Vector(1)),
        ]
    );
}

#[test]
fn masked_write_after_full_write() {
    let graph = build(&[vadd(1, 2, 3), vadd_masked(1, 4, 5), vadd(6, 1, 1)]);
    assert_eq!(
        graph.edges(),
        &[Edge::raw(0, 2, Vector(1)), Edge::raw(1, 2, Vector(1))]
    );
}

#[test]
fn slide_up_keeps_destination() {
    // vslideup.vi v8, v4, 2
    let slide = opv(0b001110, true, 4, 2, 0b011, 8);
    let graph = build(&[vadd(8, 2, 3), slide, vadd(6, 8, 8)]);
    assert_eq!(
        graph.edges(),
        &[
            Edge::raw(0, 1, Vector(8)),
            Edge::raw(0, 2, Vector(8)),
            Edge::raw(1, 2, Vector(8)),
        ]
    );
}

#[test]
fn register_groups() {
    // e32,m4,ta,ma
    let graph = builder()
        .with_params(&params(0xd2))
        .build(&records(&[vadd(8, 16, 12), vadd(20, 8, 8), vadd(24, 12, 12)]))
        .expect("Could not build graph");
    let writes = &graph.nodes()[0].effect.writes;
    assert_eq!(writes, &[Vector(8), Vector(9), Vector(10), Vector(11)]);
    assert_eq!(
        triples(graph.edges()),
        vec![
            (0, 1, Some(Vector(8))),
            (0, 1, Some(Vector(9))),
            (0, 1, Some(Vector(10))),
            (0, 1, Some(Vector(11))),
        ]
    );
}

#[test]
fn misaligned_group() {
    // v10 is not aligned to a group of four
    let res = builder()
        .with_params(&params(0xd2))
        .build(&records(&[vadd(8, 16, 12), vadd(24, 10, 10)]));
    let err = res.expect_err("Built graph from misaligned group");
    assert_eq!(err.index, Some(1));
}

#[test]
fn configuration() {
    let graph = build(&[VSETVLI, vadd(1, 2, 3), CSRR_VL]);
    assert_eq!(
        triples(graph.edges()),
        vec![
            (0, 1, Some(Location::Vl)),
            (0, 1, Some(Location::Vtype)),
            (0, 2, Some(Location::Vl)),
        ]
    );
    let vsetvli = &graph.nodes()[0];
    assert_eq!(vsetvli.kind, Some(Type::Configuration));
    assert_eq!(vsetvli.vtype.map(u64::from), Some(0xd0));
    assert_eq!(graph.nodes()[2].kind, None);
}

#[test]
fn node_context() {
    let mut records = records(&[VSETVLI, vadd(1, 2, 3)]);
    records[0].vl = Some(4);
    records[0].pc = Some(0x8000_0000);
    records[1].kind = Some(1);
    let graph = builder().build(&records).expect("Could not build graph");
    let node = &graph.nodes()[1];
    assert_eq!(node.vl, Some(4));
    assert_eq!(node.vtype.map(u64::from), Some(0xd0));
    assert_eq!(node.kind, Some(Type::Register));
    assert_eq!(node.instruction, vadd(1, 2, 3));
    assert_eq!(graph.nodes()[0].pc, Some(0x8000_0000));
    assert_eq!(node.to_string(), "1: vadd.vv v1, v2, v3");
}

#[test]
fn sequence_numbers() {
    let mut records = records(&[vadd(1, 2, 3), vadd(4, 1, 1), vadd(5, 4, 4)]);
    records[1].number = None;
    assert!(builder().with_params(&params(0xd0)).build(&records).is_ok());

    records[2].number = Some(3);
    let err = builder()
        .with_params(&params(0xd0))
        .build(&records)
        .expect_err("Built graph with gap");
    assert_eq!(err.kind, Kind::MalformedTraceRecord("number"));
    assert_eq!(err.index, Some(3));
}

#[test]
fn error_index_from_position() {
    let mut records = records(&[vadd(1, 2, 3), 0x0000000b]);
    records[1].number = None;
    let err = builder()
        .with_params(&params(0xd0))
        .build(&records)
        .expect_err("Built graph from unsupported instruction");
    assert_eq!(err.index, Some(1));
    assert_eq!(err.raw, Some(0x0b));
    assert_eq!(err.kind, Kind::UnsupportedInstruction(0x0b));
}

#[test]
fn aggregate_window() {
    let graph = build(&looped());
    let aggregated = aggregate::aggregate(&graph);
    let nodes = aggregated.nodes();
    assert_eq!(nodes.len(), 3);

    assert!(nodes[0].is_singleton());
    assert_eq!(nodes[0].mnemonic, "vsetvli");
    assert_eq!(nodes[0].representative, 0);

    assert_eq!(nodes[1].repetitions, 3);
    assert_eq!(nodes[1].constituents, (1..13).collect::<Vec<_>>());
    assert_eq!(nodes[1].representative, 1);
    assert_eq!(nodes[1].effect.mnemonic, "vle32.v");
    assert_eq!(
        nodes[1].body,
        vec!["vle32.v", "vadd.vv", "vmul.vv", "vse32.v"]
    );
    assert_eq!(nodes[1].mnemonic, "[vle32.v; vadd.vv; vmul.vv; vse32.v] x3");

    assert_eq!(nodes[2].constituents, vec![13]);
    assert_eq!(nodes[2].id, 2);

    let mut all: Vec<_> = nodes.iter().flat_map(|n| n.constituents.clone()).collect();
    all.sort();
    assert_eq!(all, (0..14).collect::<Vec<_>>());

    assert_eq!(
        triples(aggregated.edges()),
        vec![
            (0, 1, Some(Location::Vl)),
            (0, 1, Some(Location::Vtype)),
            (0, 2, Some(Location::Vl)),
        ]
    );
    assert_eq!(aggregated.owner(7).map(|n| n.id), Some(1));
}

#[test]
fn aggregate_window_bound() {
    let graph = build(&looped());
    let aggregated = aggregate::aggregate_within(&graph, 3);
    assert_eq!(aggregated.nodes().len(), 14);
    assert!(aggregated.nodes().iter().all(aggregate::Node::is_singleton));
    assert_eq!(aggregated.edges().len(), graph.edges().len());
}

#[test]
fn aggregate_shape() {
    let (a, b) = (vadd(1, 2, 3), vmul(4, 1, 1));

    // vmul depends on the preceding vadd in both windows
    let aggregated = aggregate::aggregate(&build(&[a, b, a, b]));
    assert_eq!(aggregated.nodes().len(), 1);
    assert_eq!(aggregated.nodes()[0].repetitions, 2);
    assert!(aggregated.edges().is_empty());

    // Dependencies crossing window boundaries are not part of the shape
    let aggregated = aggregate::aggregate(&build(&[a, b, vadd(1, 4, 3), b]));
    assert_eq!(aggregated.nodes().len(), 1);

    // In the second window, vmul does not depend on vadd
    let aggregated = aggregate::aggregate(&build(&[a, b, a, vmul(4, 2, 2)]));
    assert_eq!(aggregated.nodes().len(), 4);
    assert_eq!(aggregated.edges(), &[Edge::raw(0, 1, Vector(1))]);
}

#[test]
fn aggregate_prefers_larger_later_run() {
    let (a, b) = (vadd(1, 2, 3), vmul(4, 5, 6));
    let graph = build(&[a, b, a, b, b, b, b, b]);
    assert!(graph.edges().is_empty());
    let aggregated = aggregate::aggregate(&graph);
    let constituents: Vec<_> = aggregated
        .nodes()
        .iter()
        .map(|n| n.constituents.clone())
        .collect();
    assert_eq!(
        constituents,
        vec![vec![0], vec![1], vec![2], vec![3, 4, 5, 6, 7]]
    );
    assert_eq!(aggregated.nodes()[3].mnemonic, "vmul.vv x5");
}

#[test]
fn aggregate_pc() {
    let body = [vadd(12, 8, 4), vmul(16, 12, 12)];
    let mut raw = vec![VSETVLI];
    (0..3).for_each(|_| raw.extend(body));
    let mut records = records(&raw);
    records[0].pc = Some(0x100);
    for (i, record) in records.iter_mut().enumerate().skip(1) {
        record.pc = Some(0x104 + 4 * ((i as u64 - 1) % 2));
    }
    let graph = builder()
        .with_params(&params(0xd0))
        .build(&records)
        .expect("Could not build graph");

    let aggregated = aggregate::aggregate_by_pc(&graph);
    let nodes = aggregated.nodes();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[1].constituents, vec![1, 3, 5]);
    assert_eq!(nodes[1].repetitions, 3);
    assert_eq!(nodes[1].mnemonic, "vadd.vv x3");
    assert_eq!(nodes[2].constituents, vec![2, 4, 6]);
    assert_eq!(
        triples(aggregated.edges()),
        vec![
            (0, 1, Some(Location::Vl)),
            (0, 1, Some(Location::Vtype)),
            (0, 2, Some(Location::Vl)),
            (0, 2, Some(Location::Vtype)),
            (1, 2, Some(Vector(12))),
        ]
    );
}

#[test]
fn execution_order() {
    let graph = build(&looped());
    let execution = ExecutionGraph::from(&graph);
    assert_eq!(execution.nodes().len(), 14);
    assert_eq!(
        execution.edges().len(),
        graph.edges().len() + graph.nodes().len() - 1
    );
    let sequential: Vec<_> = execution
        .sequential()
        .map(|e| (e.source, e.target, e.location))
        .collect();
    let expected: Vec<_> = (0..13).map(|i| (i, i + 1, None)).collect();
    assert_eq!(sequential, expected);
    assert!(
        graph
            .edges()
            .iter()
            .all(|e| execution.edges().contains(e))
    );
}

#[test]
fn execution_custom_order() {
    let graph = build(&[vadd(1, 2, 3), vadd(4, 1, 1), vadd(5, 2, 3)]);
    let execution = build_execution_view(&graph, &[0, 2, 1, 7]);
    let ids: Vec<_> = execution.nodes().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![0, 2, 1]);
    assert_eq!(
        execution.edges(),
        &[
            Edge::raw(0, 1, Vector(1)),
            Edge::sequential(0, 2),
            Edge::sequential(2, 1),
        ]
    );
}

#[test]
fn selection() {
    let records = records(&looped());
    let graphs = build_graphs(&records, &params(0xd0), Default::default())
        .expect("Could not build graphs");
    assert_eq!(graphs.computational.map(|g| g.nodes().len()), Some(14));
    assert_eq!(graphs.aggregated.map(|g| g.nodes().len()), Some(3));
    assert_eq!(graphs.execution.map(|g| g.nodes().len()), Some(14));

    let selection = Selection {
        computational: false,
        aggregated: true,
        execution: false,
    };
    let params = Parameters {
        aggregation: Aggregation::Pc,
        ..params(0xd0)
    };
    let graphs = build_graphs(&records, &params, selection).expect("Could not build graphs");
    assert!(graphs.computational.is_none());
    assert!(graphs.execution.is_none());
    // No record carries a pc, so nothing is merged
    assert_eq!(graphs.aggregated.map(|g| g.nodes().len()), Some(14));
}
