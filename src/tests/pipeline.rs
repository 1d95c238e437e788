// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Tests from JSON traces to exported graphs

use crate::config::{Aggregation, Parameters};
use crate::decode::Kind;
use crate::graph::{self, EdgeKind, Selection};
use crate::location::Location;
use crate::{export, trace};

/// A vector loop adding two arrays, as a tracer would emit it
///
/// ```text
/// 0x100: vsetvli x5, x10, e32,m2,ta,ma
/// 0x104: vle32.v v8, (x11)
/// 0x108: vle32.v v12, (x12)
/// 0x10c: vadd.vv v16, v8, v12
/// 0x110: vse32.v v16, (x13)
/// 0x114: sub x10, x10, x5
/// ```
fn loop_trace(iterations: usize) -> String {
    let body = [
        (0x100, "0x0d1572d7", Some(2)),
        (0x104, "0x0205e407", Some(3)),
        (0x108, "0x02066607", Some(3)),
        (0x10c, "0x02860857", Some(1)),
        (0x110, "0x0206e827", Some(3)),
        (0x114, "0x40550533", None),
    ];
    let records: Vec<_> = (0..iterations)
        .flat_map(|_| body)
        .enumerate()
        .map(|(number, (pc, insn, kind))| {
            let mut record = serde_json::json!({
                "number": number,
                "pc": format!("{pc:#x}"),
                "instruction": insn,
                "vlenb": 16,
            });
            if let Some(kind) = kind {
                record["type"] = kind.into();
            }
            if kind == Some(2) {
                record["vl"] = 8.into();
                record["vtype"] = "0xd1".into();
            }
            record
        })
        .collect();
    serde_json::to_string(&records).expect("Could not serialize trace")
}

#[test]
fn computational() {
    let records = trace::from_slice(loop_trace(2).as_bytes()).expect("Could not parse trace");
    assert_eq!(records.len(), 12);

    let graph = graph::builder()
        .build(&records)
        .expect("Could not build graph");
    let nodes = graph.nodes();
    assert_eq!(nodes.len(), 12);
    assert_eq!(nodes[3].mnemonic(), "vadd.vv");
    assert_eq!(nodes[3].vl, Some(8));
    assert!(graph.edges().iter().all(|e| e.source < e.target));

    let into_vadd: Vec<_> = graph
        .incoming(3)
        .filter_map(|e| e.location.map(|l| (e.source, l)))
        .collect();
    assert_eq!(
        into_vadd,
        vec![
            (2, Location::Vector(12)),
            (2, Location::Vector(13)),
            (1, Location::Vector(8)),
            (1, Location::Vector(9)),
            (0, Location::Vl),
            (0, Location::Vtype),
        ]
    );

    // The second vsetvli depends on the sub of the first iteration
    assert!(
        graph
            .incoming(6)
            .any(|e| e.source == 5 && e.location == Some(Location::Scalar(10)))
    );
    // and the sub on the vsetvli's vl
    assert!(
        graph
            .incoming(5)
            .any(|e| e.source == 0 && e.location == Some(Location::Scalar(5)))
    );
}

#[test]
fn all_graphs() {
    let records = trace::from_slice(loop_trace(4).as_bytes()).expect("Could not parse trace");
    let graphs = graph::build_graphs(&records, &Default::default(), Selection::default())
        .expect("Could not build graphs");

    let computational = graphs.computational.expect("No computational graph");
    let aggregated = graphs.aggregated.expect("No aggregated graph");
    let execution = graphs.execution.expect("No execution graph");

    assert_eq!(aggregated.nodes().len(), 1);
    let run = &aggregated.nodes()[0];
    assert_eq!(run.repetitions, 4);
    assert_eq!(run.constituents.len(), 24);
    assert!(aggregated.edges().is_empty());

    let sequential = execution
        .edges()
        .iter()
        .filter(|e| e.kind == EdgeKind::Sequential)
        .count();
    assert_eq!(sequential, 23);
    assert_eq!(
        execution.edges().len(),
        computational.edges().len() + sequential
    );
}

#[test]
fn aggregate_by_pc() {
    let records = trace::from_slice(loop_trace(3).as_bytes()).expect("Could not parse trace");
    let params = Parameters {
        aggregation: Aggregation::Pc,
        ..Default::default()
    };
    let selection = Selection {
        computational: false,
        aggregated: true,
        execution: false,
    };
    let graphs = graph::build_graphs(&records, &params, selection).expect("Could not build graphs");
    let aggregated = graphs.aggregated.expect("No aggregated graph");
    assert_eq!(aggregated.nodes().len(), 6);
    assert!(aggregated.nodes().iter().all(|n| n.repetitions == 3));
    // sub -> vsetvli crosses iterations, but is kept between distinct nodes
    assert!(
        aggregated
            .edges()
            .iter()
            .any(|e| e.source == 5 && e.target == 0 && e.location == Some(Location::Scalar(10)))
    );
}

#[test]
fn export_round_trip() {
    let records = trace::from_slice(loop_trace(2).as_bytes()).expect("Could not parse trace");
    let graph = graph::builder()
        .build(&records)
        .expect("Could not build graph");

    let mut buf = Vec::new();
    export::write_computational(&graph, &mut buf).expect("Could not write graph");
    let read = export::read_computational(buf.as_slice()).expect("Could not read graph");
    assert_eq!(read.nodes(), graph.nodes());
    assert_eq!(read.edges(), graph.edges());

    let execution = graph::ExecutionGraph::from(&graph);
    let mut buf = Vec::new();
    export::write_execution(&execution, &mut buf).expect("Could not write graph");
    let read = export::read_execution(buf.as_slice()).expect("Could not read graph");
    assert_eq!(read, execution);
}

#[test]
fn malformed_trace() {
    let records = trace::from_slice(
        br#"[
            {"number": 0, "instruction": "0x0d1572d7"},
            {"number": 1},
            {"number": 2, "instruction": "0x02860857"}
        ]"#,
    )
    .expect("Could not parse trace");
    let err = graph::builder()
        .build(&records)
        .expect_err("Built graph from malformed trace");
    assert_eq!(err.index, Some(1));
    assert_eq!(err.kind, Kind::MalformedTraceRecord("instruction"));
}

#[test]
fn snapshot_mismatch() {
    let records = trace::from_slice(
        br#"[
            {"number": 0, "instruction": "0x0d1572d7", "vtype": "0xd1"},
            {"number": 1, "instruction": "0x02860857", "vtype": "0xd0"}
        ]"#,
    )
    .expect("Could not parse trace");
    let err = graph::builder()
        .build(&records)
        .expect_err("Built graph despite vtype mismatch");
    assert_eq!(err.index, Some(1));
    assert!(matches!(err.kind, Kind::InconsistentState(_)));
    assert_eq!(err.to_string().split(':').next(), Some("record 1 (0x02860857)"));
}
