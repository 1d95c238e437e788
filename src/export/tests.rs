// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
use super::*;

use crate::graph;
use crate::trace::Record;

fn sample() -> ComputationalGraph {
    let raw = [
        // vsetvli x5, x10, e32,m4,ta,ma
        0x0d2572d7,
        // vle32.v v8, (x10)
        0x02056407,
        // vadd.vv v8, v8, v4, v0.t
        0x00820457,
        // vadd.vv v8, v8, v4, v0.t
        0x00820457,
        // csrr x5, vl
        0xc20022f3,
    ];
    let mut records: Vec<_> = raw
        .iter()
        .enumerate()
        .map(|(i, &r)| Record::new(i as u64, r))
        .collect();
    records[0].pc = Some(0x8000_0000);
    records[0].vl = Some(16);
    records[1].kind = Some(3);
    records[1].rs1_value = Some(0x8000_1000);
    records[1].vd_data = Some("0x00000001000000020000000300000004".into());
    records[1].vstart = Some(0);
    records[1].vcsr = Some(0);
    graph::builder()
        .build(&records)
        .expect("Could not build graph")
}

fn to_json(write: impl FnOnce(&mut Vec<u8>) -> Result<(), Error>) -> serde_json::Value {
    let mut buf = Vec::new();
    write(&mut buf).expect("Could not write graph");
    serde_json::from_slice(&buf).expect("Could not parse output")
}

#[test]
fn computational_round_trip() {
    let graph = sample();
    let mut buf = Vec::new();
    write_computational(&graph, &mut buf).expect("Could not write graph");
    let read = read_computational(buf.as_slice()).expect("Could not read graph");
    assert_eq!(read, graph);
    assert_eq!(read.nodes()[1].values.rs1_value, Some(0x8000_1000));
}

#[test]
fn execution_round_trip() {
    let graph = ExecutionGraph::from(&sample());
    let mut buf = Vec::new();
    write_execution(&graph, &mut buf).expect("Could not write graph");
    let read = read_execution(buf.as_slice()).expect("Could not read graph");
    assert_eq!(read, graph);
    assert_eq!(read.sequential().count(), 4);
}

#[test]
fn node_schema() {
    let value = to_json(|buf| write_computational(&sample(), buf));
    let elements = value["elements"].as_array().expect("No element list");
    let vsetvli = &elements[0]["data"];
    assert_eq!(vsetvli["id"], "0");
    assert_eq!(vsetvli["mnemonic"], "vsetvli");
    assert_eq!(vsetvli["operands"], "x5, x10, e32,m4,ta,ma");
    assert_eq!(vsetvli["pc"], "0x80000000");
    assert_eq!(vsetvli["instruction"], "0xd2572d7");
    assert_eq!(vsetvli["class"], "configuration");
    assert_eq!(vsetvli["type"], 2);
    assert_eq!(vsetvli["vl"], 16);
    assert_eq!(vsetvli["vtype"], "0xd2");
    assert_eq!(vsetvli["writes"], serde_json::json!(["vl", "vtype", "x5"]));

    assert!(vsetvli.get("values").is_none());

    let vle = &elements[1]["data"];
    assert_eq!(
        vle["values"],
        serde_json::json!({
            "rs1_value": "0x80001000",
            "vd_data": "0x00000001000000020000000300000004",
            "vstart": 0,
            "vcsr": "0x0",
        })
    );

    let vadd = &elements[2]["data"];
    assert_eq!(vadd["class"], "arithmetic");
    assert_eq!(vadd["masked"], true);
    assert_eq!(vadd["operands"], "v8, v8, v4, v0.t");

    let edge = &elements[5]["data"];
    assert_eq!(edge["id"], "e0");
    assert_eq!(edge["source"], "0");
    assert_eq!(edge["target"], "1");
    assert_eq!(edge["kind"], "raw");
}

#[test]
fn sequential_edges() {
    let value = to_json(|buf| write_execution(&ExecutionGraph::from(&sample()), buf));
    let elements = value["elements"].as_array().expect("No element list");
    let sequential: Vec<_> = elements
        .iter()
        .map(|e| &e["data"])
        .filter(|d| d["kind"] == "sequential")
        .collect();
    assert_eq!(sequential.len(), 4);
    assert!(sequential.iter().all(|d| d.get("location").is_none()));
}

#[test]
fn aggregated_schema() {
    let aggregated = graph::aggregate::aggregate(&sample());
    let value = to_json(|buf| write_aggregated(&aggregated, buf));
    let elements = value["elements"].as_array().expect("No element list");
    let nodes: Vec<_> = elements
        .iter()
        .map(|e| &e["data"])
        .filter(|d| d.get("source").is_none())
        .collect();
    assert_eq!(nodes.len(), 4);
    let run = nodes[2];
    assert_eq!(run["mnemonic"], "vadd.vv x2");
    assert_eq!(run["repetitions"], 2);
    assert_eq!(run["constituents"], serde_json::json!([2, 3]));
    assert_eq!(run["representative"], "2");
    assert_eq!(run["body"], serde_json::json!(["vadd.vv"]));
}

#[test]
fn invalid_documents() {
    let read = |doc: &str| read_computational(doc.as_bytes());

    assert!(matches!(read("[]"), Err(Error::Json(_))));
    assert!(matches!(read(r#"{"elements": []}"#), Ok(g) if g.nodes().is_empty()));

    let node = |id: &str| {
        format!(r#"{{"data": {{"id": "{id}", "mnemonic": "add", "instruction": "0x33", "class": "scalar"}}}}"#)
    };
    let gap = format!(r#"{{"elements": [{}, {}]}}"#, node("0"), node("2"));
    assert!(matches!(read(&gap), Err(Error::Schema(_))));

    let duplicate = format!(r#"{{"elements": [{}, {}]}}"#, node("0"), node("0"));
    assert!(matches!(read(&duplicate), Err(Error::Schema(_))));

    let edge = |source: &str, target: &str, kind: &str| {
        format!(
            r#"{{"data": {{"id": "e0", "source": "{source}", "target": "{target}", "location": "x1", "kind": "{kind}"}}}}"#
        )
    };
    let dangling = format!(
        r#"{{"elements": [{}, {}, {}]}}"#,
        node("0"),
        node("1"),
        edge("0", "2", "raw")
    );
    assert!(matches!(read(&dangling), Err(Error::Schema(_))));

    let backwards = format!(
        r#"{{"elements": [{}, {}, {}]}}"#,
        node("0"),
        node("1"),
        edge("1", "0", "raw")
    );
    assert!(matches!(read(&backwards), Err(Error::Schema(_))));

    let sequential = format!(
        r#"{{"elements": [{}, {}, {}]}}"#,
        node("0"),
        node("1"),
        edge("0", "1", "sequential")
    );
    assert!(matches!(read(&sequential), Err(Error::Schema(_))));
    assert!(read_execution(sequential.as_bytes()).is_ok());

    let valid = format!(
        r#"{{"elements": [{}, {}, {}]}}"#,
        node("0"),
        node("1"),
        edge("0", "1", "raw")
    );
    let graph = read(&valid).expect("Could not read graph");
    assert_eq!(graph.edges(), &[Edge::raw(0, 1, Location::Scalar(1))]);
}
