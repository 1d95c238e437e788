// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Dependency graph generator
//!
//!     Usage: graphs [OPTIONS] <trace>
//!
//! This program reads a trace in the form of a JSON array of retired
//! instructions and writes the computational, aggregated and execution
//! graphs as Cytoscape-style JSON files next to the trace or into the
//! directory given via `--output`. Optionally, parameters may be supplied in
//! the form of a TOML file (such as `params.toml` in this directory).
//!
//! Log output is controlled through the `RUST_LOG` environment variable.

use std::path::{Path, PathBuf};

use rvv_depgraph::config::{self, Parameters};
use rvv_depgraph::{export, graph, trace};

fn main() {
    let matches = clap::Command::new("Dependency graph generator")
        .arg(clap::arg!(<trace> "Path to the JSON trace").value_parser(clap::value_parser!(PathBuf)))
        .arg(
            clap::arg!(-o --output <DIR> "Output directory")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            clap::arg!(-p --params <FILE> "Analysis parameters")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            clap::arg!(--vlen <BITS> "Width of a vector register")
                .env("VLEN")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            clap::arg!(--"by-pc" "Aggregate by program counter").action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::arg!(--"no-computational" "Do not write the computational graph")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::arg!(--"no-aggregated" "Do not write the aggregated graph")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::arg!(--"no-execution" "Do not write the execution graph")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let input = matches
        .get_one::<PathBuf>("trace")
        .expect("No trace file specified");
    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trace".into());

    // Parameters from the file may be overridden on the command line
    let mut params: Parameters = matches
        .get_one::<PathBuf>("params")
        .map(|p| {
            let params = std::fs::read_to_string(p).expect("Could not load parameters");
            toml::from_str(params.as_ref()).expect("Could not parse parameters")
        })
        .unwrap_or_default();
    if let Some(vlen) = matches.get_one::<u32>("vlen") {
        params.vlen = Some(*vlen);
    }
    if matches.get_flag("by-pc") {
        params.aggregation = config::Aggregation::Pc;
    }
    tracing::debug!(?params, "parameters");

    let selection = graph::Selection {
        computational: !matches.get_flag("no-computational"),
        aggregated: !matches.get_flag("no-aggregated"),
        execution: !matches.get_flag("no-execution"),
    };

    let file = std::fs::File::open(input).expect("Could not open trace file");
    let records =
        trace::from_reader(std::io::BufReader::new(file)).expect("Could not parse trace file");
    tracing::info!(records = records.len(), "read trace");

    let graphs = graph::build_graphs(&records, &params, selection).unwrap_or_else(|e| {
        tracing::error!("{e}");
        std::process::exit(1)
    });

    let create = |kind: &str| {
        let path = output.join(format!("{stem}.{kind}.json"));
        tracing::info!(path = %path.display(), "writing {kind} graph");
        let file = std::fs::File::create(path).expect("Could not create output file");
        std::io::BufWriter::new(file)
    };
    if let Some(graph) = graphs.computational {
        export::write_computational(&graph, create("computational"))
            .expect("Could not write computational graph");
    }
    if let Some(graph) = graphs.aggregated {
        export::write_aggregated(&graph, create("aggregated"))
            .expect("Could not write aggregated graph");
    }
    if let Some(graph) = graphs.execution {
        export::write_execution(&graph, create("execution"))
            .expect("Could not write execution graph");
    }
}
