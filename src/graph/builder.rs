// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Construction of computational graphs

use crate::config::Parameters;
use crate::decode::{Context, Error, Kind, decode};
use crate::trace::Record;
use crate::tracker::Tracker;

use super::{ComputationalGraph, Edge, Node};

/// Create a new [`Builder`] for [`ComputationalGraph`]s
pub fn builder() -> Builder {
    Default::default()
}

/// Builder for [`ComputationalGraph`]s
///
/// A builder holds the initial decoding [`Context`]. It may be used for
/// building any number of graphs, each starting from that context.
#[derive(Copy, Clone, Debug, Default)]
pub struct Builder {
    context: Context,
}

impl Builder {
    /// Create a new builder
    pub fn new() -> Self {
        Default::default()
    }

    /// Build graphs with the given [`Parameters`]
    ///
    /// New builders assume [`Default`] parameters.
    pub fn with_params(self, params: &Parameters) -> Self {
        Self {
            context: Context::new().with_params(params),
        }
    }

    /// Build a [`ComputationalGraph`] from records in trace order
    ///
    /// Records are processed exactly once. Sequence numbers, if present, must
    /// equal the record's position in the trace. Records lacking a sequence
    /// number are assigned their position.
    ///
    /// Each record's reads are resolved before its writes are recorded, so an
    /// instruction reading and writing the same location depends on the
    /// previous writer rather than on itself.
    pub fn build(self, records: &[Record]) -> Result<ComputationalGraph, Error> {
        let mut ctx = self.context;
        let mut tracker = Tracker::new();
        let mut nodes = Vec::with_capacity(records.len());
        let mut edges = Vec::new();

        for (id, record) in records.iter().enumerate() {
            let index = id as u64;
            if record.number.is_some_and(|n| n != index) {
                return Err(Error::new(
                    record.number,
                    record.instruction,
                    Kind::MalformedTraceRecord("number"),
                ));
            }
            let effect = decode(record, &mut ctx)
                .map_err(|e| Error::new(Some(index), e.raw, e.kind))?;

            let first = edges.len();
            for &location in &effect.reads {
                let producers = tracker.resolve_read(location);
                edges.extend(producers.iter().map(|&p| Edge::raw(p, id, location)));
            }
            for &location in &effect.writes {
                tracker.record_write(location, id, effect.masked && location.is_vector());
            }
            tracing::trace!(
                index,
                pc = ?record.pc,
                edges = edges.len() - first,
                masked = effect.masked,
                "{effect}"
            );

            let kind = record
                .record_type()
                .or_else(|| effect.class.record_type());
            nodes.push(Node {
                id,
                pc: record.pc,
                instruction: record.instruction.unwrap_or_default(),
                kind,
                effect,
                vl: ctx.vl,
                vtype: ctx.vtype,
                values: record.into(),
            });
        }

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            "built computational graph"
        );
        Ok(ComputationalGraph::from_parts(nodes, edges))
    }
}
