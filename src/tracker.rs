// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Register state tracking
//!
//! The [`Tracker`] keeps, for every [`Location`], the set of nodes whose
//! writes may still be observed by a subsequent read.

use crate::graph::NodeId;
use crate::location::Location;

/// Last-writer map
///
/// An unmasked write supersedes all previous writers of a location. A masked
/// write may leave parts of the location untouched and is therefore added to
/// the set of live writers instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tracker {
    live: Vec<Vec<NodeId>>,
}

impl Tracker {
    /// Create a tracker without any recorded writes
    pub fn new() -> Self {
        Self {
            live: vec![Vec::new(); Location::COUNT],
        }
    }

    /// Record a write of `location` by `node`
    pub fn record_write(&mut self, location: Location, node: NodeId, masked: bool) {
        let writers = &mut self.live[location.index()];
        if !masked {
            writers.clear();
        }
        if !writers.contains(&node) {
            writers.push(node);
        }
    }

    /// Retrieve all live writers of `location`
    ///
    /// Writers are returned in the order they were recorded. The slice is
    /// empty if the location was never written.
    pub fn resolve_read(&self, location: Location) -> &[NodeId] {
        &self.live[location.index()]
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}
