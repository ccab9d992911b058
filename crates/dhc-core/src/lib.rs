#![deny(missing_docs)]

//! Core identifiers, contracts and shared state for the dhc engines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod rng;

pub use errors::{DhcError, ErrorInfo};
pub use rng::{derive_substream_seed, RngHandle};

/// Identifier for a node of the hypergraph.
///
/// Nodes are created implicitly the first time they appear in an insertion
/// and are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

/// Identifier for a hyperedge slot within the substrate's edge pool.
///
/// Edge identifiers are assigned monotonically and stay stable for the
/// lifetime of the substrate; deleted slots are tombstoned, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(u64);

impl EdgeId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

/// Core-number assignment for the known nodes.
///
/// Reads of unknown nodes yield 0 without materializing an entry, so lookups
/// during a traversal never mutate the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreMap {
    labels: BTreeMap<NodeId, u32>,
}

impl CoreMap {
    /// Creates an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the core number of `node`, defaulting to 0 for unknown nodes.
    pub fn get(&self, node: NodeId) -> u32 {
        self.labels.get(&node).copied().unwrap_or(0)
    }

    /// Sets the core number of `node`.
    pub fn set(&mut self, node: NodeId, value: u32) {
        self.labels.insert(node, value);
    }

    /// Raises the core number of `node` by one.
    pub fn increment(&mut self, node: NodeId) {
        *self.labels.entry(node).or_insert(0) += 1;
    }

    /// Lowers the core number of `node` by one.
    pub fn decrement(&mut self, node: NodeId) {
        let entry = self.labels.entry(node).or_insert(0);
        debug_assert!(*entry > 0, "core number underflow");
        *entry = entry.saturating_sub(1);
    }

    /// Iterates over the known `(node, core)` entries in node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, u32)> + '_ {
        self.labels.iter().map(|(node, core)| (*node, *core))
    }

    /// Returns the number of known entries.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns whether the assignment is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl FromIterator<(NodeId, u32)> for CoreMap {
    fn from_iter<I: IntoIterator<Item = (NodeId, u32)>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}

/// Contract implemented by every dynamic maintenance engine.
///
/// An engine owns its substrate and auxiliary state exclusively; an update is
/// processed atomically, and queries read the reconciled state.
pub trait CoreMaintenance {
    /// Applies a hyperedge insertion and reconciles the auxiliary state.
    fn insert_edge(&mut self, nodes: &[NodeId]) -> Result<(), DhcError>;

    /// Applies a hyperedge deletion and reconciles the auxiliary state.
    ///
    /// Engines without deletion support report `deletion-unsupported`.
    fn delete_edge(&mut self, nodes: &[NodeId]) -> Result<(), DhcError>;

    /// Returns the engine's current core value for `node`.
    ///
    /// Exact engines return the core number; the approximate engine returns
    /// its threshold estimate.
    fn core_of(&self, node: NodeId) -> u32;
}
