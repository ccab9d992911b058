use std::collections::{BTreeMap, BTreeSet, HashMap};

use dhc_core::errors::{DhcError, ErrorInfo};
use dhc_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// An undirected hyperedge: an ordered tuple of node identifiers.
///
/// The trace source canonicalizes endpoints by sorting them ascending; the
/// substrate treats the tuple verbatim. Equality and hashing are element-wise
/// over the full sequence, so two edges over the same nodes in a different
/// order are distinct values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hyperedge(Vec<NodeId>);

impl Hyperedge {
    /// Creates a hyperedge from its endpoint tuple.
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self(nodes)
    }

    /// Creates a hyperedge from raw node identifiers.
    pub fn from_raw(nodes: &[u64]) -> Self {
        Self(nodes.iter().copied().map(NodeId::from_raw).collect())
    }

    /// Returns the endpoint tuple.
    pub fn nodes(&self) -> &[NodeId] {
        &self.0
    }

    /// Returns the number of endpoints.
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the edge has no endpoints.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.0.iter().map(|id| id.as_raw().to_string()).collect();
        parts.join(" ")
    }
}

impl From<Vec<NodeId>> for Hyperedge {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self(nodes)
    }
}

/// Hypergraph substrate with stable edge identifiers.
///
/// Hyperedges live in a pool indexed by [`EdgeId`]; deletion tombstones the
/// slot without compacting, so identifiers stay valid as visitation keys for
/// the whole run. A value-to-identifier multimap supports duplicate identical
/// edges, and a per-node incidence index tracks the live edges touching each
/// node. A node stays known (with an empty incidence set) once seen.
#[derive(Debug, Clone, Default)]
pub struct Hypergraph {
    edge_pool: Vec<Option<Hyperedge>>,
    edge_ids: HashMap<Hyperedge, Vec<EdgeId>>,
    incidence: BTreeMap<NodeId, BTreeSet<EdgeId>>,
    live_edges: usize,
}

impl Hypergraph {
    /// Creates an empty substrate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a hyperedge and returns its freshly assigned identifier.
    pub fn insert(&mut self, edge: Hyperedge) -> EdgeId {
        let id = EdgeId::from_raw(self.edge_pool.len() as u64);
        for node in edge.nodes() {
            self.incidence.entry(*node).or_default().insert(id);
        }
        self.edge_ids.entry(edge.clone()).or_default().push(id);
        self.edge_pool.push(Some(edge));
        self.live_edges += 1;
        id
    }

    /// Deletes one live hyperedge with the given endpoint tuple.
    ///
    /// When several identical edges are live, an arbitrary one of them is
    /// removed. Returns the identifier of the removed edge.
    pub fn delete(&mut self, edge: &Hyperedge) -> Result<EdgeId, DhcError> {
        let ids = self.edge_ids.get_mut(edge).ok_or_else(|| {
            graph_error("unknown-edge", "hyperedge is not live")
                .with_context("edge", edge.describe())
        })?;
        let id = ids.pop().expect("multimap entries are never empty");
        if ids.is_empty() {
            self.edge_ids.remove(edge);
        }
        for node in edge.nodes() {
            if let Some(set) = self.incidence.get_mut(node) {
                set.remove(&id);
            }
        }
        self.edge_pool[id.as_raw() as usize] = None;
        self.live_edges -= 1;
        Ok(id)
    }

    /// Returns the endpoints of a live edge, or `None` for tombstoned slots
    /// and out-of-range identifiers.
    pub fn edge(&self, id: EdgeId) -> Option<&Hyperedge> {
        self.edge_pool.get(id.as_raw() as usize)?.as_ref()
    }

    /// Returns whether at least one live edge has the given endpoint tuple.
    pub fn contains(&self, edge: &Hyperedge) -> bool {
        self.edge_ids.contains_key(edge)
    }

    /// Iterates over the identifiers of live edges incident to `node`.
    ///
    /// Unknown nodes yield an empty iterator; the read never materializes
    /// state.
    pub fn incident(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.incidence.get(&node).into_iter().flatten().copied()
    }

    /// Returns the number of live edges incident to `node`.
    pub fn degree(&self, node: NodeId) -> usize {
        self.incidence.get(&node).map_or(0, BTreeSet::len)
    }

    /// Iterates over every known node in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.incidence.keys().copied()
    }

    /// Iterates over `(node, degree)` for every known node.
    pub fn node_degrees(&self) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        self.incidence.iter().map(|(node, set)| (*node, set.len()))
    }

    /// Returns the number of known nodes.
    pub fn node_count(&self) -> usize {
        self.incidence.len()
    }

    /// Iterates over `(id, edge)` for every live edge in pool order.
    pub fn edge_entries(&self) -> impl Iterator<Item = (EdgeId, &Hyperedge)> + '_ {
        self.edge_pool.iter().enumerate().filter_map(|(idx, slot)| {
            slot.as_ref()
                .map(|edge| (EdgeId::from_raw(idx as u64), edge))
        })
    }

    /// Returns the number of live edges.
    pub fn live_edge_count(&self) -> usize {
        self.live_edges
    }

    /// Returns the identifier the next insertion will receive.
    pub fn next_edge_id(&self) -> EdgeId {
        EdgeId::from_raw(self.edge_pool.len() as u64)
    }

    pub(crate) fn slots(&self) -> &[Option<Hyperedge>] {
        &self.edge_pool
    }

    pub(crate) fn touch_node(&mut self, node: NodeId) {
        self.incidence.entry(node).or_default();
    }

    pub(crate) fn from_slots(slots: Vec<Option<Hyperedge>>) -> Self {
        let mut graph = Self::new();
        for slot in slots {
            match slot {
                Some(edge) => {
                    graph.insert(edge);
                }
                None => graph.edge_pool.push(None),
            }
        }
        graph
    }
}

pub(crate) fn graph_error(code: impl Into<String>, message: impl Into<String>) -> DhcError {
    DhcError::Graph(ErrorInfo::new(code, message))
}

pub(crate) trait ContextExt {
    fn with_context(self, key: impl Into<String>, value: impl ToString) -> DhcError;
}

impl ContextExt for DhcError {
    fn with_context(self, key: impl Into<String>, value: impl ToString) -> DhcError {
        match self {
            DhcError::Graph(info) => DhcError::Graph(info.with_context(key, value.to_string())),
            other => other,
        }
    }
}
