//! Exact fully-dynamic core maintenance with XY-prune color propagation.

use std::collections::{BTreeSet, HashSet};

use dhc_core::errors::{DhcError, ErrorInfo};
use dhc_core::{CoreMap, CoreMaintenance, EdgeId, NodeId};
use dhc_graph::{Hyperedge, Hypergraph};

/// Fully dynamic exact engine.
///
/// On every update only the nodes whose core numbers may change are visited:
/// a pruned color propagation collects a candidate superset, and a recolor
/// fixpoint trims it down to the nodes that actually move. Both operations
/// leave the core map equal to a from-scratch decomposition of the mutated
/// substrate.
#[derive(Debug, Default)]
pub struct ExactEngine {
    graph: Hypergraph,
    cores: CoreMap,
    candidates: BTreeSet<NodeId>,
    demoted: BTreeSet<NodeId>,
    visited: HashSet<EdgeId>,
    new_edge: Option<EdgeId>,
}

impl ExactEngine {
    /// Creates an engine over an empty substrate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the maintained substrate.
    pub fn graph(&self) -> &Hypergraph {
        &self.graph
    }

    /// Returns the maintained core numbers.
    pub fn cores(&self) -> &CoreMap {
        &self.cores
    }

    fn insert(&mut self, nodes: &[NodeId]) -> Result<(), DhcError> {
        if nodes.is_empty() {
            return Err(empty_edge());
        }
        let id = self.graph.insert(Hyperedge::new(nodes.to_vec()));
        self.new_edge = Some(id);
        self.visited.clear();
        self.candidates.clear();

        let val = nodes
            .iter()
            .map(|node| self.cores.get(*node))
            .min()
            .expect("edge has endpoints");

        // Color propagation from the minimum-core endpoints. The recursion of
        // the textbook formulation has no post-order action, so an explicit
        // work stack visits the same candidate set without unbounded call
        // depth.
        let mut stack: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|node| self.cores.get(*node) == val)
            .collect();
        while let Some(node) = stack.pop() {
            if self.candidates.contains(&node) {
                continue;
            }
            let (x, y) = self.insert_counts(node, val);
            if x > val {
                self.candidates.insert(node);
                if y < val {
                    self.expand(node, val, &mut stack);
                }
            }
        }

        self.recolor_insert(val);
        let promoted = std::mem::take(&mut self.candidates);
        log::debug!(
            "insert arity={} val={} promoted={}",
            nodes.len(),
            val,
            promoted.len()
        );
        for node in promoted {
            self.cores.increment(node);
        }
        Ok(())
    }

    fn delete(&mut self, nodes: &[NodeId]) -> Result<(), DhcError> {
        if nodes.is_empty() {
            return Err(empty_edge());
        }
        self.graph.delete(&Hyperedge::new(nodes.to_vec()))?;
        self.new_edge = None;
        self.visited.clear();
        self.candidates.clear();
        self.demoted.clear();

        let val = nodes
            .iter()
            .map(|node| self.cores.get(*node))
            .min()
            .expect("edge has endpoints");

        let mut stack = Vec::new();
        for node in nodes {
            if self.cores.get(*node) != val {
                continue;
            }
            let x = self.supported_edges(*node, val);
            if x < val {
                stack.push(*node);
            }
        }
        while let Some(node) = stack.pop() {
            if !self.candidates.insert(node) {
                continue;
            }
            let y = self.strictly_supported_edges(node, val);
            if y < val {
                self.expand(node, val, &mut stack);
            }
        }

        self.recolor_delete(val);
        let demoted = std::mem::take(&mut self.demoted);
        log::debug!(
            "delete arity={} val={} demoted={}",
            nodes.len(),
            val,
            demoted.len()
        );
        for node in demoted {
            self.cores.decrement(node);
        }
        Ok(())
    }

    /// Counts for the insertion prune: `x` is the number of incident edges
    /// whose minimum core over the other endpoints is at least `val`, `y`
    /// the number where that minimum strictly exceeds `val`, not counting
    /// the just-inserted edge.
    fn insert_counts(&self, node: NodeId, val: u32) -> (u32, u32) {
        let mut x = 0;
        let mut y = 0;
        for edge_id in self.graph.incident(node) {
            let edge = self.graph.edge(edge_id).expect("incident edge is live");
            let floor = edge
                .nodes()
                .iter()
                .filter(|other| **other != node)
                .map(|other| self.cores.get(*other))
                .min()
                .unwrap_or(u32::MAX);
            if floor >= val {
                x += 1;
            }
            if floor > val && Some(edge_id) != self.new_edge {
                y += 1;
            }
        }
        (x, y)
    }

    /// Number of incident edges whose minimum core over all endpoints is at
    /// least `val`.
    fn supported_edges(&self, node: NodeId, val: u32) -> u32 {
        let mut count = 0;
        for edge_id in self.graph.incident(node) {
            let edge = self.graph.edge(edge_id).expect("incident edge is live");
            if edge.nodes().iter().all(|other| self.cores.get(*other) >= val) {
                count += 1;
            }
        }
        count
    }

    /// Number of incident edges where every endpoint other than `node` has a
    /// core strictly above `val`.
    fn strictly_supported_edges(&self, node: NodeId, val: u32) -> u32 {
        let mut count = 0;
        for edge_id in self.graph.incident(node) {
            let edge = self.graph.edge(edge_id).expect("incident edge is live");
            let ok = edge
                .nodes()
                .iter()
                .filter(|other| **other != node)
                .all(|other| self.cores.get(*other) > val);
            if ok {
                count += 1;
            }
        }
        count
    }

    /// Walks the unvisited incident edges of `node` and pushes the co-level
    /// endpoints of fully `val`-supported edges onto the work stack.
    fn expand(&mut self, node: NodeId, val: u32, stack: &mut Vec<NodeId>) {
        let incident: Vec<EdgeId> = self.graph.incident(node).collect();
        for edge_id in incident {
            if !self.visited.insert(edge_id) {
                continue;
            }
            let edge = self.graph.edge(edge_id).expect("incident edge is live");
            if edge.nodes().iter().any(|other| self.cores.get(*other) < val) {
                continue;
            }
            for other in edge.nodes() {
                if self.cores.get(*other) == val && !self.candidates.contains(other) {
                    stack.push(*other);
                }
            }
        }
    }

    /// Number of incident edges where every endpoint keeps the node above
    /// `val` under the optimistic assumption that all candidates move.
    fn candidate_supported_edges(&self, node: NodeId, val: u32) -> u32 {
        let mut count = 0;
        for edge_id in self.graph.incident(node) {
            let edge = self.graph.edge(edge_id).expect("incident edge is live");
            let ok = edge.nodes().iter().all(|other| {
                let boost = u32::from(self.candidates.contains(other));
                self.cores.get(*other) + boost > val
            });
            if ok {
                count += 1;
            }
        }
        count
    }

    fn recolor_insert(&mut self, val: u32) {
        loop {
            let mut changed = false;
            let snapshot: Vec<NodeId> = self.candidates.iter().copied().collect();
            for node in snapshot {
                if !self.candidates.contains(&node) {
                    continue;
                }
                if self.candidate_supported_edges(node, val) <= val {
                    self.candidates.remove(&node);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn recolor_delete(&mut self, val: u32) {
        loop {
            let mut changed = false;
            let snapshot: Vec<NodeId> = self.candidates.iter().copied().collect();
            for node in snapshot {
                if !self.candidates.contains(&node) {
                    continue;
                }
                if self.candidate_supported_edges(node, val) < val {
                    self.candidates.remove(&node);
                    self.demoted.insert(node);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }
}

impl CoreMaintenance for ExactEngine {
    fn insert_edge(&mut self, nodes: &[NodeId]) -> Result<(), DhcError> {
        self.insert(nodes)
    }

    fn delete_edge(&mut self, nodes: &[NodeId]) -> Result<(), DhcError> {
        self.delete(nodes)
    }

    fn core_of(&self, node: NodeId) -> u32 {
        self.cores.get(node)
    }
}

fn empty_edge() -> DhcError {
    DhcError::Engine(ErrorInfo::new("empty-edge", "hyperedge has no endpoints"))
}
