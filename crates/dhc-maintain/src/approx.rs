//! Approximate fully-dynamic maintenance via threshold indexing.
//!
//! For a stack of thresholds `β₀ < β₁ < …` the engine maintains, per
//! threshold index, a bounded level function together with counts of the
//! incident edges that keep a node's level sustainable. Promotions and
//! demotions drain a bad set until every node satisfies its criterion, and a
//! binary search over the indices answers core queries with a (1+ε)-factor
//! guarantee.

use std::collections::{BTreeMap, BTreeSet};

use dhc_core::errors::{DhcError, ErrorInfo};
use dhc_core::{CoreMaintenance, NodeId};
use dhc_graph::{Hyperedge, Hypergraph};

/// Approximation parameters; all three must be finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxParams {
    /// Approximation factor `ε`.
    pub epsilon: f64,
    /// Threshold growth factor `λ`.
    pub lambda: f64,
    /// Promotion slack `α`.
    pub alpha: f64,
}

impl ApproxParams {
    fn validate(&self) -> Result<(), DhcError> {
        for (name, value) in [
            ("epsilon", self.epsilon),
            ("lambda", self.lambda),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DhcError::Engine(
                    ErrorInfo::new("bad-parameter", "parameter must be finite and positive")
                        .with_context(name, value.to_string()),
                ));
            }
        }
        Ok(())
    }
}

/// How the threshold ladder is grown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdGrowth {
    /// Append a threshold whenever the topmost index saturates its level cap.
    Dynamic,
    /// Pre-grow the ladder past the trace's maximum degree at construction.
    Static,
}

/// Fully dynamic (1+ε)-approximate engine.
#[derive(Debug)]
pub struct ApproxEngine {
    graph: Hypergraph,
    params: ApproxParams,
    growth: ThresholdGrowth,
    tau: i64,
    thresholds: Vec<u64>,
    levels: Vec<BTreeMap<NodeId, i64>>,
    bad_counts: Vec<BTreeMap<NodeId, i64>>,
    near_counts: Vec<BTreeMap<NodeId, i64>>,
}

impl ApproxEngine {
    /// Creates an engine for a trace with the given node-count upper bound
    /// and maximum degree.
    ///
    /// The level cap is `τ = ⌈0.15·ln N / ln(1+ε)⌉`, clamped so tiny traces
    /// stay well-defined. In static growth mode the ladder is pre-grown past
    /// `max_degree`; in dynamic mode it starts at the single threshold 0.
    pub fn new(
        params: ApproxParams,
        number_of_nodes: usize,
        max_degree: usize,
        growth: ThresholdGrowth,
    ) -> Result<Self, DhcError> {
        params.validate()?;
        let population = number_of_nodes.max(2) as f64;
        let tau = (0.15 * population.ln() / (1.0 + params.epsilon).ln()).ceil() as i64;
        let tau = tau.max(1);

        let mut thresholds = vec![0];
        if growth == ThresholdGrowth::Static {
            while *thresholds.last().expect("ladder is never empty") < max_degree as u64 {
                let last = *thresholds.last().expect("ladder is never empty");
                thresholds.push(next_threshold(last, params.lambda));
            }
        }
        let count = thresholds.len();
        Ok(Self {
            graph: Hypergraph::new(),
            params,
            growth,
            tau,
            thresholds,
            levels: vec![BTreeMap::new(); count],
            bad_counts: vec![BTreeMap::new(); count],
            near_counts: vec![BTreeMap::new(); count],
        })
    }

    /// Returns the maintained substrate.
    pub fn graph(&self) -> &Hypergraph {
        &self.graph
    }

    /// Returns the parameters the engine was built with.
    pub fn params(&self) -> ApproxParams {
        self.params
    }

    /// Returns the level cap τ.
    pub fn tau(&self) -> i64 {
        self.tau
    }

    /// Returns the current threshold ladder.
    pub fn thresholds(&self) -> &[u64] {
        &self.thresholds
    }

    /// Returns the approximate core value of `node`.
    ///
    /// Binary search for the largest index whose level function still sits at
    /// the cap; the corresponding threshold is the estimate.
    pub fn core_estimate(&self, node: NodeId) -> u64 {
        let mut p = 0;
        let mut q = self.thresholds.len();
        while p + 1 < q {
            let m = (p + q) / 2;
            if self.level(m, node) < self.tau {
                q = m;
            } else {
                p = m;
            }
        }
        self.thresholds[p]
    }

    fn level(&self, index: usize, node: NodeId) -> i64 {
        self.levels[index].get(&node).copied().unwrap_or(0)
    }

    fn bad(&self, index: usize, node: NodeId) -> i64 {
        self.bad_counts[index].get(&node).copied().unwrap_or(0)
    }

    fn near(&self, index: usize, node: NodeId) -> i64 {
        self.near_counts[index].get(&node).copied().unwrap_or(0)
    }

    fn edge_level(&self, index: usize, nodes: &[NodeId]) -> i64 {
        nodes
            .iter()
            .map(|node| self.level(index, *node))
            .min()
            .unwrap_or(i64::MAX)
    }

    fn push_threshold(&mut self) {
        let last = *self.thresholds.last().expect("ladder is never empty");
        let next = next_threshold(last, self.params.lambda);
        log::debug!("appending threshold {next}");
        self.thresholds.push(next);
        self.levels.push(BTreeMap::new());
        self.bad_counts.push(BTreeMap::new());
        self.near_counts.push(BTreeMap::new());
    }

    fn insert(&mut self, nodes: &[NodeId]) -> Result<(), DhcError> {
        if nodes.is_empty() {
            return Err(DhcError::Engine(ErrorInfo::new(
                "empty-edge",
                "hyperedge has no endpoints",
            )));
        }
        self.graph.insert(Hyperedge::new(nodes.to_vec()));

        let mut bad: BTreeSet<NodeId> = BTreeSet::new();
        let present_before = self.thresholds.len();
        let mut index = 0;
        // The drain below may append thresholds, so the ladder length is
        // re-read on every iteration.
        while index < self.thresholds.len() {
            if index < present_before {
                let edge_level = self.edge_level(index, nodes);
                for node in nodes {
                    let level = self.level(index, *node);
                    if edge_level >= level {
                        *self.bad_counts[index].entry(*node).or_insert(0) += 1;
                        bad.insert(*node);
                    }
                    if edge_level >= level - 1 {
                        *self.near_counts[index].entry(*node).or_insert(0) += 1;
                    }
                }
            } else {
                // Threshold appended during this insertion: every node starts
                // with its full degree as the bad count.
                let degrees: Vec<(NodeId, usize)> = self.graph.node_degrees().collect();
                for (node, degree) in degrees {
                    self.bad_counts[index].insert(node, degree as i64);
                    bad.insert(node);
                }
            }

            let beta = self.thresholds[index];
            let promote_floor = (self.params.alpha * beta as f64).ceil() as i64;
            while let Some(node) = bad.first().copied() {
                if self.level(index, node) < self.tau && self.bad(index, node) >= promote_floor {
                    self.promote(index, node, &mut bad);
                    if self.growth == ThresholdGrowth::Dynamic
                        && index == self.thresholds.len() - 1
                        && self.level(index, node) == self.tau
                    {
                        self.push_threshold();
                    }
                } else {
                    bad.remove(&node);
                }
            }
            index += 1;
        }
        Ok(())
    }

    fn delete(&mut self, nodes: &[NodeId]) -> Result<(), DhcError> {
        if nodes.is_empty() {
            return Err(DhcError::Engine(ErrorInfo::new(
                "empty-edge",
                "hyperedge has no endpoints",
            )));
        }
        self.graph.delete(&Hyperedge::new(nodes.to_vec()))?;

        let mut bad: BTreeSet<NodeId> = BTreeSet::new();
        for index in 0..self.thresholds.len() {
            let beta = self.thresholds[index] as i64;
            let edge_level = self.edge_level(index, nodes);
            for node in nodes {
                let level = self.level(index, *node);
                if edge_level >= level {
                    *self.bad_counts[index].entry(*node).or_insert(0) -= 1;
                }
                if edge_level >= level - 1 {
                    *self.near_counts[index].entry(*node).or_insert(0) -= 1;
                    bad.insert(*node);
                }
            }
            while let Some(node) = bad.first().copied() {
                if self.level(index, node) > 0 && self.near(index, node) < beta {
                    self.demote(index, node, &mut bad);
                } else {
                    bad.remove(&node);
                }
            }
        }
        Ok(())
    }

    fn promote(&mut self, index: usize, node: NodeId, bad: &mut BTreeSet<NodeId>) {
        let old_level = self.level(index, node);
        let new_level = old_level + 1;
        self.levels[index].insert(node, new_level);
        self.rebuild_counts(index, node);

        let incident: Vec<Vec<NodeId>> = self
            .graph
            .incident(node)
            .map(|id| {
                self.graph
                    .edge(id)
                    .expect("incident edge is live")
                    .nodes()
                    .to_vec()
            })
            .collect();
        for endpoints in incident {
            let others = endpoints
                .iter()
                .filter(|other| **other != node)
                .map(|other| self.level(index, *other))
                .min()
                .unwrap_or(i64::MAX);
            let new_edge_level = others.min(new_level);
            let old_edge_level = others.min(old_level);
            if new_edge_level == old_edge_level {
                continue;
            }
            for other in endpoints {
                let level = self.level(index, other);
                if old_edge_level < level && level <= new_edge_level {
                    *self.bad_counts[index].entry(other).or_insert(0) += 1;
                    bad.insert(other);
                }
                if old_edge_level < level - 1 && level - 1 <= new_edge_level {
                    *self.near_counts[index].entry(other).or_insert(0) += 1;
                }
            }
        }
    }

    fn demote(&mut self, index: usize, node: NodeId, bad: &mut BTreeSet<NodeId>) {
        let old_level = self.level(index, node);
        let new_level = old_level - 1;
        self.levels[index].insert(node, new_level);
        self.rebuild_counts(index, node);

        let incident: Vec<Vec<NodeId>> = self
            .graph
            .incident(node)
            .map(|id| {
                self.graph
                    .edge(id)
                    .expect("incident edge is live")
                    .nodes()
                    .to_vec()
            })
            .collect();
        for endpoints in incident {
            let others = endpoints
                .iter()
                .filter(|other| **other != node)
                .map(|other| self.level(index, *other))
                .min()
                .unwrap_or(i64::MAX);
            let new_edge_level = others.min(new_level);
            let old_edge_level = others.min(old_level);
            if new_edge_level == old_edge_level {
                continue;
            }
            for other in endpoints {
                let level = self.level(index, other);
                if new_edge_level < level && level <= old_edge_level {
                    *self.bad_counts[index].entry(other).or_insert(0) -= 1;
                }
                if new_edge_level < level - 1 && level - 1 <= old_edge_level {
                    *self.near_counts[index].entry(other).or_insert(0) -= 1;
                    bad.insert(other);
                }
            }
        }
    }

    /// Rebuilds the bad and near counts of `node` from its live incidence.
    fn rebuild_counts(&mut self, index: usize, node: NodeId) {
        let level = self.level(index, node);
        let mut bad = 0;
        let mut near = 0;
        for edge_id in self.graph.incident(node) {
            let edge = self.graph.edge(edge_id).expect("incident edge is live");
            let edge_level = edge
                .nodes()
                .iter()
                .map(|other| self.level(index, *other))
                .min()
                .unwrap_or(i64::MAX);
            if edge_level >= level {
                bad += 1;
            }
            if edge_level >= level - 1 {
                near += 1;
            }
        }
        self.bad_counts[index].insert(node, bad);
        self.near_counts[index].insert(node, near);
    }
}

impl CoreMaintenance for ApproxEngine {
    fn insert_edge(&mut self, nodes: &[NodeId]) -> Result<(), DhcError> {
        self.insert(nodes)
    }

    fn delete_edge(&mut self, nodes: &[NodeId]) -> Result<(), DhcError> {
        self.delete(nodes)
    }

    fn core_of(&self, node: NodeId) -> u32 {
        self.core_estimate(node).min(u64::from(u32::MAX)) as u32
    }
}

fn next_threshold(last: u64, lambda: f64) -> u64 {
    let grown = ((1.0 + lambda) * last as f64).ceil() as u64;
    grown.max(last + 1)
}
