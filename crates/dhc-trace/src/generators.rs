use dhc_core::errors::{DhcError, ErrorInfo};
use dhc_core::{NodeId, RngHandle};

use crate::trace::{EdgeUpdate, Trace, UpdateKind};

/// Generates a random hyperedge update trace with deterministic randomness.
///
/// Each step either deletes a uniformly random live edge (with probability
/// `delete_ratio`, once any edge is live) or inserts a fresh edge over
/// distinct random endpoints of arity `2..=max_arity`.
pub fn gen_hyperedge_trace(
    n_nodes: usize,
    n_updates: usize,
    max_arity: usize,
    delete_ratio: f64,
    rng: &mut RngHandle,
) -> Result<Trace, DhcError> {
    if n_nodes < 2 || max_arity < 2 {
        return Err(generator_error(
            "bad-generator-config",
            "need at least two nodes and arity two",
        ));
    }
    if !(0.0..=1.0).contains(&delete_ratio) {
        return Err(generator_error(
            "bad-generator-config",
            "delete ratio must lie in [0, 1]",
        ));
    }
    let max_arity = max_arity.min(n_nodes);

    let mut live: Vec<Vec<NodeId>> = Vec::new();
    let mut updates = Vec::with_capacity(n_updates);
    for step in 0..n_updates {
        if !live.is_empty() && rng.chance(delete_ratio) {
            let victim = rng.pick(live.len());
            let nodes = live.swap_remove(victim);
            updates.push(EdgeUpdate {
                kind: UpdateKind::Delete,
                nodes,
                timestamp: 0,
            });
        } else {
            let arity = rng.between(2, max_arity);
            let nodes = sample_nodes(n_nodes, arity, rng);
            live.push(nodes.clone());
            updates.push(EdgeUpdate {
                kind: UpdateKind::Insert,
                nodes,
                timestamp: step as i64,
            });
        }
    }
    Ok(Trace::from_updates(updates))
}

/// Generates an insertion-only trace of ordinary (pair) edges.
pub fn gen_pair_trace(
    n_nodes: usize,
    n_updates: usize,
    rng: &mut RngHandle,
) -> Result<Trace, DhcError> {
    if n_nodes < 2 {
        return Err(generator_error(
            "bad-generator-config",
            "need at least two nodes",
        ));
    }
    let mut updates = Vec::with_capacity(n_updates);
    for step in 0..n_updates {
        let nodes = sample_nodes(n_nodes, 2, rng);
        updates.push(EdgeUpdate {
            kind: UpdateKind::Insert,
            nodes,
            timestamp: step as i64,
        });
    }
    Ok(Trace::from_updates(updates))
}

fn sample_nodes(n_nodes: usize, arity: usize, rng: &mut RngHandle) -> Vec<NodeId> {
    let mut picked = Vec::with_capacity(arity);
    while picked.len() < arity {
        let raw = rng.pick(n_nodes) as u64;
        if !picked.contains(&raw) {
            picked.push(raw);
        }
    }
    picked.sort_unstable();
    picked.into_iter().map(NodeId::from_raw).collect()
}

fn generator_error(code: &str, message: &str) -> DhcError {
    DhcError::Trace(ErrorInfo::new(code, message))
}
