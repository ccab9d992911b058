use sha2::{Digest, Sha256};

use crate::hypergraph::{Hyperedge, Hypergraph};

/// Computes the canonical structural hash for the provided substrate.
///
/// The hash covers the known-node set and the sorted multiset of live edge
/// endpoint tuples; two substrates with the same live structure hash equal
/// regardless of insertion history or tombstone layout.
pub fn canonical_hash(graph: &Hypergraph) -> String {
    let mut hasher = Sha256::new();

    hasher.update((graph.node_count() as u64).to_le_bytes());
    for node in graph.nodes() {
        hasher.update(node.as_raw().to_le_bytes());
    }

    let mut edges: Vec<&Hyperedge> = graph.edge_entries().map(|(_, edge)| edge).collect();
    edges.sort();
    hasher.update((edges.len() as u64).to_le_bytes());
    for edge in edges {
        hasher.update((edge.arity() as u64).to_le_bytes());
        for node in edge.nodes() {
            hasher.update(node.as_raw().to_le_bytes());
        }
    }

    format!("{:x}", hasher.finalize())
}
