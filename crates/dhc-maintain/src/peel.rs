//! Static core decomposition by bucket peeling.

use std::collections::{BTreeSet, HashMap, HashSet};

use dhc_core::{CoreMap, EdgeId, NodeId};
use dhc_graph::Hypergraph;

/// Computes core numbers for every known node of `graph` from scratch.
///
/// Repeatedly extracts the minimum-degree node; the running maximum of the
/// extracted degrees is the node's core number. Removing a node marks its
/// incident edges removed and decrements every still-present endpoint across
/// them. Used as the reference oracle in tests and by the `peel` subcommand;
/// the dynamic engines never call it.
pub fn peel_cores(graph: &Hypergraph) -> CoreMap {
    let mut degrees: HashMap<NodeId, u32> = graph
        .node_degrees()
        .map(|(node, degree)| (node, degree as u32))
        .collect();
    let mut order: BTreeSet<(u32, NodeId)> = degrees
        .iter()
        .map(|(node, degree)| (*degree, *node))
        .collect();
    let mut removed: HashSet<EdgeId> = HashSet::new();
    let mut cores = CoreMap::new();
    let mut level = 0;

    while let Some((degree, node)) = order.pop_first() {
        level = level.max(degree);
        debug_assert_eq!(degree, degrees[&node]);
        cores.set(node, level);
        for edge_id in graph.incident(node) {
            if !removed.insert(edge_id) {
                continue;
            }
            let edge = graph.edge(edge_id).expect("incidence lists only live edges");
            for endpoint in edge.nodes() {
                let degree = degrees[endpoint];
                if order.remove(&(degree, *endpoint)) {
                    degrees.insert(*endpoint, degree - 1);
                    order.insert((degree - 1, *endpoint));
                }
            }
        }
    }

    cores
}
