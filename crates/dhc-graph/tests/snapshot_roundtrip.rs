use dhc_core::NodeId;
use dhc_graph::{
    canonical_hash, graph_from_bytes, graph_from_json, graph_to_bytes, graph_to_json, Hyperedge,
    Hypergraph,
};

fn sample_graph() -> Hypergraph {
    let mut graph = Hypergraph::new();
    graph.insert(Hyperedge::from_raw(&[1, 2, 3]));
    graph.insert(Hyperedge::from_raw(&[2, 3]));
    graph.insert(Hyperedge::from_raw(&[1, 4]));
    graph.delete(&Hyperedge::from_raw(&[2, 3])).expect("live edge");
    graph
}

#[test]
fn json_round_trip_preserves_structure_and_ids() {
    let graph = sample_graph();
    let json = graph_to_json(&graph).expect("serialize");
    let restored = graph_from_json(&json).expect("deserialize");

    assert_eq!(canonical_hash(&graph), canonical_hash(&restored));
    assert_eq!(restored.live_edge_count(), graph.live_edge_count());
    // The tombstoned slot keeps its position: the next id matches.
    assert_eq!(restored.next_edge_id(), graph.next_edge_id());
}

#[test]
fn bytes_round_trip_matches_json_round_trip() {
    let graph = sample_graph();
    let bytes = graph_to_bytes(&graph).expect("serialize");
    let restored = graph_from_bytes(&bytes).expect("deserialize");
    assert_eq!(canonical_hash(&graph), canonical_hash(&restored));
}

#[test]
fn round_trip_keeps_isolated_nodes_known() {
    let mut graph = Hypergraph::new();
    let edge = Hyperedge::from_raw(&[10, 11]);
    graph.insert(edge.clone());
    graph.delete(&edge).expect("live edge");

    let json = graph_to_json(&graph).expect("serialize");
    let restored = graph_from_json(&json).expect("deserialize");
    assert_eq!(restored.node_count(), 2);
    assert_eq!(restored.degree(NodeId::from_raw(10)), 0);
    assert_eq!(canonical_hash(&graph), canonical_hash(&restored));
}

#[test]
fn hash_ignores_insertion_history() {
    let mut direct = Hypergraph::new();
    direct.insert(Hyperedge::from_raw(&[1, 2]));
    direct.insert(Hyperedge::from_raw(&[3, 4]));

    let mut churned = Hypergraph::new();
    churned.insert(Hyperedge::from_raw(&[3, 4]));
    churned.insert(Hyperedge::from_raw(&[1, 2]));
    churned.insert(Hyperedge::from_raw(&[1, 2, 3, 4]));
    churned
        .delete(&Hyperedge::from_raw(&[1, 2, 3, 4]))
        .expect("live edge");

    // Same live structure and node set, different histories.
    assert_eq!(canonical_hash(&direct), canonical_hash(&churned));
}

#[test]
fn hash_distinguishes_structures() {
    let mut a = Hypergraph::new();
    a.insert(Hyperedge::from_raw(&[1, 2]));
    let mut b = Hypergraph::new();
    b.insert(Hyperedge::from_raw(&[1, 3]));
    assert_ne!(canonical_hash(&a), canonical_hash(&b));
}
