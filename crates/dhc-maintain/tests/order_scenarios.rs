use dhc_core::{CoreMaintenance, NodeId};
use dhc_maintain::{peel_cores, OrderEngine};

fn raw(nodes: &[u64]) -> Vec<NodeId> {
    nodes.iter().copied().map(NodeId::from_raw).collect()
}

fn assert_matches_oracle(engine: &OrderEngine) {
    let oracle = peel_cores(engine.graph());
    for node in engine.graph().nodes() {
        assert_eq!(
            engine.core_of(node),
            oracle.get(node),
            "core mismatch at node {}",
            node.as_raw()
        );
    }
}

/// Walking every level list must enumerate ranks 1, 2, … in the paired order
/// structure.
fn assert_rank_sequence(engine: &mut OrderEngine) {
    for level in 0..engine.level_count() {
        let nodes = engine.level_order(level);
        for (position, node) in nodes.iter().enumerate() {
            assert_eq!(
                engine.rank_in_level(level, *node),
                Some(position + 1),
                "rank drift at level {level}"
            );
        }
    }
}

fn insert_all(engine: &mut OrderEngine, edges: &[&[u64]]) {
    for edge in edges {
        engine.insert_edge(&raw(edge)).expect("insertion");
        assert_matches_oracle(engine);
        assert_rank_sequence(engine);
    }
}

fn cores_of(engine: &OrderEngine, nodes: &[u64]) -> Vec<u32> {
    nodes
        .iter()
        .map(|node| engine.core_of(NodeId::from_raw(*node)))
        .collect()
}

#[test]
fn triangle_reaches_core_two() {
    let mut engine = OrderEngine::new();
    insert_all(&mut engine, &[&[1, 2], &[2, 3], &[1, 3]]);
    assert_eq!(cores_of(&engine, &[1, 2, 3]), vec![2, 2, 2]);
}

#[test]
fn star_stays_at_core_one() {
    let mut engine = OrderEngine::new();
    insert_all(&mut engine, &[&[1, 2], &[1, 3], &[1, 4], &[1, 5]]);
    assert_eq!(cores_of(&engine, &[1, 2, 3, 4, 5]), vec![1, 1, 1, 1, 1]);
}

#[test]
fn clique_builds_up_level_by_level() {
    let mut engine = OrderEngine::new();
    // K5, edge by edge; every prefix must agree with the oracle.
    let nodes = [1u64, 2, 3, 4, 5];
    let mut edges: Vec<[u64; 2]> = Vec::new();
    for (i, a) in nodes.iter().enumerate() {
        for b in nodes.iter().skip(i + 1) {
            edges.push([*a, *b]);
        }
    }
    let edge_refs: Vec<&[u64]> = edges.iter().map(|edge| edge.as_slice()).collect();
    insert_all(&mut engine, &edge_refs);
    assert_eq!(cores_of(&engine, &nodes), vec![4, 4, 4, 4, 4]);
}

#[test]
fn chained_triangles_promote_transitively() {
    let mut engine = OrderEngine::new();
    insert_all(
        &mut engine,
        &[
            &[1, 2],
            &[3, 4],
            &[2, 3],
            &[1, 3],
            &[2, 4],
            &[1, 4],
        ],
    );
    // K4 in a scrambled insertion order.
    assert_eq!(cores_of(&engine, &[1, 2, 3, 4]), vec![3, 3, 3, 3]);
}

#[test]
fn parallel_edges_are_counted() {
    let mut engine = OrderEngine::new();
    insert_all(&mut engine, &[&[1, 2], &[1, 2]]);
    assert_eq!(cores_of(&engine, &[1, 2]), vec![2, 2]);
}

#[test]
fn non_pair_edges_are_rejected() {
    let mut engine = OrderEngine::new();
    let err = engine.insert_edge(&raw(&[1, 2, 3])).expect_err("arity 3");
    assert_eq!(err.info().code, "non-pair-edge");
    let err = engine.insert_edge(&raw(&[1])).expect_err("arity 1");
    assert_eq!(err.info().code, "non-pair-edge");
}

#[test]
fn deletions_are_unsupported() {
    let mut engine = OrderEngine::new();
    engine.insert_edge(&raw(&[1, 2])).expect("insertion");
    let err = engine.delete_edge(&raw(&[1, 2])).expect_err("deletion");
    assert_eq!(err.info().code, "deletion-unsupported");
}
