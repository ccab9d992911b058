use dhc_core::{CoreMaintenance, NodeId, RngHandle};
use dhc_maintain::{peel_cores, ApproxEngine, ApproxParams, ThresholdGrowth};
use dhc_trace::{gen_hyperedge_trace, Trace, UpdateKind};
use proptest::prelude::*;

const PARAMS: ApproxParams = ApproxParams {
    epsilon: 0.5,
    lambda: 0.5,
    alpha: 0.5,
};

fn raw(nodes: &[u64]) -> Vec<NodeId> {
    nodes.iter().copied().map(NodeId::from_raw).collect()
}

/// The estimate never undershoots the true core number. The upper side uses
/// the structural promotion bound: reaching a positive level at threshold β
/// needs a bad count of at least ⌈α·β⌉, and bad counts never exceed twice the
/// degree, so β ≤ 4·max_degree for α = 1/2. The tight multiplicative
/// constants are not derived here.
fn assert_envelope(engine: &ApproxEngine, max_degree: usize) {
    let oracle = peel_cores(engine.graph());
    let cap = 4 * max_degree as u64 + 2;
    for node in engine.graph().nodes() {
        let core = u64::from(oracle.get(node));
        let estimate = engine.core_estimate(node);
        assert!(
            estimate >= core,
            "estimate {} undershoots core {} at node {}",
            estimate,
            core,
            node.as_raw()
        );
        assert!(
            estimate <= cap,
            "estimate {} above cap {} at node {}",
            estimate,
            cap,
            node.as_raw()
        );
    }
}

fn assert_ladder_is_strictly_increasing(engine: &ApproxEngine) {
    let thresholds = engine.thresholds();
    assert_eq!(thresholds[0], 0);
    for pair in thresholds.windows(2) {
        assert!(pair[0] < pair[1], "ladder not increasing: {pair:?}");
    }
}

fn replay_checked(engine: &mut ApproxEngine, trace: &Trace) {
    for update in trace.iter() {
        match update.kind {
            UpdateKind::Insert => engine.insert_edge(&update.nodes).expect("insertion"),
            UpdateKind::Delete => engine.delete_edge(&update.nodes).expect("deletion"),
        }
        assert_envelope(engine, trace.max_degree());
        assert_ladder_is_strictly_increasing(engine);
    }
}

fn scenario_traces() -> Vec<Vec<(UpdateKind, Vec<u64>)>> {
    vec![
        // Triangle.
        vec![
            (UpdateKind::Insert, vec![1, 2]),
            (UpdateKind::Insert, vec![2, 3]),
            (UpdateKind::Insert, vec![1, 3]),
        ],
        // Star.
        vec![
            (UpdateKind::Insert, vec![1, 2]),
            (UpdateKind::Insert, vec![1, 3]),
            (UpdateKind::Insert, vec![1, 4]),
            (UpdateKind::Insert, vec![1, 5]),
        ],
        // 3-uniform hypergraph.
        vec![
            (UpdateKind::Insert, vec![1, 2, 3]),
            (UpdateKind::Insert, vec![1, 2, 4]),
            (UpdateKind::Insert, vec![2, 3, 4]),
            (UpdateKind::Insert, vec![1, 3, 4]),
        ],
        // Insert-then-delete round trip.
        vec![
            (UpdateKind::Insert, vec![1, 2]),
            (UpdateKind::Insert, vec![2, 3]),
            (UpdateKind::Insert, vec![1, 3]),
            (UpdateKind::Delete, vec![1, 3]),
        ],
        // Deletion collapsing the triangle.
        vec![
            (UpdateKind::Insert, vec![1, 2]),
            (UpdateKind::Insert, vec![2, 3]),
            (UpdateKind::Insert, vec![1, 3]),
            (UpdateKind::Delete, vec![1, 2]),
        ],
    ]
}

#[test]
fn scenarios_stay_within_the_envelope() {
    for scenario in scenario_traces() {
        let updates: Vec<_> = scenario
            .iter()
            .map(|(kind, nodes)| dhc_trace::EdgeUpdate {
                kind: *kind,
                nodes: raw(nodes),
                timestamp: 0,
            })
            .collect();
        let trace = Trace::from_updates(updates);
        let mut engine = ApproxEngine::new(
            PARAMS,
            trace.number_of_nodes(),
            trace.max_degree(),
            ThresholdGrowth::Dynamic,
        )
        .expect("valid parameters");
        replay_checked(&mut engine, &trace);
    }
}

#[test]
fn static_ladder_covers_the_trace_degree() {
    let mut rng = RngHandle::from_seed(5);
    let trace = gen_hyperedge_trace(8, 30, 3, 0.2, &mut rng).expect("generator");
    let mut engine = ApproxEngine::new(
        PARAMS,
        trace.number_of_nodes(),
        trace.max_degree(),
        ThresholdGrowth::Static,
    )
    .expect("valid parameters");
    assert!(
        *engine.thresholds().last().expect("ladder") >= trace.max_degree() as u64,
        "static ladder too short"
    );
    replay_checked(&mut engine, &trace);
}

#[test]
fn parameters_must_be_positive_and_finite() {
    for params in [
        ApproxParams { epsilon: 0.0, ..PARAMS },
        ApproxParams { lambda: -1.0, ..PARAMS },
        ApproxParams { alpha: f64::NAN, ..PARAMS },
    ] {
        let err = ApproxEngine::new(params, 10, 4, ThresholdGrowth::Dynamic)
            .expect_err("bad parameters");
        assert_eq!(err.info().code, "bad-parameter");
    }
}

#[test]
fn isolated_nodes_estimate_zero() {
    let mut engine =
        ApproxEngine::new(PARAMS, 2, 1, ThresholdGrowth::Dynamic).expect("valid parameters");
    engine.insert_edge(&raw(&[1, 2])).expect("insertion");
    engine.delete_edge(&raw(&[1, 2])).expect("deletion");
    assert_eq!(engine.core_estimate(NodeId::from_raw(1)), 0);
    assert_eq!(engine.core_of(NodeId::from_raw(2)), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_traces_stay_within_the_envelope(
        seed in any::<u64>(),
        nodes in 3usize..12,
        updates in 1usize..35,
    ) {
        let mut rng = RngHandle::from_seed(seed);
        let trace = gen_hyperedge_trace(nodes, updates, 4, 0.3, &mut rng).unwrap();
        let mut engine = ApproxEngine::new(
            PARAMS,
            trace.number_of_nodes(),
            trace.max_degree(),
            ThresholdGrowth::Dynamic,
        )
        .unwrap();
        replay_checked(&mut engine, &trace);
    }
}
