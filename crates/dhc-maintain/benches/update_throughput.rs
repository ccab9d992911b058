use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dhc_core::{CoreMaintenance, RngHandle};
use dhc_maintain::{ApproxEngine, ApproxParams, ExactEngine, ThresholdGrowth};
use dhc_trace::{gen_hyperedge_trace, Trace, UpdateKind};

fn replay(engine: &mut dyn CoreMaintenance, trace: &Trace) {
    for update in trace.iter() {
        match update.kind {
            UpdateKind::Insert => engine.insert_edge(&update.nodes).unwrap(),
            UpdateKind::Delete => engine.delete_edge(&update.nodes).unwrap(),
        }
    }
}

fn update_bench(c: &mut Criterion) {
    let mut rng = RngHandle::from_seed(7);
    let trace = gen_hyperedge_trace(200, 2_000, 4, 0.25, &mut rng).unwrap();

    c.bench_function("exact_replay", |b| {
        b.iter(|| {
            let mut engine = ExactEngine::new();
            replay(&mut engine, &trace);
            black_box(engine.graph().live_edge_count());
        });
    });

    c.bench_function("approx_replay", |b| {
        let params = ApproxParams {
            epsilon: 0.5,
            lambda: 0.5,
            alpha: 0.5,
        };
        b.iter(|| {
            let mut engine = ApproxEngine::new(
                params,
                trace.number_of_nodes(),
                trace.max_degree(),
                ThresholdGrowth::Dynamic,
            )
            .unwrap();
            replay(&mut engine, &trace);
            black_box(engine.thresholds().len());
        });
    });
}

criterion_group!(benches, update_bench);
criterion_main!(benches);
