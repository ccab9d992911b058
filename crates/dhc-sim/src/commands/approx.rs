use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;

use clap::Args as ClapArgs;
use dhc_maintain::{ApproxEngine, ApproxParams, ThresholdGrowth};
use dhc_trace::Trace;
use serde_json::json;

use super::{replay, write_report};

#[derive(ClapArgs, Debug)]
pub struct ApproxArgs {
    /// Update trace file to replay.
    #[arg(long)]
    trace: PathBuf,
    /// Approximation factor epsilon.
    #[arg(long)]
    epsilon: f64,
    /// Threshold growth factor lambda.
    #[arg(long)]
    lambda: f64,
    /// Promotion slack alpha.
    #[arg(long)]
    alpha: f64,
    /// Pre-grow the threshold ladder past the trace's maximum degree instead
    /// of appending thresholds on demand.
    #[arg(long)]
    static_thresholds: bool,
    /// Output path for the final estimates (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

pub fn run(args: ApproxArgs) -> Result<(), Box<dyn Error>> {
    let trace = Trace::from_path(&args.trace)?;
    let params = ApproxParams {
        epsilon: args.epsilon,
        lambda: args.lambda,
        alpha: args.alpha,
    };
    let growth = if args.static_thresholds {
        ThresholdGrowth::Static
    } else {
        ThresholdGrowth::Dynamic
    };
    let mut engine = ApproxEngine::new(params, trace.number_of_nodes(), trace.max_degree(), growth)?;
    replay(&mut engine, &trace)?;

    let estimates: BTreeMap<u64, u64> = engine
        .graph()
        .nodes()
        .map(|node| (node.as_raw(), engine.core_estimate(node)))
        .collect();
    let report = json!({
        "engine": "approx",
        "updates": trace.len(),
        "nodes": engine.graph().node_count(),
        "edges": engine.graph().live_edge_count(),
        "tau": engine.tau(),
        "thresholds": engine.thresholds(),
        "estimates": estimates,
    });
    write_report(&report, args.out.as_deref())
}
