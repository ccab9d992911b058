use std::error::Error;
use std::path::PathBuf;

use clap::Args as ClapArgs;
use dhc_maintain::ExactEngine;
use dhc_trace::Trace;
use serde_json::json;

use super::{core_labels, replay, write_report};

#[derive(ClapArgs, Debug)]
pub struct ExactArgs {
    /// Update trace file to replay.
    #[arg(long)]
    trace: PathBuf,
    /// Output path for the final core numbers (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

pub fn run(args: ExactArgs) -> Result<(), Box<dyn Error>> {
    let trace = Trace::from_path(&args.trace)?;
    let mut engine = ExactEngine::new();
    replay(&mut engine, &trace)?;
    let report = json!({
        "engine": "exact",
        "updates": trace.len(),
        "nodes": engine.graph().node_count(),
        "edges": engine.graph().live_edge_count(),
        "cores": core_labels(engine.cores()),
    });
    write_report(&report, args.out.as_deref())
}
