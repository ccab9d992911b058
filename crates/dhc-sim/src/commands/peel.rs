use std::error::Error;
use std::path::PathBuf;

use clap::Args as ClapArgs;
use dhc_graph::{Hyperedge, Hypergraph};
use dhc_maintain::peel_cores;
use dhc_trace::{Trace, UpdateKind};
use serde_json::json;

use super::{core_labels, write_report};

#[derive(ClapArgs, Debug)]
pub struct PeelArgs {
    /// Update trace file to replay into the substrate.
    #[arg(long)]
    trace: PathBuf,
    /// Output path for the decomposition (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

pub fn run(args: PeelArgs) -> Result<(), Box<dyn Error>> {
    let trace = Trace::from_path(&args.trace)?;
    let mut graph = Hypergraph::new();
    for update in trace.iter() {
        let edge = Hyperedge::new(update.nodes.clone());
        match update.kind {
            UpdateKind::Insert => {
                graph.insert(edge);
            }
            UpdateKind::Delete => {
                graph.delete(&edge)?;
            }
        }
    }
    let cores = peel_cores(&graph);
    let report = json!({
        "engine": "peel",
        "updates": trace.len(),
        "nodes": graph.node_count(),
        "edges": graph.live_edge_count(),
        "cores": core_labels(&cores),
    });
    write_report(&report, args.out.as_deref())
}
