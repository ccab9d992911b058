pub mod approx;
pub mod exact;
pub mod order;
pub mod peel;

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use dhc_core::{CoreMaintenance, CoreMap};
use dhc_trace::{Trace, UpdateKind};
use serde_json::Value;

/// Drains the trace into the engine, one atomic update at a time.
pub(crate) fn replay(engine: &mut dyn CoreMaintenance, trace: &Trace) -> Result<(), Box<dyn Error>> {
    for (index, update) in trace.iter().enumerate() {
        match update.kind {
            UpdateKind::Insert => engine.insert_edge(&update.nodes)?,
            UpdateKind::Delete => engine.delete_edge(&update.nodes)?,
        }
        if (index + 1) % 100_000 == 0 {
            log::info!("applied {} updates", index + 1);
        }
    }
    Ok(())
}

pub(crate) fn core_labels(cores: &CoreMap) -> BTreeMap<u64, u32> {
    cores.iter().map(|(node, core)| (node.as_raw(), core)).collect()
}

pub(crate) fn write_report(report: &Value, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let text = serde_json::to_string_pretty(report)?;
    match out {
        Some(path) => fs::write(path, text)?,
        None => println!("{text}"),
    }
    Ok(())
}
