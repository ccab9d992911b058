#![deny(missing_docs)]

//! Update source for the dhc engines: textual trace parsing, trace
//! statistics, and deterministic random trace generators.

mod generators;
mod trace;

pub use generators::{gen_hyperedge_trace, gen_pair_trace};
pub use trace::{EdgeUpdate, Trace, UpdateKind};
