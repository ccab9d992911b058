#![deny(missing_docs)]

//! Dynamic k-core maintenance engines over the hypergraph substrate.
//!
//! Three engines share the substrate: an exact fully-dynamic engine driven by
//! XY-prune color propagation, a (1+ε)-approximate fully-dynamic engine built
//! on threshold indexing, and an insertion-only exact engine for ordinary
//! graphs that keeps a total order per core level. A static bucket-peeling
//! decomposition serves as the reference oracle in tests.

mod approx;
mod exact;
mod order;
mod peel;
mod splay;

pub use approx::{ApproxEngine, ApproxParams, ThresholdGrowth};
pub use exact::ExactEngine;
pub use order::OrderEngine;
pub use peel::peel_cores;
pub use splay::{SplayForest, SplayHandle, SplayTree};
