#![deny(missing_docs)]

//! Hypergraph substrate with stable edge identifiers, shared by every
//! maintenance engine.

mod hash;
mod hypergraph;
mod serialization;

pub use hash::canonical_hash;
pub use hypergraph::{Hyperedge, Hypergraph};
pub use serialization::{graph_from_bytes, graph_from_json, graph_to_bytes, graph_to_json};
