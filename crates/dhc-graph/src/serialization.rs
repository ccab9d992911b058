use dhc_core::errors::{DhcError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::hypergraph::{Hyperedge, Hypergraph};

/// Serializes the substrate to a compact binary representation using `bincode`.
pub fn graph_to_bytes(graph: &Hypergraph) -> Result<Vec<u8>, DhcError> {
    let serializable = SerializableGraph::from_graph(graph);
    bincode::serialize(&serializable)
        .map_err(|err| DhcError::Serde(ErrorInfo::new("serialize-bytes", err.to_string())))
}

/// Restores a substrate from its binary representation.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<Hypergraph, DhcError> {
    let serializable: SerializableGraph = bincode::deserialize(bytes)
        .map_err(|err| DhcError::Serde(ErrorInfo::new("deserialize-bytes", err.to_string())))?;
    Ok(serializable.into_graph())
}

/// Serializes the substrate to a JSON string.
pub fn graph_to_json(graph: &Hypergraph) -> Result<String, DhcError> {
    let serializable = SerializableGraph::from_graph(graph);
    serde_json::to_string_pretty(&serializable)
        .map_err(|err| DhcError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a substrate from a JSON string.
pub fn graph_from_json(json: &str) -> Result<Hypergraph, DhcError> {
    let serializable: SerializableGraph = serde_json::from_str(json)
        .map_err(|err| DhcError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))?;
    Ok(serializable.into_graph())
}

/// Raw edge-pool snapshot; tombstoned slots and the known-node set are kept
/// so identifiers and node visibility survive a round trip.
#[derive(Debug, Serialize, Deserialize)]
struct SerializableGraph {
    nodes: Vec<u64>,
    slots: Vec<Option<Vec<u64>>>,
}

impl SerializableGraph {
    fn from_graph(graph: &Hypergraph) -> Self {
        let nodes = graph.nodes().map(|id| id.as_raw()).collect();
        let slots = graph
            .slots()
            .iter()
            .map(|slot| {
                slot.as_ref()
                    .map(|edge| edge.nodes().iter().map(|id| id.as_raw()).collect())
            })
            .collect();
        Self { nodes, slots }
    }

    fn into_graph(self) -> Hypergraph {
        let slots = self
            .slots
            .into_iter()
            .map(|slot| slot.map(|nodes| Hyperedge::from_raw(&nodes)))
            .collect();
        let mut graph = Hypergraph::from_slots(slots);
        for node in self.nodes {
            graph.touch_node(dhc_core::NodeId::from_raw(node));
        }
        graph
    }
}
