//! Interchange form for stores.
//!
//! A [`SerializedGraph`] is a plain, explicit snapshot: every edge carries
//! its key (generated or not), so round-tripping never loses edge
//! identity. Rebuilding goes through the normal mutation path, which means
//! all structural invariants are re-checked on the way in.

use serde::{Deserialize, Serialize};

use super::attributes::AttrMap;
use super::store::{GraphError, GraphOptions, GraphResult, GraphStore};
use super::types::Key;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNode {
    pub key: Key,
    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    pub attributes: AttrMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedEdge {
    pub key: Key,
    pub source: Key,
    pub target: Key,
    #[serde(default, skip_serializing_if = "is_false")]
    pub undirected: bool,
    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    pub attributes: AttrMap,
}

/// A store snapshot suitable for interchange with external tooling.
///
/// The order of `nodes` and `edges` reflects one iteration of the source
/// store and carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedGraph {
    #[serde(default = "GraphOptions::mixed")]
    pub options: GraphOptions,
    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    pub attributes: AttrMap,
    pub nodes: Vec<SerializedNode>,
    pub edges: Vec<SerializedEdge>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl SerializedGraph {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse a snapshot from JSON. Malformed input surfaces as
    /// [`GraphError::InvalidArgument`]; structural violations surface when
    /// the snapshot is loaded into a store.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        serde_json::from_str(json).map_err(|err| GraphError::InvalidArgument {
            method: "from_json",
            reason: err.to_string(),
        })
    }
}

impl GraphStore {
    /// Snapshot the store into its interchange form.
    pub fn serialize(&self) -> SerializedGraph {
        let nodes = self
            .node_entries()
            .map(|(key, node)| SerializedNode {
                key: key.clone(),
                attributes: node.attributes.clone(),
            })
            .collect();
        let edges = self
            .edge_entries()
            .map(|(key, edge)| SerializedEdge {
                key: key.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                undirected: !edge.directed,
                attributes: edge.attributes.clone(),
            })
            .collect();
        SerializedGraph {
            options: self.options(),
            attributes: self.attributes().clone(),
            nodes,
            edges,
        }
    }

    /// Rebuild a store from its interchange form.
    ///
    /// Runs through the normal mutation path, so duplicate keys, missing
    /// endpoints and kind mismatches fail exactly as live mutations would.
    pub fn from_serialized(data: SerializedGraph) -> GraphResult<GraphStore> {
        let mut store = GraphStore::new(data.options);
        store.replace_attributes(data.attributes);
        for node in data.nodes {
            store.add_node_with_attributes(node.key, node.attributes)?;
        }
        for edge in data.edges {
            if edge.undirected {
                store.add_undirected_edge_with_key(edge.key, edge.source, edge.target, edge.attributes)?;
            } else {
                store.add_directed_edge_with_key(edge.key, edge.source, edge.target, edge.attributes)?;
            }
        }
        Ok(store)
    }
}
