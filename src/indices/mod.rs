//! Projections of a [`GraphStore`] into the dense indices of
//! [`trellis_indices`].
//!
//! Each builder performs one read pass over the store and hands the
//! resulting dense arrays to the index crate, which never reaches back.
//! Indices are point-in-time snapshots: they do not observe later store
//! mutations, and staleness is the caller's responsibility. Building an
//! index while the store is being mutated is out of contract.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::graph::attributes::AttrValue;
use crate::graph::store::GraphStore;
use crate::graph::types::Key;

pub use trellis_indices::{
    louvain, ConnectedComponentsIndex, DirectedCommunityStructure, LouvainConfig, LouvainResult,
    NeighborhoodIndex, UndirectedCommunityStructure,
};

/// Snapshot the store's adjacency into a CSR neighborhood index.
///
/// Directed edges contribute source→target to the outgoing blocks;
/// undirected edges contribute both directions. Weights come from the
/// named edge attribute when given (missing or non-numeric values fall
/// back to 1.0); with no attribute the index is unweighted. The dense id
/// assignment order is internal to the index.
pub fn build_neighborhood(
    store: &GraphStore,
    weight_attribute: Option<&str>,
) -> NeighborhoodIndex<Key> {
    let index_to_node: Vec<Key> = store.node_keys().cloned().collect();
    let ids: FxHashMap<&Key, usize> =
        index_to_node.iter().enumerate().map(|(idx, key)| (key, idx)).collect();
    let n = index_to_node.len();

    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut weights: Option<Vec<Vec<f64>>> =
        weight_attribute.map(|_| vec![Vec::new(); n]);

    for (_, edge) in store.edge_entries() {
        let u = ids[&edge.source];
        let v = ids[&edge.target];
        let w = edge_weight(&edge.attributes, weight_attribute);

        outgoing[u].push(v);
        incoming[v].push(u);
        if let Some(ref mut rows) = weights {
            rows[u].push(w);
        }
        if !edge.directed && u != v {
            outgoing[v].push(u);
            incoming[u].push(v);
            if let Some(ref mut rows) = weights {
                rows[v].push(w);
            }
        }
    }

    debug!(nodes = n, edges = store.size(), "built neighborhood index");
    NeighborhoodIndex::from_adjacency(index_to_node, outgoing, incoming, weights)
}

/// Partition the store's nodes into connected components, ignoring edge
/// direction.
pub fn build_components(store: &GraphStore) -> ConnectedComponentsIndex<Key> {
    let neighborhood = build_neighborhood(store, None);
    let components = ConnectedComponentsIndex::from_neighborhood(&neighborhood);
    debug!(components = components.count(), "built connected components index");
    components
}

/// Build the undirected community structure over the store, treating every
/// edge as undirected.
pub fn build_undirected_community_structure(
    store: &GraphStore,
    weight_attribute: Option<&str>,
) -> UndirectedCommunityStructure<Key> {
    UndirectedCommunityStructure::new(symmetric_neighborhood(store, weight_attribute))
}

/// Build the directed community structure over the store. Undirected edges
/// are treated as a reciprocal pair of directed edges at full weight.
pub fn build_directed_community_structure(
    store: &GraphStore,
    weight_attribute: Option<&str>,
) -> DirectedCommunityStructure<Key> {
    DirectedCommunityStructure::new(build_neighborhood(store, weight_attribute))
}

/// Detect communities on the store with [`louvain`], treating every edge
/// as undirected.
pub fn louvain_communities(
    store: &GraphStore,
    weight_attribute: Option<&str>,
    config: &LouvainConfig,
) -> LouvainResult<Key> {
    louvain(symmetric_neighborhood(store, weight_attribute), config)
}

/// Symmetrized snapshot: every edge (directed or not) visible from both
/// endpoints, self-loops listed once. This is the input shape
/// [`UndirectedCommunityStructure`] requires.
fn symmetric_neighborhood(
    store: &GraphStore,
    weight_attribute: Option<&str>,
) -> NeighborhoodIndex<Key> {
    let index_to_node: Vec<Key> = store.node_keys().cloned().collect();
    let ids: FxHashMap<&Key, usize> =
        index_to_node.iter().enumerate().map(|(idx, key)| (key, idx)).collect();
    let n = index_to_node.len();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut weights: Vec<Vec<f64>> = vec![Vec::new(); n];

    for (_, edge) in store.edge_entries() {
        let u = ids[&edge.source];
        let v = ids[&edge.target];
        let w = edge_weight(&edge.attributes, weight_attribute);

        adjacency[u].push(v);
        weights[u].push(w);
        if u != v {
            adjacency[v].push(u);
            weights[v].push(w);
        }
    }

    debug!(nodes = n, edges = store.size(), "built symmetric neighborhood index");
    NeighborhoodIndex::from_adjacency(
        index_to_node,
        adjacency.clone(),
        adjacency,
        Some(weights),
    )
}

fn edge_weight(
    attributes: &crate::graph::attributes::AttrMap,
    weight_attribute: Option<&str>,
) -> f64 {
    weight_attribute
        .and_then(|name| attributes.get(name))
        .and_then(AttrValue::as_number)
        .unwrap_or(1.0)
}
