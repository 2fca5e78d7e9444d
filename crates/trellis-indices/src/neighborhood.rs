//! Dense, read-only neighborhood snapshots in Compressed Sparse Row form.
//!
//! Algorithms that traverse repeatedly from arbitrary nodes pay heavily for
//! hash lookups into a general-purpose store. A [`NeighborhoodIndex`]
//! freezes a point-in-time adjacency into flat offset/neighbor arrays so
//! locating a node's block is O(1) and iterating it is O(degree).

use std::collections::HashMap;
use std::hash::Hash;

/// A dense, integer-indexed snapshot of graph topology.
///
/// Generic over the external node handle `K`; internally every node is a
/// dense id in `0..node_count`. The id assignment order is internal to the
/// index and unrelated to any ordering the source graph may exhibit.
///
/// The index is immutable once built: it does not observe later mutations
/// of the graph it was taken from, and staleness is the caller's problem.
pub struct NeighborhoodIndex<K> {
    /// Mapping from dense index (0..N) back to the external node handle
    pub index_to_node: Vec<K>,
    /// Mapping from external node handle to dense index
    pub node_to_index: HashMap<K, usize>,

    /// Outgoing CSR structure: offsets into `out_neighbors`, size N + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of outgoing neighbor indices
    pub out_neighbors: Vec<usize>,

    /// Incoming CSR structure: offsets into `in_neighbors`, size N + 1
    pub in_offsets: Vec<usize>,
    /// Contiguous array of incoming neighbor indices
    pub in_neighbors: Vec<usize>,

    /// Edge weights, aligned with `out_neighbors`. Absent for unweighted
    /// snapshots, in which case every entry weighs 1.0.
    pub weights: Option<Vec<f64>>,
}

impl<K: Eq + Hash + Clone> NeighborhoodIndex<K> {
    /// Flatten per-node adjacency lists into CSR arrays.
    ///
    /// `outgoing[i]` and `incoming[i]` hold dense neighbor indices for the
    /// node at position `i` of `index_to_node`; `weights`, when given, must
    /// be shaped exactly like `outgoing`.
    pub fn from_adjacency(
        index_to_node: Vec<K>,
        outgoing: Vec<Vec<usize>>,
        incoming: Vec<Vec<usize>>,
        weights: Option<Vec<Vec<f64>>>,
    ) -> Self {
        let node_count = index_to_node.len();
        debug_assert_eq!(outgoing.len(), node_count);
        debug_assert_eq!(incoming.len(), node_count);

        let node_to_index: HashMap<K, usize> = index_to_node
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.clone(), idx))
            .collect();

        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_neighbors = Vec::new();
        let mut flat_weights = weights.as_ref().map(|_| Vec::new());

        out_offsets.push(0);
        for (i, neighbors) in outgoing.into_iter().enumerate() {
            out_neighbors.extend(neighbors);
            out_offsets.push(out_neighbors.len());

            if let Some(ref mut flat) = flat_weights {
                if let Some(row) = weights.as_ref().map(|w| &w[i]) {
                    flat.extend(row.iter());
                }
            }
        }

        let mut in_offsets = Vec::with_capacity(node_count + 1);
        let mut in_neighbors = Vec::new();
        in_offsets.push(0);
        for sources in incoming {
            in_neighbors.extend(sources);
            in_offsets.push(in_neighbors.len());
        }

        NeighborhoodIndex {
            index_to_node,
            node_to_index,
            out_offsets,
            out_neighbors,
            in_offsets,
            in_neighbors,
            weights: flat_weights,
        }
    }

    /// Dense index of an external node handle.
    pub fn id_of(&self, key: &K) -> Option<usize> {
        self.node_to_index.get(key).copied()
    }
}

impl<K> NeighborhoodIndex<K> {
    /// Number of nodes in the snapshot.
    pub fn node_count(&self) -> usize {
        self.index_to_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_node.is_empty()
    }

    /// External handle of a dense index.
    pub fn key_of(&self, idx: usize) -> &K {
        &self.index_to_node[idx]
    }

    /// Out-degree of a node (by dense index).
    pub fn out_degree(&self, idx: usize) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// In-degree of a node (by dense index).
    pub fn in_degree(&self, idx: usize) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Outgoing neighbors (successors) of a node.
    pub fn successors(&self, idx: usize) -> &[usize] {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        &self.out_neighbors[start..end]
    }

    /// Incoming neighbors (predecessors) of a node.
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        let start = self.in_offsets[idx];
        let end = self.in_offsets[idx + 1];
        &self.in_neighbors[start..end]
    }

    /// Weights of a node's outgoing block, if the snapshot is weighted.
    pub fn weights_of(&self, idx: usize) -> Option<&[f64]> {
        self.weights.as_ref().map(|w| {
            let start = self.out_offsets[idx];
            let end = self.out_offsets[idx + 1];
            &w[start..end]
        })
    }

    /// Iterate a node's outgoing block as `(neighbor, weight)` pairs.
    ///
    /// Unweighted snapshots yield 1.0 for every entry.
    pub fn neighbor_weights(&self, idx: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.out_offsets[idx];
        let end = self.out_offsets[idx + 1];
        let weights = self.weights.as_deref();
        (start..end).map(move |slot| {
            let w = weights.map_or(1.0, |w| w[slot]);
            (self.out_neighbors[slot], w)
        })
    }

    /// Sum of all outgoing entry weights.
    ///
    /// On a symmetric snapshot every non-loop edge is counted from both
    /// endpoints; divide by two accordingly.
    pub fn total_out_weight(&self) -> f64 {
        match &self.weights {
            Some(w) => w.iter().sum(),
            None => self.out_neighbors.len() as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NeighborhoodIndex<&'static str> {
        // a -> b, a -> c, b -> c
        NeighborhoodIndex::from_adjacency(
            vec!["a", "b", "c"],
            vec![vec![1, 2], vec![2], vec![]],
            vec![vec![], vec![0], vec![0, 1]],
            None,
        )
    }

    #[test]
    fn csr_layout() {
        let index = sample();
        assert_eq!(index.node_count(), 3);
        assert_eq!(index.successors(0), &[1, 2]);
        assert_eq!(index.successors(2), &[] as &[usize]);
        assert_eq!(index.predecessors(2), &[0, 1]);
        assert_eq!(index.out_degree(0), 2);
        assert_eq!(index.in_degree(2), 2);
    }

    #[test]
    fn id_round_trip() {
        let index = sample();
        let id = index.id_of(&"b").unwrap();
        assert_eq!(*index.key_of(id), "b");
        assert_eq!(index.id_of(&"missing"), None);
    }

    #[test]
    fn unweighted_defaults_to_unit_weight() {
        let index = sample();
        let entries: Vec<(usize, f64)> = index.neighbor_weights(0).collect();
        assert_eq!(entries, vec![(1, 1.0), (2, 1.0)]);
        assert_eq!(index.total_out_weight(), 3.0);
    }

    #[test]
    fn weighted_blocks_stay_aligned() {
        let index = NeighborhoodIndex::from_adjacency(
            vec![10u64, 20, 30],
            vec![vec![1, 2], vec![2], vec![]],
            vec![vec![], vec![0], vec![0, 1]],
            Some(vec![vec![0.5, 2.0], vec![3.0], vec![]]),
        );
        assert_eq!(index.weights_of(0), Some(&[0.5, 2.0][..]));
        let entries: Vec<(usize, f64)> = index.neighbor_weights(1).collect();
        assert_eq!(entries, vec![(2, 3.0)]);
        assert_eq!(index.total_out_weight(), 5.5);
    }
}
