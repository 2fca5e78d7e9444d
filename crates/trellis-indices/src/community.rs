//! Mutable community aggregates for modularity optimization.
//!
//! Louvain-style algorithms move one node at a time and must price each
//! candidate move from cached sums; rescanning edges per move would make a
//! single pass quadratic. These structures keep per-node and per-community
//! weighted degree totals that update in O(degree) per move, plus the
//! aggregation step that coarsens a converged partition into a new graph.
//!
//! Two variants: [`UndirectedCommunityStructure`] works on a symmetric
//! snapshot (every edge visible from both endpoints, self-loops listed
//! once); [`DirectedCommunityStructure`] works on a directed out-CSR and
//! derives the weighted transpose itself, tracking in/out sums separately
//! because the directed modularity null model differs.

use std::collections::HashMap;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::neighborhood::NeighborhoodIndex;

/// Community aggregates over an undirected (symmetric) snapshot.
///
/// A self-loop of weight `w` contributes `2w` to its node's degree and `w`
/// to the total graph weight `m`, which is fixed at construction.
pub struct UndirectedCommunityStructure<K> {
    graph: NeighborhoodIndex<K>,
    node_community: Vec<usize>,
    node_degree: Vec<f64>,
    self_loop: Vec<f64>,
    community_degree: Vec<f64>,
    community_internal: Vec<f64>,
    community_size: Vec<usize>,
    community_count: usize,
    total_weight: f64,
}

impl<K: Eq + Hash + Clone> UndirectedCommunityStructure<K> {
    /// Build the structure with every node in its own singleton community.
    ///
    /// The snapshot must be symmetric: each non-loop edge listed from both
    /// endpoints, each self-loop listed once.
    pub fn new(graph: NeighborhoodIndex<K>) -> Self {
        let n = graph.node_count();
        let mut node_degree = vec![0.0; n];
        let mut self_loop = vec![0.0; n];

        for u in 0..n {
            for (v, w) in graph.neighbor_weights(u) {
                if v == u {
                    self_loop[u] += w;
                    node_degree[u] += 2.0 * w;
                } else {
                    node_degree[u] += w;
                }
            }
        }

        let total_weight = node_degree.iter().sum::<f64>() / 2.0;

        UndirectedCommunityStructure {
            graph,
            node_community: (0..n).collect(),
            community_degree: node_degree.clone(),
            community_internal: self_loop.clone(),
            community_size: vec![1; n],
            community_count: n,
            node_degree,
            self_loop,
            total_weight,
        }
    }

    /// Aggregate edge weight from `node` to each neighboring community.
    ///
    /// O(degree(node)). The node's own self-loop is excluded; it is
    /// accounted for separately by [`move_node`](Self::move_node).
    pub fn neighbor_community_weights(&self, node: usize) -> FxHashMap<usize, f64> {
        let mut weights = FxHashMap::default();
        for (v, w) in self.graph.neighbor_weights(node) {
            if v != node {
                *weights.entry(self.node_community[v]).or_insert(0.0) += w;
            }
        }
        weights
    }

    /// Reassign `node` to `community`, updating all sums in O(degree).
    ///
    /// Moving a node into its current community is a no-op. `community`
    /// must be an id in `0..node_count` (communities are never created,
    /// only vacated).
    pub fn move_node(&mut self, node: usize, community: usize) {
        let old = self.node_community[node];
        if old == community {
            return;
        }
        debug_assert!(community < self.node_community.len());

        let weights = self.neighbor_community_weights(node);
        let to_old = weights.get(&old).copied().unwrap_or(0.0);
        let to_new = weights.get(&community).copied().unwrap_or(0.0);

        self.community_degree[old] -= self.node_degree[node];
        self.community_internal[old] -= to_old + self.self_loop[node];
        self.community_size[old] -= 1;
        if self.community_size[old] == 0 {
            self.community_count -= 1;
        }

        if self.community_size[community] == 0 {
            self.community_count += 1;
        }
        self.community_degree[community] += self.node_degree[node];
        self.community_internal[community] += to_new + self.self_loop[node];
        self.community_size[community] += 1;

        self.node_community[node] = community;
    }

    /// Modularity gain of moving `node` into `community`, given the weight
    /// from the node to that community (as produced by
    /// [`neighbor_community_weights`](Self::neighbor_community_weights)).
    ///
    /// Exact when the node currently sits alone in its own community, which
    /// is how moving phases price candidate insertions. Zero for the
    /// current community.
    pub fn gain(&self, node: usize, community: usize, weight_to_community: f64) -> f64 {
        if community == self.node_community[node] || self.total_weight == 0.0 {
            return 0.0;
        }
        let m = self.total_weight;
        weight_to_community / m
            - self.node_degree[node] * self.community_degree[community] / (2.0 * m * m)
    }

    /// Convenience form of [`gain`](Self::gain) that aggregates the
    /// node-to-community weight itself. O(degree(node)).
    pub fn modularity_gain(&self, node: usize, community: usize) -> f64 {
        let weight = self
            .neighbor_community_weights(node)
            .get(&community)
            .copied()
            .unwrap_or(0.0);
        self.gain(node, community, weight)
    }

    /// Modularity of the current partition, from the cached sums.
    pub fn modularity(&self) -> f64 {
        let m = self.total_weight;
        if m == 0.0 {
            return 0.0;
        }
        (0..self.node_community.len())
            .filter(|&c| self.community_size[c] > 0)
            .map(|c| {
                let degree = self.community_degree[c] / (2.0 * m);
                self.community_internal[c] / m - degree * degree
            })
            .sum()
    }

    /// Coarsen the current partition into a new graph whose nodes are the
    /// occupied communities, together with a fresh singleton-community
    /// structure over it.
    ///
    /// Inter-community weights are summed; intra-community weight becomes a
    /// self-loop on the coarse node. Returns the node-to-coarse-node
    /// mapping alongside the new structure, so multi-level optimization can
    /// fold assignments back down.
    pub fn aggregate(&self) -> (Vec<usize>, UndirectedCommunityStructure<usize>) {
        let n = self.node_community.len();

        // Contiguous renumbering of occupied communities.
        let mut remap: FxHashMap<usize, usize> = FxHashMap::default();
        let mut membership = vec![0usize; n];
        for u in 0..n {
            let next = remap.len();
            membership[u] = *remap.entry(self.node_community[u]).or_insert(next);
        }
        let coarse_n = remap.len();

        let mut adjacency: Vec<FxHashMap<usize, f64>> = vec![FxHashMap::default(); coarse_n];
        let mut loops = vec![0.0; coarse_n];
        for u in 0..n {
            let cu = membership[u];
            for (v, w) in self.graph.neighbor_weights(u) {
                if v == u {
                    loops[cu] += w;
                } else if membership[v] == cu {
                    // Internal non-loop edges are listed from both
                    // endpoints; count them once.
                    if u < v {
                        loops[cu] += w;
                    }
                } else {
                    *adjacency[cu].entry(membership[v]).or_insert(0.0) += w;
                }
            }
        }

        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); coarse_n];
        let mut weights: Vec<Vec<f64>> = vec![Vec::new(); coarse_n];
        for cu in 0..coarse_n {
            if loops[cu] > 0.0 {
                outgoing[cu].push(cu);
                weights[cu].push(loops[cu]);
            }
            for (&cv, &w) in &adjacency[cu] {
                outgoing[cu].push(cv);
                weights[cu].push(w);
            }
        }

        let coarse = NeighborhoodIndex::from_adjacency(
            (0..coarse_n).collect(),
            outgoing.clone(),
            outgoing,
            Some(weights),
        );
        (membership, UndirectedCommunityStructure::new(coarse))
    }

    /// Current community assignment keyed by external node handle.
    pub fn assignments(&self) -> HashMap<K, usize> {
        self.graph
            .index_to_node
            .iter()
            .enumerate()
            .map(|(u, key)| (key.clone(), self.node_community[u]))
            .collect()
    }
}

impl<K> UndirectedCommunityStructure<K> {
    pub fn node_count(&self) -> usize {
        self.node_community.len()
    }

    /// Number of occupied communities.
    pub fn community_count(&self) -> usize {
        self.community_count
    }

    pub fn community_of(&self, node: usize) -> usize {
        self.node_community[node]
    }

    /// Weighted degree of a node (self-loops counted twice).
    pub fn node_degree(&self, node: usize) -> f64 {
        self.node_degree[node]
    }

    pub fn self_loop_weight(&self, node: usize) -> f64 {
        self.self_loop[node]
    }

    /// Sum of member degrees of a community.
    pub fn community_degree(&self, community: usize) -> f64 {
        self.community_degree[community]
    }

    /// Total weight of edges with both endpoints inside a community.
    pub fn internal_weight(&self, community: usize) -> f64 {
        self.community_internal[community]
    }

    /// Total graph weight `m`, fixed at construction.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// The snapshot this structure was built over.
    pub fn graph(&self) -> &NeighborhoodIndex<K> {
        &self.graph
    }
}

/// Community aggregates over a directed snapshot.
///
/// Built from an out-CSR with weights; the weighted transpose is derived
/// internally. A self-loop contributes once to its node's in-degree and
/// once to its out-degree.
pub struct DirectedCommunityStructure<K> {
    graph: NeighborhoodIndex<K>,
    in_offsets: Vec<usize>,
    in_sources: Vec<usize>,
    in_weights: Vec<f64>,
    node_community: Vec<usize>,
    node_in_degree: Vec<f64>,
    node_out_degree: Vec<f64>,
    self_loop: Vec<f64>,
    community_in_degree: Vec<f64>,
    community_out_degree: Vec<f64>,
    community_internal: Vec<f64>,
    community_size: Vec<usize>,
    community_count: usize,
    total_weight: f64,
}

impl<K: Eq + Hash + Clone> DirectedCommunityStructure<K> {
    /// Build the structure with every node in its own singleton community.
    pub fn new(graph: NeighborhoodIndex<K>) -> Self {
        let n = graph.node_count();

        // Weighted transpose, plus degree and loop totals, in one sweep.
        let mut in_counts = vec![0usize; n];
        for u in 0..n {
            for &v in graph.successors(u) {
                in_counts[v] += 1;
            }
        }
        let mut in_offsets = Vec::with_capacity(n + 1);
        in_offsets.push(0);
        for u in 0..n {
            in_offsets.push(in_offsets[u] + in_counts[u]);
        }
        let total_entries = in_offsets[n];
        let mut in_sources = vec![0usize; total_entries];
        let mut in_weights = vec![0.0; total_entries];
        let mut cursor = in_offsets[..n].to_vec();

        let mut node_in_degree = vec![0.0; n];
        let mut node_out_degree = vec![0.0; n];
        let mut self_loop = vec![0.0; n];
        let mut total_weight = 0.0;

        for u in 0..n {
            for (v, w) in graph.neighbor_weights(u) {
                in_sources[cursor[v]] = u;
                in_weights[cursor[v]] = w;
                cursor[v] += 1;

                node_out_degree[u] += w;
                node_in_degree[v] += w;
                if u == v {
                    self_loop[u] += w;
                }
                total_weight += w;
            }
        }

        DirectedCommunityStructure {
            graph,
            in_offsets,
            in_sources,
            in_weights,
            node_community: (0..n).collect(),
            community_in_degree: node_in_degree.clone(),
            community_out_degree: node_out_degree.clone(),
            community_internal: self_loop.clone(),
            community_size: vec![1; n],
            community_count: n,
            node_in_degree,
            node_out_degree,
            self_loop,
            total_weight,
        }
    }

    fn in_entries(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.in_offsets[node];
        let end = self.in_offsets[node + 1];
        (start..end).map(move |slot| (self.in_sources[slot], self.in_weights[slot]))
    }

    /// Aggregate edge weight between `node` and each neighboring community,
    /// both directions combined. O(degree(node)).
    pub fn neighbor_community_weights(&self, node: usize) -> FxHashMap<usize, f64> {
        let mut weights = FxHashMap::default();
        for (v, w) in self.graph.neighbor_weights(node) {
            if v != node {
                *weights.entry(self.node_community[v]).or_insert(0.0) += w;
            }
        }
        for (v, w) in self.in_entries(node) {
            if v != node {
                *weights.entry(self.node_community[v]).or_insert(0.0) += w;
            }
        }
        weights
    }

    /// Reassign `node` to `community`, updating all sums in O(degree).
    ///
    /// Moving a node into its current community is a no-op.
    pub fn move_node(&mut self, node: usize, community: usize) {
        let old = self.node_community[node];
        if old == community {
            return;
        }
        debug_assert!(community < self.node_community.len());

        let weights = self.neighbor_community_weights(node);
        let to_old = weights.get(&old).copied().unwrap_or(0.0);
        let to_new = weights.get(&community).copied().unwrap_or(0.0);

        self.community_in_degree[old] -= self.node_in_degree[node];
        self.community_out_degree[old] -= self.node_out_degree[node];
        self.community_internal[old] -= to_old + self.self_loop[node];
        self.community_size[old] -= 1;
        if self.community_size[old] == 0 {
            self.community_count -= 1;
        }

        if self.community_size[community] == 0 {
            self.community_count += 1;
        }
        self.community_in_degree[community] += self.node_in_degree[node];
        self.community_out_degree[community] += self.node_out_degree[node];
        self.community_internal[community] += to_new + self.self_loop[node];
        self.community_size[community] += 1;

        self.node_community[node] = community;
    }

    /// Directed modularity gain of moving `node` into `community`, given
    /// the combined both-direction weight from the node to that community.
    /// Zero for the current community.
    pub fn gain(&self, node: usize, community: usize, weight_to_community: f64) -> f64 {
        if community == self.node_community[node] || self.total_weight == 0.0 {
            return 0.0;
        }
        let m = self.total_weight;
        weight_to_community / m
            - (self.node_out_degree[node] * self.community_in_degree[community]
                + self.node_in_degree[node] * self.community_out_degree[community])
                / (m * m)
    }

    /// Convenience form of [`gain`](Self::gain). O(degree(node)).
    pub fn modularity_gain(&self, node: usize, community: usize) -> f64 {
        let weight = self
            .neighbor_community_weights(node)
            .get(&community)
            .copied()
            .unwrap_or(0.0);
        self.gain(node, community, weight)
    }

    /// Directed modularity of the current partition.
    pub fn modularity(&self) -> f64 {
        let m = self.total_weight;
        if m == 0.0 {
            return 0.0;
        }
        (0..self.node_community.len())
            .filter(|&c| self.community_size[c] > 0)
            .map(|c| {
                self.community_internal[c] / m
                    - self.community_in_degree[c] * self.community_out_degree[c] / (m * m)
            })
            .sum()
    }

    /// Coarsen the current partition; see
    /// [`UndirectedCommunityStructure::aggregate`].
    pub fn aggregate(&self) -> (Vec<usize>, DirectedCommunityStructure<usize>) {
        let n = self.node_community.len();

        let mut remap: FxHashMap<usize, usize> = FxHashMap::default();
        let mut membership = vec![0usize; n];
        for u in 0..n {
            let next = remap.len();
            membership[u] = *remap.entry(self.node_community[u]).or_insert(next);
        }
        let coarse_n = remap.len();

        let mut adjacency: Vec<FxHashMap<usize, f64>> = vec![FxHashMap::default(); coarse_n];
        let mut loops = vec![0.0; coarse_n];
        for u in 0..n {
            let cu = membership[u];
            // Each directed edge is listed exactly once in the out-CSR.
            for (v, w) in self.graph.neighbor_weights(u) {
                let cv = membership[v];
                if cu == cv {
                    loops[cu] += w;
                } else {
                    *adjacency[cu].entry(cv).or_insert(0.0) += w;
                }
            }
        }

        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); coarse_n];
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); coarse_n];
        let mut weights: Vec<Vec<f64>> = vec![Vec::new(); coarse_n];
        for cu in 0..coarse_n {
            if loops[cu] > 0.0 {
                outgoing[cu].push(cu);
                incoming[cu].push(cu);
                weights[cu].push(loops[cu]);
            }
            for (&cv, &w) in &adjacency[cu] {
                outgoing[cu].push(cv);
                incoming[cv].push(cu);
                weights[cu].push(w);
            }
        }

        let coarse = NeighborhoodIndex::from_adjacency(
            (0..coarse_n).collect(),
            outgoing,
            incoming,
            Some(weights),
        );
        (membership, DirectedCommunityStructure::new(coarse))
    }

    /// Current community assignment keyed by external node handle.
    pub fn assignments(&self) -> HashMap<K, usize> {
        self.graph
            .index_to_node
            .iter()
            .enumerate()
            .map(|(u, key)| (key.clone(), self.node_community[u]))
            .collect()
    }
}

impl<K> DirectedCommunityStructure<K> {
    pub fn node_count(&self) -> usize {
        self.node_community.len()
    }

    pub fn community_count(&self) -> usize {
        self.community_count
    }

    pub fn community_of(&self, node: usize) -> usize {
        self.node_community[node]
    }

    pub fn node_in_degree(&self, node: usize) -> f64 {
        self.node_in_degree[node]
    }

    pub fn node_out_degree(&self, node: usize) -> f64 {
        self.node_out_degree[node]
    }

    pub fn self_loop_weight(&self, node: usize) -> f64 {
        self.self_loop[node]
    }

    pub fn community_in_degree(&self, community: usize) -> f64 {
        self.community_in_degree[community]
    }

    pub fn community_out_degree(&self, community: usize) -> f64 {
        self.community_out_degree[community]
    }

    pub fn internal_weight(&self, community: usize) -> f64 {
        self.community_internal[community]
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn graph(&self) -> &NeighborhoodIndex<K> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    /// Symmetric path a - b - c, unit weights.
    fn path() -> UndirectedCommunityStructure<&'static str> {
        let index = NeighborhoodIndex::from_adjacency(
            vec!["a", "b", "c"],
            vec![vec![1], vec![0, 2], vec![1]],
            vec![vec![1], vec![0, 2], vec![1]],
            None,
        );
        UndirectedCommunityStructure::new(index)
    }

    #[test]
    fn init_is_singleton_partition() {
        let structure = path();
        assert_eq!(structure.community_count(), 3);
        assert_eq!(structure.node_degree(1), 2.0);
        assert_eq!(structure.community_degree(1), 2.0);
        assert_eq!(structure.internal_weight(0), 0.0);
        assert!((structure.total_weight() - 2.0).abs() < EPSILON);
    }

    #[test]
    fn neighbor_weights_aggregate_by_community() {
        let mut structure = path();
        structure.move_node(2, 0);

        let weights = structure.neighbor_community_weights(1);
        // Both neighbors of b now live in community 0.
        assert_eq!(weights.len(), 1);
        assert!((weights[&0] - 2.0).abs() < EPSILON);
    }

    #[test]
    fn move_updates_sums() {
        let mut structure = path();
        structure.move_node(1, 0);

        assert_eq!(structure.community_of(1), 0);
        assert_eq!(structure.community_count(), 2);
        assert!((structure.community_degree(0) - 3.0).abs() < EPSILON);
        assert!((structure.internal_weight(0) - 1.0).abs() < EPSILON);
        assert!((structure.community_degree(1) - 0.0).abs() < EPSILON);

        let assignments = structure.assignments();
        assert_eq!(assignments[&"a"], 0);
        assert_eq!(assignments[&"b"], 0);
        assert_eq!(assignments[&"c"], 2);
    }

    #[test]
    fn move_and_move_back_is_identity() {
        let mut structure = path();
        let degrees: Vec<f64> = (0..3).map(|c| structure.community_degree(c)).collect();
        let internals: Vec<f64> = (0..3).map(|c| structure.internal_weight(c)).collect();

        structure.move_node(1, 2);
        structure.move_node(1, 1);

        for c in 0..3 {
            assert!((structure.community_degree(c) - degrees[c]).abs() < EPSILON);
            assert!((structure.internal_weight(c) - internals[c]).abs() < EPSILON);
        }
        assert_eq!(structure.community_count(), 3);
    }

    #[test]
    fn move_into_current_community_is_noop() {
        let mut structure = path();
        let before = structure.modularity();
        structure.move_node(1, 1);
        assert_eq!(structure.community_of(1), 1);
        assert!((structure.modularity() - before).abs() < EPSILON);
        assert!(structure.modularity_gain(1, 1).abs() < EPSILON);
    }

    #[test]
    fn gain_matches_modularity_delta_for_singleton() {
        let mut structure = path();
        let predicted = structure.modularity_gain(0, 1);
        let before = structure.modularity();
        structure.move_node(0, 1);
        let observed = structure.modularity() - before;
        assert!((predicted - observed).abs() < EPSILON);
    }

    #[test]
    fn undirected_self_loop_counts_twice_in_degree() {
        let index = NeighborhoodIndex::from_adjacency(
            vec!["a", "b"],
            vec![vec![0, 1], vec![0]],
            vec![vec![0, 1], vec![0]],
            Some(vec![vec![3.0, 1.0], vec![1.0]]),
        );
        let structure = UndirectedCommunityStructure::new(index);

        assert!((structure.node_degree(0) - 7.0).abs() < EPSILON);
        assert!((structure.self_loop_weight(0) - 3.0).abs() < EPSILON);
        // m = loop + edge
        assert!((structure.total_weight() - 4.0).abs() < EPSILON);
        assert!((structure.internal_weight(0) - 3.0).abs() < EPSILON);
    }

    #[test]
    fn aggregate_preserves_weight_and_modularity() {
        let mut structure = path();
        structure.move_node(1, 0);

        let fine_modularity = structure.modularity();
        let (membership, coarse) = structure.aggregate();

        assert_eq!(coarse.node_count(), 2);
        assert_eq!(membership[0], membership[1]);
        assert_ne!(membership[0], membership[2]);
        assert!((coarse.total_weight() - structure.total_weight()).abs() < EPSILON);
        // Singleton partition of the coarse graph is the fine partition.
        assert!((coarse.modularity() - fine_modularity).abs() < EPSILON);
        // Intra-community weight became a self-loop.
        let merged = membership[0];
        assert!((coarse.self_loop_weight(merged) - 1.0).abs() < EPSILON);
    }

    /// Directed cycle a -> b -> c -> a.
    fn cycle() -> DirectedCommunityStructure<&'static str> {
        let index = NeighborhoodIndex::from_adjacency(
            vec!["a", "b", "c"],
            vec![vec![1], vec![2], vec![0]],
            vec![vec![2], vec![0], vec![1]],
            None,
        );
        DirectedCommunityStructure::new(index)
    }

    #[test]
    fn directed_init_and_degrees() {
        let structure = cycle();
        assert_eq!(structure.community_count(), 3);
        assert!((structure.node_in_degree(0) - 1.0).abs() < EPSILON);
        assert!((structure.node_out_degree(0) - 1.0).abs() < EPSILON);
        assert!((structure.total_weight() - 3.0).abs() < EPSILON);

        let assignments = structure.assignments();
        assert_eq!(assignments.len(), 3);
        assert_ne!(assignments[&"a"], assignments[&"b"]);
    }

    #[test]
    fn directed_self_loop_counts_once_per_direction() {
        let index = NeighborhoodIndex::from_adjacency(
            vec!["a"],
            vec![vec![0]],
            vec![vec![0]],
            Some(vec![vec![2.0]]),
        );
        let structure = DirectedCommunityStructure::new(index);

        assert!((structure.node_in_degree(0) - 2.0).abs() < EPSILON);
        assert!((structure.node_out_degree(0) - 2.0).abs() < EPSILON);
        assert!((structure.self_loop_weight(0) - 2.0).abs() < EPSILON);
        assert!((structure.internal_weight(0) - 2.0).abs() < EPSILON);
    }

    #[test]
    fn directed_move_and_move_back_is_identity() {
        let mut structure = cycle();
        structure.move_node(0, 2);
        structure.move_node(0, 0);

        for c in 0..3 {
            assert!((structure.community_in_degree(c) - 1.0).abs() < EPSILON);
            assert!((structure.community_out_degree(c) - 1.0).abs() < EPSILON);
        }
        assert!((structure.internal_weight(0) - 0.0).abs() < EPSILON);
    }

    #[test]
    fn directed_gain_matches_modularity_delta_for_singleton() {
        let mut structure = cycle();
        let predicted = structure.modularity_gain(0, 1);
        let before = structure.modularity();
        structure.move_node(0, 1);
        let observed = structure.modularity() - before;
        assert!((predicted - observed).abs() < EPSILON);
    }

    #[test]
    fn directed_aggregate_preserves_weight_and_modularity() {
        let mut structure = cycle();
        structure.move_node(1, 0);

        let fine_modularity = structure.modularity();
        let (membership, coarse) = structure.aggregate();

        assert_eq!(coarse.node_count(), 2);
        assert_eq!(membership[0], membership[1]);
        assert!((coarse.total_weight() - 3.0).abs() < EPSILON);
        assert!((coarse.modularity() - fine_modularity).abs() < EPSILON);
        // a -> b became internal.
        assert!((coarse.self_loop_weight(membership[0]) - 1.0).abs() < EPSILON);
    }
}
