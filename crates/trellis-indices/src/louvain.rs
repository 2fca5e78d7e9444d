//! Multi-level modularity optimization over community structures.
//!
//! A thin driver: all aggregate state lives in
//! [`UndirectedCommunityStructure`]; this module only schedules the local
//! moving phases and the coarsening steps between them.

use std::collections::HashMap;
use std::hash::Hash;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::community::UndirectedCommunityStructure;
use crate::neighborhood::NeighborhoodIndex;

/// Tuning knobs for [`louvain`].
#[derive(Debug, Clone)]
pub struct LouvainConfig {
    /// Maximum number of passes (one pass = one moving phase, at any
    /// level). Default: 10.
    pub max_passes: usize,

    /// Minimum modularity improvement between levels to keep going.
    /// Default: 1e-4.
    pub tolerance: f64,

    /// Seed for the node visit order. `None` visits nodes in snapshot
    /// order, which is deterministic.
    pub seed: Option<u64>,
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self { max_passes: 10, tolerance: 1e-4, seed: None }
    }
}

impl LouvainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Result of [`louvain`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LouvainResult<K: Eq + Hash> {
    /// Final community per node, renumbered contiguously from 0.
    pub assignments: HashMap<K, usize>,

    /// Number of moving phases performed across all levels.
    pub passes: usize,

    /// Modularity of the final partition.
    pub modularity: f64,

    /// Number of distinct communities in the final partition.
    pub community_count: usize,
}

/// One complete local moving phase: sweep nodes (optionally in shuffled
/// order) and greedily apply the best positive-gain move until a full sweep
/// changes nothing. Returns whether any node moved.
fn local_moving<K: Eq + Hash + Clone>(
    structure: &mut UndirectedCommunityStructure<K>,
    rng: &mut Option<StdRng>,
) -> bool {
    let n = structure.node_count();
    let m = structure.total_weight();
    if m == 0.0 {
        return false;
    }

    let mut order: Vec<usize> = (0..n).collect();
    if let Some(rng) = rng.as_mut() {
        order.shuffle(rng);
    }

    let mut moved_any = false;
    let mut changed = true;
    while changed {
        changed = false;

        for &node in &order {
            let current = structure.community_of(node);
            let weights = structure.neighbor_community_weights(node);
            let degree = structure.node_degree(node);
            let to_current = weights.get(&current).copied().unwrap_or(0.0);
            // Community totals with the node itself removed, so candidate
            // deltas price the full remove-then-insert.
            let residual = structure.community_degree(current) - degree;

            let mut best = current;
            let mut best_delta = 0.0;
            for (&candidate, &weight) in &weights {
                if candidate == current {
                    continue;
                }
                let delta = (weight - to_current) / m
                    - degree * (structure.community_degree(candidate) - residual)
                        / (2.0 * m * m);
                if delta > best_delta {
                    best_delta = delta;
                    best = candidate;
                }
            }

            if best != current {
                structure.move_node(node, best);
                changed = true;
                moved_any = true;
            }
        }
    }

    moved_any
}

/// Detect communities by multi-level modularity optimization.
///
/// The snapshot must be symmetric (each edge visible from both endpoints,
/// self-loops listed once), as produced for
/// [`UndirectedCommunityStructure`].
pub fn louvain<K: Eq + Hash + Clone>(
    index: NeighborhoodIndex<K>,
    config: &LouvainConfig,
) -> LouvainResult<K> {
    let keys = index.index_to_node.clone();
    let mut rng = config.seed.map(StdRng::seed_from_u64);

    let mut structure = UndirectedCommunityStructure::new(index);
    if structure.total_weight() == 0.0 {
        // No edges: the singleton partition is already optimal.
        let count = keys.len();
        let assignments = keys.into_iter().enumerate().map(|(i, k)| (k, i)).collect();
        return LouvainResult { assignments, passes: 0, modularity: 0.0, community_count: count };
    }

    let mut passes = 0;
    local_moving(&mut structure, &mut rng);
    passes += 1;
    let mut modularity = structure.modularity();

    let (mut membership, mut coarse) = structure.aggregate();

    while passes < config.max_passes {
        let moved = local_moving(&mut coarse, &mut rng);
        passes += 1;
        let quality = coarse.modularity();
        if !moved || quality - modularity < config.tolerance {
            modularity = quality;
            break;
        }
        modularity = quality;

        let (step, next) = coarse.aggregate();
        for slot in membership.iter_mut() {
            *slot = step[*slot];
        }
        coarse = next;
    }

    // Fold the last level's (possibly un-aggregated) moves down to the
    // original nodes and renumber contiguously.
    let mut remap: HashMap<usize, usize> = HashMap::new();
    let mut assignments = HashMap::with_capacity(keys.len());
    for (node, key) in keys.into_iter().enumerate() {
        let community = coarse.community_of(membership[node]);
        let next = remap.len();
        let id = *remap.entry(community).or_insert(next);
        assignments.insert(key, id);
    }

    LouvainResult { assignments, passes, modularity, community_count: remap.len() }
}
