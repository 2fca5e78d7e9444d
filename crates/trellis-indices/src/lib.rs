//! Low-level graph indices for Trellis.
//!
//! Everything here operates on dense, point-in-time snapshots: the graph
//! store projects itself into a [`NeighborhoodIndex`] and the index types
//! never reach back. Three families:
//!
//! - [`NeighborhoodIndex`]: flattened CSR adjacency for cache-friendly
//!   repeated traversal;
//! - [`ConnectedComponentsIndex`]: union-find partition, built once,
//!   queried in O(1);
//! - [`UndirectedCommunityStructure`] / [`DirectedCommunityStructure`]:
//!   incrementally-updatable community aggregates for modularity
//!   optimization, with [`louvain`] as the driver on top.

pub mod community;
pub mod components;
pub mod louvain;
pub mod neighborhood;

pub use community::{DirectedCommunityStructure, UndirectedCommunityStructure};
pub use components::ConnectedComponentsIndex;
pub use louvain::{louvain, LouvainConfig, LouvainResult};
pub use neighborhood::NeighborhoodIndex;
