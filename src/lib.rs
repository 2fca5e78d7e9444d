//! Trellis: an in-memory multigraph engine.
//!
//! One store, four graph flavors: directed, undirected and mixed graphs,
//! each optionally a multigraph, with attributed nodes and edges behind a
//! single coherent API. Derived, disposable indices turn the store's
//! general-purpose representation into specialized layouts for repeated
//! computation: CSR neighborhoods for traversal, union-find components for
//! connectivity queries, and incrementally-updatable community structures
//! for modularity optimization.
//!
//! # Example
//!
//! ```rust
//! use trellis::graph::GraphStore;
//! use trellis::indices::build_components;
//!
//! let mut store = GraphStore::directed();
//! store.add_node("a").unwrap();
//! store.add_node("b").unwrap();
//! store.add_node("c").unwrap();
//! store.add_edge("a", "b").unwrap();
//! store.add_edge("b", "c").unwrap();
//!
//! assert_eq!(store.order(), 3);
//! assert_eq!(store.size(), 2);
//!
//! // Connectivity ignores edge direction.
//! let components = build_components(&store);
//! assert_eq!(
//!     components.component_of(&"a".into()),
//!     components.component_of(&"c".into()),
//! );
//! ```
//!
//! # Execution model
//!
//! Single-threaded and synchronous: no operation blocks, no internal
//! locking. Change notifications are delivered in the same call stack as
//! the mutation. Indices are built from a point-in-time read of the store
//! and never track later mutations.

#![warn(clippy::all)]

pub mod graph;
pub mod indices;

// Re-export main types for convenience
pub use graph::{
    AttrMap, AttrUpdate, AttrValue, ErrorKind, EventKind, GraphError, GraphEvent, GraphKind,
    GraphOptions, GraphResult, GraphStore, Key, ObserverId, SerializedGraph,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.3.0");
    }
}
