//! The graph store: entity model, mutation API and consistency invariants.
//!
//! [`GraphStore`] supports directed, undirected and mixed multigraphs with
//! attributed nodes and edges behind one coherent API. It is the sole
//! source of truth; the indices in [`crate::indices`] are derived,
//! disposable projections built from point-in-time reads.

pub mod attributes;
pub(crate) mod edge;
pub mod event;
pub(crate) mod node;
pub mod serialization;
pub mod store;
pub mod types;

pub use attributes::{attrs, AttrMap, AttrValue};
pub use event::{AttrUpdate, EventKind, GraphEvent, ObserverId};
pub use serialization::{SerializedEdge, SerializedGraph, SerializedNode};
pub use store::{ErrorKind, GraphError, GraphOptions, GraphResult, GraphStore};
pub use types::{GraphKind, Key};
