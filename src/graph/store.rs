//! In-memory multigraph storage.
//!
//! [`GraphStore`] owns nodes, edges, attributes and the adjacency relation,
//! and is the sole source of truth: the indices under `crate::indices` are
//! derived, disposable projections of it. All structural invariants are
//! enforced here, at the mutation boundary; a failed operation leaves the
//! store exactly as it was before the call.
//!
//! The execution model is single-threaded and synchronous. There is no
//! internal locking; concurrent mutation must be serialized by the caller.

use indexmap::IndexMap;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

use super::attributes::{AttrMap, AttrValue};
use super::edge::EdgeData;
use super::event::{AttrUpdate, EventKind, GraphEvent, ObserverId, ObserverRegistry};
use super::node::{NodeData, Slot};
use super::types::{GraphKind, Key};

/// Errors raised by [`GraphStore`] operations.
///
/// Messages name the offending method and, where one exists, the correct
/// alternative. Use [`GraphError::kind`] for the coarse taxonomy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("{method}: node \"{key}\" not found")]
    NodeNotFound { method: &'static str, key: Key },

    #[error("{method}: edge \"{key}\" not found")]
    EdgeNotFound { method: &'static str, key: Key },

    #[error("{method}: no edge between \"{src}\" and \"{target}\"")]
    NoEdgeBetween { method: &'static str, src: Key, target: Key },

    #[error("{method}: node \"{key}\" already exists")]
    NodeAlreadyExists { method: &'static str, key: Key },

    #[error("{method}: edge \"{key}\" already exists")]
    EdgeAlreadyExists { method: &'static str, key: Key },

    #[error("{method}: self-loop on \"{key}\" rejected, this graph was built without self-loops")]
    SelfLoopNotAllowed { method: &'static str, key: Key },

    #[error(
        "{method}: an edge between \"{src}\" and \"{target}\" already exists, \
         and this graph is not a multigraph"
    )]
    ParallelEdgeNotAllowed { method: &'static str, src: Key, target: Key },

    #[error("{method}: this graph is {kind}; use {hint} instead")]
    WrongGraphKind { method: &'static str, kind: GraphKind, hint: &'static str },

    #[error("{method}: ambiguous on a multigraph; use {hint} instead")]
    AmbiguousOnMultigraph { method: &'static str, hint: &'static str },

    #[error("{method}: {reason}")]
    InvalidArgument { method: &'static str, reason: String },
}

/// Coarse error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced node or edge does not exist.
    NotFound,
    /// The operation is structurally inconsistent with the store's
    /// configuration.
    Usage,
    /// Malformed input where coercion cannot apply.
    InvalidArgument,
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::NodeNotFound { .. }
            | GraphError::EdgeNotFound { .. }
            | GraphError::NoEdgeBetween { .. } => ErrorKind::NotFound,
            GraphError::NodeAlreadyExists { .. }
            | GraphError::EdgeAlreadyExists { .. }
            | GraphError::SelfLoopNotAllowed { .. }
            | GraphError::ParallelEdgeNotAllowed { .. }
            | GraphError::WrongGraphKind { .. }
            | GraphError::AmbiguousOnMultigraph { .. } => ErrorKind::Usage,
            GraphError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Construction-time configuration. Immutable for the life of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GraphOptions {
    pub kind: GraphKind,
    /// Allow more than one edge between the same node pair (per
    /// directedness; unordered pair for undirected edges).
    #[serde(default)]
    pub multi: bool,
    /// Allow edges whose source and target are the same node.
    #[serde(default = "default_self_loops")]
    pub self_loops: bool,
}

fn default_self_loops() -> bool {
    true
}

impl Default for GraphOptions {
    fn default() -> Self {
        GraphOptions { kind: GraphKind::Mixed, multi: false, self_loops: true }
    }
}

impl GraphOptions {
    pub fn directed() -> Self {
        GraphOptions { kind: GraphKind::Directed, ..Default::default() }
    }

    pub fn undirected() -> Self {
        GraphOptions { kind: GraphKind::Undirected, ..Default::default() }
    }

    pub fn mixed() -> Self {
        Self::default()
    }

    pub const fn with_multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub const fn with_self_loops(mut self, self_loops: bool) -> Self {
        self.self_loops = self_loops;
        self
    }
}

/// In-memory graph store for directed, undirected and mixed multigraphs
/// with attributed nodes and edges.
///
/// Keys are canonical strings ([`Key`]); coercion happens once at the API
/// boundary. Creation methods return the created key; other mutators
/// return the store for chaining. No iteration order is guaranteed beyond
/// what individual operations document.
///
/// ```
/// use trellis::graph::GraphStore;
///
/// let mut store = GraphStore::mixed();
/// store.add_node("alice").unwrap();
/// store.add_node("bob").unwrap();
/// let edge = store.add_edge("alice", "bob").unwrap();
///
/// assert_eq!(store.order(), 2);
/// assert!(store.has_edge(&edge));
/// assert!(store.is_directed_edge(&edge).unwrap());
/// ```
#[derive(Debug, Default)]
pub struct GraphStore {
    options: GraphOptions,
    attributes: AttrMap,
    nodes: IndexMap<Key, NodeData>,
    edges: IndexMap<Key, EdgeData>,
    observers: ObserverRegistry,
    edge_key_counter: u64,
}

impl GraphStore {
    /// Create an empty store with the given configuration.
    pub fn new(options: GraphOptions) -> Self {
        GraphStore { options, ..Default::default() }
    }

    /// A store accepting only directed edges.
    pub fn directed() -> Self {
        Self::new(GraphOptions::directed())
    }

    /// A store accepting only undirected edges.
    pub fn undirected() -> Self {
        Self::new(GraphOptions::undirected())
    }

    /// A store accepting both directed and undirected edges.
    pub fn mixed() -> Self {
        Self::new(GraphOptions::mixed())
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn kind(&self) -> GraphKind {
        self.options.kind
    }

    pub fn is_multi(&self) -> bool {
        self.options.multi
    }

    pub fn allows_self_loops(&self) -> bool {
        self.options.self_loops
    }

    /// Number of nodes.
    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn size(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ============================================================
    // Mutation
    // ============================================================

    /// Add a node. Fails if the key is already taken.
    pub fn add_node(&mut self, key: impl Into<Key>) -> GraphResult<Key> {
        self.add_node_with_attributes(key, AttrMap::new())
    }

    pub fn add_node_with_attributes(
        &mut self,
        key: impl Into<Key>,
        attributes: AttrMap,
    ) -> GraphResult<Key> {
        let key = key.into();
        if self.nodes.contains_key(&key) {
            return Err(GraphError::NodeAlreadyExists { method: "add_node", key });
        }
        self.nodes.insert(key.clone(), NodeData::new(attributes));
        self.emit_event(GraphEvent::NodeAdded { key: key.clone() });
        Ok(key)
    }

    /// Add an edge with a generated key. Resolves to a directed edge
    /// unless the store is undirected.
    pub fn add_edge(
        &mut self,
        source: impl Into<Key>,
        target: impl Into<Key>,
    ) -> GraphResult<Key> {
        let directed = self.options.kind != GraphKind::Undirected;
        self.add_edge_inner("add_edge", None, source.into(), target.into(), directed, AttrMap::new())
    }

    pub fn add_edge_with_attributes(
        &mut self,
        source: impl Into<Key>,
        target: impl Into<Key>,
        attributes: AttrMap,
    ) -> GraphResult<Key> {
        let directed = self.options.kind != GraphKind::Undirected;
        self.add_edge_inner("add_edge", None, source.into(), target.into(), directed, attributes)
    }

    pub fn add_edge_with_key(
        &mut self,
        key: impl Into<Key>,
        source: impl Into<Key>,
        target: impl Into<Key>,
        attributes: AttrMap,
    ) -> GraphResult<Key> {
        let directed = self.options.kind != GraphKind::Undirected;
        self.add_edge_inner(
            "add_edge_with_key",
            Some(key.into()),
            source.into(),
            target.into(),
            directed,
            attributes,
        )
    }

    pub fn add_directed_edge(
        &mut self,
        source: impl Into<Key>,
        target: impl Into<Key>,
    ) -> GraphResult<Key> {
        self.add_edge_inner(
            "add_directed_edge",
            None,
            source.into(),
            target.into(),
            true,
            AttrMap::new(),
        )
    }

    pub fn add_directed_edge_with_attributes(
        &mut self,
        source: impl Into<Key>,
        target: impl Into<Key>,
        attributes: AttrMap,
    ) -> GraphResult<Key> {
        self.add_edge_inner("add_directed_edge", None, source.into(), target.into(), true, attributes)
    }

    pub fn add_directed_edge_with_key(
        &mut self,
        key: impl Into<Key>,
        source: impl Into<Key>,
        target: impl Into<Key>,
        attributes: AttrMap,
    ) -> GraphResult<Key> {
        self.add_edge_inner(
            "add_directed_edge_with_key",
            Some(key.into()),
            source.into(),
            target.into(),
            true,
            attributes,
        )
    }

    pub fn add_undirected_edge(
        &mut self,
        source: impl Into<Key>,
        target: impl Into<Key>,
    ) -> GraphResult<Key> {
        self.add_edge_inner(
            "add_undirected_edge",
            None,
            source.into(),
            target.into(),
            false,
            AttrMap::new(),
        )
    }

    pub fn add_undirected_edge_with_attributes(
        &mut self,
        source: impl Into<Key>,
        target: impl Into<Key>,
        attributes: AttrMap,
    ) -> GraphResult<Key> {
        self.add_edge_inner(
            "add_undirected_edge",
            None,
            source.into(),
            target.into(),
            false,
            attributes,
        )
    }

    pub fn add_undirected_edge_with_key(
        &mut self,
        key: impl Into<Key>,
        source: impl Into<Key>,
        target: impl Into<Key>,
        attributes: AttrMap,
    ) -> GraphResult<Key> {
        self.add_edge_inner(
            "add_undirected_edge_with_key",
            Some(key.into()),
            source.into(),
            target.into(),
            false,
            attributes,
        )
    }

    fn add_edge_inner(
        &mut self,
        method: &'static str,
        key: Option<Key>,
        source: Key,
        target: Key,
        directed: bool,
        attributes: AttrMap,
    ) -> GraphResult<Key> {
        if directed && !self.options.kind.accepts_directed() {
            return Err(GraphError::WrongGraphKind {
                method,
                kind: self.options.kind,
                hint: "add_undirected_edge or add_edge",
            });
        }
        if !directed && !self.options.kind.accepts_undirected() {
            return Err(GraphError::WrongGraphKind {
                method,
                kind: self.options.kind,
                hint: "add_directed_edge or add_edge",
            });
        }
        if !self.nodes.contains_key(&source) {
            return Err(GraphError::NodeNotFound { method, key: source });
        }
        if !self.nodes.contains_key(&target) {
            return Err(GraphError::NodeNotFound { method, key: target });
        }
        if source == target && !self.options.self_loops {
            return Err(GraphError::SelfLoopNotAllowed { method, key: source });
        }
        if !self.options.multi && self.pair_occupied(&source, &target, directed) {
            return Err(GraphError::ParallelEdgeNotAllowed { method, src: source, target });
        }

        let (key, generated) = match key {
            Some(key) => {
                if self.edges.contains_key(&key) {
                    return Err(GraphError::EdgeAlreadyExists { method, key });
                }
                (key, false)
            }
            None => (self.generate_edge_key(), true),
        };

        if source == target {
            self.nodes[&source].attach_loop(directed, key.clone());
        } else if directed {
            self.nodes[&source].attach(Slot::Out, target.clone(), key.clone());
            self.nodes[&target].attach(Slot::In, source.clone(), key.clone());
        } else {
            self.nodes[&source].attach(Slot::Undirected, target.clone(), key.clone());
            self.nodes[&target].attach(Slot::Undirected, source.clone(), key.clone());
        }
        self.edges.insert(key.clone(), EdgeData::new(source, target, directed, generated, attributes));
        self.emit_event(GraphEvent::EdgeAdded { key: key.clone() });
        Ok(key)
    }

    /// Drop a node and, atomically, every edge incident to it.
    pub fn drop_node(&mut self, key: impl Into<Key>) -> GraphResult<&mut Self> {
        let key = key.into();
        let incident = match self.nodes.get(&key) {
            Some(node) => node.incident_edges(),
            None => return Err(GraphError::NodeNotFound { method: "drop_node", key }),
        };
        for edge_key in incident {
            self.drop_edge_inner("drop_node", edge_key)?;
        }
        self.nodes.swap_remove(&key);
        self.emit_event(GraphEvent::NodeDropped { key });
        Ok(self)
    }

    /// Drop a single edge.
    pub fn drop_edge(&mut self, key: impl Into<Key>) -> GraphResult<&mut Self> {
        self.drop_edge_inner("drop_edge", key.into())?;
        Ok(self)
    }

    fn drop_edge_inner(&mut self, method: &'static str, key: Key) -> GraphResult<()> {
        let edge = match self.edges.swap_remove(&key) {
            Some(edge) => edge,
            None => return Err(GraphError::EdgeNotFound { method, key }),
        };
        if edge.is_loop() {
            self.nodes[&edge.source].detach_loop(edge.directed, &key);
        } else if edge.directed {
            self.nodes[&edge.source].detach(Slot::Out, &edge.target, &key);
            self.nodes[&edge.target].detach(Slot::In, &edge.source, &key);
        } else {
            self.nodes[&edge.source].detach(Slot::Undirected, &edge.target, &key);
            self.nodes[&edge.target].detach(Slot::Undirected, &edge.source, &key);
        }
        self.emit_event(GraphEvent::EdgeDropped { key });
        Ok(())
    }

    /// Drop every node and edge. Graph-level attributes are kept.
    pub fn clear(&mut self) -> &mut Self {
        self.nodes.clear();
        self.edges.clear();
        debug!("cleared graph store");
        self.emit_event(GraphEvent::Cleared);
        self
    }

    // ============================================================
    // Existence and pair queries
    // ============================================================

    pub fn has_node(&self, key: impl Into<Key>) -> bool {
        self.nodes.contains_key(&key.into())
    }

    pub fn has_edge(&self, key: impl Into<Key>) -> bool {
        self.edges.contains_key(&key.into())
    }

    /// Whether any edge runs between the pair (directed source→target or
    /// undirected). Fails on multigraphs, where "the edge between" is
    /// ambiguous; use [`has_any_edge_between`](Self::has_any_edge_between)
    /// for the explicit any-edge reading.
    pub fn has_edge_between(
        &self,
        source: impl Into<Key>,
        target: impl Into<Key>,
    ) -> GraphResult<bool> {
        if self.options.multi {
            return Err(GraphError::AmbiguousOnMultigraph {
                method: "has_edge_between",
                hint: "has_any_edge_between",
            });
        }
        Ok(self.any_edge_between(&source.into(), &target.into()))
    }

    /// Any-edge-between semantics; multigraph-safe. Missing nodes simply
    /// yield `false`.
    pub fn has_any_edge_between(
        &self,
        source: impl Into<Key>,
        target: impl Into<Key>,
    ) -> bool {
        self.any_edge_between(&source.into(), &target.into())
    }

    /// Resolve the single edge between a pair, directed taking precedence
    /// on mixed graphs. Fails on multigraphs; use
    /// [`edges_between`](Self::edges_between) there.
    pub fn edge_between(
        &self,
        source: impl Into<Key>,
        target: impl Into<Key>,
    ) -> GraphResult<Option<Key>> {
        if self.options.multi {
            return Err(GraphError::AmbiguousOnMultigraph {
                method: "edge_between",
                hint: "edges_between",
            });
        }
        let source = source.into();
        let target = target.into();
        Ok(self
            .first_edge_between(&source, &target, true)
            .or_else(|| self.first_edge_between(&source, &target, false)))
    }

    pub fn directed_edge_between(
        &self,
        source: impl Into<Key>,
        target: impl Into<Key>,
    ) -> GraphResult<Option<Key>> {
        if !self.options.kind.accepts_directed() {
            return Err(GraphError::WrongGraphKind {
                method: "directed_edge_between",
                kind: self.options.kind,
                hint: "edge_between",
            });
        }
        if self.options.multi {
            return Err(GraphError::AmbiguousOnMultigraph {
                method: "directed_edge_between",
                hint: "edges_between",
            });
        }
        Ok(self.first_edge_between(&source.into(), &target.into(), true))
    }

    pub fn undirected_edge_between(
        &self,
        source: impl Into<Key>,
        target: impl Into<Key>,
    ) -> GraphResult<Option<Key>> {
        if !self.options.kind.accepts_undirected() {
            return Err(GraphError::WrongGraphKind {
                method: "undirected_edge_between",
                kind: self.options.kind,
                hint: "edge_between",
            });
        }
        if self.options.multi {
            return Err(GraphError::AmbiguousOnMultigraph {
                method: "undirected_edge_between",
                hint: "edges_between",
            });
        }
        Ok(self.first_edge_between(&source.into(), &target.into(), false))
    }

    /// Every edge from `source` to `target`: directed source→target plus
    /// undirected between the pair, parallels included.
    pub fn edges_between(&self, source: impl Into<Key>, target: impl Into<Key>) -> Vec<Key> {
        let source = source.into();
        let target = target.into();
        let Some(node) = self.nodes.get(&source) else {
            return Vec::new();
        };
        let mut result = Vec::new();
        if source == target {
            result.extend(node.directed_loops.iter().cloned());
            result.extend(node.undirected_loops.iter().cloned());
        } else {
            if let Some(edges) = node.out.get(&target) {
                result.extend(edges.iter().cloned());
            }
            if let Some(edges) = node.undirected.get(&target) {
                result.extend(edges.iter().cloned());
            }
        }
        result
    }

    fn any_edge_between(&self, source: &Key, target: &Key) -> bool {
        self.pair_occupied(source, target, true) || self.pair_occupied(source, target, false)
    }

    fn pair_occupied(&self, source: &Key, target: &Key, directed: bool) -> bool {
        let Some(node) = self.nodes.get(source) else {
            return false;
        };
        if source == target {
            if directed {
                !node.directed_loops.is_empty()
            } else {
                !node.undirected_loops.is_empty()
            }
        } else if directed {
            node.out.contains_key(target)
        } else {
            node.undirected.contains_key(target)
        }
    }

    fn first_edge_between(&self, source: &Key, target: &Key, directed: bool) -> Option<Key> {
        let node = self.nodes.get(source)?;
        if source == target {
            let loops = if directed { &node.directed_loops } else { &node.undirected_loops };
            loops.first().cloned()
        } else {
            let map = if directed { &node.out } else { &node.undirected };
            map.get(target).and_then(|edges| edges.first()).cloned()
        }
    }

    // ============================================================
    // Edge accessors
    // ============================================================

    pub fn source(&self, edge: impl Into<Key>) -> GraphResult<&Key> {
        let key = edge.into();
        self.edge_data("source", &key).map(|edge| &edge.source)
    }

    pub fn target(&self, edge: impl Into<Key>) -> GraphResult<&Key> {
        let key = edge.into();
        self.edge_data("target", &key).map(|edge| &edge.target)
    }

    pub fn extremities(&self, edge: impl Into<Key>) -> GraphResult<(&Key, &Key)> {
        let key = edge.into();
        self.edge_data("extremities", &key).map(|edge| (&edge.source, &edge.target))
    }

    /// The endpoint of `edge` opposite to `node`.
    pub fn opposite(&self, node: impl Into<Key>, edge: impl Into<Key>) -> GraphResult<Key> {
        let node = node.into();
        let key = edge.into();
        let edge = self.edge_data("opposite", &key)?;
        edge.opposite(&node).cloned().ok_or_else(|| GraphError::InvalidArgument {
            method: "opposite",
            reason: format!("node \"{}\" is not an endpoint of edge \"{}\"", node, key),
        })
    }

    pub fn is_directed_edge(&self, edge: impl Into<Key>) -> GraphResult<bool> {
        let key = edge.into();
        self.edge_data("is_directed_edge", &key).map(|edge| edge.directed)
    }

    pub fn is_self_loop(&self, edge: impl Into<Key>) -> GraphResult<bool> {
        let key = edge.into();
        self.edge_data("is_self_loop", &key).map(EdgeData::is_loop)
    }

    /// Whether the edge's key was auto-assigned. Informational only: a
    /// generated key has identical semantics to a user-supplied one.
    pub fn is_generated_key(&self, edge: impl Into<Key>) -> GraphResult<bool> {
        let key = edge.into();
        self.edge_data("is_generated_key", &key).map(|edge| edge.generated)
    }

    // ============================================================
    // Degrees
    // ============================================================

    /// Total degree: directed plus undirected, self-loops counting twice.
    pub fn degree(&self, key: impl Into<Key>) -> GraphResult<usize> {
        let key = key.into();
        self.node_data("degree", &key).map(NodeData::degree)
    }

    pub fn out_degree(&self, key: impl Into<Key>) -> GraphResult<usize> {
        self.directed_only("out_degree", "degree")?;
        let key = key.into();
        self.node_data("out_degree", &key).map(NodeData::out_degree)
    }

    pub fn in_degree(&self, key: impl Into<Key>) -> GraphResult<usize> {
        self.directed_only("in_degree", "degree")?;
        let key = key.into();
        self.node_data("in_degree", &key).map(NodeData::in_degree)
    }

    pub fn directed_degree(&self, key: impl Into<Key>) -> GraphResult<usize> {
        self.directed_only("directed_degree", "degree")?;
        let key = key.into();
        self.node_data("directed_degree", &key).map(NodeData::directed_degree)
    }

    pub fn undirected_degree(&self, key: impl Into<Key>) -> GraphResult<usize> {
        self.undirected_only("undirected_degree", "degree")?;
        let key = key.into();
        self.node_data("undirected_degree", &key).map(NodeData::undirected_degree)
    }

    // ============================================================
    // Neighbors and incident edges
    // ============================================================

    /// Every distinct neighbor, in no particular order. A node with a
    /// self-loop is its own neighbor.
    pub fn neighbors(&self, key: impl Into<Key>) -> GraphResult<Vec<Key>> {
        let key = key.into();
        let node = self.node_data("neighbors", &key)?;
        let mut set: HashSet<&Key> = HashSet::new();
        set.extend(node.out.keys());
        set.extend(node.in_.keys());
        set.extend(node.undirected.keys());
        if !node.directed_loops.is_empty() || !node.undirected_loops.is_empty() {
            set.insert(&key);
        }
        Ok(set.into_iter().cloned().collect())
    }

    pub fn out_neighbors(&self, key: impl Into<Key>) -> GraphResult<Vec<Key>> {
        self.directed_only("out_neighbors", "neighbors")?;
        let key = key.into();
        let node = self.node_data("out_neighbors", &key)?;
        let mut result: Vec<Key> = node.out.keys().cloned().collect();
        if !node.directed_loops.is_empty() {
            result.push(key);
        }
        Ok(result)
    }

    pub fn in_neighbors(&self, key: impl Into<Key>) -> GraphResult<Vec<Key>> {
        self.directed_only("in_neighbors", "neighbors")?;
        let key = key.into();
        let node = self.node_data("in_neighbors", &key)?;
        let mut result: Vec<Key> = node.in_.keys().cloned().collect();
        if !node.directed_loops.is_empty() {
            result.push(key);
        }
        Ok(result)
    }

    pub fn undirected_neighbors(&self, key: impl Into<Key>) -> GraphResult<Vec<Key>> {
        self.undirected_only("undirected_neighbors", "neighbors")?;
        let key = key.into();
        let node = self.node_data("undirected_neighbors", &key)?;
        let mut result: Vec<Key> = node.undirected.keys().cloned().collect();
        if !node.undirected_loops.is_empty() {
            result.push(key);
        }
        Ok(result)
    }

    /// Keys of every edge incident to a node, each exactly once.
    pub fn edges_of(&self, key: impl Into<Key>) -> GraphResult<Vec<Key>> {
        let key = key.into();
        self.node_data("edges_of", &key).map(NodeData::incident_edges)
    }

    pub fn out_edges_of(&self, key: impl Into<Key>) -> GraphResult<Vec<Key>> {
        self.directed_only("out_edges_of", "edges_of")?;
        let key = key.into();
        let node = self.node_data("out_edges_of", &key)?;
        let mut result: Vec<Key> = node.out.values().flatten().cloned().collect();
        result.extend(node.directed_loops.iter().cloned());
        Ok(result)
    }

    pub fn in_edges_of(&self, key: impl Into<Key>) -> GraphResult<Vec<Key>> {
        self.directed_only("in_edges_of", "edges_of")?;
        let key = key.into();
        let node = self.node_data("in_edges_of", &key)?;
        let mut result: Vec<Key> = node.in_.values().flatten().cloned().collect();
        result.extend(node.directed_loops.iter().cloned());
        Ok(result)
    }

    pub fn undirected_edges_of(&self, key: impl Into<Key>) -> GraphResult<Vec<Key>> {
        self.undirected_only("undirected_edges_of", "edges_of")?;
        let key = key.into();
        let node = self.node_data("undirected_edges_of", &key)?;
        let mut result: Vec<Key> = node.undirected.values().flatten().cloned().collect();
        result.extend(node.undirected_loops.iter().cloned());
        Ok(result)
    }

    /// Iterate node keys, in no guaranteed order.
    pub fn node_keys(&self) -> impl Iterator<Item = &Key> {
        self.nodes.keys()
    }

    /// Iterate edge keys, in no guaranteed order.
    pub fn edge_keys(&self) -> impl Iterator<Item = &Key> {
        self.edges.keys()
    }

    // ============================================================
    // Graph attributes
    // ============================================================

    pub fn attributes(&self) -> &AttrMap {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> &mut Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn remove_attribute(&mut self, name: &str) -> &mut Self {
        self.attributes.remove(name);
        self
    }

    /// Replace the whole graph-level mapping, clearing prior attributes.
    pub fn replace_attributes(&mut self, attributes: AttrMap) -> &mut Self {
        self.attributes = attributes;
        self
    }

    pub fn merge_attributes(&mut self, attributes: AttrMap) -> &mut Self {
        self.attributes.extend(attributes);
        self
    }

    // ============================================================
    // Node attributes
    // ============================================================

    pub fn node_attributes(&self, key: impl Into<Key>) -> GraphResult<&AttrMap> {
        let key = key.into();
        self.node_data("node_attributes", &key).map(|node| &node.attributes)
    }

    pub fn node_attribute(
        &self,
        key: impl Into<Key>,
        name: &str,
    ) -> GraphResult<Option<&AttrValue>> {
        let key = key.into();
        self.node_data("node_attribute", &key).map(|node| node.attributes.get(name))
    }

    pub fn has_node_attribute(&self, key: impl Into<Key>, name: &str) -> GraphResult<bool> {
        let key = key.into();
        self.node_data("has_node_attribute", &key).map(|node| node.attributes.contains_key(name))
    }

    pub fn set_node_attribute(
        &mut self,
        key: impl Into<Key>,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> GraphResult<&mut Self> {
        let key = key.into();
        let name = name.into();
        let node = self.node_data_mut("set_node_attribute", &key)?;
        node.attributes.insert(name.clone(), value.into());
        self.emit_event(GraphEvent::NodeAttributesUpdated { key, update: AttrUpdate::Set { name } });
        Ok(self)
    }

    pub fn remove_node_attribute(
        &mut self,
        key: impl Into<Key>,
        name: &str,
    ) -> GraphResult<&mut Self> {
        let key = key.into();
        let node = self.node_data_mut("remove_node_attribute", &key)?;
        node.attributes.remove(name);
        self.emit_event(GraphEvent::NodeAttributesUpdated {
            key,
            update: AttrUpdate::Remove { name: name.to_string() },
        });
        Ok(self)
    }

    /// Replace a node's whole mapping, clearing prior attributes.
    pub fn replace_node_attributes(
        &mut self,
        key: impl Into<Key>,
        attributes: AttrMap,
    ) -> GraphResult<&mut Self> {
        let key = key.into();
        let node = self.node_data_mut("replace_node_attributes", &key)?;
        node.attributes = attributes;
        self.emit_event(GraphEvent::NodeAttributesUpdated { key, update: AttrUpdate::Replace });
        Ok(self)
    }

    pub fn merge_node_attributes(
        &mut self,
        key: impl Into<Key>,
        attributes: AttrMap,
    ) -> GraphResult<&mut Self> {
        let key = key.into();
        let node = self.node_data_mut("merge_node_attributes", &key)?;
        node.attributes.extend(attributes);
        self.emit_event(GraphEvent::NodeAttributesUpdated { key, update: AttrUpdate::Merge });
        Ok(self)
    }

    // ============================================================
    // Edge attributes
    // ============================================================

    pub fn edge_attributes(&self, key: impl Into<Key>) -> GraphResult<&AttrMap> {
        let key = key.into();
        self.edge_data("edge_attributes", &key).map(|edge| &edge.attributes)
    }

    pub fn edge_attribute(
        &self,
        key: impl Into<Key>,
        name: &str,
    ) -> GraphResult<Option<&AttrValue>> {
        let key = key.into();
        self.edge_data("edge_attribute", &key).map(|edge| edge.attributes.get(name))
    }

    pub fn has_edge_attribute(&self, key: impl Into<Key>, name: &str) -> GraphResult<bool> {
        let key = key.into();
        self.edge_data("has_edge_attribute", &key).map(|edge| edge.attributes.contains_key(name))
    }

    pub fn set_edge_attribute(
        &mut self,
        key: impl Into<Key>,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> GraphResult<&mut Self> {
        let key = key.into();
        let name = name.into();
        let edge = self.edge_data_mut("set_edge_attribute", &key)?;
        edge.attributes.insert(name.clone(), value.into());
        self.emit_event(GraphEvent::EdgeAttributesUpdated { key, update: AttrUpdate::Set { name } });
        Ok(self)
    }

    pub fn remove_edge_attribute(
        &mut self,
        key: impl Into<Key>,
        name: &str,
    ) -> GraphResult<&mut Self> {
        let key = key.into();
        let edge = self.edge_data_mut("remove_edge_attribute", &key)?;
        edge.attributes.remove(name);
        self.emit_event(GraphEvent::EdgeAttributesUpdated {
            key,
            update: AttrUpdate::Remove { name: name.to_string() },
        });
        Ok(self)
    }

    /// Replace an edge's whole mapping, clearing prior attributes.
    pub fn replace_edge_attributes(
        &mut self,
        key: impl Into<Key>,
        attributes: AttrMap,
    ) -> GraphResult<&mut Self> {
        let key = key.into();
        let edge = self.edge_data_mut("replace_edge_attributes", &key)?;
        edge.attributes = attributes;
        self.emit_event(GraphEvent::EdgeAttributesUpdated { key, update: AttrUpdate::Replace });
        Ok(self)
    }

    pub fn merge_edge_attributes(
        &mut self,
        key: impl Into<Key>,
        attributes: AttrMap,
    ) -> GraphResult<&mut Self> {
        let key = key.into();
        let edge = self.edge_data_mut("merge_edge_attributes", &key)?;
        edge.attributes.extend(attributes);
        self.emit_event(GraphEvent::EdgeAttributesUpdated { key, update: AttrUpdate::Merge });
        Ok(self)
    }

    /// Set an attribute on the single edge between a pair, directed taking
    /// precedence on mixed graphs. Fails on multigraphs.
    pub fn set_edge_attribute_between(
        &mut self,
        source: impl Into<Key>,
        target: impl Into<Key>,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> GraphResult<&mut Self> {
        if self.options.multi {
            return Err(GraphError::AmbiguousOnMultigraph {
                method: "set_edge_attribute_between",
                hint: "set_edge_attribute",
            });
        }
        let source = source.into();
        let target = target.into();
        let key = self
            .first_edge_between(&source, &target, true)
            .or_else(|| self.first_edge_between(&source, &target, false))
            .ok_or(GraphError::NoEdgeBetween {
                method: "set_edge_attribute_between",
                src: source,
                target,
            })?;
        self.set_edge_attribute(key, name, value)
    }

    /// Set an attribute on the directed edge between a pair.
    pub fn set_directed_edge_attribute_between(
        &mut self,
        source: impl Into<Key>,
        target: impl Into<Key>,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> GraphResult<&mut Self> {
        if !self.options.kind.accepts_directed() {
            return Err(GraphError::WrongGraphKind {
                method: "set_directed_edge_attribute_between",
                kind: self.options.kind,
                hint: "set_edge_attribute_between",
            });
        }
        if self.options.multi {
            return Err(GraphError::AmbiguousOnMultigraph {
                method: "set_directed_edge_attribute_between",
                hint: "set_edge_attribute",
            });
        }
        let source = source.into();
        let target = target.into();
        let key = self.first_edge_between(&source, &target, true).ok_or(
            GraphError::NoEdgeBetween {
                method: "set_directed_edge_attribute_between",
                src: source,
                target,
            },
        )?;
        self.set_edge_attribute(key, name, value)
    }

    /// Set an attribute on the undirected edge between a pair, even when a
    /// directed edge also runs between the same nodes.
    pub fn set_undirected_edge_attribute_between(
        &mut self,
        source: impl Into<Key>,
        target: impl Into<Key>,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> GraphResult<&mut Self> {
        if !self.options.kind.accepts_undirected() {
            return Err(GraphError::WrongGraphKind {
                method: "set_undirected_edge_attribute_between",
                kind: self.options.kind,
                hint: "set_edge_attribute_between",
            });
        }
        if self.options.multi {
            return Err(GraphError::AmbiguousOnMultigraph {
                method: "set_undirected_edge_attribute_between",
                hint: "set_edge_attribute",
            });
        }
        let source = source.into();
        let target = target.into();
        let key = self.first_edge_between(&source, &target, false).ok_or(
            GraphError::NoEdgeBetween {
                method: "set_undirected_edge_attribute_between",
                src: source,
                target,
            },
        )?;
        self.set_edge_attribute(key, name, value)
    }

    // ============================================================
    // Observers
    // ============================================================

    /// Register an observer for the given notification kinds (`None`
    /// subscribes to all). Delivery is synchronous, after each mutation
    /// commits; callbacks must not re-enter the store with a conflicting
    /// mutation.
    pub fn subscribe<F>(&mut self, kinds: Option<&[EventKind]>, callback: F) -> ObserverId
    where
        F: Fn(&GraphEvent) + 'static,
    {
        self.observers.subscribe(kinds.map(<[EventKind]>::to_vec), Box::new(callback))
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn emit_event(&self, event: GraphEvent) {
        self.observers.emit(&event);
    }

    // ============================================================
    // Internals
    // ============================================================

    pub(crate) fn node_entries(&self) -> impl Iterator<Item = (&Key, &NodeData)> {
        self.nodes.iter()
    }

    pub(crate) fn edge_entries(&self) -> impl Iterator<Item = (&Key, &EdgeData)> {
        self.edges.iter()
    }

    fn node_data(&self, method: &'static str, key: &Key) -> GraphResult<&NodeData> {
        self.nodes
            .get(key)
            .ok_or_else(|| GraphError::NodeNotFound { method, key: key.clone() })
    }

    fn node_data_mut(&mut self, method: &'static str, key: &Key) -> GraphResult<&mut NodeData> {
        self.nodes
            .get_mut(key)
            .ok_or_else(|| GraphError::NodeNotFound { method, key: key.clone() })
    }

    fn edge_data(&self, method: &'static str, key: &Key) -> GraphResult<&EdgeData> {
        self.edges
            .get(key)
            .ok_or_else(|| GraphError::EdgeNotFound { method, key: key.clone() })
    }

    fn edge_data_mut(&mut self, method: &'static str, key: &Key) -> GraphResult<&mut EdgeData> {
        self.edges
            .get_mut(key)
            .ok_or_else(|| GraphError::EdgeNotFound { method, key: key.clone() })
    }

    fn directed_only(&self, method: &'static str, hint: &'static str) -> GraphResult<()> {
        if self.options.kind.accepts_directed() {
            Ok(())
        } else {
            Err(GraphError::WrongGraphKind { method, kind: self.options.kind, hint })
        }
    }

    fn undirected_only(&self, method: &'static str, hint: &'static str) -> GraphResult<()> {
        if self.options.kind.accepts_undirected() {
            Ok(())
        } else {
            Err(GraphError::WrongGraphKind { method, kind: self.options.kind, hint })
        }
    }

    /// Counter-derived keys with a collision-skip over existing edges, so
    /// generated keys are plain strings that survive serialization and can
    /// be reused across copies of the store.
    fn generate_edge_key(&mut self) -> Key {
        loop {
            let key = Key::from(format!("e{}", self.edge_key_counter));
            self.edge_key_counter += 1;
            if !self.edges.contains_key(&key) {
                return key;
            }
        }
    }
}
