//! Community structure scenarios driven through the store.

use trellis::graph::attrs;
use trellis::indices::{
    build_directed_community_structure, build_undirected_community_structure,
    louvain_communities, LouvainConfig,
};
use trellis::{GraphOptions, GraphStore, Key};

const EPSILON: f64 = 1e-9;

/// Two triangles bridged by a single edge, with one weighted edge.
fn two_triangles() -> GraphStore {
    let mut store = GraphStore::undirected();
    for k in ["a", "b", "c", "x", "y", "z"] {
        store.add_node(k).unwrap();
    }
    for (s, t) in [("a", "b"), ("b", "c"), ("c", "a"), ("x", "y"), ("y", "z"), ("z", "x")] {
        store.add_edge(s, t).unwrap();
    }
    store.add_edge_with_attributes("c", "x", attrs([("weight", 0.5.into())])).unwrap();
    store
}

#[test]
fn init_puts_every_node_in_a_singleton_community() {
    let store = two_triangles();
    let structure = build_undirected_community_structure(&store, Some("weight"));

    assert_eq!(structure.node_count(), 6);
    assert_eq!(structure.community_count(), 6);
    for node in 0..structure.node_count() {
        assert_eq!(structure.community_of(node), node);
        assert!(
            (structure.community_degree(node) - structure.node_degree(node)).abs() < EPSILON
        );
        assert!(
            (structure.internal_weight(node) - structure.self_loop_weight(node)).abs() < EPSILON
        );
    }
    // Six unit edges plus the 0.5 bridge.
    assert!((structure.total_weight() - 6.5).abs() < EPSILON);
}

#[test]
fn move_node_and_inverse_restore_all_sums() {
    let store = two_triangles();
    let mut structure = build_undirected_community_structure(&store, Some("weight"));
    let node = structure.graph().id_of(&Key::from("c")).unwrap();
    let home = structure.community_of(node);
    let away = structure.graph().id_of(&Key::from("x")).unwrap();

    let degrees: Vec<f64> =
        (0..structure.node_count()).map(|c| structure.community_degree(c)).collect();
    let internals: Vec<f64> =
        (0..structure.node_count()).map(|c| structure.internal_weight(c)).collect();

    structure.move_node(node, away);
    structure.move_node(node, home);

    for c in 0..structure.node_count() {
        assert!((structure.community_degree(c) - degrees[c]).abs() < EPSILON);
        assert!((structure.internal_weight(c) - internals[c]).abs() < EPSILON);
    }
    assert_eq!(structure.community_of(node), home);
}

#[test]
fn neighbor_community_weights_track_assignments() {
    let store = two_triangles();
    let mut structure = build_undirected_community_structure(&store, Some("weight"));
    let a = structure.graph().id_of(&Key::from("a")).unwrap();
    let b = structure.graph().id_of(&Key::from("b")).unwrap();
    let c = structure.graph().id_of(&Key::from("c")).unwrap();

    // Pull b into a's community: c now sees a single community worth 2.0.
    structure.move_node(b, a);
    let weights = structure.neighbor_community_weights(c);
    assert!((weights[&a] - 2.0).abs() < EPSILON);

    let x = structure.graph().id_of(&Key::from("x")).unwrap();
    assert!((weights[&x] - 0.5).abs() < EPSILON);
}

#[test]
fn gain_is_zero_for_the_current_community_and_positive_into_the_clique() {
    let store = two_triangles();
    let mut structure = build_undirected_community_structure(&store, Some("weight"));
    let a = structure.graph().id_of(&Key::from("a")).unwrap();
    let b = structure.graph().id_of(&Key::from("b")).unwrap();

    assert!(structure.modularity_gain(a, structure.community_of(a)).abs() < EPSILON);

    let predicted = structure.modularity_gain(a, b);
    assert!(predicted > 0.0);

    let before = structure.modularity();
    structure.move_node(a, b);
    assert!((structure.modularity() - before - predicted).abs() < EPSILON);
}

#[test]
fn aggregate_zooms_out_to_the_community_graph() {
    let store = two_triangles();
    let mut structure = build_undirected_community_structure(&store, Some("weight"));
    let ids: Vec<usize> = ["a", "b", "c", "x", "y", "z"]
        .iter()
        .map(|k| structure.graph().id_of(&Key::from(*k)).unwrap())
        .collect();

    // Left triangle into one community, right triangle into another.
    structure.move_node(ids[1], ids[0]);
    structure.move_node(ids[2], ids[0]);
    structure.move_node(ids[4], ids[3]);
    structure.move_node(ids[5], ids[3]);
    assert_eq!(structure.community_count(), 2);

    let (membership, coarse) = structure.aggregate();

    assert_eq!(coarse.node_count(), 2);
    assert_eq!(membership[ids[0]], membership[ids[2]]);
    assert_ne!(membership[ids[0]], membership[ids[3]]);
    // Each triangle's three internal edges became a self-loop of 3.0.
    assert!((coarse.self_loop_weight(membership[ids[0]]) - 3.0).abs() < EPSILON);
    assert!((coarse.self_loop_weight(membership[ids[3]]) - 3.0).abs() < EPSILON);
    assert!((coarse.total_weight() - structure.total_weight()).abs() < EPSILON);
    assert!((coarse.modularity() - structure.modularity()).abs() < EPSILON);
}

#[test]
fn directed_structure_handles_mixed_stores() {
    let mut store = GraphStore::mixed();
    for k in ["a", "b", "c"] {
        store.add_node(k).unwrap();
    }
    store.add_directed_edge("a", "b").unwrap();
    // An undirected edge acts as a reciprocal directed pair.
    store.add_undirected_edge("b", "c").unwrap();

    let structure = build_directed_community_structure(&store, None);
    let b = structure.graph().id_of(&Key::from("b")).unwrap();
    let c = structure.graph().id_of(&Key::from("c")).unwrap();

    assert!((structure.total_weight() - 3.0).abs() < EPSILON);
    assert!((structure.node_in_degree(b) - 2.0).abs() < EPSILON);
    assert!((structure.node_out_degree(b) - 1.0).abs() < EPSILON);
    assert!((structure.node_out_degree(c) - 1.0).abs() < EPSILON);
}

#[test]
fn louvain_recovers_the_two_triangles() {
    let store = two_triangles();
    let result = louvain_communities(&store, Some("weight"), &LouvainConfig::default());

    assert_eq!(result.community_count, 2);
    let left = result.assignments[&Key::from("a")];
    let right = result.assignments[&Key::from("x")];
    assert_ne!(left, right);
    for k in ["a", "b", "c"] {
        assert_eq!(result.assignments[&Key::from(k)], left);
    }
    for k in ["x", "y", "z"] {
        assert_eq!(result.assignments[&Key::from(k)], right);
    }
    assert!(result.modularity > 0.3);
}

#[test]
fn louvain_is_stable_under_a_fixed_seed() {
    let store = two_triangles();
    let config = LouvainConfig::new().with_seed(7);

    let a = louvain_communities(&store, Some("weight"), &config);
    let b = louvain_communities(&store, Some("weight"), &config);

    assert_eq!(a.assignments, b.assignments);
}

#[test]
fn multigraph_parallel_edges_accumulate_weight() {
    let mut store = GraphStore::new(GraphOptions::undirected().with_multi(true));
    store.add_node("a").unwrap();
    store.add_node("b").unwrap();
    store.add_edge("a", "b").unwrap();
    store.add_edge("a", "b").unwrap();

    let structure = build_undirected_community_structure(&store, None);
    let a = structure.graph().id_of(&Key::from("a")).unwrap();

    assert!((structure.node_degree(a) - 2.0).abs() < EPSILON);
    assert!((structure.total_weight() - 2.0).abs() < EPSILON);
}
