//! Neighborhood and connected-components index scenarios.

use std::collections::HashSet;

use trellis::graph::attrs;
use trellis::indices::{build_components, build_neighborhood};
use trellis::{GraphOptions, GraphStore, Key};

fn key(s: &str) -> Key {
    Key::from(s)
}

#[test]
fn neighborhood_blocks_match_store_adjacency() {
    let mut store = GraphStore::mixed();
    for k in ["a", "b", "c", "d"] {
        store.add_node(k).unwrap();
    }
    store.add_directed_edge("a", "b").unwrap();
    store.add_directed_edge("a", "c").unwrap();
    store.add_undirected_edge("c", "d").unwrap();

    let index = build_neighborhood(&store, None);
    assert_eq!(index.node_count(), 4);

    let a = index.id_of(&key("a")).unwrap();
    let c = index.id_of(&key("c")).unwrap();
    let d = index.id_of(&key("d")).unwrap();

    let successors_of_a: HashSet<&Key> =
        index.successors(a).iter().map(|&v| index.key_of(v)).collect();
    assert_eq!(successors_of_a, HashSet::from([&key("b"), &key("c")]));

    // Undirected edges are visible from both endpoints.
    assert!(index.successors(c).contains(&d));
    assert!(index.successors(d).contains(&c));

    assert_eq!(index.out_degree(a), 2);
    assert_eq!(index.in_degree(a), 0);
}

#[test]
fn neighborhood_weights_come_from_the_named_attribute() {
    let mut store = GraphStore::directed();
    store.add_node("a").unwrap();
    store.add_node("b").unwrap();
    store.add_node("c").unwrap();
    store.add_edge_with_attributes("a", "b", attrs([("weight", 2.5.into())])).unwrap();
    store.add_edge_with_attributes("a", "c", attrs([("weight", "heavy".into())])).unwrap();

    let index = build_neighborhood(&store, Some("weight"));
    let a = index.id_of(&key("a")).unwrap();
    let b = index.id_of(&key("b")).unwrap();

    let entries: Vec<(usize, f64)> = index.neighbor_weights(a).collect();
    let weight_to_b = entries.iter().find(|(v, _)| *v == b).map(|(_, w)| *w);
    assert_eq!(weight_to_b, Some(2.5));

    // Non-numeric weights fall back to 1.0.
    let total: f64 = entries.iter().map(|(_, w)| w).sum();
    assert_eq!(total, 3.5);
}

#[test]
fn index_is_a_point_in_time_snapshot() {
    // Surface the index-build debug logs when running with --nocapture.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut store = GraphStore::directed();
    store.add_node("a").unwrap();
    store.add_node("b").unwrap();
    store.add_edge("a", "b").unwrap();

    let index = build_neighborhood(&store, None);
    store.add_node("c").unwrap();
    store.add_edge("b", "c").unwrap();

    // The snapshot does not observe the later mutation.
    assert_eq!(index.node_count(), 2);
    assert_eq!(index.id_of(&key("c")), None);
}

#[test]
fn connectivity_ignores_edge_direction() {
    let mut store = GraphStore::directed();
    for k in ["a", "b", "c"] {
        store.add_node(k).unwrap();
    }
    store.add_edge("a", "b").unwrap();
    store.add_edge("b", "c").unwrap();

    let components = build_components(&store);

    assert_eq!(components.count(), 1);
    assert_eq!(components.component_of(&key("a")), components.component_of(&key("c")));
}

#[test]
fn components_come_out_largest_first() {
    let mut store = GraphStore::new(GraphOptions::undirected());
    for k in ["a", "b", "c", "d", "e", "lonely"] {
        store.add_node(k).unwrap();
    }
    // {a, b} and {c, d, e}
    store.add_edge("a", "b").unwrap();
    store.add_edge("c", "d").unwrap();
    store.add_edge("d", "e").unwrap();

    let components = build_components(&store);

    let sizes: Vec<usize> = components.components().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 2, 1]);

    let largest: HashSet<&Key> = components.largest().unwrap().iter().collect();
    assert_eq!(largest, HashSet::from([&key("c"), &key("d"), &key("e")]));
    assert_eq!(components.component_of(&key("lonely")), Some(2));
}

#[test]
fn self_loops_and_multi_edges_do_not_confuse_the_indices() {
    let mut store = GraphStore::new(GraphOptions::mixed().with_multi(true));
    store.add_node("a").unwrap();
    store.add_node("b").unwrap();
    store.add_directed_edge("a", "a").unwrap();
    store.add_directed_edge("a", "b").unwrap();
    store.add_directed_edge("a", "b").unwrap();

    let index = build_neighborhood(&store, None);
    let a = index.id_of(&key("a")).unwrap();
    // Loop once, parallel edges twice.
    assert_eq!(index.out_degree(a), 3);

    let components = build_components(&store);
    assert_eq!(components.count(), 1);
}
