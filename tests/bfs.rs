use std::{cmp::Ordering, collections::HashSet};

use hashgraph::{Graph, TraversalError, breadth_first_visit, key_ops::default_hash};

fn compare(a: &u32, b: &u32) -> Ordering {
    a.cmp(b)
}

fn hash(key: &u32) -> u64 {
    default_hash(key)
}

/// Builds an unlabelled graph on nodes `0..num_nodes`.
fn build(directed: bool, num_nodes: u32, edges: &[(u32, u32)]) -> Graph<u32, ()> {
    let mut graph = Graph::new(false, directed, compare, hash).unwrap();
    for node in 0..num_nodes {
        graph.add_node(node).unwrap();
    }
    for (a, b) in edges {
        graph.add_edge(a, b, None).unwrap();
    }
    graph
}

fn as_set(nodes: &[u32]) -> HashSet<u32> {
    nodes.iter().copied().collect()
}

#[test]
fn test_visit_path_from_middle() {
    let graph = build(false, 5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
    let visited = breadth_first_visit(&graph, &2, compare, hash).unwrap();
    assert_eq!(visited.len(), 5);
    assert_eq!(visited[0], 2);
    assert_eq!(as_set(&visited[1..3]), HashSet::from([1, 3]));
    assert_eq!(as_set(&visited[3..]), HashSet::from([0, 4]));
}

#[test]
fn test_visit_directed_chain() {
    let graph = build(true, 4, &[(0, 1), (1, 2), (2, 3)]);
    assert_eq!(
        breadth_first_visit(&graph, &0, compare, hash).unwrap(),
        vec![0, 1, 2, 3]
    );
    assert_eq!(
        breadth_first_visit(&graph, &2, compare, hash).unwrap(),
        vec![2, 3]
    );
}

#[test]
fn test_visit_skips_other_components() {
    let graph = build(false, 6, &[(0, 1), (1, 2), (3, 4), (4, 5)]);
    let visited = breadth_first_visit(&graph, &4, compare, hash).unwrap();
    assert_eq!(as_set(&visited), HashSet::from([3, 4, 5]));
}

#[test]
fn test_visit_with_self_loop() {
    let graph = build(false, 2, &[(0, 0), (0, 1)]);
    assert_eq!(
        breadth_first_visit(&graph, &0, compare, hash).unwrap(),
        vec![0, 1]
    );
}

#[test]
fn test_visit_missing_start() {
    let graph = build(false, 3, &[(0, 1)]);
    assert_eq!(
        breadth_first_visit(&graph, &7, compare, hash),
        Err(TraversalError::StartNotFound)
    );
}

#[test]
fn test_visit_complete_graph() {
    let n = 12;
    let edges: Vec<_> = (0..n)
        .flat_map(|a| (a + 1..n).map(move |b| (a, b)))
        .collect();
    let graph = build(false, n, &edges);
    assert_eq!(graph.num_edges(), (n * (n - 1) / 2) as usize);
    let visited = breadth_first_visit(&graph, &5, compare, hash).unwrap();
    assert_eq!(visited[0], 5);
    assert_eq!(as_set(&visited), (0..n).collect::<HashSet<_>>());
}

/// Visits a large grid from one corner; nodes must come out in order of
/// Manhattan distance from the corner.
#[cfg(feature = "slow_tests")]
#[test]
fn test_visit_large_grid() {
    const SIDE: u32 = 150;
    let id = |row: u32, col: u32| row * SIDE + col;
    let mut edges = Vec::new();
    for row in 0..SIDE {
        for col in 0..SIDE {
            if col + 1 < SIDE {
                edges.push((id(row, col), id(row, col + 1)));
            }
            if row + 1 < SIDE {
                edges.push((id(row, col), id(row + 1, col)));
            }
        }
    }
    let graph = build(false, SIDE * SIDE, &edges);
    assert_eq!(graph.check_consistency(), Ok(()));

    let visited = breadth_first_visit(&graph, &0, compare, hash).unwrap();
    assert_eq!(visited.len(), (SIDE * SIDE) as usize);
    let distances: Vec<_> = visited
        .iter()
        .map(|node| node / SIDE + node % SIDE)
        .collect();
    assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));
}
