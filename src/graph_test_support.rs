use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use quickcheck::{Arbitrary, Gen};

use crate::{
    Graph, KeyOps,
    tracing_support::{info_span, init_tracing},
};

/// Number of distinct node ids generated, kept small so that generated
/// operations hit existing nodes and edges often.
const NODE_RANGE: u8 = 12;

#[derive(Clone, Copy, Debug)]
pub enum GraphOp {
    AddNode(u8),
    RemoveNode(u8),
    AddEdge(u8, u8, u8),
    RemoveEdge(u8, u8),
}

impl Arbitrary for GraphOp {
    fn arbitrary(g: &mut Gen) -> Self {
        let node = |g: &mut Gen| u8::arbitrary(g) % NODE_RANGE;
        match u8::arbitrary(g) % 8 {
            0..=2 => GraphOp::AddNode(node(g)),
            3 => GraphOp::RemoveNode(node(g)),
            4..=6 => GraphOp::AddEdge(node(g), node(g), u8::arbitrary(g)),
            _ => GraphOp::RemoveEdge(node(g), node(g)),
        }
    }
}

/// A sequence of operations to replay on a fresh `Graph<u8, u8>`.
#[derive(Clone, Debug)]
pub struct ArbGraph {
    pub labelled: bool,
    pub directed: bool,
    pub ops: Vec<GraphOp>,
}

impl Arbitrary for ArbGraph {
    fn arbitrary(g: &mut Gen) -> Self {
        ArbGraph {
            labelled: bool::arbitrary(g),
            directed: bool::arbitrary(g),
            ops: Vec::arbitrary(g),
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let labelled = self.labelled;
        let directed = self.directed;
        Box::new(self.ops.shrink().map(move |ops| ArbGraph {
            labelled,
            directed,
            ops,
        }))
    }
}

impl ArbGraph {
    pub fn new_graph(&self) -> Graph<u8, u8> {
        Graph::with_ops(self.labelled, self.directed, KeyOps::natural()).unwrap()
    }

    /// Replays every operation, calling `after_op` after each one.
    pub fn replay(&self, mut after_op: impl FnMut(&Graph<u8, u8>, GraphOp)) -> Graph<u8, u8> {
        let mut graph = self.new_graph();
        for &op in &self.ops {
            match op {
                GraphOp::AddNode(n) => {
                    graph.add_node(n).unwrap();
                }
                GraphOp::RemoveNode(n) => {
                    graph.remove_node(&n);
                }
                GraphOp::AddEdge(a, b, label) => {
                    let _ = graph.add_edge(&a, &b, Some(label));
                }
                GraphOp::RemoveEdge(a, b) => {
                    graph.remove_edge(&a, &b);
                }
            }
            after_op(&graph, op);
        }
        graph
    }
}

pub fn has_duplicates<T: Eq + Hash>(items: impl IntoIterator<Item = T>) -> bool {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item) {
            return true;
        }
    }
    false
}

/// Checks the internal consistency of a graph.
pub fn check_graph_consistency<N, L>(graph: &Graph<N, L>)
where
    N: Eq + Hash + Debug,
    L: PartialEq + Debug,
{
    init_tracing();
    let _span = info_span!("check_graph_consistency").entered();

    assert_eq!(graph.check_consistency(), Ok(()));

    // Node views agree with each other and with the counter.
    assert!(!has_duplicates(graph.node_ids()));
    assert_eq!(graph.node_ids().count(), graph.num_nodes());
    assert_eq!(graph.get_nodes().unwrap().len(), graph.num_nodes());

    // Every logical edge is listed exactly once.
    let edges = graph.get_edges().unwrap();
    assert_eq!(edges.len(), graph.num_edges());
    assert!(!has_duplicates(edges.iter().map(|edge| edge.ends())));

    for node in graph.node_ids() {
        let neighbours = {
            let _span = info_span!("get_neighbours").entered();
            graph.get_neighbours(node).unwrap()
        };
        assert_eq!(graph.num_neighbours(node), Some(neighbours.len()));
        assert_eq!(
            graph.neighbours(node).map(|n| n.count()),
            Some(neighbours.len())
        );

        for &neighbour in &neighbours {
            let _span = info_span!("check_edge").entered();
            let edge = graph.get_edge(node, neighbour).unwrap();
            assert_eq!(edge.ends(), (node, neighbour));
            assert_eq!(graph.get_label(node, neighbour), edge.label());
            if !graph.is_labelled() {
                assert_eq!(edge.label(), None);
            }
            if !graph.is_directed() {
                assert!(graph.contains_edge(neighbour, node));
                assert_eq!(
                    graph.get_label(neighbour, node),
                    graph.get_label(node, neighbour)
                );
            }
        }
    }

    // If there are edges, there must be nodes.
    assert!(graph.num_nodes() > 0 || graph.num_edges() == 0);
}
