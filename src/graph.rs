//! A graph stored as a hash table of hash tables.
//!
//! The top-level table maps every node to its adjacency table, which in turn
//! maps each neighbour to the [`Edge`] record leading to it.  Directedness and
//! labelling are fixed when the graph is created:
//!
//! - In a directed graph, `add_edge(u, v, _)` stores one record, in `u`'s
//!   table.
//! - In an undirected graph it stores a record in `u`'s table and a mirrored
//!   record in `v`'s table.  Only symmetric add/remove operations are exposed,
//!   so the two records can't get out of sync.
//! - An unlabelled graph discards the labels it is given.
//!
//! Node and label values are handles: the graph clones and drops handles but
//! never the payload behind them.
//!
//! There is no reverse index: removing a node scans every other node's
//! adjacency table, so [`Graph::remove_node`] is O(V).

use std::cmp::Ordering;

use crate::{
    HashTable,
    error::GraphError,
    hash_table::{Keys, collect_exact},
    key_ops::{CompareFn, HashFn, KeyOps},
    tracing_support::debug,
};

pub use self::edge::Edge;

mod edge;

/// The adjacency table of a single node: neighbour -> edge record.
pub type Adjacency<N, L> = HashTable<N, Edge<N, L>>;

#[derive(Debug)]
pub struct Graph<N, L> {
    nodes: HashTable<N, Adjacency<N, L>>,
    labelled: bool,
    directed: bool,
    /// Number of stored edge records.  An undirected self-loop is a single
    /// record that is its own mirror and is counted twice, so the count is
    /// always even for undirected graphs.
    edge_count: usize,
}

impl<N, L> Graph<N, L> {
    /// Creates an empty graph.  `compare` and `hash` are used for the
    /// top-level table and every adjacency table.
    pub fn new(
        labelled: bool,
        directed: bool,
        compare: CompareFn<N>,
        hash: HashFn<N>,
    ) -> Result<Self, GraphError> {
        Self::with_ops(labelled, directed, KeyOps::new(compare, hash))
    }

    pub fn with_ops(labelled: bool, directed: bool, ops: KeyOps<N>) -> Result<Self, GraphError> {
        Ok(Self {
            nodes: HashTable::with_ops(ops)?,
            labelled,
            directed,
            edge_count: 0,
        })
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn is_labelled(&self) -> bool {
        self.labelled
    }

    pub fn ops(&self) -> KeyOps<N> {
        self.nodes.ops()
    }

    /// Weight of a record in `edge_count`.
    fn record_weight(directed: bool, ops: KeyOps<N>, edge: &Edge<N, L>) -> usize {
        if !directed && ops.equals(&edge.source, &edge.dest) {
            2
        } else {
            1
        }
    }

    // Nodes

    /// Adds `node` with an empty adjacency table.  Returns `false` without
    /// touching the graph if the node is already present.
    pub fn add_node(&mut self, node: N) -> Result<bool, GraphError> {
        if self.nodes.contains_key(&node) {
            return Ok(false);
        }
        let adjacency = HashTable::with_ops(self.nodes.ops())?;
        self.nodes.put(node, adjacency)?;
        Ok(true)
    }

    /// Gets the handle the graph stores for `node`, which may differ from
    /// `node` when the compare function treats distinct handles as equal.
    pub fn get_node(&self, node: &N) -> Option<&N> {
        self.nodes.get_key_value(node).map(|(stored, _)| stored)
    }

    pub fn contains_node(&self, node: &N) -> bool {
        self.nodes.contains_key(node)
    }

    /// Removes `node`, all edges leaving it and all edges leading to it.
    /// Returns `false` if the node is not in the graph.
    pub fn remove_node(&mut self, node: &N) -> bool {
        let Some((removed, adjacency)) = self.nodes.remove_entry(node) else {
            return false;
        };
        let directed = self.directed;
        let ops = self.nodes.ops();

        let mut dropped: usize = adjacency
            .iter()
            .map(|(_, edge)| Self::record_weight(directed, ops, edge))
            .sum();
        drop(adjacency);

        for (_, edges) in self.nodes.iter_mut() {
            if let Some(edge) = edges.remove(&removed) {
                dropped += Self::record_weight(directed, ops, &edge);
            }
        }

        debug!(dropped, "removed node and its edges");
        self.edge_count -= dropped;
        true
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.size()
    }

    /// Returns every node, in unspecified order.
    pub fn get_nodes(&self) -> Result<Vec<&N>, GraphError> {
        Ok(self.nodes.keyset()?)
    }

    pub fn node_ids(&self) -> Keys<'_, N, Adjacency<N, L>> {
        self.nodes.keys()
    }

    // Edges

    /// Adds an edge from `source` to `dest`.  Both nodes must already be in
    /// the graph.  Returns `false` without touching the graph if the edge (or,
    /// in an undirected graph, its mirror) is already present.
    pub fn add_edge(&mut self, source: &N, dest: &N, label: Option<L>) -> Result<bool, GraphError>
    where
        N: Clone,
        L: Clone,
    {
        let ops = self.nodes.ops();
        let (source, source_edges) = self
            .nodes
            .get_key_value(source)
            .ok_or(GraphError::NodeNotFound)?;
        let (dest, dest_edges) = self
            .nodes
            .get_key_value(dest)
            .ok_or(GraphError::NodeNotFound)?;
        if source_edges.contains_key(dest) || (!self.directed && dest_edges.contains_key(source))
        {
            return Ok(false);
        }
        // Records hold the graph's own node handles, not the caller's.
        let (source, dest) = (source.clone(), dest.clone());

        let label = if self.labelled { label } else { None };
        let mirrored = !self.directed && !ops.equals(&source, &dest);
        let edge = Edge::new(source.clone(), dest.clone(), label.clone());
        let weight = Self::record_weight(self.directed, ops, &edge);

        self.adjacency_mut(&source)?.put(dest.clone(), edge)?;
        if mirrored {
            let mirror = Edge::new(dest.clone(), source.clone(), label);
            if let Err(err) = self.adjacency_mut(&dest)?.put(source.clone(), mirror) {
                self.adjacency_mut(&source)?.remove(&dest);
                return Err(err.into());
            }
            self.edge_count += 2;
        } else {
            self.edge_count += weight;
        }
        Ok(true)
    }

    fn adjacency_mut(&mut self, node: &N) -> Result<&mut Adjacency<N, L>, GraphError> {
        self.nodes.get_mut(node).ok_or(GraphError::NodeNotFound)
    }

    /// Adds every `(node_a, node_b, label)` triple, adding missing nodes
    /// first.  Returns the number of edges that were not already present.
    pub fn extend_edges(
        &mut self,
        triples: impl IntoIterator<Item = (N, N, L)>,
    ) -> Result<usize, GraphError>
    where
        N: Clone,
        L: Clone,
    {
        let mut added = 0;
        for (source, dest, label) in triples {
            self.add_node(source.clone())?;
            self.add_node(dest.clone())?;
            if self.add_edge(&source, &dest, Some(label))? {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn contains_edge(&self, source: &N, dest: &N) -> bool {
        self.get_edge(source, dest).is_some()
    }

    pub fn get_edge(&self, source: &N, dest: &N) -> Option<&Edge<N, L>> {
        if !self.nodes.contains_key(dest) {
            return None;
        }
        self.nodes.get(source)?.get(dest)
    }

    /// Gets the label of the edge from `source` to `dest`.  Always `None` for
    /// an unlabelled graph.
    pub fn get_label(&self, source: &N, dest: &N) -> Option<&L> {
        if !self.labelled {
            return None;
        }
        self.get_edge(source, dest)?.label()
    }

    /// Removes the edge from `source` to `dest`, and its mirror in an
    /// undirected graph.  Returns `false` if there was no such edge.
    pub fn remove_edge(&mut self, source: &N, dest: &N) -> bool {
        if !self.nodes.contains_key(dest) {
            return false;
        }
        let directed = self.directed;
        let ops = self.nodes.ops();
        let Some(edge) = self
            .nodes
            .get_mut(source)
            .and_then(|edges| edges.remove(dest))
        else {
            return false;
        };
        self.edge_count -= Self::record_weight(directed, ops, &edge);

        if !directed && !ops.equals(source, dest) {
            let mirror = self
                .nodes
                .get_mut(dest)
                .and_then(|edges| edges.remove(source));
            debug_assert!(mirror.is_some(), "undirected edge without mirror");
            if mirror.is_some() {
                self.edge_count -= 1;
            }
        }
        true
    }

    /// Number of logical edges: each undirected edge counts once.
    pub fn num_edges(&self) -> usize {
        if self.directed {
            self.edge_count
        } else {
            self.edge_count / 2
        }
    }

    /// Returns every logical edge once, in unspecified order.  For an
    /// undirected graph this is the record whose source compares less than
    /// or equal to its dest.
    pub fn get_edges(&self) -> Result<Vec<&Edge<N, L>>, GraphError> {
        let directed = self.directed;
        let ops = self.nodes.ops();
        let edges = self
            .nodes
            .iter()
            .flat_map(|(_, edges)| edges.iter().map(|(_, edge)| edge))
            .filter(|edge| directed || ops.compare(&edge.source, &edge.dest) != Ordering::Greater);
        Ok(collect_exact(edges, self.num_edges())?)
    }

    // Neighbours

    /// Iterates over the nodes reachable from `node` by one edge, or `None` if
    /// `node` is not in the graph.
    pub fn neighbours(&self, node: &N) -> Option<Keys<'_, N, Edge<N, L>>> {
        self.nodes.get(node).map(|edges| edges.keys())
    }

    pub fn get_neighbours(&self, node: &N) -> Result<Vec<&N>, GraphError> {
        let edges = self.nodes.get(node).ok_or(GraphError::NodeNotFound)?;
        Ok(edges.keyset()?)
    }

    pub fn num_neighbours(&self, node: &N) -> Option<usize> {
        self.nodes.get(node).map(|edges| edges.size())
    }

    // Consistency

    /// Counts the stored edge records by walking every adjacency table, with
    /// the same weighting as the edge counter.
    pub fn count_edge_records(&self) -> usize {
        let directed = self.directed;
        let ops = self.nodes.ops();
        self.nodes
            .iter()
            .flat_map(|(_, edges)| edges.iter())
            .map(|(_, edge)| Self::record_weight(directed, ops, edge))
            .sum()
    }

    /// Checks the internal invariants of the graph, returning a reason if one
    /// does not hold.  This walks the whole graph.
    pub fn check_consistency(&self) -> Result<(), &'static str> {
        let ops = self.nodes.ops();
        if self.count_edge_records() != self.edge_count {
            return Err("edge counter does not match stored edge records");
        }
        for (node, edges) in self.nodes.iter() {
            for (neighbour, edge) in edges.iter() {
                if !ops.equals(&edge.source, node) || !ops.equals(&edge.dest, neighbour) {
                    return Err("edge record filed under the wrong nodes");
                }
                if !self.nodes.contains_key(neighbour) {
                    return Err("edge leads to a node that is not in the graph");
                }
                if !self.labelled && edge.label.is_some() {
                    return Err("unlabelled graph stores a label");
                }
                if !self.directed {
                    let Some(mirror) = self.get_edge(neighbour, node) else {
                        return Err("undirected edge without mirror");
                    };
                    if mirror.label.is_some() != edge.label.is_some() {
                        return Err("mirrored edges disagree on label");
                    }
                }
            }
        }
        Ok(())
    }
}
