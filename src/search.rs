use crate::{
    Graph, HashTable, Queue,
    error::{HashTableError, TraversalError},
    key_ops::{CompareFn, HashFn, KeyOps},
    tracing_support::{debug, info_span},
};

/// Breadth-first iterator over the nodes reachable from a start node.
///
/// Nodes are yielded in the order they are discovered, starting with the
/// start node.  A node is marked explored as soon as it is discovered, so it
/// is enqueued and yielded at most once.  The explored set uses the key ops
/// the iterator was created with, which need not be the graph's own.
///
/// Each item is an `Err` only if the explored set or frontier could not grow;
/// the iterator ends after the first error.
pub struct BfsIterator<'g, N, L> {
    graph: &'g Graph<N, L>,
    explored: HashTable<N, ()>,
    frontier: Queue<N>,
    failed: bool,
}

impl<'g, N, L> BfsIterator<'g, N, L>
where
    N: Clone,
{
    pub fn new(graph: &'g Graph<N, L>, start: &N, ops: KeyOps<N>) -> Result<Self, TraversalError> {
        let start = graph.get_node(start).ok_or(TraversalError::StartNotFound)?;
        let mut explored = HashTable::with_ops(ops)?;
        let mut frontier = Queue::new();
        explored.put(start.clone(), ())?;
        frontier.enqueue(start.clone())?;
        Ok(Self {
            graph,
            explored,
            frontier,
            failed: false,
        })
    }

    /// Marks and enqueues every unexplored neighbour of `current`.
    fn expand(&mut self, current: &N) -> Result<(), TraversalError> {
        let graph = self.graph;
        let Some(neighbours) = graph.neighbours(current) else {
            return Ok(());
        };
        for neighbour in neighbours {
            if self.explored.contains_key(neighbour) {
                continue;
            }
            self.explored.put(neighbour.clone(), ())?;
            self.frontier.enqueue(neighbour.clone())?;
        }
        Ok(())
    }
}

impl<'g, N, L> Iterator for BfsIterator<'g, N, L>
where
    N: Clone,
{
    type Item = Result<N, TraversalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let current = self.frontier.dequeue()?;
        if let Err(err) = self.expand(&current) {
            self.failed = true;
            return Some(Err(err));
        }
        Some(Ok(current))
    }
}

impl<N, L> Graph<N, L>
where
    N: Clone,
{
    /// Performs a breadth-first search starting from the given node, using
    /// the graph's own key ops for the explored set.
    pub fn bfs(&self, start: &N) -> Result<BfsIterator<'_, N, L>, TraversalError> {
        BfsIterator::new(self, start, self.ops())
    }
}

/// Visits every node reachable from `start` in breadth-first order and
/// returns them in visitation order, `start` first.
///
/// `compare` and `hash` build the explored set.  Fails with
/// [`TraversalError::StartNotFound`] if `start` is not in the graph.  If any
/// allocation fails, everything allocated by the traversal is dropped and the
/// error returned; there are no partial results.
pub fn breadth_first_visit<N, L>(
    graph: &Graph<N, L>,
    start: &N,
    compare: CompareFn<N>,
    hash: HashFn<N>,
) -> Result<Vec<N>, TraversalError>
where
    N: Clone,
{
    let _span = info_span!("breadth_first_visit", nodes = graph.num_nodes()).entered();

    let bfs = BfsIterator::new(graph, start, KeyOps::new(compare, hash))?;
    let mut visited = Vec::new();
    visited
        .try_reserve_exact(graph.num_nodes())
        .map_err(|_| HashTableError::OutOfMemory {
            requested: graph.num_nodes(),
        })?;
    for node in bfs {
        visited.push(node?);
    }
    visited.shrink_to_fit();

    debug!(visited = visited.len(), "breadth-first visit finished");
    Ok(visited)
}
