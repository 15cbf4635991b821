use thiserror::Error;

/// Errors reported by [`HashTable`](crate::HashTable).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashTableError {
    /// Storage for `requested` slots could not be allocated.
    #[error("unable to allocate storage for {requested} slots")]
    OutOfMemory { requested: usize },
}

/// Errors reported by [`Queue`](crate::Queue).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("unable to grow queue beyond {len} elements")]
    OutOfMemory { len: usize },
}

/// Errors reported by [`Graph`](crate::Graph).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node passed to an operation is not in the graph.
    #[error("node not found in graph")]
    NodeNotFound,

    #[error(transparent)]
    HashTable(#[from] HashTableError),
}

/// Errors reported by [`breadth_first_visit`](crate::search::breadth_first_visit).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraversalError {
    /// The start node is not in the graph.
    #[error("start node not found in graph")]
    StartNotFound,

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    HashTable(#[from] HashTableError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}
