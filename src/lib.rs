pub mod error;
pub mod graph;
pub mod hash_table;
pub mod key_ops;
pub mod prime;
pub mod queue;
pub mod search;
pub mod tracing_support;

#[cfg(test)]
mod graph_test_support;
mod test_util;

pub use error::{GraphError, HashTableError, QueueError, TraversalError};
pub use graph::{Edge, Graph};
pub use hash_table::HashTable;
pub use key_ops::KeyOps;
pub use queue::Queue;
pub use search::{BfsIterator, breadth_first_visit};
