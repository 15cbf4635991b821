use std::collections::VecDeque;

use crate::error::QueueError;

/// An unbounded FIFO queue of handles, used as the frontier of a
/// breadth-first traversal.
///
/// Dropping the queue drops the stored handles only.
#[derive(Clone, Debug)]
pub struct Queue<T> {
    items: VecDeque<T>,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Appends `item` at the rear.  Fails without modifying the queue if the
    /// backing storage cannot grow.
    pub fn enqueue(&mut self, item: T) -> Result<(), QueueError> {
        self.items
            .try_reserve(1)
            .map_err(|_| QueueError::OutOfMemory {
                len: self.items.len(),
            })?;
        self.items.push_back(item);
        Ok(())
    }

    /// Removes and returns the front item, or `None` if the queue is empty.
    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Returns the front item without removing it.
    pub fn first(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
