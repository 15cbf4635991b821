#![cfg(test)]

use std::cell::Cell;

/// Counts how many of the values it hands out have been dropped.  Used to
/// check that containers drop only the handles they store, never the payload
/// behind them.
pub struct DropCounter {
    count: Cell<usize>,
}

impl DropCounter {
    pub fn new() -> Self {
        DropCounter {
            count: Cell::new(0),
        }
    }

    pub fn drop_count(&self) -> usize {
        self.count.get()
    }

    pub fn new_value(&self) -> DroppableValue<'_> {
        DroppableValue(self)
    }
}

#[derive(Debug)]
pub struct DroppableValue<'a>(&'a DropCounter);

impl std::fmt::Debug for DropCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DropCounter({})", self.count.get())
    }
}

impl<'a> Drop for DroppableValue<'a> {
    fn drop(&mut self) {
        self.0.count.set(self.0.count.get() + 1);
    }
}
