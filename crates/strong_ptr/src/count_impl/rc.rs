use std::cell::Cell;

use super::{MAX_COUNT, overflow};

/// A single-threaded tally
#[derive(Debug)]
pub(crate) struct Count(Cell<usize>);

impl Count {
    pub(crate) const fn new(initial: usize) -> Self {
        Self(Cell::new(initial))
    }

    #[inline]
    pub(crate) fn get(&self) -> usize {
        self.0.get()
    }

    /// Increments the count, returning the new value
    #[inline]
    pub(crate) fn increment(&self) -> usize {
        let count = self.0.get() + 1;
        if count > MAX_COUNT {
            overflow();
        }
        self.0.set(count);
        count
    }

    /// Decrements the count, returning the new value
    ///
    /// A count that's already at zero is left unchanged.
    #[inline]
    pub(crate) fn decrement(&self) -> usize {
        let count = self.0.get().saturating_sub(1);
        self.0.set(count);
        count
    }

    /// Increments the count unless it has already reached zero
    #[inline]
    pub(crate) fn increment_if_nonzero(&self) -> bool {
        if self.0.get() == 0 {
            false
        } else {
            self.increment();
            true
        }
    }
}
