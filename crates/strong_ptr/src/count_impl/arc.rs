use std::sync::atomic::{AtomicUsize, Ordering, fence};

use super::{MAX_COUNT, overflow};

/// A thread-safe tally
#[derive(Debug)]
pub(crate) struct Count(AtomicUsize);

impl Count {
    pub(crate) const fn new(initial: usize) -> Self {
        Self(AtomicUsize::new(initial))
    }

    #[inline]
    pub(crate) fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    /// Increments the count, returning the new value
    ///
    /// The caller already holds a reference, so the increment doesn't need to synchronize.
    #[inline]
    pub(crate) fn increment(&self) -> usize {
        let previous = self.0.fetch_add(1, Ordering::Relaxed);
        if previous >= MAX_COUNT {
            overflow();
        }
        previous + 1
    }

    /// Decrements the count, returning the new value
    ///
    /// A count that's already at zero is left unchanged. Reaching zero synchronizes with every
    /// earlier release so that the caller can safely clean up.
    #[inline]
    pub(crate) fn decrement(&self) -> usize {
        match self
            .0
            .fetch_update(Ordering::Release, Ordering::Relaxed, |count| {
                count.checked_sub(1)
            }) {
            Ok(1) => {
                fence(Ordering::Acquire);
                0
            }
            Ok(previous) => previous - 1,
            Err(_) => 0,
        }
    }

    /// Increments the count unless it has already reached zero
    ///
    /// The check and the increment are a single compare-and-swap, so a value that's being
    /// destroyed on another thread can't be revived.
    #[inline]
    pub(crate) fn increment_if_nonzero(&self) -> bool {
        match self
            .0
            .fetch_update(Ordering::Acquire, Ordering::Relaxed, |count| {
                (count != 0).then(|| count + 1)
            }) {
            Ok(previous) => {
                if previous >= MAX_COUNT {
                    overflow();
                }
                true
            }
            Err(_) => false,
        }
    }
}
