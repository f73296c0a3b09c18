use parking_lot::Mutex;
use std::{ops::Deref, sync::Arc};

/// A snapshot of a [Tally]'s counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    /// The number of values that have been constructed
    pub constructed: usize,
    /// The number of values that have been dropped
    pub dropped: usize,
}

/// Counts the constructions and destructions of [Tracked] values
///
/// Clones of a tally share the same counts.
#[derive(Clone, Debug, Default)]
pub struct Tally(Arc<Mutex<Counts>>);

impl Tally {
    /// Makes a new tally with zeroed counts
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the value in a [Tracked] that reports to this tally
    pub fn track<T>(&self, value: T) -> Tracked<T> {
        self.0.lock().constructed += 1;
        Tracked {
            value,
            tally: self.clone(),
        }
    }

    /// Returns a snapshot of the counts
    pub fn counts(&self) -> Counts {
        *self.0.lock()
    }

    /// The number of values that have been constructed
    pub fn constructed(&self) -> usize {
        self.counts().constructed
    }

    /// The number of values that have been dropped
    pub fn dropped(&self) -> usize {
        self.counts().dropped
    }

    /// The number of values that are currently alive
    pub fn alive(&self) -> usize {
        let counts = self.counts();
        counts.constructed - counts.dropped
    }
}

/// A value that reports its construction and destruction to a [Tally]
#[derive(Debug)]
pub struct Tracked<T = ()> {
    value: T,
    tally: Tally,
}

impl<T> Tracked<T> {
    /// Makes a new value that reports to the tally
    pub fn new(tally: &Tally, value: T) -> Self {
        tally.track(value)
    }
}

impl<T: Clone> Clone for Tracked<T> {
    fn clone(&self) -> Self {
        self.tally.track(self.value.clone())
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.tally.0.lock().dropped += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_constructions_and_drops() {
        let tally = Tally::new();
        let a = Tracked::new(&tally, 1);
        let b = a.clone();
        assert_eq!(*b, 1);
        assert_eq!(tally.alive(), 2);

        drop(a);
        drop(b);
        assert_eq!(
            tally.counts(),
            Counts {
                constructed: 2,
                dropped: 2
            }
        );
    }
}
