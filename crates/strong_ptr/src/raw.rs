//! The ownership protocol shared by strong and weak handles

use std::{fmt, marker::PhantomData, mem::ManuallyDrop, ptr::NonNull};

use crate::{Address, Upcast, counter::Counter, strategy::Strategy};

/// A payload pointer coupled with the counter that tracks it
///
/// `STRONG` selects the handle's role: strong cells own a strong reference and keep the payload
/// alive, weak cells own a weak reference and only keep the counter alive.
///
/// A strong cell's payload pointer is always valid while it's set. A weak cell keeps its payload
/// pointer after the payload has been destroyed, so it must only be read after a successful
/// promotion.
pub(crate) struct RawPtr<T: ?Sized, const STRONG: bool, S> {
    value: Option<NonNull<T>>,
    counter: Option<NonNull<Counter>>,
    _marker: PhantomData<(Box<T>, fn() -> S)>,
}

// With atomic counts the cells can be shared in the same way as `std::sync::Arc`.
#[cfg(feature = "arc")]
unsafe impl<T: ?Sized + Send + Sync, const STRONG: bool, S> Send for RawPtr<T, STRONG, S> {}
#[cfg(feature = "arc")]
unsafe impl<T: ?Sized + Send + Sync, const STRONG: bool, S> Sync for RawPtr<T, STRONG, S> {}

impl<T: ?Sized, const STRONG: bool, S> RawPtr<T, STRONG, S> {
    pub(crate) const fn empty() -> Self {
        Self {
            value: None,
            counter: None,
            _marker: PhantomData,
        }
    }

    /// Shares the other cell's counter, taking a reference in this cell's role
    ///
    /// Strong cells can only be acquired from live payloads, otherwise the result is empty.
    /// Weak cells can observe payloads that have already expired.
    pub(crate) fn acquire<U, const OTHER: bool>(other: &RawPtr<U, OTHER, S>) -> Self
    where
        U: ?Sized + Upcast<T>,
    {
        let (Some(value), Some(counter)) = (other.value, other.counter) else {
            return Self::empty();
        };

        // Safety: the other cell's reference keeps the counter alive
        let counter_ref = unsafe { counter.as_ref() };
        let acquired = if STRONG && OTHER {
            counter_ref.increment_strong();
            true
        } else if STRONG {
            counter_ref.try_increment_strong()
        } else {
            counter_ref.increment_weak();
            true
        };

        if acquired {
            Self {
                value: Some(U::upcast(value)),
                counter: Some(counter),
                _marker: PhantomData,
            }
        } else {
            Self::empty()
        }
    }

    /// Releases this cell's reference, leaving the cell empty
    ///
    /// Releasing an empty cell does nothing.
    pub(crate) fn release(&mut self) {
        self.value = None;
        if let Some(counter) = self.counter.take() {
            // Safety: the cell owned a reference in its role, and has forgotten the counter
            unsafe {
                if STRONG {
                    Counter::release_strong(counter);
                } else {
                    Counter::release_weak(counter);
                }
            }
        }
    }

    /// Replaces the cell's referent with the other cell's referent
    ///
    /// Resetting to the value that the cell already refers to leaves the counts untouched.
    pub(crate) fn reset_from<U, const OTHER: bool>(&mut self, other: &RawPtr<U, OTHER, S>)
    where
        U: ?Sized + Upcast<T>,
    {
        let target = other
            .value
            .map_or_else(Address::null, |value| U::upcast(value).as_ptr().cast_const().into());
        if self.identity() == other.identity() && self.address() == target {
            return;
        }

        // The replacement is acquired before the old referent is released,
        // the other cell may only be reachable via our payload.
        *self = Self::acquire(other);
    }

    /// Converts the cell into a view of another payload type, keeping its reference
    pub(crate) fn upcast<U: ?Sized>(self) -> RawPtr<U, STRONG, S>
    where
        T: Upcast<U>,
    {
        let this = ManuallyDrop::new(self);
        RawPtr {
            value: this.value.map(T::upcast),
            counter: this.counter,
            _marker: PhantomData,
        }
    }

    /// The payload pointer, which for weak cells may refer to a destroyed payload
    #[inline]
    pub(crate) fn value(&self) -> Option<NonNull<T>> {
        self.value
    }

    #[inline]
    fn counter(&self) -> Option<&Counter> {
        // Safety: the cell's reference keeps the counter alive
        self.counter.as_ref().map(|counter| unsafe { counter.as_ref() })
    }

    pub(crate) fn use_count(&self) -> usize {
        self.counter().map_or(0, Counter::strong_count)
    }

    pub(crate) fn weak_count(&self) -> usize {
        self.counter().map_or(0, Counter::weak_count)
    }

    /// Empty cells are vacuously unique
    pub(crate) fn is_unique(&self) -> bool {
        self.counter().is_none_or(|counter| counter.strong_count() == 1)
    }

    /// True when no other handle of either kind refers to the payload
    pub(crate) fn is_exclusive(&self) -> bool {
        self.counter()
            .is_some_and(|counter| counter.strong_count() == 1 && counter.weak_count() == 0)
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.counter().is_none_or(Counter::is_expired)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.counter.is_none()
    }

    pub(crate) fn address(&self) -> Address {
        self.value
            .map_or_else(Address::null, |value| value.as_ptr().cast_const().into())
    }

    /// The identity used for comparisons, ordering, and hashing
    ///
    /// Each payload has its own counter, so the counter's address identifies the payload
    /// whichever view the cell has of it. Payload addresses can't be used, zero-sized payloads
    /// may share them, and field views are offset from the payload's start.
    pub(crate) fn identity(&self) -> Address {
        self.counter
            .map_or_else(Address::null, |counter| counter.as_ptr().cast_const().into())
    }

    pub(crate) fn fmt_counts(&self, f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
        f.debug_struct(name)
            .field("address", &self.address())
            .field("strong", &self.use_count())
            .field("weak", &self.weak_count())
            .finish()
    }
}

impl<T: ?Sized, S: Strategy<T>> RawPtr<T, true, S> {
    /// Takes ownership of a payload, allocating its counter
    ///
    /// # Safety
    ///
    /// The payload must have been produced by `S`, and must not be owned by anything else.
    pub(crate) unsafe fn from_raw(value: NonNull<T>) -> Self {
        Self {
            value: Some(value),
            counter: Some(Counter::allocate::<T, S>(value)),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized, const STRONG: bool, S> Clone for RawPtr<T, STRONG, S> {
    fn clone(&self) -> Self {
        Self::acquire(self)
    }
}

impl<T: ?Sized, const STRONG: bool, S> Drop for RawPtr<T, STRONG, S> {
    fn drop(&mut self) {
        self.release();
    }
}
