//! The counting cell shared by every handle of a value

use std::{marker::PhantomData, ptr::NonNull};

use crate::{count_impl::Count, strategy::Strategy};

/// Tallies the strong and weak handles that refer to a value
///
/// A counter is born with a strong count of 1, alongside the first strong handle of a freshly
/// allocated payload. It's never owned by a single handle, it's freed by whichever handle
/// releases the last reference of either kind.
///
/// The weak tally includes one extra reference that's shared by all of the strong handles while
/// any exist, so that only one party can ever observe both tallies reaching zero. The extra
/// reference is hidden from [Counter::weak_count].
#[derive(Debug)]
pub(crate) struct Counter {
    strong: Count,
    weak: Count,
    // Bound to the payload's original type when the counter is allocated,
    // later handles may refer to the payload through an upcast type.
    destroy_payload: unsafe fn(NonNull<Counter>),
    free: unsafe fn(NonNull<Counter>),
}

// The counter is the first field so that a pointer to a block is also a pointer to its counter.
#[repr(C)]
struct Block<U: ?Sized, S> {
    counter: Counter,
    payload: NonNull<U>,
    _strategy: PhantomData<fn() -> S>,
}

impl Counter {
    /// Allocates a counter for a payload that's been produced by the strategy `S`
    pub(crate) fn allocate<U, S>(payload: NonNull<U>) -> NonNull<Counter>
    where
        U: ?Sized,
        S: Strategy<U>,
    {
        let block = Box::new(Block::<U, S> {
            counter: Counter {
                strong: Count::new(1),
                weak: Count::new(1),
                destroy_payload: destroy_payload::<U, S>,
                free: free_block::<U, S>,
            },
            payload,
            _strategy: PhantomData,
        });

        let counter = NonNull::from(Box::leak(block)).cast::<Counter>();
        log::trace!("allocated counter {counter:p} for payload {payload:p}");
        counter
    }

    /// The number of strong handles
    #[inline]
    pub(crate) fn strong_count(&self) -> usize {
        self.strong.get()
    }

    /// The number of weak handles
    #[inline]
    pub(crate) fn weak_count(&self) -> usize {
        let weak = self.weak.get();
        if self.strong.get() > 0 {
            weak.saturating_sub(1)
        } else {
            weak
        }
    }

    /// Returns true once the payload has been destroyed
    #[inline]
    pub(crate) fn is_expired(&self) -> bool {
        self.strong_count() == 0
    }

    /// Increments the strong count, returning the new count
    ///
    /// The caller must already hold a strong reference, see
    /// [try_increment_strong](Self::try_increment_strong) for promotions.
    #[inline]
    pub(crate) fn increment_strong(&self) -> usize {
        self.strong.increment()
    }

    /// Increments the strong count unless the payload has expired
    #[inline]
    pub(crate) fn try_increment_strong(&self) -> bool {
        self.strong.increment_if_nonzero()
    }

    /// Increments the weak count, returning the new count
    #[inline]
    pub(crate) fn increment_weak(&self) -> usize {
        self.weak.increment();
        self.weak_count()
    }

    /// Decrements the strong count, returning the new count
    ///
    /// A count that's already at zero is left unchanged.
    #[inline]
    pub(crate) fn decrement_strong(&self) -> usize {
        self.strong.decrement()
    }

    /// Decrements the weak tally, returning the new tally including the strong handles' reference
    ///
    /// A tally that's already at zero is left unchanged.
    #[inline]
    pub(crate) fn decrement_weak(&self) -> usize {
        self.weak.decrement()
    }

    /// Releases a strong reference
    ///
    /// The payload is destroyed when the last strong reference is released.
    ///
    /// # Safety
    ///
    /// The caller must own one of the counter's strong references, and must not use `counter`
    /// again afterwards.
    pub(crate) unsafe fn release_strong(counter: NonNull<Counter>) {
        // Safety: the caller's strong reference keeps the counter alive
        let this = unsafe { counter.as_ref() };
        if this.decrement_strong() == 0 {
            let destroy_payload = this.destroy_payload;
            // Safety: this was the last strong reference, nothing else can reach the payload
            unsafe { destroy_payload(counter) };
            // Safety: the strong handles' shared weak reference is released now that they're gone
            unsafe { Self::release_weak(counter) };
        }
    }

    /// Releases a weak reference
    ///
    /// The counter is freed when both tallies have reached zero.
    ///
    /// # Safety
    ///
    /// The caller must own one of the counter's weak references, and must not use `counter`
    /// again afterwards.
    pub(crate) unsafe fn release_weak(counter: NonNull<Counter>) {
        // Safety: the caller's weak reference keeps the counter alive
        let this = unsafe { counter.as_ref() };
        if this.decrement_weak() == 0 {
            let free = this.free;
            // Safety: no references remain
            unsafe { free(counter) };
        }
    }
}

unsafe fn destroy_payload<U, S>(counter: NonNull<Counter>)
where
    U: ?Sized,
    S: Strategy<U>,
{
    // Safety: the counter was allocated as a `Block<U, S>` by `Counter::allocate`
    let payload = unsafe { counter.cast::<Block<U, S>>().as_ref().payload };
    log::trace!("destroying payload {payload:p}");
    // Safety: the payload was produced by `S` and the last strong reference has been released
    unsafe { S::deallocate(payload) };
}

unsafe fn free_block<U: ?Sized, S>(counter: NonNull<Counter>) {
    log::trace!("freeing counter {counter:p}");
    // Safety: the counter was allocated as a boxed `Block<U, S>` by `Counter::allocate`
    drop(unsafe { Box::from_raw(counter.cast::<Block<U, S>>().as_ptr()) });
}
