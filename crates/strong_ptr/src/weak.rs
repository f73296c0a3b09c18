use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use crate::{Address, Error, Global, Result, Strong, Upcast, raw::RawPtr};

/// A non-owning handle that observes a value owned by [Strong] handles
///
/// A weak handle doesn't keep its payload alive, and it doesn't provide direct access to it.
/// The payload can only be reached by promoting the handle with [Weak::lock] or
/// [Weak::upgrade], which fail once the payload has been destroyed.
///
/// Weak handles are used to break reference cycles between strong handles.
pub struct Weak<T: ?Sized, S = Global>(pub(crate) RawPtr<T, false, S>);

impl<T: ?Sized> Weak<T> {
    /// Makes a weak handle that doesn't observe a value
    pub const fn new() -> Self {
        Self(RawPtr::empty())
    }
}

impl<T: ?Sized, S> Weak<T, S> {
    /// Makes a weak handle that observes a strong handle's payload
    pub fn from_strong<U>(strong: &Strong<U, S>) -> Self
    where
        U: ?Sized + Upcast<T>,
    {
        Self(RawPtr::acquire(&strong.0))
    }

    /// Makes a weak handle that observes another weak handle's payload
    ///
    /// Expired payloads can be observed, the result is then also expired.
    pub fn from_weak<U>(other: &Weak<U, S>) -> Self
    where
        U: ?Sized + Upcast<T>,
    {
        Self(RawPtr::acquire(&other.0))
    }

    /// Converts the handle into an observer of another payload type
    pub fn upcast<U>(self) -> Weak<U, S>
    where
        U: ?Sized,
        T: Upcast<U>,
    {
        Weak(self.0.upcast())
    }

    /// Returns true if the handle's payload no longer exists
    ///
    /// Handles that don't observe a value are always expired.
    pub fn is_expired(&self) -> bool {
        self.0.is_expired()
    }

    /// Attempts to promote the handle to a [Strong] handle
    ///
    /// The returned handle is empty if the payload has expired.
    pub fn lock(&self) -> Strong<T, S> {
        Strong::from_weak(self)
    }

    /// Attempts to promote the handle to a [Strong] handle
    ///
    /// An error is returned if the handle doesn't observe a value, or if the payload has
    /// expired.
    pub fn upgrade(&self) -> Result<Strong<T, S>> {
        if self.0.is_empty() {
            return Err(Error::Empty);
        }

        let strong = self.lock();
        if Strong::is_empty(&strong) {
            Err(Error::Expired)
        } else {
            Ok(strong)
        }
    }

    /// Observes a strong handle's payload instead of the current one
    pub fn assign_strong<U>(&mut self, strong: &Strong<U, S>)
    where
        U: ?Sized + Upcast<T>,
    {
        self.0.reset_from(&strong.0);
    }

    /// Observes another weak handle's payload instead of the current one
    pub fn assign_weak<U>(&mut self, other: &Weak<U, S>)
    where
        U: ?Sized + Upcast<T>,
    {
        self.0.reset_from(&other.0);
    }

    /// Stops observing the payload, leaving the handle empty
    pub fn reset(&mut self) {
        self.0.release();
    }

    /// Exchanges the referents of two handles without changing any counts
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Returns the number of strong handles that refer to the payload
    pub fn use_count(&self) -> usize {
        self.0.use_count()
    }

    /// Returns the number of weak handles that observe the payload, including this one
    pub fn weak_count(&self) -> usize {
        self.0.weak_count()
    }

    /// Returns true if a single strong handle refers to the payload
    ///
    /// Handles that don't observe a value are considered to be unique.
    pub fn is_unique(&self) -> bool {
        self.0.is_unique()
    }

    /// Returns true if the handle doesn't observe a value
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the address of the observed payload
    ///
    /// The address remains available after the payload has expired, but it must not be used to
    /// access the payload.
    pub fn address(&self) -> Address {
        self.0.address()
    }

    /// Returns true if the two handles observe the same payload
    pub fn ptr_eq<U: ?Sized, S2>(&self, other: &Weak<U, S2>) -> bool {
        self.0.identity() == other.0.identity()
    }
}

impl<T: ?Sized, S> From<&Strong<T, S>> for Weak<T, S> {
    fn from(strong: &Strong<T, S>) -> Self {
        Self::from_strong(strong)
    }
}

impl<T: ?Sized, S> Default for Weak<T, S> {
    fn default() -> Self {
        Self(RawPtr::empty())
    }
}

impl<T: ?Sized, S> Clone for Weak<T, S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized, S> fmt::Debug for Weak<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_counts(f, "Weak")
    }
}

impl<T: ?Sized, U: ?Sized, S, S2> PartialEq<Weak<U, S2>> for Weak<T, S> {
    fn eq(&self, other: &Weak<U, S2>) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: ?Sized, S> Eq for Weak<T, S> {}

impl<T: ?Sized, U: ?Sized, S, S2> PartialOrd<Weak<U, S2>> for Weak<T, S> {
    fn partial_cmp(&self, other: &Weak<U, S2>) -> Option<Ordering> {
        Some(self.0.identity().cmp(&other.0.identity()))
    }
}

impl<T: ?Sized, S> Ord for Weak<T, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.identity().cmp(&other.0.identity())
    }
}

impl<T: ?Sized, S> Hash for Weak<T, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.identity().hash(state)
    }
}
