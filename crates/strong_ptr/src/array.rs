use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::{Index, IndexMut},
    ptr::NonNull,
};

use crate::{
    Address, AllocateArray, Error, GlobalArray, Result, Strategy, error::contract_violation,
    raw::RawPtr,
};

/// An owning handle to a reference counted array
///
/// The array counterpart of [Strong](crate::Strong). Handles share ownership of a contiguous
/// sequence of values that's destroyed by the array strategy `S` when the last handle is
/// released.
///
/// Elements are accessed by index. Reading an element is always possible, writing requires the
/// array to be unshared, i.e. no other strong or weak handle can refer to it. Out of range
/// indices and writes to shared arrays are contract violations that panic, the `try_` and
/// `get` accessors are the checked alternatives.
///
/// Arrays that are written through several handles need interior mutability, e.g.
/// `StrongArray<Cell<T>>`:
///
/// ```
/// use std::cell::Cell;
/// use strong_ptr::StrongArray;
///
/// let array = StrongArray::<Cell<i32>>::new(2);
/// let copy = array.clone();
/// copy[1].set(42);
/// assert_eq!(array[1].get(), 42);
/// ```
pub struct StrongArray<T, S = GlobalArray>(RawPtr<[T], true, S>);

/// A non-owning handle that observes a [StrongArray]'s values
pub struct WeakArray<T, S = GlobalArray>(RawPtr<[T], false, S>);

impl<T: Default> StrongArray<T> {
    /// Allocates an array of `len` default-initialized values
    pub fn new(len: usize) -> Self {
        Self::with_strategy(len)
    }
}

impl<T, S: AllocateArray<T>> StrongArray<T, S> {
    /// Allocates an array of `len` default-initialized values with the strategy `S`
    pub fn with_strategy(len: usize) -> Self
    where
        T: Default,
    {
        // Safety: the array was freshly produced by the handle's strategy
        unsafe { Self::from_non_null(S::allocate_array(len)) }
    }

    /// Moves the values into an array allocated with the strategy `S`
    pub fn from_vec(values: Vec<T>) -> Self {
        // Safety: the array was freshly produced by the handle's strategy
        unsafe { Self::from_non_null(S::allocate_from_vec(values)) }
    }
}

impl<T, S: Strategy<[T]>> StrongArray<T, S> {
    /// Takes ownership of an array that was produced by the strategy `S`
    ///
    /// A null pointer produces an empty handle.
    ///
    /// # Safety
    ///
    /// `values` must be null, or have been produced by `S`. The array must not be owned by
    /// anything else.
    pub unsafe fn from_raw(values: *mut [T]) -> Self {
        match NonNull::new(values) {
            // Safety: see the caller's guarantees
            Some(values) => unsafe { Self::from_non_null(values) },
            None => Self::empty(),
        }
    }

    unsafe fn from_non_null(values: NonNull<[T]>) -> Self {
        // Safety: see the caller's guarantees
        Self(unsafe { RawPtr::from_raw(values) })
    }
}

impl<T, S> StrongArray<T, S> {
    /// Makes a handle that doesn't refer to an array
    pub const fn empty() -> Self {
        Self(RawPtr::empty())
    }

    /// Promotes a weak array handle
    ///
    /// The result is empty if the array has expired.
    pub fn from_weak(weak: &WeakArray<T, S>) -> Self {
        Self(RawPtr::acquire(&weak.0))
    }

    /// Makes a weak handle that observes the array
    pub fn downgrade(&self) -> WeakArray<T, S> {
        WeakArray(RawPtr::acquire(&self.0))
    }

    /// Returns the array's values
    ///
    /// An empty handle has no values.
    pub fn as_slice(&self) -> &[T] {
        match self.0.value() {
            // Safety: the handle's strong reference keeps the array alive
            Some(values) => unsafe { values.as_ref() },
            None => &[],
        }
    }

    /// Returns the number of values in the array
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns true if the array has no values, or if the handle is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a reference to the value at `index`, or `None` if it's out of bounds
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns a reference to the value at `index`
    pub fn try_get(&self, index: usize) -> Result<&T> {
        if self.0.is_empty() {
            return Err(Error::Empty);
        }
        let values = self.as_slice();
        values.get(index).ok_or(Error::OutOfBounds {
            index,
            len: values.len(),
        })
    }

    /// Returns a mutable reference to the value at `index`
    ///
    /// `None` is returned if the index is out of bounds, or if the array is shared.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.try_get_mut(index).ok()
    }

    /// Returns a mutable reference to the value at `index`
    ///
    /// An error is returned if the handle is empty, if the array is shared with other handles,
    /// or if the index is out of bounds.
    pub fn try_get_mut(&mut self, index: usize) -> Result<&mut T> {
        let Some(mut values) = self.0.value() else {
            return Err(Error::Empty);
        };
        if !self.0.is_exclusive() {
            return Err(Error::Shared);
        }

        // Safety: no other handle can reach the array
        let values = unsafe { values.as_mut() };
        let len = values.len();
        values.get_mut(index).ok_or(Error::OutOfBounds { index, len })
    }

    /// Replaces the handle's referent with a share of another handle's array
    ///
    /// Assigning a handle that refers to the same array leaves the counts untouched.
    pub fn assign(&mut self, other: &Self) {
        self.0.reset_from(&other.0);
    }

    /// Releases the handle's ownership, leaving it empty
    pub fn reset(&mut self) {
        self.0.release();
    }

    /// Exchanges the referents of two handles without changing any counts
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Returns the number of strong handles that refer to the array
    pub fn use_count(&self) -> usize {
        self.0.use_count()
    }

    /// Returns the number of weak handles that observe the array
    pub fn weak_count(&self) -> usize {
        self.0.weak_count()
    }

    /// Returns true if this is the array's only strong handle
    ///
    /// Empty handles are considered to be unique.
    pub fn is_unique(&self) -> bool {
        self.0.is_unique()
    }

    /// Returns the address of the array's first value
    pub fn address(&self) -> Address {
        self.0.address()
    }

    /// Returns true if the two handles refer to the same array
    pub fn ptr_eq<U, S2>(&self, other: &StrongArray<U, S2>) -> bool {
        self.0.identity() == other.0.identity()
    }
}

impl<T, S> WeakArray<T, S> {
    /// Makes a weak handle that doesn't observe an array
    pub const fn new() -> Self {
        Self(RawPtr::empty())
    }

    /// Returns true if the array no longer exists
    pub fn is_expired(&self) -> bool {
        self.0.is_expired()
    }

    /// Attempts to promote the handle, the result is empty if the array has expired
    pub fn lock(&self) -> StrongArray<T, S> {
        StrongArray::from_weak(self)
    }

    /// Stops observing the array, leaving the handle empty
    pub fn reset(&mut self) {
        self.0.release();
    }

    /// Returns the number of strong handles that refer to the array
    pub fn use_count(&self) -> usize {
        self.0.use_count()
    }

    /// Returns the number of weak handles that observe the array
    pub fn weak_count(&self) -> usize {
        self.0.weak_count()
    }
}

impl<T> From<Vec<T>> for StrongArray<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl<T> From<Box<[T]>> for StrongArray<T> {
    fn from(values: Box<[T]>) -> Self {
        // Safety: leaked boxed slices are released by `GlobalArray`
        unsafe { Self::from_non_null(NonNull::from(Box::leak(values))) }
    }
}

impl<T, S> Index<usize> for StrongArray<T, S> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.try_get(index) {
            Ok(value) => value,
            Err(error) => contract_violation(error),
        }
    }
}

impl<T, S> IndexMut<usize> for StrongArray<T, S> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.try_get_mut(index) {
            Ok(value) => value,
            Err(error) => contract_violation(error),
        }
    }
}

impl<T, S> Default for StrongArray<T, S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T, S> Clone for StrongArray<T, S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T, S> Default for WeakArray<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> Clone for WeakArray<T, S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T, S> fmt::Debug for StrongArray<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_counts(f, "StrongArray")
    }
}

impl<T, S> fmt::Debug for WeakArray<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_counts(f, "WeakArray")
    }
}

impl<T, U, S, S2> PartialEq<StrongArray<U, S2>> for StrongArray<T, S> {
    fn eq(&self, other: &StrongArray<U, S2>) -> bool {
        self.ptr_eq(other)
    }
}

impl<T, S> Eq for StrongArray<T, S> {}

impl<T, U, S, S2> PartialOrd<StrongArray<U, S2>> for StrongArray<T, S> {
    fn partial_cmp(&self, other: &StrongArray<U, S2>) -> Option<Ordering> {
        Some(self.0.identity().cmp(&other.0.identity()))
    }
}

impl<T, S> Ord for StrongArray<T, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.identity().cmp(&other.0.identity())
    }
}

impl<T, S> Hash for StrongArray<T, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.identity().hash(state)
    }
}
