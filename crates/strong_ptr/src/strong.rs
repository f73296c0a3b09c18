use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    ptr::{self, NonNull},
};

use crate::{
    Address, Allocate, Construct, Error, Global, Result, Strategy, Upcast, Weak,
    error::contract_violation, raw::RawPtr,
};

/// Makes a [Strong] handle, with support for casting to trait objects
///
/// Handles can be converted to trait objects via [Upcast], but declaring the conversion isn't
/// necessary if the trait object is the only type the payload will be referred to with. The
/// payload is boxed and coerced at the call site, so the expected handle type decides the
/// payload's view.
///
/// # Examples
///
/// ```
/// use std::fmt::Display;
/// use strong_ptr::{Strong, make_strong};
///
/// let displayed: Strong<dyn Display> = make_strong!(42);
/// assert_eq!(displayed.to_string(), "42");
/// ```
#[macro_export]
macro_rules! make_strong {
    ($value:expr) => {
        $crate::Strong::from_box(::std::boxed::Box::new($value) as ::std::boxed::Box<_>)
    };
}

/// Allocates a value from the provided constructor arguments and wraps it in a [Strong] handle
///
/// The arguments are a tuple of up to six values, see [Construct].
pub fn make_strong<T, Args>(args: Args) -> Strong<T>
where
    T: Construct<Args>,
{
    // Safety: the payload was freshly produced by the handle's strategy
    unsafe { Strong::from_non_null(Global::allocate_with(args)) }
}

/// Allocates the value returned by `f` and wraps it in a [Strong] handle
pub fn make_strong_with<T, F>(f: F) -> Strong<T>
where
    F: FnOnce() -> T,
{
    Strong::new(f())
}

/// An owning handle to a reference counted value
///
/// Cloning the handle shares ownership of the value, which is destroyed by the strategy `S` when
/// the last strong handle is dropped or reset. [Weak] handles can observe the value without
/// keeping it alive.
///
/// A handle can also be empty, e.g. when it's the result of promoting an expired [Weak] handle.
/// Dereferencing an empty handle panics, [Strong::get] and [Strong::try_get] are the checked
/// alternatives.
///
/// The payload is only accessible immutably while it's shared. Interior mutability (e.g. a
/// `RefCell`) can be used for shared mutation, and [Strong::get_mut] provides direct access when
/// the handle is the payload's only reference.
///
/// Handles are compared, ordered, and hashed by the identity of their payload rather than by
/// its value, so that they can be used as keys in ordered and hashed containers.
///
/// The handle's own operations are associated functions, e.g. `Strong::use_count(&handle)`, to
/// avoid clashes with the payload's methods.
pub struct Strong<T: ?Sized, S = Global>(pub(crate) RawPtr<T, true, S>);

impl<T> Strong<T> {
    /// Moves the provided value into newly allocated memory
    pub fn new(value: T) -> Self {
        Self::with_strategy(value)
    }
}

impl<T: ?Sized> Strong<T> {
    /// Takes ownership of a boxed value
    pub fn from_box(boxed: Box<T>) -> Self {
        // Safety: leaked boxes are released by `Global`
        unsafe { Self::from_non_null(NonNull::from(Box::leak(boxed))) }
    }
}

impl<T, S: Allocate<T>> Strong<T, S> {
    /// Moves the provided value into memory allocated by the strategy `S`
    pub fn with_strategy(value: T) -> Self {
        // Safety: the payload was freshly produced by the handle's strategy
        unsafe { Self::from_non_null(S::allocate(value)) }
    }

    /// Replaces the handle's referent with a newly allocated value
    pub fn reset_with(this: &mut Self, value: T) {
        *this = Self::with_strategy(value);
    }
}

impl<T: ?Sized, S: Strategy<T>> Strong<T, S> {
    /// Takes ownership of a payload that was produced by the strategy `S`
    ///
    /// A null pointer produces an empty handle.
    ///
    /// # Safety
    ///
    /// `value` must be null, or have been produced by `S`. The payload must not be owned by
    /// anything else, wrapping the same payload in two independent handles destroys it twice.
    pub unsafe fn from_raw(value: *mut T) -> Self {
        match NonNull::new(value) {
            // Safety: see the caller's guarantees
            Some(value) => unsafe { Self::from_non_null(value) },
            None => Self::empty(),
        }
    }

    unsafe fn from_non_null(value: NonNull<T>) -> Self {
        // Safety: see the caller's guarantees
        Self(unsafe { RawPtr::from_raw(value) })
    }
}

impl<T: ?Sized, S> Strong<T, S> {
    /// Makes a handle that doesn't refer to a value
    pub const fn empty() -> Self {
        Self(RawPtr::empty())
    }

    /// Makes a handle that shares ownership of another handle's payload
    ///
    /// The other handle's payload type must be viewable as `T`, see [Upcast].
    pub fn from_strong<U>(other: &Strong<U, S>) -> Self
    where
        U: ?Sized + Upcast<T>,
    {
        Self(RawPtr::acquire(&other.0))
    }

    /// Promotes a weak handle
    ///
    /// The result is empty if the observed payload has expired.
    pub fn from_weak<U>(weak: &Weak<U, S>) -> Self
    where
        U: ?Sized + Upcast<T>,
    {
        Self(RawPtr::acquire(&weak.0))
    }

    /// Converts the handle into a view of another payload type, keeping its ownership
    pub fn upcast<U>(this: Self) -> Strong<U, S>
    where
        U: ?Sized,
        T: Upcast<U>,
    {
        Strong(this.0.upcast())
    }

    /// Makes a weak handle that observes the payload
    pub fn downgrade(this: &Self) -> Weak<T, S> {
        Weak::from_strong(this)
    }

    /// Replaces the handle's referent with a share of another strong handle's payload
    ///
    /// Assigning a handle that refers to the same payload leaves the counts untouched.
    pub fn assign_strong<U>(this: &mut Self, other: &Strong<U, S>)
    where
        U: ?Sized + Upcast<T>,
    {
        this.0.reset_from(&other.0);
    }

    /// Replaces the handle's referent with a promotion of the weak handle
    ///
    /// The handle becomes empty if the weak handle's payload has expired.
    pub fn assign_weak<U>(this: &mut Self, weak: &Weak<U, S>)
    where
        U: ?Sized + Upcast<T>,
    {
        this.0.reset_from(&weak.0);
    }

    /// Releases the handle's ownership, leaving it empty
    ///
    /// The payload is destroyed if this was its last strong handle.
    pub fn reset(this: &mut Self) {
        this.0.release();
    }

    /// Exchanges the referents of two handles without changing any counts
    pub fn swap(this: &mut Self, other: &mut Self) {
        std::mem::swap(this, other);
    }

    /// Returns a reference to the payload, or `None` if the handle is empty
    pub fn get(this: &Self) -> Option<&T> {
        // Safety: the handle's strong reference keeps the payload alive
        this.0.value().map(|value| unsafe { value.as_ref() })
    }

    /// Returns a reference to the payload
    ///
    /// An error is returned if the handle is empty.
    pub fn try_get(this: &Self) -> Result<&T> {
        Self::get(this).ok_or(Error::Empty)
    }

    /// Returns a mutable reference to the payload
    ///
    /// `None` is returned if the handle is empty, or if other strong or weak handles refer to
    /// the payload.
    pub fn get_mut(this: &mut Self) -> Option<&mut T> {
        Self::try_get_mut(this).ok()
    }

    /// Returns a mutable reference to the payload
    ///
    /// An error is returned if the handle is empty, or if other strong or weak handles refer to
    /// the payload.
    pub fn try_get_mut(this: &mut Self) -> Result<&mut T> {
        match this.0.value() {
            None => Err(Error::Empty),
            // Safety: no other handle can reach the payload
            Some(mut value) if this.0.is_exclusive() => Ok(unsafe { value.as_mut() }),
            Some(_) => Err(Error::Shared),
        }
    }

    /// Returns a pointer to the payload, which is null if the handle is empty
    pub fn as_ptr(this: &Self) -> *const T
    where
        T: Sized,
    {
        this.0
            .value()
            .map_or(ptr::null(), |value| value.as_ptr().cast_const())
    }

    /// Returns the address of the payload
    pub fn address(this: &Self) -> Address {
        this.0.address()
    }

    /// Returns true if the two handles refer to the same payload
    ///
    /// Handles that view the same payload through different types are equal, whether the view
    /// is the payload itself, one of its fields, or a trait object. Two empty handles are equal.
    pub fn ptr_eq<U: ?Sized, S2>(this: &Self, other: &Strong<U, S2>) -> bool {
        this.0.identity() == other.0.identity()
    }

    /// Returns the number of strong handles that refer to the payload
    ///
    /// Empty handles have a count of zero.
    pub fn use_count(this: &Self) -> usize {
        this.0.use_count()
    }

    /// Returns the number of weak handles that observe the payload
    pub fn weak_count(this: &Self) -> usize {
        this.0.weak_count()
    }

    /// Returns true if this is the payload's only strong handle
    ///
    /// Empty handles are considered to be unique.
    pub fn is_unique(this: &Self) -> bool {
        this.0.is_unique()
    }

    /// Returns true if the handle doesn't refer to a value
    pub fn is_empty(this: &Self) -> bool {
        this.0.is_empty()
    }
}

impl<T> From<T> for Strong<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: ?Sized> From<Box<T>> for Strong<T> {
    fn from(boxed: Box<T>) -> Self {
        Self::from_box(boxed)
    }
}

impl<T: ?Sized, S> Default for Strong<T, S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized, S> Clone for Strong<T, S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized, S> Deref for Strong<T, S> {
    type Target = T;

    fn deref(&self) -> &T {
        match Self::try_get(self) {
            Ok(value) => value,
            Err(error) => contract_violation(error),
        }
    }
}

impl<T: ?Sized, S> fmt::Debug for Strong<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_counts(f, "Strong")
    }
}

impl<T: ?Sized + fmt::Display, S> fmt::Display for Strong<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Self::get(self) {
            Some(value) => value.fmt(f),
            None => f.write_str("<empty>"),
        }
    }
}

impl<T: ?Sized, U: ?Sized, S, S2> PartialEq<Strong<U, S2>> for Strong<T, S> {
    fn eq(&self, other: &Strong<U, S2>) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl<T: ?Sized, S> Eq for Strong<T, S> {}

impl<T: ?Sized, U: ?Sized, S, S2> PartialOrd<Strong<U, S2>> for Strong<T, S> {
    fn partial_cmp(&self, other: &Strong<U, S2>) -> Option<Ordering> {
        Some(self.0.identity().cmp(&other.0.identity()))
    }
}

impl<T: ?Sized, S> Ord for Strong<T, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.identity().cmp(&other.0.identity())
    }
}

impl<T: ?Sized, S> Hash for Strong<T, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.identity().hash(state)
    }
}
