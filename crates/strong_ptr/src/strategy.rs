//! Allocation strategies that produce and destroy payloads

use std::{iter, ptr::NonNull};

/// Destroys payloads that were produced by the strategy
///
/// A strategy is a type-level policy, it's part of a handle's type and is never instantiated.
/// Handles that use different strategies can't be converted into each other.
pub trait Strategy<T: ?Sized>: 'static {
    /// Destroys the payload and releases its memory
    ///
    /// # Safety
    ///
    /// `payload` must have been produced by this strategy, and must not be used afterwards.
    unsafe fn deallocate(payload: NonNull<T>);
}

/// A strategy that allocates single values
pub trait Allocate<T>: Strategy<T> {
    /// Moves the value into newly allocated memory
    fn allocate(value: T) -> NonNull<T>;

    /// Constructs a value from the provided arguments in newly allocated memory
    ///
    /// See [Construct].
    fn allocate_with<Args>(args: Args) -> NonNull<T>
    where
        T: Construct<Args>,
    {
        Self::allocate(T::construct(args))
    }
}

/// A strategy that allocates contiguous sequences of values
pub trait AllocateArray<T>: Strategy<[T]> {
    /// Allocates an array of `len` default-initialized values
    fn allocate_array(len: usize) -> NonNull<[T]>
    where
        T: Default;

    /// Moves the values into a newly allocated array
    fn allocate_from_vec(values: Vec<T>) -> NonNull<[T]>;
}

/// The default single-value strategy, backed by [Box]
#[derive(Clone, Copy, Debug, Default)]
pub struct Global;

impl<T: ?Sized> Strategy<T> for Global {
    unsafe fn deallocate(payload: NonNull<T>) {
        // Safety: payloads produced by `Global` are leaked boxes
        drop(unsafe { Box::from_raw(payload.as_ptr()) });
    }
}

impl<T> Allocate<T> for Global {
    fn allocate(value: T) -> NonNull<T> {
        NonNull::from(Box::leak(Box::new(value)))
    }
}

/// The default array strategy, backed by boxed slices
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalArray;

impl<T> Strategy<[T]> for GlobalArray {
    unsafe fn deallocate(payload: NonNull<[T]>) {
        // Safety: payloads produced by `GlobalArray` are leaked boxed slices
        drop(unsafe { Box::from_raw(payload.as_ptr()) });
    }
}

impl<T> AllocateArray<T> for GlobalArray {
    fn allocate_array(len: usize) -> NonNull<[T]>
    where
        T: Default,
    {
        let values: Box<[T]> = iter::repeat_with(T::default).take(len).collect();
        NonNull::from(Box::leak(values))
    }

    fn allocate_from_vec(values: Vec<T>) -> NonNull<[T]> {
        NonNull::from(Box::leak(values.into_boxed_slice()))
    }
}

/// Constructs a value from a tuple of up to six arguments
///
/// An empty tuple constructs the type's [Default] value, larger tuples are forwarded to the
/// type's `From<(A1, ..., An)>` implementation.
///
/// # Examples
///
/// ```
/// use strong_ptr::make_strong;
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl From<(i32, i32)> for Point {
///     fn from((x, y): (i32, i32)) -> Self {
///         Self { x, y }
///     }
/// }
///
/// let point = make_strong::<Point, _>((1, 2));
/// assert_eq!(point.x + point.y, 3);
///
/// let zero = make_strong::<i64, _>(());
/// assert_eq!(*zero, 0);
/// ```
pub trait Construct<Args>: Sized {
    /// Makes a new value from the arguments
    fn construct(args: Args) -> Self;
}

impl<T: Default> Construct<()> for T {
    fn construct((): ()) -> Self {
        T::default()
    }
}

macro_rules! construct_from_tuple {
    ($($arg:ident),+) => {
        impl<T, $($arg),+> Construct<($($arg,)+)> for T
        where
            T: From<($($arg,)+)>,
        {
            fn construct(args: ($($arg,)+)) -> Self {
                T::from(args)
            }
        }
    };
}

construct_from_tuple!(A1);
construct_from_tuple!(A1, A2);
construct_from_tuple!(A1, A2, A3);
construct_from_tuple!(A1, A2, A3, A4);
construct_from_tuple!(A1, A2, A3, A4, A5);
construct_from_tuple!(A1, A2, A3, A4, A5, A6);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Wide(u8, u16, u32, u64, i8, i16);

    impl From<(u8, u16, u32, u64, i8, i16)> for Wide {
        fn from((a, b, c, d, e, f): (u8, u16, u32, u64, i8, i16)) -> Self {
            Self(a, b, c, d, e, f)
        }
    }

    #[test]
    fn construct_from_no_arguments() {
        assert_eq!(String::construct(()), "");
    }

    #[test]
    fn construct_from_six_arguments() {
        assert_eq!(
            Wide::construct((1u8, 2u16, 3u32, 4u64, -5i8, -6i16)),
            Wide(1, 2, 3, 4, -5, -6)
        );
    }

    #[test]
    fn global_round_trip() {
        let payload: NonNull<Wide> = Global::allocate_with((1u8, 2u16, 3u32, 4u64, 5i8, 6i16));
        assert_eq!(unsafe { payload.as_ref() }, &Wide(1, 2, 3, 4, 5, 6));
        unsafe { Global::deallocate(payload) };
    }

    #[test]
    fn array_is_default_initialized() {
        let array = <GlobalArray as AllocateArray<String>>::allocate_array(3);
        let values = unsafe { array.as_ref() };
        assert_eq!(values.len(), 3);
        assert!(values.iter().all(String::is_empty));
        unsafe { GlobalArray::deallocate(array) };
    }

    #[test]
    fn empty_array() {
        let array = <GlobalArray as AllocateArray<u8>>::allocate_from_vec(Vec::new());
        assert!(unsafe { array.as_ref() }.is_empty());
        unsafe { GlobalArray::deallocate(array) };
    }
}
