use std::ptr::NonNull;

/// Declares that a payload of type `Self` can be viewed as a `T`
///
/// Handles for `Self` can be converted into handles for `T` that share the same counting cell.
/// The payload is still destroyed as a `Self` when the last strong handle is released, whichever
/// type that handle refers to it through.
///
/// Every type can be viewed as itself. Other views are declared with the [upcast!] macro, either
/// as a trait object, or as a field that embeds a base type.
///
/// # Safety
///
/// `upcast` must not read through `ptr`, which may refer to a payload that has already been
/// destroyed. The returned pointer must address a `T` that lives inside the payload at `ptr` for
/// as long as the payload does.
///
/// [upcast!]: crate::upcast!
pub unsafe trait Upcast<T: ?Sized> {
    /// Converts a pointer to the payload into a pointer to its `T` view
    fn upcast(ptr: NonNull<Self>) -> NonNull<T>;
}

unsafe impl<T: ?Sized> Upcast<T> for T {
    #[inline]
    fn upcast(ptr: NonNull<Self>) -> NonNull<T> {
        ptr
    }
}

/// Implements [Upcast] for a payload type
///
/// Two forms are supported:
/// - `upcast!(Type => dyn Trait)` allows handles for `Type` to be viewed as `dyn Trait`.
/// - `upcast!(Derived => Base, field)` allows handles for `Derived` to be viewed as the `Base`
///   that's stored in `Derived`'s `field`.
///
/// # Examples
///
/// ```
/// use strong_ptr::{Strong, upcast};
///
/// trait Shape {
///     fn area(&self) -> f64;
/// }
///
/// struct Base {
///     name: &'static str,
/// }
///
/// struct Square {
///     base: Base,
///     side: f64,
/// }
///
/// impl Shape for Square {
///     fn area(&self) -> f64 {
///         self.side * self.side
///     }
/// }
///
/// upcast!(Square => dyn Shape);
/// upcast!(Square => Base, base);
///
/// let square = Strong::new(Square {
///     base: Base { name: "square" },
///     side: 2.0,
/// });
/// let shape: Strong<dyn Shape> = Strong::from_strong(&square);
/// let base: Strong<Base> = Strong::from_strong(&square);
///
/// assert_eq!(shape.area(), 4.0);
/// assert_eq!(base.name, "square");
/// assert_eq!(Strong::use_count(&square), 3);
/// ```
///
/// The field must have the base type:
///
/// ```compile_fail
/// use strong_ptr::upcast;
///
/// struct Holder {
///     tag: u8,
/// }
///
/// upcast!(Holder => String, tag);
/// ```
#[macro_export]
macro_rules! upcast {
    ($derived:ty => dyn $($base:tt)+) => {
        unsafe impl $crate::Upcast<dyn $($base)+> for $derived {
            #[inline]
            fn upcast(
                ptr: ::std::ptr::NonNull<Self>,
            ) -> ::std::ptr::NonNull<dyn $($base)+> {
                ptr
            }
        }
    };
    ($derived:ty => $base:ty, $field:ident) => {
        // Rejects fields that aren't of the base type
        const _: fn(&$derived) -> &$base = |derived| &derived.$field;

        unsafe impl $crate::Upcast<$base> for $derived {
            #[inline]
            fn upcast(ptr: ::std::ptr::NonNull<Self>) -> ::std::ptr::NonNull<$base> {
                // Offset without dereferencing, the payload may have been destroyed
                let field = ptr
                    .as_ptr()
                    .wrapping_byte_add(::std::mem::offset_of!($derived, $field))
                    .cast::<$base>();
                // Safety: offsetting a non-null payload pointer to one of its fields
                unsafe { ::std::ptr::NonNull::new_unchecked(field) }
            }
        }
    };
}
