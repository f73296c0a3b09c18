use thiserror::Error;

/// The errors reported by the checked handle accessors
///
/// The panicking accessors (`Deref`, `Index`, `IndexMut`) report the same conditions as
/// contract violations, using this type's `Display` output as the panic message.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The handle doesn't refer to a value
    #[error("The handle is empty")]
    Empty,
    /// The observed value has already been destroyed
    #[error("The observed value has expired")]
    Expired,
    /// Mutable access was requested while other handles refer to the value
    #[error("The value is shared with other handles")]
    Shared,
    /// An array index was outside of the array's bounds
    #[error("Index {index} is out of bounds for an array of length {len}")]
    OutOfBounds {
        /// The requested index
        index: usize,
        /// The length of the array
        len: usize,
    },
}

/// The Result type returned by the checked handle accessors
pub type Result<T> = std::result::Result<T, Error>;

/// Panics with the error's message, used by the operators that treat errors as contract violations
#[cold]
#[track_caller]
pub(crate) fn contract_violation(error: Error) -> ! {
    panic!("{error}")
}
