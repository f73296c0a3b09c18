use std::{
    fmt,
    hash::{Hash, Hasher},
    ptr,
};

/// A wrapper for comparing, ordering, and hashing payload addresses
///
/// Empty handles have a null address.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Address(*const u8);

impl Address {
    /// The address of an empty handle
    pub const fn null() -> Self {
        Self(ptr::null())
    }

    /// Returns true if the address doesn't refer to a value
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized> From<*const T> for Address {
    fn from(pointer: *const T) -> Self {
        Self(pointer as *const u8)
    }
}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.0 as usize);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
