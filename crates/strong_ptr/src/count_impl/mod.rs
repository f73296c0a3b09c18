#[cfg(feature = "arc")]
mod arc;
#[cfg(feature = "arc")]
pub(crate) use arc::*;

#[cfg(feature = "rc")]
mod rc;
#[cfg(feature = "rc")]
pub(crate) use rc::*;

/// Counts above this limit abort the process rather than risk wrapping around
pub(crate) const MAX_COUNT: usize = isize::MAX as usize;

#[cold]
pub(crate) fn overflow() -> ! {
    log::error!("reference count overflow");
    std::process::abort()
}
