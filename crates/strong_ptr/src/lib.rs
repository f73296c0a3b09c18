//! Non-intrusive reference counted handles
//!
//! A value is owned by one or more [Strong] handles and observed by any number of [Weak]
//! handles. All handles for a value share a single counting cell that lives in its own
//! allocation, so payload types don't need to reserve space for counts.
//!
//! The payload is destroyed when the last strong handle is released, and the counting cell is
//! freed once the last handle of either kind is gone. Reference cycles are not detected, a
//! [Weak] handle should be used to break them.
//!
//! Payloads are produced and destroyed by an allocation [Strategy] that is part of the handle's
//! type. [Global] boxes single values, and [GlobalArray] boxes slices for [StrongArray].
//!
//! # Features
//!
//! - `rc` (default): counts are plain cells, handles can't be sent between threads.
//! - `arc`: counts are atomics, handles are `Send + Sync` when the payload is.
//!
//! A single counting scheme can be enabled at a time.

#![warn(missing_docs)]

#[cfg(all(feature = "arc", feature = "rc"))]
compile_error!("A single counting feature can be enabled at a time");

#[cfg(not(any(feature = "arc", feature = "rc")))]
compile_error!("Either the `rc` or the `arc` feature needs to be enabled");

mod address;
mod array;
mod count_impl;
mod counter;
mod error;
mod raw;
mod strategy;
mod strong;
mod upcast;
mod weak;

pub use crate::{
    address::Address,
    array::{StrongArray, WeakArray},
    error::{Error, Result},
    strategy::{Allocate, AllocateArray, Construct, Global, GlobalArray, Strategy},
    strong::{Strong, make_strong, make_strong_with},
    upcast::Upcast,
    weak::Weak,
};
