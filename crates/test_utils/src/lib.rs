//! Testing utilities for strong_ptr
//!
//! Instrumented payload types that report when they're constructed and dropped. The reports are
//! shared through thread-safe cells, so the same helpers work with both of strong_ptr's counting
//! features.

#![warn(missing_docs)]

mod drop_log;
mod tally;

pub use drop_log::{DropLog, Named};
pub use tally::{Counts, Tally, Tracked};
