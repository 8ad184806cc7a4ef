//! Retry utilities for fallible operations.
//!
//! The main entry point is [`retry`], which builds a [`Retry`] that
//! re-runs an operation produced by a factory closure until it
//! succeeds or the retry limit is reached, sleeping between attempts.

mod retry;

#[doc(inline)]
pub use retry::{Retry, retry};
