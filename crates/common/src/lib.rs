//! Common types shared across the Concierge crates.
//!
//! Every library crate in the workspace reports failures through
//! [`ConciergeError`] so that errors cross crate boundaries without
//! conversion glue.

pub mod error;

pub use error::{ConciergeError, Result};
