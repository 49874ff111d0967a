//! Shared utilities for the tessera workspace

pub mod tracing;

pub use self::tracing::{init, init_for_tests};
