//! Error taxonomy for token acquisition and verification

mod builders;
mod display;
mod types;

pub use types::{Result, TokenError};
