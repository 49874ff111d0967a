//! Core domain types, errors, and constants for the token trust protocol.
//!
//! ## Key Components
//!
//! - **`errors`**: the closed `TokenError` taxonomy and `Result` alias. Only
//!   `Expired` is recoverable.
//! - **`types`**: tokens, principals, validity caveats, proxy assertions and
//!   token requests.
//! - **`security_id`**: reserved platform identities and the rules for telling
//!   a security id apart from an application name.
//! - **`constants`** and **`time`**: shared header names, defaults and the
//!   millisecond clock.

pub mod constants;
pub mod errors;
pub mod security_id;
pub mod time;
pub mod types;

pub use self::{
    constants::*,
    errors::{Result, TokenError},
    time::now_millis,
    types::*,
};
