//! Configuration for the tessera security client
//!
//! `ClientConfig` can be built in code, read from a flat property map or a
//! JSON file, and then adjusted from the process environment.

pub mod config;
pub mod error;
pub mod loader;
pub mod mode;

pub use config::*;
pub use error::ConfigError;
pub use loader::*;
pub use mode::ProviderMode;
