//! Token protocol data model.
//!
//! - **`validity`**: `ValidityCaveats` and `Principal`, the who/whom/when envelope
//! - **`token`**: `SecurityToken` and its authorization payload
//! - **`proxy`**: proxied-user assertions produced by the front-end authenticator
//! - **`request`**: the ephemeral `TokenRequest` sent to the issuing service

pub mod proxy;
pub mod request;
pub mod token;
pub mod validity;

pub use proxy::*;
pub use request::*;
pub use token::*;
pub use validity::*;
