//! Security client for the token trust protocol.
//!
//! Turns a proxied-user assertion or the local application's identity into a
//! verified, cached [`SecurityToken`](tessera_core::SecurityToken), and checks
//! tokens received from peers.
//!
//! ## Key Components
//!
//! - **`client`**: [`SecurityClient`] and its builder.
//! - **`provider`**: the Mock, Unauthenticated and Production acquisition
//!   strategies behind [`TokenProvider`].
//! - **`validation`**: receive-side checks for tokens, principals and proxy
//!   assertions.
//! - **`rpc`**, **`discovery`**, **`headers`**: the collaborator interfaces the
//!   client consumes.

pub mod client;
pub mod discovery;
pub mod headers;
pub mod provider;
pub mod rpc;
pub mod validation;

pub use client::{CachePolicy, SecurityClient, SecurityClientBuilder};
pub use discovery::{SecurityIdResolver, StaticResolver};
pub use headers::{proxy_principal_from_headers, Headers};
pub use provider::{MockProvider, ProductionProvider, TokenProvider, UnauthenticatedProvider};
pub use rpc::{ClientPool, PooledClient, RpcError, SecurityService};
