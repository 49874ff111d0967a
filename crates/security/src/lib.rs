//! Canonical encoding and signing for the token trust protocol.
//!
//! Signing and verification only agree if both sides feed the signer the exact
//! same bytes. [`canonical`] produces those bytes; [`keys`] holds the ed25519
//! material; [`signing`] ties the two together for every signed object in the
//! protocol.

pub mod canonical;
pub mod keys;
pub mod signer;
pub mod signing;

pub use canonical::{encode_principal, encode_request, encode_token};
pub use keys::{KeyError, KeyPair};
pub use signer::{SignatureVerifier, TokenSigner};
pub use signing::*;
