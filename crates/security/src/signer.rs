//! Signer and verifier capabilities.
//!
//! Signatures travel as standard base64 text inside string fields.

use crate::keys::{KeyError, KeyPair};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, Verifier};
use tracing::trace;

pub trait TokenSigner: Send + Sync {
    /// Sign `bytes`, returning base64 text
    fn sign(&self, bytes: &[u8]) -> Result<String, KeyError>;
}

pub trait SignatureVerifier: Send + Sync {
    /// Never fails: any decoding or cryptographic error is reported as `false`
    fn verify(&self, bytes: &[u8], signature: &str) -> bool;
}

impl TokenSigner for KeyPair {
    fn sign(&self, bytes: &[u8]) -> Result<String, KeyError> {
        let signature = self.signing_key()?.sign(bytes);
        Ok(STANDARD.encode(signature.to_bytes()))
    }
}

impl SignatureVerifier for KeyPair {
    fn verify(&self, bytes: &[u8], signature: &str) -> bool {
        let Ok(verifying_key) = self.verifying_key() else {
            trace!("verification attempted without a public key");
            return false;
        };
        let Ok(raw) = STANDARD.decode(signature) else {
            trace!("signature is not valid base64");
            return false;
        };
        let Ok(signature) = Signature::try_from(raw.as_slice()) else {
            trace!(len = raw.len(), "signature has the wrong length");
            return false;
        };
        verifying_key.verify(bytes, &signature).is_ok()
    }
}
