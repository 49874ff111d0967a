//! Ed25519 key material

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use tessera_core::TokenError;
use zeroize::Zeroizing;

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("no private key available for signing")]
    NoPrivateKey,

    #[error("no public key available for verification")]
    NoPublicKey,

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

impl From<KeyError> for TokenError {
    fn from(err: KeyError) -> Self {
        TokenError::signing(err.to_string(), err)
    }
}

/// A keypair that may hold only one half.
///
/// Verifiers usually hold just the peer's public key; an issuer holds both.
#[derive(Clone, Default)]
pub struct KeyPair {
    signing: Option<SigningKey>,
    verifying: Option<VerifyingKey>,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("has_private_key", &self.signing.is_some())
            .field("public_key", &self.public_key_base64())
            .finish()
    }
}

impl KeyPair {
    /// Generate a fresh keypair
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        Self::from_signing_key(SigningKey::generate(&mut csprng))
    }

    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing: Some(signing_key),
            verifying: Some(verifying_key),
        }
    }

    pub fn from_verifying_key(verifying_key: VerifyingKey) -> Self {
        Self {
            signing: None,
            verifying: Some(verifying_key),
        }
    }

    /// Load a private key from its base64-encoded 32-byte seed
    pub fn from_base64_private(encoded: &str) -> Result<Self, KeyError> {
        let bytes = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .map_err(|e| KeyError::InvalidKey(e.to_string()))?,
        );
        let seed: Zeroizing<[u8; SECRET_KEY_LENGTH]> = Zeroizing::new(
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| wrong_length(SECRET_KEY_LENGTH, bytes.len()))?,
        );
        Ok(Self::from_signing_key(SigningKey::from_bytes(&seed)))
    }

    /// Load a public key from base64
    pub fn from_base64_public(encoded: &str) -> Result<Self, KeyError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| KeyError::InvalidKey(e.to_string()))?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| wrong_length(PUBLIC_KEY_LENGTH, bytes.len()))?;
        let verifying =
            VerifyingKey::from_bytes(&bytes).map_err(|e| KeyError::InvalidKey(e.to_string()))?;
        Ok(Self::from_verifying_key(verifying))
    }

    /// Base64 of the private seed, for handing to a configuration file
    pub fn private_key_base64(&self) -> Result<Zeroizing<String>, KeyError> {
        let signing = self.signing.as_ref().ok_or(KeyError::NoPrivateKey)?;
        Ok(Zeroizing::new(STANDARD.encode(signing.to_bytes())))
    }

    pub fn public_key_base64(&self) -> Option<String> {
        self.verifying.map(|k| STANDARD.encode(k.to_bytes()))
    }

    /// Drop the private half, keeping only what a verifier needs
    pub fn public_only(&self) -> Self {
        Self {
            signing: None,
            verifying: self.verifying,
        }
    }

    pub fn has_private_key(&self) -> bool {
        self.signing.is_some()
    }

    pub fn has_public_key(&self) -> bool {
        self.verifying.is_some()
    }

    pub(crate) fn signing_key(&self) -> Result<&SigningKey, KeyError> {
        self.signing.as_ref().ok_or(KeyError::NoPrivateKey)
    }

    pub(crate) fn verifying_key(&self) -> Result<&VerifyingKey, KeyError> {
        self.verifying.as_ref().ok_or(KeyError::NoPublicKey)
    }
}

fn wrong_length(expected: usize, actual: usize) -> KeyError {
    KeyError::InvalidKey(format!("expected {expected} bytes, got {actual}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trip_preserves_identity() {
        let pair = KeyPair::generate();
        let private = pair.private_key_base64().unwrap();
        let public = pair.public_key_base64().unwrap();

        let loaded = KeyPair::from_base64_private(&private).unwrap();
        assert_eq!(loaded.public_key_base64().unwrap(), public);

        let verifier = KeyPair::from_base64_public(&public).unwrap();
        assert!(!verifier.has_private_key());
        assert!(verifier.has_public_key());
    }

    #[test]
    fn rejects_wrong_lengths_and_bad_base64() {
        assert!(matches!(
            KeyPair::from_base64_public("AAAA"),
            Err(KeyError::InvalidKey(_))
        ));
        assert!(matches!(
            KeyPair::from_base64_private("not base64!!"),
            Err(KeyError::InvalidKey(_))
        ));
    }

    #[test]
    fn public_only_cannot_export_private() {
        let pair = KeyPair::generate().public_only();
        assert!(matches!(pair.private_key_base64(), Err(KeyError::NoPrivateKey)));
        assert!(format!("{pair:?}").contains("has_private_key: false"));
    }
}
