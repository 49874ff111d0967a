//! Core error type definitions

/// Result type alias for token operations
pub type Result<T> = std::result::Result<T, TokenError>;

/// Closed set of failures a token operation can produce.
///
/// Only [`TokenError::Expired`] is recoverable, and only by a single refresh.
/// Every other variant is fatal at the layer that observed it.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// A proxy assertion or derivation input could not be parsed
    Malformed { input: String, message: String },

    /// The validity window closed (`now >= not_after`)
    Expired { subject: String, not_after: i64 },

    /// A signature failed to verify against the expected key
    SignatureInvalid { subject: String, signer: String },

    /// The token was not issued for the identity checking it
    RecipientMismatch {
        expected: String,
        actual: Option<String>,
    },

    /// The issuing service does not know the requesting application
    AppNotRegistered { security_id: String, message: String },

    /// The RPC collaborator failed to reach the issuing service
    TransportFailure { service: String, message: String },

    /// The local key material could not produce a signature
    Signing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The client was assembled with missing or inconsistent settings
    Configuration { message: String },
}
