//! Builder methods for creating errors with context

use super::types::TokenError;

impl TokenError {
    /// Create a malformed-input error
    #[must_use]
    pub fn malformed(input: impl Into<String>, message: impl Into<String>) -> Self {
        TokenError::Malformed {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create an expiry error for the given subject
    #[must_use]
    pub fn expired(subject: impl Into<String>, not_after: i64) -> Self {
        TokenError::Expired {
            subject: subject.into(),
            not_after,
        }
    }

    /// Create a signature failure, naming whose key was used
    #[must_use]
    pub fn signature_invalid(subject: impl Into<String>, signer: impl Into<String>) -> Self {
        TokenError::SignatureInvalid {
            subject: subject.into(),
            signer: signer.into(),
        }
    }

    #[must_use]
    pub fn recipient_mismatch(expected: impl Into<String>, actual: Option<String>) -> Self {
        TokenError::RecipientMismatch {
            expected: expected.into(),
            actual,
        }
    }

    #[must_use]
    pub fn app_not_registered(security_id: impl Into<String>, message: impl Into<String>) -> Self {
        TokenError::AppNotRegistered {
            security_id: security_id.into(),
            message: message.into(),
        }
    }

    /// Create a transport failure for the named service
    #[must_use]
    pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
        TokenError::TransportFailure {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a signing error with an underlying source
    #[must_use]
    pub fn signing(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        TokenError::Signing {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        TokenError::Configuration {
            message: message.into(),
        }
    }

    /// Whether the caller may recover by refreshing the token once
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TokenError::Expired { .. })
    }

    /// Whether the failure indicates tampering or misuse of a token
    #[must_use]
    pub fn is_security_violation(&self) -> bool {
        matches!(
            self,
            TokenError::SignatureInvalid { .. } | TokenError::RecipientMismatch { .. }
        )
    }
}
