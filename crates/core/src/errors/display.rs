//! Display implementations for error types

use super::types::TokenError;
use std::fmt;

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed { input, message } => {
                write!(f, "malformed {input}: {message}")
            }
            TokenError::Expired { subject, not_after } => {
                write!(f, "token for '{subject}' expired at {not_after}")
            }
            TokenError::SignatureInvalid { subject, signer } => {
                write!(
                    f,
                    "signature for '{subject}' does not verify against the {signer} key"
                )
            }
            TokenError::RecipientMismatch { expected, actual } => match actual {
                Some(actual) => write!(
                    f,
                    "token was issued for '{actual}', not for '{expected}'"
                ),
                None => write!(
                    f,
                    "token has no recipient, expected it to be issued for '{expected}'"
                ),
            },
            TokenError::AppNotRegistered {
                security_id,
                message,
            } => {
                write!(
                    f,
                    "application '{security_id}' is not registered with the issuing service: {message}"
                )
            }
            TokenError::TransportFailure { service, message } => {
                write!(f, "failed to reach '{service}': {message}")
            }
            TokenError::Signing { message, source } => match source {
                Some(source) => write!(f, "signing failed: {message}: {source}"),
                None => write!(f, "signing failed: {message}"),
            },
            TokenError::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
        }
    }
}
