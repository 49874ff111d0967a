use crate::errors::{Result, TokenError};
use serde::{Deserialize, Serialize};

/// An assertion of end-user identity produced by the front-end authenticator.
///
/// `proxy_token` is opaque to everyone except the parser in
/// [`ProxyUserToken::from_json`]; `signature` covers its exact bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyPrincipal {
    pub proxy_token: String,
    pub signature: String,
}

impl ProxyPrincipal {
    pub fn new(proxy_token: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            proxy_token: proxy_token.into(),
            signature: signature.into(),
        }
    }

    /// Parse the embedded user token
    pub fn user_token(&self) -> Result<ProxyUserToken> {
        ProxyUserToken::from_json(&self.proxy_token)
    }
}

/// Certificate identity of the proxied user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct X509Info {
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

/// Decoded form of [`ProxyPrincipal::proxy_token`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyUserToken {
    pub x509: X509Info,
    pub issued_by: String,
    pub issued_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_for: Option<String>,
    pub not_after: i64,
}

impl ProxyUserToken {
    pub fn new(
        subject: impl Into<String>,
        issued_by: impl Into<String>,
        issued_to: impl Into<String>,
        not_after: i64,
    ) -> Self {
        Self {
            x509: X509Info {
                subject: subject.into(),
                issuer: None,
            },
            issued_by: issued_by.into(),
            issued_to: issued_to.into(),
            issued_for: None,
            not_after,
        }
    }

    pub fn subject(&self) -> &str {
        &self.x509.subject
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| TokenError::malformed("proxy user token", e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| TokenError::malformed("proxy user token", e.to_string()))
    }
}
