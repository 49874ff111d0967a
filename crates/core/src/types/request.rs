use super::proxy::ProxyPrincipal;
use super::token::{SecurityToken, TokenType};
use super::validity::Principal;
use crate::time::now_millis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What the requester wants a token about. Exactly one kind per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestSubject {
    /// The requesting application itself, with no explicit principal
    Application,
    /// A proxied user asserted by the front end
    ProxyPrincipal(ProxyPrincipal),
    /// An existing token, for derivation or refresh
    TokenPrincipal(Box<SecurityToken>),
    /// An explicit principal signed by the issuer
    Principal(Principal),
}

/// A single acquire or refresh call to the issuing service. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub requester_security_id: String,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub subject: RequestSubject,
    pub target_security_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_authorizations: Option<BTreeSet<String>>,
}

impl TokenRequest {
    pub fn new(
        requester_security_id: impl Into<String>,
        token_type: TokenType,
        subject: RequestSubject,
        target_security_id: impl Into<String>,
    ) -> Self {
        Self {
            requester_security_id: requester_security_id.into(),
            timestamp: now_millis(),
            token_type,
            subject,
            target_security_id: target_security_id.into(),
            exclude_authorizations: None,
        }
    }

    /// Attach exclusions; an empty set is treated as no exclusions
    #[must_use]
    pub fn with_exclusions(mut self, exclude: Option<BTreeSet<String>>) -> Self {
        self.exclude_authorizations = exclude.filter(|e| !e.is_empty());
        self
    }

    pub fn proxy_principal(&self) -> Option<&ProxyPrincipal> {
        match &self.subject {
            RequestSubject::ProxyPrincipal(p) => Some(p),
            _ => None,
        }
    }

    pub fn token_principal(&self) -> Option<&SecurityToken> {
        match &self.subject {
            RequestSubject::TokenPrincipal(t) => Some(t),
            _ => None,
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        match &self.subject {
            RequestSubject::Principal(p) => Some(p),
            _ => None,
        }
    }
}
