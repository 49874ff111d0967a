use super::warn_trust_downgrade;
use std::collections::BTreeSet;
use tessera_config::ProviderMode;
use tessera_core::security_id::ISSUING_SERVICE;
use tessera_core::time::millis_from_now;
use tessera_core::{
    now_millis, Authorizations, Principal, RequestSubject, Result, SecurityToken, TokenError,
    TokenRequest, TokenType, ValidityCaveats, MOCK_APP_PRINCIPAL_VALIDITY_MILLIS,
    MOCK_TOKEN_VALIDITY_MILLIS,
};
use tracing::debug;

/// Synthesizes short-lived tokens locally from the request and a fixed
/// authorization set. Nothing is signed and nothing is checked.
#[derive(Debug, Clone)]
pub struct MockProvider {
    security_id: String,
    auths: BTreeSet<String>,
}

impl MockProvider {
    pub fn new(security_id: impl Into<String>, auths: BTreeSet<String>) -> Self {
        warn_trust_downgrade(ProviderMode::Mock);
        Self {
            security_id: security_id.into(),
            auths,
        }
    }

    pub fn acquire(&self, request: &TokenRequest) -> Result<SecurityToken> {
        let principal = self.principal_for(request)?;

        let mut validity = ValidityCaveats::new(
            ISSUING_SERVICE.common_name,
            &self.security_id,
            millis_from_now(MOCK_TOKEN_VALIDITY_MILLIS),
        );
        validity.issued_for = Some(request.target_security_id.clone());

        let mut token = SecurityToken::new(request.token_type, principal, validity);
        token.authorizations = Authorizations::with_formal(self.auths.iter().cloned());
        if let Some(exclude) = &request.exclude_authorizations {
            token.authorizations.remove_all(exclude);
        }

        debug!(subject = %token.principal.principal, target = %request.target_security_id, "issued mock token");
        Ok(token)
    }

    /// Push `not_after` one mock window past the later of its current value and now
    pub fn refresh(&self, token: &SecurityToken) -> SecurityToken {
        let mut fresh = token.clone();
        fresh.validity.not_after = token
            .validity
            .not_after
            .max(now_millis())
            .saturating_add(MOCK_TOKEN_VALIDITY_MILLIS);
        fresh
    }

    fn principal_for(&self, request: &TokenRequest) -> Result<Principal> {
        match &request.subject {
            RequestSubject::ProxyPrincipal(proxy) => {
                let user = proxy.user_token()?;
                let validity =
                    ValidityCaveats::new(&user.issued_by, &user.issued_to, user.not_after);
                let mut principal = Principal::new(user.subject(), validity);
                principal.issuer = user.x509.issuer.clone();
                Ok(principal)
            }
            RequestSubject::TokenPrincipal(token) => Ok(token.principal.clone()),
            RequestSubject::Principal(principal) => Ok(principal.clone()),
            RequestSubject::Application if request.token_type == TokenType::App => {
                let validity = ValidityCaveats::new(
                    ISSUING_SERVICE.common_name,
                    &request.requester_security_id,
                    millis_from_now(MOCK_APP_PRINCIPAL_VALIDITY_MILLIS),
                );
                Ok(Principal::new(&request.requester_security_id, validity))
            }
            RequestSubject::Application => Err(TokenError::malformed(
                "token request",
                "a user token needs a proxy principal, token or principal",
            )),
        }
    }
}
