use super::Remote;
use crate::rpc::ClientPool;
use std::sync::Arc;
use tessera_core::{now_millis, Result, SecurityToken, TokenError, TokenRequest};
use tessera_security::{sign_request, verify_token_signature, KeyPair};
use tracing::{debug, error};

/// Signs every request with the application key and verifies every response
/// against the issuer key before handing it out.
pub struct ProductionProvider {
    pub(super) remote: Remote,
    app_key: Arc<KeyPair>,
    issuer_key: Arc<KeyPair>,
}

impl ProductionProvider {
    pub fn new(
        security_id: impl Into<String>,
        service_name: impl Into<String>,
        pool: Arc<dyn ClientPool>,
        app_key: Arc<KeyPair>,
        issuer_key: Arc<KeyPair>,
    ) -> Self {
        Self {
            remote: Remote {
                security_id: security_id.into(),
                service_name: service_name.into(),
                pool,
            },
            app_key,
            issuer_key,
        }
    }

    pub fn acquire(&self, request: &TokenRequest) -> Result<SecurityToken> {
        let signature = sign_request(request, self.app_key.as_ref())?;
        let token = self.remote.request_token(request, &signature)?;
        self.verify_response(&token)?;
        debug!(
            subject = %token.principal.principal,
            target = %request.target_security_id,
            "acquired verified token"
        );
        Ok(token)
    }

    pub fn refresh(&self, token: &SecurityToken) -> Result<SecurityToken> {
        let request = self.remote.refresh_request(token);
        let signature = sign_request(&request, self.app_key.as_ref())?;
        let fresh = self.remote.refresh_token(&request, &signature)?;
        self.verify_response(&fresh)?;
        debug!(
            subject = %fresh.principal.principal,
            not_after = fresh.validity.not_after,
            "refreshed token"
        );
        Ok(fresh)
    }

    /// Quiet check used for cache lookups: a stale or tampered entry is a
    /// miss, not an incident.
    pub fn is_valid(&self, token: &SecurityToken) -> bool {
        match self.check(token) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "cached security token is not valid");
                false
            }
        }
    }

    /// Check a token fresh from the issuing service. A bad signature here is
    /// logged at `error`.
    fn verify_response(&self, token: &SecurityToken) -> Result<()> {
        let result = self.check(token);
        if let Err(TokenError::SignatureInvalid { .. }) = &result {
            error!(
                subject = %token.principal.principal,
                "issuing service response failed signature verification"
            );
        }
        result
    }

    /// Signature under the issuer key, then `now < not_after`
    fn check(&self, token: &SecurityToken) -> Result<()> {
        if !verify_token_signature(token, self.issuer_key.as_ref()) {
            return Err(TokenError::signature_invalid(&token.principal.principal, "issuer"));
        }
        if !token.is_valid_at(now_millis()) {
            return Err(TokenError::expired(&token.principal.principal, token.validity.not_after));
        }
        Ok(())
    }
}
