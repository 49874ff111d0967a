//! Receive-side checks for tokens, principals and proxy assertions

use tessera_core::{
    now_millis, Principal, ProxyPrincipal, ProxyUserToken, Result, SecurityToken, TokenError,
};
use tessera_security::{
    verify_principal_signature, verify_proxy_token, verify_token_signature, SignatureVerifier,
};
use tracing::{debug, error};

/// Check a token handed to us by a peer.
///
/// Recipient and expiry are checked before the signature, then again after
/// it, so a token mutated while the signature was being checked is still
/// rejected.
pub fn verify_received_token(
    token: &SecurityToken,
    own_id: &str,
    issuer: &dyn SignatureVerifier,
) -> Result<()> {
    check_recipient(token, own_id)?;
    check_expiry(token)?;

    if !verify_token_signature(token, issuer) {
        error!(subject = %token.principal.principal, issued_to = %token.validity.issued_to, "received token failed signature verification");
        return Err(TokenError::signature_invalid(&token.principal.principal, "issuer"));
    }

    check_recipient(token, own_id)?;
    check_expiry(token)
}

fn check_recipient(token: &SecurityToken, own_id: &str) -> Result<()> {
    match token.target_security_id() {
        Some(recipient) if recipient == own_id => Ok(()),
        actual => {
            error!(expected = %own_id, actual = ?actual, subject = %token.principal.principal, "token was issued for another application");
            Err(TokenError::recipient_mismatch(own_id, actual.map(str::to_string)))
        }
    }
}

fn check_expiry(token: &SecurityToken) -> Result<()> {
    if token.is_valid_at(now_millis()) {
        return Ok(());
    }
    debug!(subject = %token.principal.principal, not_after = token.validity.not_after, "received token has expired");
    Err(TokenError::expired(&token.principal.principal, token.validity.not_after))
}

/// Verify the front end's signature over the raw proxy token, then parse it
/// and check it has not expired.
pub fn verify_proxy_principal(
    proxy: &ProxyPrincipal,
    front_end: &dyn SignatureVerifier,
) -> Result<ProxyUserToken> {
    if !verify_proxy_token(proxy, front_end) {
        error!("proxy principal failed signature verification");
        return Err(TokenError::signature_invalid("proxy principal", "front end"));
    }

    let user = proxy.user_token()?;
    if now_millis() >= user.not_after {
        debug!(subject = %user.subject(), not_after = user.not_after, "proxy principal has expired");
        return Err(TokenError::expired(user.subject(), user.not_after));
    }
    Ok(user)
}

/// Expiry first, then the issuer's signature over the canonical principal
pub fn verify_principal(principal: &Principal, issuer: &dyn SignatureVerifier) -> Result<()> {
    if !principal.validity.is_valid_at(now_millis()) {
        return Err(TokenError::expired(&principal.principal, principal.validity.not_after));
    }
    if !verify_principal_signature(principal, issuer) {
        error!(subject = %principal.principal, "principal failed signature verification");
        return Err(TokenError::signature_invalid(&principal.principal, "issuer"));
    }
    Ok(())
}
