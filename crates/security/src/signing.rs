//! Sign and verify every signed object in the protocol

use crate::canonical::{encode_principal, encode_request, encode_token};
use crate::keys::KeyError;
use crate::signer::{SignatureVerifier, TokenSigner};
use tessera_core::{
    Principal, ProxyPrincipal, ProxyUserToken, SecurityToken, TokenError, TokenRequest,
};
use tracing::debug;

/// Sign the token's canonical encoding and store the result in its caveats
pub fn sign_token(token: &mut SecurityToken, signer: &dyn TokenSigner) -> Result<(), KeyError> {
    let signature = signer.sign(&encode_token(token))?;
    token.validity.signature = Some(signature);
    Ok(())
}

pub fn verify_token_signature(token: &SecurityToken, verifier: &dyn SignatureVerifier) -> bool {
    let Some(signature) = token.validity.signature.as_deref() else {
        debug!(subject = %token.principal.principal, "token carries no signature");
        return false;
    };
    verifier.verify(&encode_token(token), signature)
}

pub fn sign_principal(principal: &mut Principal, signer: &dyn TokenSigner) -> Result<(), KeyError> {
    let signature = signer.sign(&encode_principal(principal))?;
    principal.validity.signature = Some(signature);
    Ok(())
}

pub fn verify_principal_signature(principal: &Principal, verifier: &dyn SignatureVerifier) -> bool {
    principal
        .validity
        .signature
        .as_deref()
        .is_some_and(|signature| verifier.verify(&encode_principal(principal), signature))
}

/// Requests travel with a detached signature
pub fn sign_request(request: &TokenRequest, signer: &dyn TokenSigner) -> Result<String, KeyError> {
    signer.sign(&encode_request(request))
}

pub fn verify_request_signature(
    request: &TokenRequest,
    signature: &str,
    verifier: &dyn SignatureVerifier,
) -> bool {
    verifier.verify(&encode_request(request), signature)
}

/// Serialize a proxied user and sign the exact JSON bytes
pub fn sign_proxy_token(
    token: &ProxyUserToken,
    signer: &dyn TokenSigner,
) -> Result<ProxyPrincipal, TokenError> {
    let json = token.to_json()?;
    let signature = signer.sign(json.as_bytes())?;
    Ok(ProxyPrincipal::new(json, signature))
}

pub fn verify_proxy_token(proxy: &ProxyPrincipal, verifier: &dyn SignatureVerifier) -> bool {
    verifier.verify(proxy.proxy_token.as_bytes(), &proxy.signature)
}
