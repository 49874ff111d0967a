//! Proxy principal extraction from inbound request headers

use std::collections::HashMap;
use tessera_core::{ProxyPrincipal, HTTP_HEADER_PREFIX, PROXY_SIGNATURE_HEADER, PROXY_TOKEN_HEADER};
use tracing::trace;

/// Inbound headers: name to every value received under it
pub type Headers = HashMap<String, Vec<String>>;

/// First value of `name`, matched case-insensitively, falling back to the
/// `HTTP_`-prefixed upper-case form some gateways use.
pub fn header_value<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    let upper = name.to_uppercase();
    let prefixed = format!("{HTTP_HEADER_PREFIX}{upper}");

    let value = first_value(headers.get(&upper))
        .or_else(|| scan(headers, &upper))
        .or_else(|| first_value(headers.get(&prefixed)))
        .or_else(|| scan(headers, &prefixed));
    trace!(header = name, found = value.is_some(), "header lookup");
    value
}

fn first_value(values: Option<&Vec<String>>) -> Option<&str> {
    values.and_then(|v| v.first()).map(String::as_str)
}

fn scan<'a>(headers: &'a Headers, needle: &str) -> Option<&'a str> {
    headers
        .iter()
        .filter(|(key, _)| key.to_uppercase() == needle)
        .find_map(|(_, values)| values.first())
        .map(String::as_str)
}

/// The proxied user assertion, if both halves are present and the token is
/// not empty
pub fn proxy_principal_from_headers(headers: &Headers) -> Option<ProxyPrincipal> {
    let token = header_value(headers, PROXY_TOKEN_HEADER).filter(|t| !t.is_empty())?;
    let signature = header_value(headers, PROXY_SIGNATURE_HEADER)?;
    Some(ProxyPrincipal::new(token, signature))
}
