//! Canonical byte encoding of tokens, requests and principals.
//!
//! Fields are written back to back as UTF-8 with no framing or separators.
//! Absent optional fields are skipped, never padded. Set-valued fields are
//! written in sorted order; the request chain keeps caller order.
//!
//! Because nothing delimits fields, distinct values can encode to the same
//! bytes (`"ab" + "c"` vs `"a" + "bc"`). The layout is fixed by already-issued
//! signatures and must not change.

use tessera_core::{Principal, RequestSubject, SecurityToken, TokenRequest};

/// Accumulates the encoded form of one object
#[derive(Debug, Default)]
pub struct CanonicalWriter {
    buf: Vec<u8>,
}

impl CanonicalWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_str(&mut self, value: &str) -> &mut Self {
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    pub fn put_opt(&mut self, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.put_str(value);
        }
        self
    }

    pub fn put_i64(&mut self, value: i64) -> &mut Self {
        self.put_str(&value.to_string())
    }

    pub fn put_bool(&mut self, value: bool) -> &mut Self {
        self.put_str(if value { "true" } else { "false" })
    }

    pub fn put_all<'a, I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        for value in values {
            self.put_str(value);
        }
        self
    }

    /// Write `values` after sorting a copy of them
    pub fn put_sorted<'a, I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut sorted: Vec<&String> = values.into_iter().collect();
        sorted.sort();
        self.put_all(sorted.into_iter().map(String::as_str))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Subject, issuer if present, each request-chain hop, then `notAfter`
pub fn encode_principal(principal: &Principal) -> Vec<u8> {
    let mut w = CanonicalWriter::new();
    w.put_str(&principal.principal)
        .put_opt(principal.issuer.as_deref())
        .put_all(principal.request_chain.iter().map(String::as_str))
        .put_i64(principal.validity.not_after);
    w.into_bytes()
}

pub fn encode_token(token: &SecurityToken) -> Vec<u8> {
    let mut w = CanonicalWriter::new();
    write_token(&mut w, token);
    w.into_bytes()
}

fn write_token(w: &mut CanonicalWriter, token: &SecurityToken) {
    let validity = &token.validity;
    w.put_str(&validity.issued_to)
        .put_opt(validity.recipient())
        .put_i64(validity.not_after)
        .put_i64(validity.not_before.unwrap_or(0))
        .put_i64(validity.issued_time)
        .put_str(token.token_type.as_str());

    let principal = &token.principal;
    w.put_str(&principal.principal)
        .put_opt(principal.issuer.as_deref())
        .put_all(principal.request_chain.iter().map(String::as_str));

    w.put_opt(token.authorization_level.as_deref());

    // BTreeSet iteration is already sorted
    let auths = &token.authorizations;
    w.put_all(auths.formal.iter().map(String::as_str))
        .put_all(auths.external_community.iter().map(String::as_str));
    for id in &auths.platform_object {
        w.put_i64(*id);
    }

    for (project, groups) in &token.external_project_groups {
        w.put_str(project).put_sorted(groups);
    }

    for community in token.external_communities.values() {
        w.put_str(&community.name)
            .put_str(&community.community_type)
            .put_str(&community.organization)
            .put_sorted(&community.groups)
            .put_sorted(&community.topics)
            .put_sorted(&community.regions);
        for (flag, value) in &community.flags {
            w.put_str(flag).put_bool(*value);
        }
    }

    w.put_bool(token.valid_for_external_request)
        .put_opt(token.citizenship.as_deref())
        .put_opt(token.organization.as_deref());
}

/// Subject bytes, then type, requester, target, timestamp and sorted exclusions
pub fn encode_request(request: &TokenRequest) -> Vec<u8> {
    let mut w = CanonicalWriter::new();
    match &request.subject {
        RequestSubject::ProxyPrincipal(proxy) => {
            w.put_str(&proxy.proxy_token).put_str(&proxy.signature);
        }
        RequestSubject::TokenPrincipal(token) => write_token(&mut w, token),
        RequestSubject::Principal(_) | RequestSubject::Application => {}
    }

    w.put_str(request.token_type.as_str())
        .put_str(&request.requester_security_id)
        .put_str(&request.target_security_id)
        .put_i64(request.timestamp);

    if let Some(exclude) = &request.exclude_authorizations {
        w.put_all(exclude.iter().map(String::as_str));
    }
    w.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{CommunityMembership, ProxyPrincipal, TokenType, ValidityCaveats};

    fn token() -> SecurityToken {
        let validity = ValidityCaveats {
            issuer: "01".into(),
            issued_to: "123".into(),
            issued_for: Some("456".into()),
            issued_time: 10,
            not_before: None,
            not_after: 20,
            signature: None,
        };
        let principal = Principal::new("alice", validity.clone())
            .with_issuer("FE")
            .with_request_chain(vec!["z".into(), "a".into()]);
        SecurityToken::new(TokenType::User, principal, validity)
    }

    #[test]
    fn principal_layout() {
        let p = token().principal;
        assert_eq!(encode_principal(&p), b"aliceFEza20");
    }

    #[test]
    fn token_layout_without_payload() {
        let bytes = encode_token(&token());
        assert_eq!(bytes, b"12345620010USERaliceFEzafalse".to_vec());
    }

    #[test]
    fn empty_recipient_is_omitted() {
        let mut t = token();
        t.validity.issued_for = Some(String::new());
        let with_empty = encode_token(&t);
        t.validity.issued_for = None;
        assert_eq!(encode_token(&t), with_empty);
        assert!(with_empty.starts_with(b"12320"));
    }

    #[test]
    fn sets_are_sorted_and_lists_inside_maps_too() {
        let mut t = token();
        t.authorization_level = Some("high".into());
        t.authorizations.formal.extend(["S".to_string(), "A".to_string()]);
        t.authorizations.platform_object.extend([30, 4]);
        t.external_project_groups
            .insert("proj".into(), vec!["g2".into(), "g1".into()]);
        t.external_communities.insert(
            "c".into(),
            CommunityMembership {
                name: "c".into(),
                community_type: "t".into(),
                organization: "o".into(),
                groups: vec!["y".into(), "x".into()],
                flags: [("b".to_string(), true), ("a".to_string(), false)].into(),
                ..CommunityMembership::default()
            },
        );
        t.citizenship = Some("NZ".into());

        let bytes = String::from_utf8(encode_token(&t)).unwrap();
        assert!(bytes.ends_with("highAS430projg1g2ctoxyafalsebtruefalseNZ"));
    }

    #[test]
    fn caller_order_of_exclusions_does_not_matter() {
        let mut first = TokenRequest::new(
            "123",
            TokenType::User,
            RequestSubject::ProxyPrincipal(ProxyPrincipal::new("{p}", "sig")),
            "456",
        );
        first.timestamp = 7;
        first.exclude_authorizations = Some(["b", "a"].iter().map(|s| s.to_string()).collect());

        assert_eq!(encode_request(&first), b"{p}sigUSER1234567ab".to_vec());
    }

    #[test]
    fn derived_request_embeds_token_encoding() {
        let t = token();
        let mut request = TokenRequest::new(
            "123",
            TokenType::User,
            RequestSubject::TokenPrincipal(Box::new(t.clone())),
            "789",
        );
        request.timestamp = 1;
        let mut expected = encode_token(&t);
        expected.extend_from_slice(b"USER1237891");
        assert_eq!(encode_request(&request), expected);
    }
}
