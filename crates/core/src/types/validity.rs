use crate::time::now_millis;
use serde::{Deserialize, Serialize};

/// Issuer, recipients and validity window attached to a token or principal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityCaveats {
    pub issuer: String,
    pub issued_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_for: Option<String>,
    pub issued_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<i64>,
    pub not_after: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ValidityCaveats {
    pub fn new(issuer: impl Into<String>, issued_to: impl Into<String>, not_after: i64) -> Self {
        Self {
            issuer: issuer.into(),
            issued_to: issued_to.into(),
            issued_time: now_millis(),
            not_after,
            ..Self::default()
        }
    }

    /// Valid strictly before `not_after`; a caveat expiring exactly at `now` is expired.
    pub fn is_valid_at(&self, now: i64) -> bool {
        now < self.not_after
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_millis())
    }

    /// `issued_for` if it is set to something other than the empty string
    pub fn recipient(&self) -> Option<&str> {
        self.issued_for.as_deref().filter(|s| !s.is_empty())
    }
}

/// The subject of a token together with its delegation history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub principal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Prior delegation hops, in the order they happened
    #[serde(default)]
    pub request_chain: Vec<String>,
    pub validity: ValidityCaveats,
}

impl Principal {
    pub fn new(principal: impl Into<String>, validity: ValidityCaveats) -> Self {
        Self {
            principal: principal.into(),
            validity,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    #[must_use]
    pub fn with_request_chain(mut self, chain: Vec<String>) -> Self {
        self.request_chain = chain;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_boundary_is_strict() {
        let now = 1_700_000_000_000;
        let caveats = |not_after| ValidityCaveats {
            not_after,
            ..ValidityCaveats::default()
        };

        assert!(!caveats(now - 1).is_valid_at(now));
        assert!(!caveats(now).is_valid_at(now));
        assert!(caveats(now + 1).is_valid_at(now));
    }

    #[test]
    fn empty_recipient_is_absent() {
        let mut caveats = ValidityCaveats::new("01", "123", 0);
        assert_eq!(caveats.recipient(), None);
        caveats.issued_for = Some(String::new());
        assert_eq!(caveats.recipient(), None);
        caveats.issued_for = Some("app-42".into());
        assert_eq!(caveats.recipient(), Some("app-42"));
    }
}
