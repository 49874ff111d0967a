use super::validity::{Principal, ValidityCaveats};
use crate::constants::{INTERNAL_ADMIN_GROUP, INTERNAL_PROJECT};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Whether a token speaks for an end user or for an application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenType {
    #[default]
    User,
    App,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::User => "USER",
            TokenType::App => "APP",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization labels carried by a token. Only membership matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorizations {
    #[serde(default)]
    pub formal: BTreeSet<String>,
    #[serde(default)]
    pub external_community: BTreeSet<String>,
    #[serde(default)]
    pub platform_object: BTreeSet<i64>,
}

impl Authorizations {
    pub fn with_formal<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            formal: labels.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.formal.is_empty()
            && self.external_community.is_empty()
            && self.platform_object.is_empty()
    }

    /// Drop every label found in `exclude` from the formal and community sets
    pub fn remove_all(&mut self, exclude: &BTreeSet<String>) {
        self.formal.retain(|a| !exclude.contains(a));
        self.external_community.retain(|a| !exclude.contains(a));
    }
}

/// Membership of the subject in one external community
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMembership {
    pub name: String,
    #[serde(default)]
    pub community_type: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

/// A signed assertion of identity, authorizations and validity window.
///
/// Consumers treat a token as immutable once the issuer has signed it. The one
/// exception is [`SecurityToken::replace_with`], used when a caller-held token
/// is refreshed in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityToken {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub principal: Principal,
    pub validity: ValidityCaveats,
    #[serde(default)]
    pub authorizations: Authorizations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_level: Option<String>,
    #[serde(default)]
    pub external_project_groups: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub external_communities: BTreeMap<String, CommunityMembership>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citizenship: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default)]
    pub valid_for_external_request: bool,
}

impl SecurityToken {
    pub fn new(token_type: TokenType, principal: Principal, validity: ValidityCaveats) -> Self {
        Self {
            token_type,
            principal,
            validity,
            ..Self::default()
        }
    }

    /// The identity the token was issued to
    pub fn security_id(&self) -> &str {
        &self.validity.issued_to
    }

    /// The identity the token was issued for, if set
    pub fn target_security_id(&self) -> Option<&str> {
        self.validity.recipient()
    }

    pub fn user_id(&self) -> Option<&str> {
        match self.token_type {
            TokenType::User => Some(&self.principal.principal),
            TokenType::App => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self.token_type {
            TokenType::User => Some(
                self.principal
                    .name
                    .as_deref()
                    .unwrap_or(&self.principal.principal),
            ),
            TokenType::App => None,
        }
    }

    pub fn application_security_id(&self) -> Option<&str> {
        match self.token_type {
            TokenType::App => Some(&self.principal.principal),
            TokenType::User => None,
        }
    }

    /// Member of the admin group of the internal project
    pub fn is_admin(&self) -> bool {
        self.external_project_groups
            .get(INTERNAL_PROJECT)
            .is_some_and(|groups| groups.iter().any(|g| g == INTERNAL_ADMIN_GROUP))
    }

    pub fn is_valid_at(&self, now: i64) -> bool {
        self.validity.is_valid_at(now)
    }

    pub fn is_valid(&self) -> bool {
        self.validity.is_valid()
    }

    /// Overwrite every field with those of `fresh`, keeping this value in place
    pub fn replace_with(&mut self, fresh: SecurityToken) {
        *self = fresh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_token() -> SecurityToken {
        let validity = ValidityCaveats::new("01", "1234", i64::MAX);
        let principal = Principal::new("alice", validity.clone()).with_name("Alice A.");
        SecurityToken::new(TokenType::User, principal, validity)
    }

    #[test]
    fn accessors_follow_token_type() {
        let token = user_token();
        assert_eq!(token.security_id(), "1234");
        assert_eq!(token.user_id(), Some("alice"));
        assert_eq!(token.username(), Some("Alice A."));
        assert_eq!(token.application_security_id(), None);

        let mut app = token.clone();
        app.token_type = TokenType::App;
        app.principal.principal = "1234".into();
        assert_eq!(app.application_security_id(), Some("1234"));
        assert_eq!(app.user_id(), None);
    }

    #[test]
    fn admin_requires_internal_admin_group() {
        let mut token = user_token();
        assert!(!token.is_admin());

        token
            .external_project_groups
            .insert(INTERNAL_PROJECT.into(), vec!["users".into()]);
        assert!(!token.is_admin());

        token
            .external_project_groups
            .insert(INTERNAL_PROJECT.into(), vec!["users".into(), INTERNAL_ADMIN_GROUP.into()]);
        assert!(token.is_admin());
    }

    #[test]
    fn replace_with_overwrites_every_field() {
        let mut held = user_token();
        let mut fresh = user_token();
        fresh.validity.not_after = 42;
        fresh.citizenship = Some("NZ".into());

        held.replace_with(fresh.clone());
        assert_eq!(held, fresh);
    }

    #[test]
    fn token_type_serializes_upper_case() {
        let json = serde_json::to_string(&TokenType::App).unwrap();
        assert_eq!(json, "\"APP\"");
        assert_eq!(TokenType::User.to_string(), "USER");
    }

    #[test]
    fn exclusions_drop_labels() {
        let mut auths = Authorizations::with_formal(["U", "S", "TS"]);
        auths.external_community.insert("S".into());
        auths.remove_all(&["S".to_string()].into_iter().collect());
        assert_eq!(auths.formal.len(), 2);
        assert!(auths.external_community.is_empty());
    }
}
