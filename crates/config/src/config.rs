//! Security client settings

use crate::mode::ProviderMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tessera_core::{
    DEFAULT_CACHE_MAX_SIZE, DEFAULT_CACHE_TTL_SECS, DEFAULT_MOCK_AUTHS, DEFAULT_SERVICE_NAME,
};

/// Everything needed to assemble a security client.
///
/// Key material is base64 text: the application's ed25519 private seed, the
/// issuing service's public key and the front-end authenticator's public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// This application's security id
    pub security_id: String,

    pub mode: ProviderMode,

    /// Substitute a configured user when no proxy headers arrive
    pub use_mock: bool,
    pub mock_user: String,
    pub mock_target: Option<String>,
    pub mock_token_auths: BTreeSet<String>,

    pub cache_max_size: usize,
    /// Lifetime of synthesized mock proxy principals, in seconds
    pub cache_default_ttl_secs: u64,

    /// Pool name of the issuing service
    pub service_name: String,

    pub app_private_key: Option<String>,
    pub issuer_public_key: Option<String>,
    pub front_end_public_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            security_id: String::new(),
            mode: ProviderMode::default(),
            use_mock: false,
            mock_user: String::new(),
            mock_target: None,
            mock_token_auths: parse_csv(DEFAULT_MOCK_AUTHS),
            cache_max_size: DEFAULT_CACHE_MAX_SIZE,
            cache_default_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            app_private_key: None,
            issuer_public_key: None,
            front_end_public_key: None,
        }
    }
}

impl ClientConfig {
    pub fn new(security_id: impl Into<String>) -> Self {
        Self {
            security_id: security_id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ProviderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Turn on client mock mode for the given user
    #[must_use]
    pub fn with_mock_user(mut self, user: impl Into<String>) -> Self {
        self.use_mock = true;
        self.mock_user = user.into();
        self
    }

    #[must_use]
    pub fn with_mock_target(mut self, target: impl Into<String>) -> Self {
        self.mock_target = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_cache_max_size(mut self, size: usize) -> Self {
        self.cache_max_size = size;
        self
    }

    pub fn cache_default_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_default_ttl_secs)
    }
}

/// Split a comma separated list, trimming entries and dropping empties
pub fn parse_csv(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
