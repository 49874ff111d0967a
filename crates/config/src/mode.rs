use serde::{Deserialize, Serialize};
use std::fmt;

/// Which token provider the client is built with
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum ProviderMode {
    /// Synthesizes tokens locally; no trust boundary at all
    Mock,
    /// Talks to the issuing service but neither signs nor verifies
    Unauthenticated,
    /// Signs requests and verifies responses (default)
    #[default]
    Production,
}

impl From<&str> for ProviderMode {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "mock" => ProviderMode::Mock,
            "unauthenticated" | "dev" => ProviderMode::Unauthenticated,
            "production" | "prod" | "real" => ProviderMode::Production,
            _ => {
                tracing::warn!(
                    "Unknown client mode \"{}\", falling back to production mode",
                    value
                );
                ProviderMode::Production
            }
        }
    }
}

impl From<String> for ProviderMode {
    fn from(value: String) -> Self {
        ProviderMode::from(value.as_str())
    }
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode_str = match self {
            ProviderMode::Mock => "mock",
            ProviderMode::Unauthenticated => "unauthenticated",
            ProviderMode::Production => "production",
        };
        write!(f, "{mode_str}")
    }
}

impl ProviderMode {
    /// Whether tokens produced in this mode can be trusted
    pub fn verifies_tokens(&self) -> bool {
        matches!(self, ProviderMode::Production)
    }
}
