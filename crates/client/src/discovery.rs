//! Name to security-id resolution

use std::collections::HashMap;

/// Service discovery lookup used when a caller names its target application
/// instead of giving a security id
pub trait SecurityIdResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Fixed name table, for tests and single-host deployments
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    ids: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, security_id: impl Into<String>) -> Self {
        self.ids.insert(name.into(), security_id.into());
        self
    }
}

impl SecurityIdResolver for StaticResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        self.ids.get(name).cloned()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for StaticResolver {
    fn from(entries: [(&str, &str); N]) -> Self {
        entries
            .into_iter()
            .fold(StaticResolver::new(), |r, (name, id)| r.with(name, id))
    }
}
