use super::{warn_trust_downgrade, Remote};
use crate::rpc::ClientPool;
use std::sync::Arc;
use tessera_config::ProviderMode;
use tessera_core::{Result, SecurityToken, TokenRequest};
use tracing::debug;

/// Talks to a real issuing service with an empty request signature and takes
/// whatever comes back on trust.
pub struct UnauthenticatedProvider {
    pub(super) remote: Remote,
}

impl UnauthenticatedProvider {
    pub fn new(
        security_id: impl Into<String>,
        service_name: impl Into<String>,
        pool: Arc<dyn ClientPool>,
    ) -> Self {
        warn_trust_downgrade(ProviderMode::Unauthenticated);
        Self {
            remote: Remote {
                security_id: security_id.into(),
                service_name: service_name.into(),
                pool,
            },
        }
    }

    pub fn acquire(&self, request: &TokenRequest) -> Result<SecurityToken> {
        debug!(target = %request.target_security_id, "requesting unsigned token");
        self.remote.request_token(request, "")
    }

    pub fn refresh(&self, token: &SecurityToken) -> Result<SecurityToken> {
        let request = self.remote.refresh_request(token);
        self.remote.refresh_token(&request, "")
    }
}
