//! Token acquisition strategies.
//!
//! Each variant carries its own trust posture:
//!
//! - **Mock** never leaves the process and trusts everything.
//! - **Unauthenticated** talks to the issuing service without signing requests
//!   or verifying responses.
//! - **Production** signs every request with the application key and verifies
//!   every response against the issuer key.
//!
//! The variant is chosen once, by [`TokenProvider::from_config`].

mod mock;
mod production;
mod unauthenticated;

pub use mock::MockProvider;
pub use production::ProductionProvider;
pub use unauthenticated::UnauthenticatedProvider;

use crate::rpc::{ClientPool, PooledClient, RpcError};
use std::sync::Arc;
use tessera_config::{ClientConfig, ProviderMode};
use tessera_core::{RequestSubject, Result, SecurityToken, TokenError, TokenRequest};
use tessera_security::KeyPair;
use tracing::{error, warn};

pub enum TokenProvider {
    Mock(MockProvider),
    Unauthenticated(UnauthenticatedProvider),
    Production(ProductionProvider),
}

impl TokenProvider {
    /// Build the provider selected by `config.mode`.
    ///
    /// Production requires a pool, the application's private key and the
    /// issuer's public key; Unauthenticated requires only the pool.
    pub fn from_config(
        config: &ClientConfig,
        pool: Option<Arc<dyn ClientPool>>,
        app_key: Option<Arc<KeyPair>>,
        issuer_key: Option<Arc<KeyPair>>,
    ) -> Result<Self> {
        let require_pool = |pool: Option<Arc<dyn ClientPool>>| {
            pool.ok_or_else(|| {
                TokenError::configuration(format!("{} mode needs a client pool", config.mode))
            })
        };

        let provider = match config.mode {
            ProviderMode::Mock => TokenProvider::Mock(MockProvider::new(
                config.security_id.clone(),
                config.mock_token_auths.clone(),
            )),
            ProviderMode::Unauthenticated => {
                TokenProvider::Unauthenticated(UnauthenticatedProvider::new(
                    config.security_id.clone(),
                    config.service_name.clone(),
                    require_pool(pool)?,
                ))
            }
            ProviderMode::Production => {
                let app_key = app_key
                    .filter(|k| k.has_private_key())
                    .ok_or_else(|| {
                        TokenError::configuration("production mode needs the application private key")
                    })?;
                let issuer_key = issuer_key
                    .filter(|k| k.has_public_key())
                    .ok_or_else(|| {
                        TokenError::configuration("production mode needs the issuer public key")
                    })?;
                TokenProvider::Production(ProductionProvider::new(
                    config.security_id.clone(),
                    config.service_name.clone(),
                    require_pool(pool)?,
                    app_key,
                    issuer_key,
                ))
            }
        };
        Ok(provider)
    }

    pub fn mode(&self) -> ProviderMode {
        match self {
            TokenProvider::Mock(_) => ProviderMode::Mock,
            TokenProvider::Unauthenticated(_) => ProviderMode::Unauthenticated,
            TokenProvider::Production(_) => ProviderMode::Production,
        }
    }

    pub fn acquire(&self, request: &TokenRequest) -> Result<SecurityToken> {
        match self {
            TokenProvider::Mock(p) => p.acquire(request),
            TokenProvider::Unauthenticated(p) => p.acquire(request),
            TokenProvider::Production(p) => p.acquire(request),
        }
    }

    pub fn refresh(&self, token: &SecurityToken) -> Result<SecurityToken> {
        match self {
            TokenProvider::Mock(p) => Ok(p.refresh(token)),
            TokenProvider::Unauthenticated(p) => p.refresh(token),
            TokenProvider::Production(p) => p.refresh(token),
        }
    }

    /// Never fails. Mock and Unauthenticated accept every token.
    pub fn is_valid(&self, token: &SecurityToken) -> bool {
        match self {
            TokenProvider::Mock(_) | TokenProvider::Unauthenticated(_) => true,
            TokenProvider::Production(p) => p.is_valid(token),
        }
    }

    pub fn ping(&self) -> Result<bool> {
        match self {
            TokenProvider::Mock(_) => Ok(true),
            TokenProvider::Unauthenticated(p) => p.remote.ping(),
            TokenProvider::Production(p) => p.remote.ping(),
        }
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TokenProvider").field(&self.mode()).finish()
    }
}

/// The pool handle and identity shared by the two remote providers
pub(crate) struct Remote {
    pub security_id: String,
    pub service_name: String,
    pub pool: Arc<dyn ClientPool>,
}

impl Remote {
    pub fn request_token(&self, request: &TokenRequest, signature: &str) -> Result<SecurityToken> {
        let mut client = self.borrow()?;
        client
            .call(|c| c.request_token(request, signature))
            .map_err(|e| self.map_error(e))
    }

    pub fn refresh_token(&self, request: &TokenRequest, signature: &str) -> Result<SecurityToken> {
        let mut client = self.borrow()?;
        client
            .call(|c| c.refresh_token(request, signature))
            .map_err(|e| self.map_error(e))
    }

    pub fn ping(&self) -> Result<bool> {
        let mut client = self.borrow()?;
        client.call(|c| c.ping()).map_err(|e| self.map_error(e))
    }

    /// A refresh carries the old token as its subject and keeps its recipient
    pub fn refresh_request(&self, token: &SecurityToken) -> TokenRequest {
        TokenRequest::new(
            self.security_id.clone(),
            token.token_type,
            RequestSubject::TokenPrincipal(Box::new(token.clone())),
            token.target_security_id().unwrap_or_default(),
        )
    }

    fn borrow(&self) -> Result<PooledClient<'_>> {
        PooledClient::borrow(self.pool.as_ref(), &self.service_name).map_err(|e| self.map_error(e))
    }

    fn map_error(&self, err: RpcError) -> TokenError {
        match err {
            RpcError::AppNotRegistered(message) => {
                error!(security_id = %self.security_id, %message, "application is not registered with the issuing service");
                TokenError::app_not_registered(&self.security_id, message)
            }
            RpcError::Transport(message) => {
                error!(service = %self.service_name, %message, "transport failure talking to the issuing service");
                TokenError::transport(&self.service_name, message)
            }
        }
    }
}

pub(crate) fn warn_trust_downgrade(mode: ProviderMode) {
    warn!(%mode, "token provider does not verify tokens; never use this mode in production");
}
