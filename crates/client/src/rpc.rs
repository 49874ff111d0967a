//! Interfaces to the issuing service and the pool that hands out clients for it.
//!
//! Transport, framing and timeouts live behind these traits.

use std::fmt;
use tessera_core::{SecurityToken, TokenRequest};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    /// The service does not recognise the requesting application
    #[error("application not registered: {0}")]
    AppNotRegistered(String),

    /// Connection, framing or pool failure
    #[error("transport failure: {0}")]
    Transport(String),
}

/// One connection to the issuing service
pub trait SecurityService: Send {
    fn request_token(
        &mut self,
        request: &TokenRequest,
        signature: &str,
    ) -> Result<SecurityToken, RpcError>;

    fn refresh_token(
        &mut self,
        request: &TokenRequest,
        signature: &str,
    ) -> Result<SecurityToken, RpcError>;

    fn ping(&mut self) -> Result<bool, RpcError>;
}

/// Pool of [`SecurityService`] connections keyed by service name
pub trait ClientPool: Send + Sync {
    fn borrow(&self, service_name: &str) -> Result<Box<dyn SecurityService>, RpcError>;

    /// Give back a healthy client
    fn return_client(&self, client: Box<dyn SecurityService>);

    /// Give back a client that must not be reused
    fn return_broken(&self, client: Box<dyn SecurityService>);
}

/// A borrowed client that goes back to its pool when dropped, on every exit
/// path. Transport failures mark it broken.
pub struct PooledClient<'a> {
    pool: &'a dyn ClientPool,
    client: Option<Box<dyn SecurityService>>,
    broken: bool,
}

impl<'a> PooledClient<'a> {
    pub fn borrow(pool: &'a dyn ClientPool, service_name: &str) -> Result<Self, RpcError> {
        let client = pool.borrow(service_name)?;
        Ok(Self {
            pool,
            client: Some(client),
            broken: false,
        })
    }

    /// Run one call on the borrowed client
    pub fn call<T, F>(&mut self, f: F) -> Result<T, RpcError>
    where
        F: FnOnce(&mut dyn SecurityService) -> Result<T, RpcError>,
    {
        let client = self
            .client
            .as_mut()
            .ok_or_else(|| RpcError::Transport("client already returned to pool".into()))?;
        let result = f(client.as_mut());
        if matches!(result, Err(RpcError::Transport(_))) {
            self.broken = true;
        }
        result
    }
}

impl Drop for PooledClient<'_> {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };
        if self.broken {
            warn!("returning broken client to pool");
            self.pool.return_broken(client);
        } else {
            self.pool.return_client(client);
        }
    }
}

impl fmt::Debug for PooledClient<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledClient")
            .field("borrowed", &self.client.is_some())
            .field("broken", &self.broken)
            .finish()
    }
}
