//! The security client: cache-then-acquire token fetching, receive-side
//! validation with refresh-in-place, and proxy assertion handling.

use crate::discovery::SecurityIdResolver;
use crate::headers::{proxy_principal_from_headers, Headers};
use crate::provider::TokenProvider;
use crate::rpc::ClientPool;
use crate::validation;
use std::collections::BTreeSet;
use std::sync::Arc;
use tessera_cache::{CacheKey, CacheStats, TokenCache};
use tessera_config::ClientConfig;
use tessera_core::security_id::{is_security_id, ISSUING_SERVICE};
use tessera_core::time::millis_from_now;
use tessera_core::{
    Principal, ProxyPrincipal, ProxyUserToken, RequestSubject, Result, SecurityToken, TokenError,
    TokenRequest, TokenType,
};
use tessera_security::KeyPair;
use tracing::{debug, info, warn};

/// Whether a fetch may be answered from the cache. Fresh tokens are stored
/// either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    #[default]
    Use,
    Bypass,
}

pub struct SecurityClient {
    config: ClientConfig,
    provider: TokenProvider,
    cache: Arc<TokenCache>,
    resolver: Option<Arc<dyn SecurityIdResolver>>,
    issuer_key: Option<Arc<KeyPair>>,
    front_end_key: Option<Arc<KeyPair>>,
}

impl std::fmt::Debug for SecurityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityClient")
            .field("security_id", &self.config.security_id)
            .field("provider", &self.provider)
            .field("use_mock", &self.config.use_mock)
            .finish_non_exhaustive()
    }
}

impl SecurityClient {
    pub fn builder(config: ClientConfig) -> SecurityClientBuilder {
        SecurityClientBuilder::new(config)
    }

    pub fn security_id(&self) -> &str {
        &self.config.security_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn provider(&self) -> &TokenProvider {
        &self.provider
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Validate a token received from a peer.
    ///
    /// On expiry the token is refreshed once and every field of `token` is
    /// overwritten with the fresh value, so the caller's binding stays put.
    /// Any other failure is returned unchanged.
    pub fn validate_received(&self, token: &mut SecurityToken) -> Result<()> {
        if self.config.use_mock {
            warn!(subject = %token.principal.principal, "mock mode: skipping received token validation");
            return Ok(());
        }

        match self.check_received(token) {
            Err(e) if e.is_recoverable() => {
                info!(subject = %token.principal.principal, "received token expired, refreshing");
                let fresh = self.provider.refresh(token)?;
                token.replace_with(fresh);
                Ok(())
            }
            other => other,
        }
    }

    fn check_received(&self, token: &SecurityToken) -> Result<()> {
        match &self.issuer_key {
            Some(issuer) => {
                validation::verify_received_token(token, self.security_id(), issuer.as_ref())
            }
            None => Err(TokenError::configuration(
                "validating received tokens needs the issuer public key",
            )),
        }
    }

    /// A token for this application, issued for `target`
    pub fn fetch_app_token(
        &self,
        target: &str,
        exclude: Option<&BTreeSet<String>>,
    ) -> Result<SecurityToken> {
        self.fetch_app_token_with(target, exclude, CachePolicy::Use)
    }

    pub fn fetch_app_token_with(
        &self,
        target: &str,
        exclude: Option<&BTreeSet<String>>,
        policy: CachePolicy,
    ) -> Result<SecurityToken> {
        let target = self.resolve_target(target);
        let own_id = self.security_id();
        let request =
            TokenRequest::new(own_id, TokenType::App, RequestSubject::Application, &target)
                .with_exclusions(exclude.cloned());
        let key = CacheKey::new(TokenType::App, own_id, exclude, None, &target);
        self.fetch(&request, key, policy)
    }

    /// A user token for the proxied user, issued for `target`. The proxy
    /// principal is verified against the front-end key first.
    pub fn fetch_token_for_proxied_user(
        &self,
        proxy: &ProxyPrincipal,
        target: &str,
        exclude: Option<&BTreeSet<String>>,
    ) -> Result<SecurityToken> {
        self.fetch_token_for_proxied_user_with(proxy, target, exclude, CachePolicy::Use)
    }

    pub fn fetch_token_for_proxied_user_with(
        &self,
        proxy: &ProxyPrincipal,
        target: &str,
        exclude: Option<&BTreeSet<String>>,
        policy: CachePolicy,
    ) -> Result<SecurityToken> {
        let user = self.verify_proxy_principal(proxy)?;
        let target = self.resolve_target(target);
        let request = TokenRequest::new(
            self.security_id(),
            TokenType::User,
            RequestSubject::ProxyPrincipal(proxy.clone()),
            &target,
        )
        .with_exclusions(exclude.cloned());
        let key = CacheKey::new(TokenType::User, user.subject(), exclude, None, &target);
        self.fetch(&request, key, policy)
    }

    /// Same as [`SecurityClient::fetch_token_for_proxied_user`], with the proxy
    /// principal taken from inbound headers
    pub fn fetch_token_for_proxied_user_from_headers(
        &self,
        headers: &Headers,
        target: &str,
        exclude: Option<&BTreeSet<String>>,
    ) -> Result<SecurityToken> {
        let proxy = self.proxy_principal_from_request(headers)?;
        self.fetch_token_for_proxied_user(&proxy, target, exclude)
    }

    /// Re-issue `existing` for another target, keeping its subject
    pub fn fetch_derived_token(
        &self,
        existing: &SecurityToken,
        target: &str,
        exclude: Option<&BTreeSet<String>>,
    ) -> Result<SecurityToken> {
        self.fetch_derived_token_with(existing, target, exclude, CachePolicy::Use)
    }

    pub fn fetch_derived_token_with(
        &self,
        existing: &SecurityToken,
        target: &str,
        exclude: Option<&BTreeSet<String>>,
        policy: CachePolicy,
    ) -> Result<SecurityToken> {
        let target = self.resolve_target(target);
        let request = TokenRequest::new(
            self.security_id(),
            existing.token_type,
            RequestSubject::TokenPrincipal(Box::new(existing.clone())),
            &target,
        )
        .with_exclusions(exclude.cloned());
        let key = CacheKey::new(
            existing.token_type,
            &existing.principal.principal,
            exclude,
            Some(existing.principal.request_chain.as_slice()),
            &target,
        );
        self.fetch(&request, key, policy)
    }

    fn fetch(
        &self,
        request: &TokenRequest,
        key: CacheKey,
        policy: CachePolicy,
    ) -> Result<SecurityToken> {
        if policy == CachePolicy::Use {
            if let Some(token) = self.cache.get_with(&key, |t| self.provider.is_valid(t)) {
                debug!(key = %key, "using cached token");
                return Ok(token);
            }
        }

        let token = self.provider.acquire(request)?;
        self.cache.put(key, token.clone());
        Ok(token)
    }

    /// Turn a caller-supplied target into a security id.
    ///
    /// Empty means this application (or the mock target in mock mode). A
    /// security id is kept as is. Anything else is looked up by name and kept
    /// unresolved if discovery has no answer.
    pub fn resolve_target(&self, target: &str) -> String {
        if target.is_empty() {
            if self.config.use_mock {
                if let Some(mock_target) = &self.config.mock_target {
                    return mock_target.clone();
                }
            }
            return self.config.security_id.clone();
        }
        if is_security_id(target) {
            return target.to_string();
        }
        match self.resolver.as_ref().and_then(|r| r.resolve(target)) {
            Some(id) => {
                debug!(name = %target, security_id = %id, "resolved target");
                id
            }
            None => {
                warn!(name = %target, "no security id for target, using the name as given");
                target.to_string()
            }
        }
    }

    /// The proxied user on an inbound request. In mock mode a configured user
    /// stands in when the headers are absent.
    pub fn proxy_principal_from_request(&self, headers: &Headers) -> Result<ProxyPrincipal> {
        if let Some(proxy) = proxy_principal_from_headers(headers) {
            return Ok(proxy);
        }
        if self.config.use_mock {
            return self.mock_proxy_principal();
        }
        Err(TokenError::malformed(
            "request headers",
            "no proxied user assertion present",
        ))
    }

    fn mock_proxy_principal(&self) -> Result<ProxyPrincipal> {
        let ttl = i64::try_from(self.config.cache_default_ttl().as_millis()).unwrap_or(i64::MAX);
        let user = ProxyUserToken::new(
            &self.config.mock_user,
            ISSUING_SERVICE.common_name,
            "",
            millis_from_now(ttl),
        );
        debug!(user = %self.config.mock_user, "mock mode: substituting configured user");
        Ok(ProxyPrincipal::new(user.to_json()?, ""))
    }

    /// Check the front end's signature and the expiry of a proxy principal
    pub fn verify_proxy_principal(&self, proxy: &ProxyPrincipal) -> Result<ProxyUserToken> {
        if self.config.use_mock {
            warn!("mock mode: skipping proxy principal verification");
            return proxy.user_token();
        }
        let front_end = self.front_end_key.as_ref().ok_or_else(|| {
            TokenError::configuration("verifying proxy principals needs the front-end public key")
        })?;
        validation::verify_proxy_principal(proxy, front_end.as_ref())
    }

    /// Extract and verify the proxied user of an inbound request
    pub fn validate_current_request(&self, headers: &Headers) -> Result<ProxyPrincipal> {
        let proxy = self.proxy_principal_from_request(headers)?;
        self.verify_proxy_principal(&proxy)?;
        Ok(proxy)
    }

    /// Check a principal signed by the issuing service
    pub fn verify_principal(&self, principal: &Principal) -> Result<()> {
        if self.config.use_mock {
            warn!(subject = %principal.principal, "mock mode: skipping principal verification");
            return Ok(());
        }
        let issuer = self.issuer_key.as_ref().ok_or_else(|| {
            TokenError::configuration("verifying principals needs the issuer public key")
        })?;
        validation::verify_principal(principal, issuer.as_ref())
    }

    /// Whether the issuing service answers
    pub fn ping(&self) -> Result<bool> {
        self.provider.ping()
    }
}

/// Assembles a [`SecurityClient`]. Anything not supplied is derived from the
/// configuration.
pub struct SecurityClientBuilder {
    config: ClientConfig,
    pool: Option<Arc<dyn ClientPool>>,
    resolver: Option<Arc<dyn SecurityIdResolver>>,
    cache: Option<Arc<TokenCache>>,
    provider: Option<TokenProvider>,
    app_key: Option<Arc<KeyPair>>,
    issuer_key: Option<Arc<KeyPair>>,
    front_end_key: Option<Arc<KeyPair>>,
}

impl SecurityClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            pool: None,
            resolver: None,
            cache: None,
            provider: None,
            app_key: None,
            issuer_key: None,
            front_end_key: None,
        }
    }

    pub fn pool(mut self, pool: Arc<dyn ClientPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn SecurityIdResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Share a cache between clients, or isolate one in tests
    pub fn cache(mut self, cache: Arc<TokenCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn provider(mut self, provider: TokenProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn app_key(mut self, key: KeyPair) -> Self {
        self.app_key = Some(Arc::new(key));
        self
    }

    pub fn issuer_key(mut self, key: KeyPair) -> Self {
        self.issuer_key = Some(Arc::new(key));
        self
    }

    pub fn front_end_key(mut self, key: KeyPair) -> Self {
        self.front_end_key = Some(Arc::new(key));
        self
    }

    pub fn build(self) -> Result<SecurityClient> {
        let config = self.config;
        if config.security_id.is_empty() {
            return Err(TokenError::configuration("security_id is not set"));
        }

        let app_key = load_key(
            self.app_key,
            config.app_private_key.as_deref(),
            "application private",
            KeyPair::from_base64_private,
        )?;
        let issuer_key = load_key(
            self.issuer_key,
            config.issuer_public_key.as_deref(),
            "issuer public",
            KeyPair::from_base64_public,
        )?;
        let front_end_key = load_key(
            self.front_end_key,
            config.front_end_public_key.as_deref(),
            "front-end public",
            KeyPair::from_base64_public,
        )?;

        let provider = match self.provider {
            Some(provider) => provider,
            None => TokenProvider::from_config(&config, self.pool, app_key, issuer_key.clone())?,
        };
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(TokenCache::new(config.cache_max_size)));

        if config.use_mock {
            warn!(user = %config.mock_user, "security client running in mock mode; received tokens are not validated");
        }
        info!(security_id = %config.security_id, mode = %provider.mode(), "security client ready");

        Ok(SecurityClient {
            config,
            provider,
            cache,
            resolver: self.resolver,
            issuer_key,
            front_end_key,
        })
    }
}

fn load_key<F>(
    supplied: Option<Arc<KeyPair>>,
    encoded: Option<&str>,
    what: &str,
    parse: F,
) -> Result<Option<Arc<KeyPair>>>
where
    F: FnOnce(&str) -> std::result::Result<KeyPair, tessera_security::KeyError>,
{
    if supplied.is_some() {
        return Ok(supplied);
    }
    encoded
        .map(|encoded| {
            parse(encoded)
                .map(Arc::new)
                .map_err(|e| TokenError::configuration(format!("{what} key: {e}")))
        })
        .transpose()
}
