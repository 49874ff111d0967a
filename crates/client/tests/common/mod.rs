//! In-process issuing service and client pool for integration tests
#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use tessera_client::{ClientPool, RpcError, SecurityClient, SecurityService};
use tessera_config::{ClientConfig, ProviderMode};
use tessera_core::security_id::ISSUING_SERVICE;
use tessera_core::{
    now_millis, Authorizations, Principal, ProxyPrincipal, ProxyUserToken, RequestSubject,
    SecurityToken, TokenRequest, ValidityCaveats,
};
use tessera_security::{sign_proxy_token, sign_token, verify_request_signature, KeyPair};

pub const APP_ID: &str = "1234";
pub const ISSUED_AUTHS: [&str; 2] = ["S", "U"];

/// State shared by every connection the fake pool hands out
pub struct Issuer {
    pub key: KeyPair,
    /// When set, request signatures must verify under this key
    pub app_public: Option<KeyPair>,
    pub registered: AtomicBool,
    pub transport_down: AtomicBool,
    pub validity_millis: AtomicI64,
    pub requests: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub signatures_seen: Mutex<Vec<String>>,
}

impl Issuer {
    pub fn new(app_public: Option<KeyPair>) -> Arc<Self> {
        Arc::new(Self {
            key: KeyPair::generate(),
            app_public,
            registered: AtomicBool::new(true),
            transport_down: AtomicBool::new(false),
            validity_millis: AtomicI64::new(60_000),
            requests: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
            signatures_seen: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    fn check(&self, request: &TokenRequest, signature: &str) -> Result<(), RpcError> {
        if self.transport_down.load(Ordering::SeqCst) {
            return Err(RpcError::Transport("connection refused".into()));
        }
        if !self.registered.load(Ordering::SeqCst) {
            return Err(RpcError::AppNotRegistered(request.requester_security_id.clone()));
        }
        self.signatures_seen.lock().push(signature.to_string());
        if let Some(app) = &self.app_public {
            if !verify_request_signature(request, signature, app) {
                return Err(RpcError::Transport("request signature rejected".into()));
            }
        }
        Ok(())
    }

    /// Issue a signed token the way the real service would
    pub fn issue(&self, request: &TokenRequest) -> SecurityToken {
        let principal = match &request.subject {
            RequestSubject::ProxyPrincipal(proxy) => {
                let user = proxy.user_token().expect("fake issuer got unparsable proxy token");
                let validity =
                    ValidityCaveats::new(&user.issued_by, &user.issued_to, user.not_after);
                Principal::new(user.subject(), validity)
            }
            RequestSubject::TokenPrincipal(token) => token.principal.clone(),
            RequestSubject::Principal(principal) => principal.clone(),
            RequestSubject::Application => Principal::new(
                &request.requester_security_id,
                ValidityCaveats::new(ISSUING_SERVICE.id, &request.requester_security_id, i64::MAX),
            ),
        };

        let mut validity = ValidityCaveats::new(
            ISSUING_SERVICE.id,
            &request.requester_security_id,
            now_millis() + self.validity_millis.load(Ordering::SeqCst),
        );
        validity.issued_for = Some(request.target_security_id.clone());

        let mut token = SecurityToken::new(request.token_type, principal, validity);
        token.authorizations = Authorizations::with_formal(ISSUED_AUTHS);
        if let Some(exclude) = &request.exclude_authorizations {
            token.authorizations.remove_all(exclude);
        }
        sign_token(&mut token, &self.key).expect("issuer key signs");
        token
    }
}

pub struct FakeService {
    issuer: Arc<Issuer>,
}

impl SecurityService for FakeService {
    fn request_token(
        &mut self,
        request: &TokenRequest,
        signature: &str,
    ) -> Result<SecurityToken, RpcError> {
        self.issuer.check(request, signature)?;
        self.issuer.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.issuer.issue(request))
    }

    fn refresh_token(
        &mut self,
        request: &TokenRequest,
        signature: &str,
    ) -> Result<SecurityToken, RpcError> {
        self.issuer.check(request, signature)?;
        self.issuer.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(self.issuer.issue(request))
    }

    fn ping(&mut self) -> Result<bool, RpcError> {
        if self.issuer.transport_down.load(Ordering::SeqCst) {
            return Err(RpcError::Transport("connection refused".into()));
        }
        Ok(true)
    }
}

#[derive(Default)]
pub struct PoolCounters {
    pub borrowed: AtomicUsize,
    pub returned: AtomicUsize,
    pub broken: AtomicUsize,
}

pub struct FakePool {
    pub issuer: Arc<Issuer>,
    pub counters: Arc<PoolCounters>,
}

impl FakePool {
    pub fn new(issuer: Arc<Issuer>) -> Self {
        Self {
            issuer,
            counters: Arc::new(PoolCounters::default()),
        }
    }

    pub fn all_returned(&self) -> bool {
        let c = &self.counters;
        c.borrowed.load(Ordering::SeqCst)
            == c.returned.load(Ordering::SeqCst) + c.broken.load(Ordering::SeqCst)
    }
}

impl ClientPool for FakePool {
    fn borrow(&self, _service_name: &str) -> Result<Box<dyn SecurityService>, RpcError> {
        self.counters.borrowed.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeService {
            issuer: Arc::clone(&self.issuer),
        }))
    }

    fn return_client(&self, _client: Box<dyn SecurityService>) {
        self.counters.returned.fetch_add(1, Ordering::SeqCst);
    }

    fn return_broken(&self, _client: Box<dyn SecurityService>) {
        self.counters.broken.fetch_add(1, Ordering::SeqCst);
    }
}

/// A production client wired to a fresh fake issuer
pub struct Harness {
    pub client: SecurityClient,
    pub issuer: Arc<Issuer>,
    pub pool: Arc<FakePool>,
    pub front_end: KeyPair,
}

pub fn production_client(config: ClientConfig) -> Harness {
    tessera_utils::init_for_tests();

    let app = KeyPair::generate();
    let issuer = Issuer::new(Some(app.public_only()));
    let pool = Arc::new(FakePool::new(Arc::clone(&issuer)));
    let front_end = KeyPair::generate();

    let client = SecurityClient::builder(config.with_mode(ProviderMode::Production))
        .pool(pool.clone())
        .app_key(app)
        .issuer_key(issuer.key.public_only())
        .front_end_key(front_end.public_only())
        .build()
        .expect("production client builds");

    Harness {
        client,
        issuer,
        pool,
        front_end,
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::new(APP_ID)
}

/// A proxy principal for `subject`, signed by the front end
pub fn signed_proxy(front_end: &KeyPair, subject: &str, lifetime_millis: i64) -> ProxyPrincipal {
    let user = ProxyUserToken::new(subject, "_Ts_FrontEnd", "02", now_millis() + lifetime_millis);
    sign_proxy_token(&user, front_end).expect("front end signs")
}

pub fn set(labels: &[&str]) -> BTreeSet<String> {
    labels.iter().map(|s| s.to_string()).collect()
}
