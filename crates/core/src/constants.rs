/// Constants shared across the tessera crates
// Inbound header names carrying a proxied user assertion
pub const PROXY_TOKEN_HEADER: &str = "verified_user_info";
pub const PROXY_SIGNATURE_HEADER: &str = "verified_signature";

// Prefix some gateways add when exposing headers as CGI-style variables
pub const HTTP_HEADER_PREFIX: &str = "HTTP_";

// Project and group that mark a user as a platform administrator
pub const INTERNAL_PROJECT: &str = "_Ts_internal";
pub const INTERNAL_ADMIN_GROUP: &str = "admins";

// Default name of the issuing service in the RPC pool
pub const DEFAULT_SERVICE_NAME: &str = "token-issuer";

// Cache sizing
pub const DEFAULT_CACHE_MAX_SIZE: usize = 1000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

// Mock issuing window
pub const MOCK_TOKEN_VALIDITY_MILLIS: i64 = 10_000;
pub const MOCK_APP_PRINCIPAL_VALIDITY_MILLIS: i64 = 1_000;
pub const DEFAULT_MOCK_AUTHS: &str = "U";
