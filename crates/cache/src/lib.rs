//! Client-side token cache.
//!
//! Entries carry no TTL of their own: validity is re-derived from the cached
//! token's `not_after` on every lookup, and stale entries are evicted on read.

pub mod key;
pub mod stats;
pub mod token_cache;

pub use key::CacheKey;
pub use stats::CacheStats;
pub use token_cache::TokenCache;
