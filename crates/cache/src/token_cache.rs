use crate::key::CacheKey;
use crate::stats::{CacheStats, Counters};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tessera_core::{now_millis, SecurityToken, DEFAULT_CACHE_MAX_SIZE};
use tracing::{debug, trace};

/// Bounded, thread-safe map from [`CacheKey`] to [`SecurityToken`].
///
/// Concurrent misses on the same key are not coalesced; whichever `put`
/// lands last wins.
#[derive(Debug)]
pub struct TokenCache {
    entries: Mutex<LruCache<CacheKey, SecurityToken>>,
    counters: Counters,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_MAX_SIZE)
    }
}

impl TokenCache {
    /// A cache holding at most `max_size` tokens (at least one)
    pub fn new(max_size: usize) -> Self {
        let capacity = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            counters: Counters::default(),
        }
    }

    /// Return the cached token if it has not expired. Expired entries are
    /// evicted and reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<SecurityToken> {
        self.get_with(key, |_| true)
    }

    /// Like [`TokenCache::get`], but the entry must also satisfy `is_valid`
    /// (for example a provider's signature check) to be returned.
    ///
    /// `is_valid` runs without the lock held. A stale entry is only evicted if
    /// it has not been replaced in the meantime.
    pub fn get_with<F>(&self, key: &CacheKey, is_valid: F) -> Option<SecurityToken>
    where
        F: FnOnce(&SecurityToken) -> bool,
    {
        let now = now_millis();
        let cached = self.entries.lock().get(key).cloned();
        let Some(token) = cached else {
            Counters::bump(&self.counters.misses);
            trace!(key = %key, "token cache miss");
            return None;
        };

        if token.is_valid_at(now) && is_valid(&token) {
            Counters::bump(&self.counters.hits);
            trace!(key = %key, "token cache hit");
            return Some(token);
        }

        let mut entries = self.entries.lock();
        if entries.peek(key) == Some(&token) {
            entries.pop(key);
            Counters::bump(&self.counters.expiry_evictions);
            debug!(key = %key, "evicted stale token on read");
        }
        Counters::bump(&self.counters.misses);
        None
    }

    pub fn put(&self, key: CacheKey, token: SecurityToken) {
        let mut entries = self.entries.lock();
        if let Some((evicted, _)) = entries.push(key.clone(), token) {
            if evicted != key {
                Counters::bump(&self.counters.capacity_evictions);
                debug!(key = %evicted, "evicted least recently used token");
            }
        }
    }

    pub fn invalidate(&self, key: &CacheKey) -> Option<SecurityToken> {
        self.entries.lock().pop(key)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.len())
    }
}
