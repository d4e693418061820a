//! Match result caching
//!
//! The router itself never caches. [`CachedRouter`] puts a [`RouteCache`] in
//! front of a sealed [`Router`], keyed by method and path. Invalidation is the
//! cache owner's concern: a router is immutable, so entries only go stale when
//! the cache is reused with a different router.

use crate::config::RouterConfig;
use crate::error::RoutingResult;
use crate::matcher::{MatchedRoute, Router};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::trace;

/// Cached outcome of a match; `route` is `None` for a cached miss
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CachedResult {
    pub route: Option<usize>,
    pub params: HashMap<String, String>,
}

impl CachedResult {
    pub fn miss() -> Self {
        Self::default()
    }

    fn from_match<T>(matched: Option<&MatchedRoute<'_, T>>) -> Self {
        match matched {
            Some(matched) => Self {
                route: Some(matched.route_index()),
                params: matched.params().clone(),
            },
            None => Self::miss(),
        }
    }
}

/// Key-value store for match results
pub trait RouteCache: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedResult>;

    /// Store a result; `None` keeps it until evicted
    fn set(&self, key: &str, value: CachedResult, ttl: Option<Duration>);
}

/// Cache key for a request: upper-cased method and the raw path
pub fn cache_key(method: &str, path: &str) -> String {
    format!("{} {}", method.to_ascii_uppercase(), path)
}

#[derive(Debug)]
struct CacheEntry {
    value: CachedResult,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |exp| Instant::now() > exp)
    }
}

/// In-process [`RouteCache`] with per-entry expiry and a capacity bound.
///
/// When full, the oldest inserted key is evicted first. Expired entries are
/// treated as misses and dropped by [`MemoryRouteCache::purge_expired`] or when
/// their key is overwritten or evicted.
#[derive(Debug)]
pub struct MemoryRouteCache {
    entries: DashMap<String, CacheEntry>,
    insertion_order: Mutex<VecDeque<String>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryRouteCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            insertion_order: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(config.cache_capacity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Remove every expired entry and return how many were dropped
    pub fn purge_expired(&self) -> usize {
        let mut order = self.insertion_order.lock();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        order.retain(|key| self.entries.contains_key(key));
        before - self.entries.len()
    }

    pub fn clear(&self) {
        let mut order = self.insertion_order.lock();
        self.entries.clear();
        order.clear();
    }
}

impl RouteCache for MemoryRouteCache {
    fn get(&self, key: &str) -> Option<CachedResult> {
        let value = self
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone());

        match value {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        value
    }

    fn set(&self, key: &str, value: CachedResult, ttl: Option<Duration>) {
        let entry = CacheEntry {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };

        let mut order = self.insertion_order.lock();
        if !self.entries.contains_key(key) {
            while order.len() >= self.capacity {
                match order.pop_front() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            order.push_back(key.to_string());
        }
        self.entries.insert(key.to_string(), entry);
    }
}

/// A [`Router`] fronted by a match result cache
#[derive(Debug)]
pub struct CachedRouter<T, C = MemoryRouteCache> {
    router: Router<T>,
    cache: C,
    ttl: Option<Duration>,
}

impl<T> CachedRouter<T, MemoryRouteCache> {
    /// Use an in-memory cache sized and timed from the configuration
    pub fn from_config(router: Router<T>, config: &RouterConfig) -> Self {
        CachedRouter::new(router, MemoryRouteCache::from_config(config))
            .with_ttl(Some(config.cache_ttl()))
    }
}

impl<T, C: RouteCache> CachedRouter<T, C> {
    pub fn new(router: Router<T>, cache: C) -> Self {
        Self {
            router,
            cache,
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn router(&self) -> &Router<T> {
        &self.router
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Resolve a request, consulting the cache first.
    ///
    /// Misses are cached too. Paths rejected with `InvalidArgument` are not.
    pub fn match_request(
        &self,
        method: &str,
        path: &str,
    ) -> RoutingResult<Option<MatchedRoute<'_, T>>> {
        let key = cache_key(method, path);

        if let Some(cached) = self.cache.get(&key) {
            match cached.route {
                None => {
                    trace!("Route cache hit for '{}' (no route)", key);
                    return Ok(None);
                }
                Some(index) => {
                    if let Some(route) = self.router.route_at(index) {
                        trace!("Route cache hit for '{}'", key);
                        return Ok(Some(MatchedRoute::new(route, index, cached.params)));
                    }
                }
            }
        }

        trace!("Route cache miss for '{}'", key);
        let matched = self.router.match_path(path)?;
        self.cache
            .set(&key, CachedResult::from_match(matched.as_ref()), self.ttl);
        Ok(matched)
    }
}
