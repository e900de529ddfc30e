use dashmap::DashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of the current instant for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A thread-safe cache with TTL support.
///
/// Entries are replaced whole; there is no partial invalidation.
pub struct TtlCache<K, V, C = SystemClock> {
    data: DashMap<K, CacheEntry<V>>,
    default_ttl: Duration,
    clock: C,
}

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V, SystemClock> {
    /// Create a new cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, SystemClock)
    }
}

impl<K: Eq + Hash, V: Clone, C: Clock> TtlCache<K, V, C> {
    pub fn with_clock(default_ttl: Duration, clock: C) -> Self {
        Self {
            data: DashMap::new(),
            default_ttl,
            clock,
        }
    }

    /// Get a live value; expired entries are evicted on read.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let entry = self.data.get(key)?;
        if entry.expires_at > now {
            Some(entry.value.clone())
        } else {
            drop(entry);
            self.data.remove_if(key, |_, e| e.expires_at <= now);
            None
        }
    }

    /// Set a value with the default TTL.
    pub fn set(&self, key: K, value: V) {
        self.put(key, value, self.default_ttl);
    }

    /// Set a value with a custom TTL.
    pub fn put(&self, key: K, value: V, ttl: Duration) {
        self.data.insert(
            key,
            CacheEntry {
                value,
                expires_at: self.clock.now() + ttl,
            },
        );
    }

    /// Remove all expired entries.
    pub fn cleanup(&self) {
        let now = self.clock.now();
        self.data.retain(|_, entry| entry.expires_at > now);
    }

    /// Number of entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
