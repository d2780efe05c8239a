//! Read-through cache for detail responses
//!
//! Bounded map from [`CacheKey`] to the serialised response. Every mutation
//! in [`OrgService`](super::OrgService) invalidates the affected keys after
//! its transaction commits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Employee(i64),
    Department(i64),
}

#[derive(Debug)]
struct Entry {
    json: String,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct EntityCache {
    entries: DashMap<CacheKey, Entry>,
    capacity: usize,
    ttl: Duration,
    /// Bumped on every invalidation
    generation: AtomicU64,
}

impl EntityCache {
    /// A capacity of 0 disables caching
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
            ttl,
            generation: AtomicU64::new(0),
        }
    }

    /// Token to pass to [`put`](Self::put); take it before reading the store
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        {
            let entry = self.entries.get(key)?;
            if entry.stored_at.elapsed() < self.ttl {
                return serde_json::from_str(&entry.json).ok();
            }
        }
        // Expired; the read guard is released above
        self.entries.remove(key);
        None
    }

    /// Store `value` unless an invalidation happened since `generation` was taken
    pub fn put<T: Serialize>(&self, key: CacheKey, value: &T, generation: u64) {
        if self.capacity == 0 {
            return;
        }
        let Ok(json) = serde_json::to_string(value) else {
            return;
        };
        if self.entries.len() >= self.capacity {
            self.evict();
        }
        self.entries.insert(
            key,
            Entry {
                json,
                stored_at: Instant::now(),
            },
        );
        // An invalidation raced with this insert; the value may be stale
        if self.generation() != generation {
            self.entries.remove(&key);
        }
    }

    pub fn invalidate(&self, key: &CacheKey) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries, then the oldest one if still full
    fn evict(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, e| e.stored_at.elapsed() < ttl);
        if self.entries.len() < self.capacity {
            return;
        }
        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.value().stored_at)
            .map(|e| *e.key());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
