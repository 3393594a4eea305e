//! Motion Cache
//!
//! Shared store of loaded motions.
//!
//! # Lifetime
//!
//! Players hold [`MotionHandle`]s (`Arc<Motion>`), so a motion stays alive for
//! as long as anything plays it. The cache keeps one more reference so that a
//! motion replayed shortly after it finished does not have to be reloaded:
//!
//! - While any handle besides the cache's exists, the entry is *in use*.
//! - Once the cache holds the last reference, a grace window starts.
//! - [`MotionCache::maintain`] evicts entries idle for longer than
//!   [`MotionSettings::motion_grace_period`]; re-acquiring a handle before that
//!   cancels the window.

use std::sync::Arc;

use marionette_core::MotionSettings;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::motion::MotionHandle;

new_key_type! {
    pub struct MotionKey;
}

struct CacheEntry {
    motion: MotionHandle,
    // Time at which the cache became the only owner.
    idle_since: Option<f64>,
}

#[derive(Default)]
struct CacheInner {
    map: SlotMap<MotionKey, CacheEntry>,
    lookup: FxHashMap<String, MotionKey>,
}

/// Thread-safe motion store, deduplicated by motion name.
pub struct MotionCache {
    inner: RwLock<CacheInner>,
    grace_period: f64,
}

impl Default for MotionCache {
    fn default() -> Self {
        Self::new(&MotionSettings::default())
    }
}

impl MotionCache {
    #[must_use]
    pub fn new(settings: &MotionSettings) -> Self {
        Self {
            inner: RwLock::default(),
            grace_period: f64::from(settings.motion_grace_period.max(0.0)),
        }
    }

    /// [Write] Adds a motion. If a motion with the same name is already
    /// cached, the existing key is returned and `motion` is dropped.
    pub fn insert(&self, motion: impl Into<MotionHandle>) -> MotionKey {
        let motion = motion.into();
        let mut guard = self.inner.write();
        if let Some(&key) = guard.lookup.get(&motion.name) {
            return key;
        }

        let name = motion.name.clone();
        let key = guard.map.insert(CacheEntry {
            motion,
            idle_since: None,
        });
        guard.lookup.insert(name, key);
        key
    }

    /// [Read] Returns a new handle to a cached motion.
    pub fn get(&self, key: MotionKey) -> Option<MotionHandle> {
        let guard = self.inner.read();
        guard.map.get(key).map(|e| Arc::clone(&e.motion))
    }

    pub fn get_by_name(&self, name: &str) -> Option<MotionHandle> {
        let guard = self.inner.read();
        let key = guard.lookup.get(name)?;
        guard.map.get(*key).map(|e| Arc::clone(&e.motion))
    }

    pub fn key_of(&self, name: &str) -> Option<MotionKey> {
        self.inner.read().lookup.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().lookup.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().map.is_empty()
    }

    /// [Write] Runs the eviction policy at time `now` (seconds, monotonic).
    /// Returns the number of evicted motions.
    pub fn maintain(&self, now: f64) -> usize {
        let mut guard = self.inner.write();
        let grace_period = self.grace_period;
        let mut evicted = Vec::new();

        for (key, entry) in &mut guard.map {
            if Arc::strong_count(&entry.motion) > 1 {
                entry.idle_since = None;
                continue;
            }
            let since = *entry.idle_since.get_or_insert(now);
            if now - since >= grace_period {
                evicted.push(key);
            }
        }

        for key in &evicted {
            if let Some(entry) = guard.map.remove(*key) {
                guard.lookup.remove(&entry.motion.name);
                log::debug!("Evicted motion '{}' from cache", entry.motion.name);
            }
        }

        evicted.len()
    }
}
