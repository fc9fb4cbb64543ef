//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking, or
//! delegating to an external backend.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::cache::{
    CacheCapability, CacheEntry, CacheOption, CacheStats, ComponentKey, Instance, LruTracker,
};
use crate::error::{AppError, Result};

// == LRU Store ==
/// Bounded instance storage with least-recently-used eviction.
#[derive(Debug)]
pub struct LruStore {
    entries: HashMap<ComponentKey, CacheEntry>,
    lru: LruTracker<ComponentKey>,
    max_entries: usize,
}

impl LruStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            max_entries,
        }
    }

    // == Get ==
    /// Returns the cached instance and marks it most recently used.
    pub fn get(&mut self, key: &ComponentKey) -> Option<Instance> {
        let entry = self.entries.get_mut(key)?;
        let tick = self.lru.touch(key);
        Some(entry.refresh(tick))
    }

    // == Set ==
    /// Inserts an instance as most recently used.
    ///
    /// Insertion happens first; if that pushes the store past capacity, the
    /// single least recently used entry is evicted and its key returned.
    pub fn set(&mut self, key: ComponentKey, value: Instance) -> Option<ComponentKey> {
        let tick = self.lru.touch(&key);
        self.entries
            .insert(key.clone(), CacheEntry::new(key, value, tick));

        if self.entries.len() <= self.max_entries {
            return None;
        }

        let evicted = self.lru.evict_oldest()?;
        self.entries.remove(&evicted);
        Some(evicted)
    }

    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }
}

enum Backend {
    Lru(LruStore),
    Custom(Box<dyn CacheCapability>),
}

// == Instance Cache ==
/// App-lifetime component instance storage.
pub struct InstanceCache {
    backend: Backend,
    stats: CacheStats,
}

impl InstanceCache {
    // == Constructor ==
    /// Creates an LRU-backed cache holding at most `max_entries` (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        Self {
            backend: Backend::Lru(LruStore::new(max_entries.max(1))),
            stats: CacheStats::new(),
        }
    }

    /// Builds the cache described by `option`. A zero capacity is a
    /// configuration error.
    pub fn from_option(option: CacheOption) -> Result<Self> {
        let backend = match option {
            CacheOption::Capacity(0) => {
                return Err(AppError::Configuration(
                    "cache capacity must be at least 1".to_string(),
                ))
            }
            CacheOption::Capacity(max) => Backend::Lru(LruStore::new(max)),
            CacheOption::Custom(capability) => Backend::Custom(capability),
        };

        Ok(Self {
            backend,
            stats: CacheStats::new(),
        })
    }

    // == Get ==
    /// Looks up an instance, counting the hit or miss.
    pub fn get(&mut self, key: &ComponentKey) -> Option<Instance> {
        let found = match &mut self.backend {
            Backend::Lru(store) => store.get(key),
            Backend::Custom(capability) => capability.get(&key.constructor, &key.id),
        };

        match found {
            Some(instance) => {
                self.stats.record_hit();
                debug!(key = %key, "Instance cache hit");
                Some(instance)
            }
            None => {
                self.stats.record_miss();
                debug!(key = %key, "Instance cache miss");
                None
            }
        }
    }

    // == Set ==
    /// Stores a newly constructed instance.
    pub fn set(&mut self, key: ComponentKey, value: Instance) {
        self.stats.record_construction();
        match &mut self.backend {
            Backend::Lru(store) => {
                if let Some(evicted) = store.set(key, value) {
                    self.stats.record_eviction();
                    debug!(key = %evicted, capacity = store.capacity(), "Evicted instance");
                }
                self.stats.set_total_entries(store.len());
            }
            Backend::Custom(capability) => capability.set(&key.constructor, &key.id, value),
        }
    }

    /// Counts a constructor call that failed; nothing is stored for it.
    pub fn record_failed_construction(&mut self, key: &ComponentKey) {
        self.stats.record_failed_construction();
        debug!(key = %key, "Instance construction failed");
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// Number of entries held by the built-in LRU; 0 for a custom backend.
    pub fn len(&self) -> usize {
        match &self.backend {
            Backend::Lru(store) => store.len(),
            Backend::Custom(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.backend, Backend::Custom(_))
    }
}

impl fmt::Debug for InstanceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = match &self.backend {
            Backend::Lru(store) => format!("Lru(capacity = {})", store.capacity()),
            Backend::Custom(_) => "Custom".to_string(),
        };
        f.debug_struct("InstanceCache")
            .field("backend", &backend)
            .field("stats", &self.stats)
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::cache::{Constructor, InstanceId};

    fn ctor() -> Constructor {
        Constructor::new(|_, _, _, _| Ok(()))
    }

    fn key(ctor: &Constructor, id: impl Into<InstanceId>) -> ComponentKey {
        ComponentKey::new(ctor.clone(), id.into())
    }

    fn instance(n: u32) -> Instance {
        Arc::new(n)
    }

    #[test]
    fn test_lru_store_get_returns_same_instance() {
        let c = ctor();
        let mut store = LruStore::new(10);
        let value = instance(1);

        store.set(key(&c, "a"), value.clone());

        let found = store.get(&key(&c, "a")).unwrap();
        assert!(Arc::ptr_eq(&found, &value));
        assert!(store.get(&key(&c, "b")).is_none());
    }

    #[test]
    fn test_lru_store_evicts_after_insert() {
        let c = ctor();
        let mut store = LruStore::new(2);

        assert!(store.set(key(&c, 1), instance(1)).is_none());
        assert!(store.set(key(&c, 2), instance(2)).is_none());
        let evicted = store.set(key(&c, 3), instance(3));

        assert_eq!(evicted, Some(key(&c, 1)));
        assert_eq!(store.len(), 2);
        assert!(!store.contains(&key(&c, 1)));
    }

    #[test]
    fn test_lru_store_get_refreshes_recency() {
        let c = ctor();
        let mut store = LruStore::new(2);

        store.set(key(&c, 1), instance(1));
        store.set(key(&c, 2), instance(2));
        store.get(&key(&c, 1));
        let evicted = store.set(key(&c, 3), instance(3));

        assert_eq!(evicted, Some(key(&c, 2)));
        assert!(store.contains(&key(&c, 1)));
    }

    #[test]
    fn test_lru_store_overwrite_does_not_evict() {
        let c = ctor();
        let mut store = LruStore::new(1);

        store.set(key(&c, 1), instance(1));
        assert!(store.set(key(&c, 1), instance(2)).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_same_id_different_constructor_is_distinct() {
        let a = ctor();
        let b = ctor();
        let mut store = LruStore::new(10);

        store.set(key(&a, "x"), instance(1));

        assert!(store.get(&key(&b, "x")).is_none());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = InstanceCache::from_option(CacheOption::Capacity(0)).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_instance_cache_stats() {
        let c = ctor();
        let mut cache = InstanceCache::from_option(CacheOption::Capacity(1)).unwrap();

        assert!(cache.get(&key(&c, 1)).is_none());
        cache.set(key(&c, 1), instance(1));
        assert!(cache.get(&key(&c, 1)).is_some());
        cache.set(key(&c, 2), instance(2));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.constructions, 2);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(cache.len(), 1);
    }

    #[derive(Clone, Default)]
    struct Recording {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl CacheCapability for Recording {
        fn get(&mut self, _: &Constructor, id: &InstanceId) -> Option<Instance> {
            self.calls.lock().unwrap().push(format!("get {}", id));
            None
        }

        fn set(&mut self, _: &Constructor, id: &InstanceId, _: Instance) {
            self.calls.lock().unwrap().push(format!("set {}", id));
        }
    }

    #[test]
    fn test_custom_backend_delegates() {
        let c = ctor();
        let recording = Recording::default();
        let mut cache = InstanceCache::from_option(CacheOption::custom(recording.clone())).unwrap();

        assert!(cache.is_custom());
        assert!(cache.get(&key(&c, "foo")).is_none());
        cache.set(key(&c, "foo"), instance(1));

        assert_eq!(*recording.calls.lock().unwrap(), vec!["get foo", "set foo"]);
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().misses, 1);
    }
}
