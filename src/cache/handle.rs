//! Cache Handle Module
//!
//! Shared, lockable access to the app's instance cache.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::cache::{
    CacheOption, CacheStats, ComponentKey, Constructor, Instance, InstanceCache, InstanceId,
};
use crate::emitter::Emitter;
use crate::error::{AppError, Result};
use crate::state::State;

// == Cache Handle ==
/// Cloneable reference to one app's instance cache.
#[derive(Debug, Clone)]
pub struct CacheHandle {
    inner: Arc<Mutex<InstanceCache>>,
}

impl CacheHandle {
    pub fn new(cache: InstanceCache) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn from_option(option: CacheOption) -> Result<Self> {
        InstanceCache::from_option(option).map(Self::new)
    }

    // == Acquire ==
    /// Returns the cached instance for `(constructor, id)`, constructing it on a miss.
    ///
    /// On a hit `args` are ignored. The lock is released while the constructor
    /// runs, so constructors may acquire their own child components. A failed
    /// construction leaves the cache untouched.
    pub fn acquire(
        &self,
        constructor: &Constructor,
        id: InstanceId,
        state: &State,
        emit: &Emitter,
        args: &[Value],
    ) -> Result<Instance> {
        let key = ComponentKey::new(constructor.clone(), id);

        if let Some(instance) = self.lock().get(&key) {
            return Ok(instance);
        }

        let instance = match constructor.construct(&key.id, state, emit, args) {
            Ok(instance) => instance,
            Err(source) => {
                self.lock().record_failed_construction(&key);
                return Err(AppError::Construction {
                    constructor: constructor.name().to_string(),
                    id: key.id.to_string(),
                    source,
                });
            }
        };

        self.lock().set(key, instance.clone());
        Ok(instance)
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, InstanceCache> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
