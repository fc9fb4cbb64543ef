//! Per-navigation state
//!
//! Assembles the object handed to route handlers and exposes the app's
//! instance cache and shared application fields through it.

use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::cache::{CacheHandle, Constructor, Instance, InstanceId};
use crate::emitter::Emitter;
use crate::error::{AppError, Result};
use crate::router::{Location, Match};

/// Shared field written by the built-in `DOMTitleChange` listener.
pub const TITLE_FIELD: &str = "title";

// == Shared Fields ==
/// Application fields that outlive a single navigation.
///
/// Every `State` holds a clone of the same handle, so writes made while
/// handling one navigation are visible on the next.
#[derive(Debug, Clone, Default)]
pub struct SharedFields {
    inner: Arc<Mutex<Map<String, Value>>>,
}

impl SharedFields {
    pub fn new(initial: Map<String, Value>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    /// Stores `value`, returning the previous one.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.lock().insert(key.into(), value.into())
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.lock().remove(key)
    }

    /// Runs `f` with exclusive access to the whole map.
    pub fn update<R>(&self, f: impl FnOnce(&mut Map<String, Value>) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// == State ==
/// What a route handler sees for one navigation.
#[derive(Debug)]
pub struct State {
    /// Hash-processed, query-stripped path
    pub href: String,
    /// Winning pattern without its leading `/`
    pub route: String,
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    /// Event names registered on the app's emitter when this state was built
    pub events: BTreeSet<String>,
    shared: SharedFields,
    cache: CacheHandle,
    emitter: Emitter,
}

// == Build ==
/// Assembles a fresh `State` for a resolved navigation.
pub fn build<H>(
    matched: &Match<'_, H>,
    location: Location,
    shared: &SharedFields,
    cache: &CacheHandle,
    emitter: &Emitter,
) -> State {
    State {
        href: location.href,
        route: matched.route.pattern.route_name().to_string(),
        params: matched.params.clone(),
        query: location.query,
        events: emitter.event_names(),
        shared: shared.clone(),
        cache: cache.clone(),
        emitter: emitter.clone(),
    }
}

impl State {
    // == Cache ==
    /// Returns the instance cached for `(constructor, id)`, building it on a miss
    /// as `constructor(id, self, emit, args)`.
    pub fn cache(
        &self,
        constructor: &Constructor,
        id: impl Into<InstanceId>,
        args: &[Value],
    ) -> Result<Instance> {
        self.cache
            .acquire(constructor, id.into(), self, &self.emitter, args)
    }

    /// Like [`State::cache`], downcast to the constructor's concrete type.
    pub fn cache_as<T: Any + Send + Sync>(
        &self,
        constructor: &Constructor,
        id: impl Into<InstanceId>,
        args: &[Value],
    ) -> Result<Arc<T>> {
        let id = id.into();
        let instance = self.cache(constructor, id.clone(), args)?;
        instance
            .downcast::<T>()
            .map_err(|_| AppError::Construction {
                constructor: constructor.name().to_string(),
                id: id.to_string(),
                source: anyhow::anyhow!(
                    "instance is not a {}",
                    std::any::type_name::<T>()
                ),
            })
    }

    pub fn shared(&self) -> &SharedFields {
        &self.shared
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Current document title, as last set through `DOMTitleChange`.
    pub fn title(&self) -> Option<String> {
        self.shared
            .get(TITLE_FIELD)
            .and_then(|v| v.as_str().map(str::to_string))
    }
}
