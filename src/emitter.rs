//! Event Emitter
//!
//! App-owned publish/subscribe used by views and components to talk to the app.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::debug;

/// Names of the events the app itself listens for or emits.
pub mod events {
    pub const DOM_CONTENT_LOADED: &str = "DOMContentLoaded";
    pub const DOM_TITLE_CHANGE: &str = "DOMTitleChange";
    pub const RENDER: &str = "render";
    pub const NAVIGATE: &str = "navigate";
    pub const PUSH_STATE: &str = "pushState";
    pub const REPLACE_STATE: &str = "replaceState";
    pub const POP_STATE: &str = "popState";
}

type Listener = Arc<dyn Fn(&[Value]) + Send + Sync>;

// == Emitter ==
/// Synchronous, name-keyed event dispatch.
///
/// Clones share the same listener table.
#[derive(Clone, Default)]
pub struct Emitter {
    listeners: Arc<Mutex<HashMap<String, Vec<Listener>>>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    // == On ==
    /// Registers a listener; listeners for one name run in registration order.
    pub fn on<F>(&self, name: impl Into<String>, listener: F)
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        self.lock()
            .entry(name.into())
            .or_default()
            .push(Arc::new(listener));
    }

    // == Emit ==
    /// Calls every listener currently registered under `name`.
    ///
    /// Dispatch runs over a snapshot taken before the first call, so listeners
    /// may emit or register further listeners without deadlocking; those new
    /// listeners are not invoked by this dispatch.
    pub fn emit(&self, name: &str, args: &[Value]) {
        let snapshot: Vec<Listener> = match self.lock().get(name) {
            Some(listeners) => listeners.clone(),
            None => Vec::new(),
        };

        debug!(event = name, listeners = snapshot.len(), "Emitting event");
        for listener in snapshot {
            listener(args);
        }
    }

    /// Names with at least one registered listener.
    pub fn event_names(&self) -> BTreeSet<String> {
        self.lock()
            .iter()
            .filter(|(_, listeners)| !listeners.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.lock().get(name).map_or(0, Vec::len)
    }

    pub fn remove_all_listeners(&self, name: &str) {
        self.lock().remove(name);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Listener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("events", &self.event_names())
            .finish()
    }
}
