//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with recency metadata.

use std::fmt;

use crate::cache::{ComponentKey, Instance};

// == Cache Entry ==
/// Represents a single cached component instance.
#[derive(Clone)]
pub struct CacheEntry {
    /// Constructor and id this instance was built for
    pub key: ComponentKey,
    /// The constructed instance
    pub value: Instance,
    /// Tick of the last touch, from the owning LRU tracker
    pub recency: u64,
}

impl CacheEntry {
    // == Constructor ==
    pub fn new(key: ComponentKey, value: Instance, recency: u64) -> Self {
        Self {
            key,
            value,
            recency,
        }
    }

    // == Refresh ==
    /// Records a new touch tick and hands back a shared reference to the instance.
    pub fn refresh(&mut self, recency: u64) -> Instance {
        self.recency = recency;
        self.value.clone()
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key.to_string())
            .field("recency", &self.recency)
            .finish_non_exhaustive()
    }
}
