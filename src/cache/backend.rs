//! Cache Backend Module
//!
//! The pluggable storage seam behind the instance cache.

use std::fmt;

use crate::cache::{Constructor, Instance, InstanceId, DEFAULT_MAX_INSTANCES};

// == Cache Capability ==
/// External storage for component instances.
///
/// When an app is configured with one of these, the built-in LRU is bypassed
/// entirely: eviction (if any) is the implementor's job.
pub trait CacheCapability: Send {
    /// Looks up a previously stored instance.
    fn get(&mut self, constructor: &Constructor, id: &InstanceId) -> Option<Instance>;

    /// Stores a freshly constructed instance.
    fn set(&mut self, constructor: &Constructor, id: &InstanceId, instance: Instance);
}

// == Cache Option ==
/// How an app stores its component instances.
pub enum CacheOption {
    /// Built-in LRU holding at most this many instances
    Capacity(usize),
    /// Fully delegated storage
    Custom(Box<dyn CacheCapability>),
}

impl CacheOption {
    pub fn custom(capability: impl CacheCapability + 'static) -> Self {
        CacheOption::Custom(Box::new(capability))
    }
}

impl Default for CacheOption {
    fn default() -> Self {
        CacheOption::Capacity(DEFAULT_MAX_INSTANCES)
    }
}

impl From<usize> for CacheOption {
    fn from(capacity: usize) -> Self {
        CacheOption::Capacity(capacity)
    }
}

impl fmt::Debug for CacheOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheOption::Capacity(n) => f.debug_tuple("Capacity").field(n).finish(),
            CacheOption::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
