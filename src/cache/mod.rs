//! Cache Module
//!
//! Component instance caching with LRU eviction or a pluggable backend.

mod backend;
mod entry;
mod handle;
mod key;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use backend::{CacheCapability, CacheOption};
pub use entry::CacheEntry;
pub use handle::CacheHandle;
pub use key::{ComponentKey, Constructor, Instance, InstanceId};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{InstanceCache, LruStore};

// == Public Constants ==
/// Instances kept by the built-in LRU when no capacity is configured
pub const DEFAULT_MAX_INSTANCES: usize = 100;
