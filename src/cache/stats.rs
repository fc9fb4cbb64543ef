//! Cache Statistics Module
//!
//! Counters for component acquisition: how often an instance was reused,
//! built, failed to build or was evicted.

use serde::Serialize;

// == Cache Stats ==
/// Instance cache counters, exposed through `/_stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Acquisitions served from the cache
    pub hits: u64,
    /// Acquisitions that found nothing and had to call the constructor
    pub misses: u64,
    /// Constructor calls that produced an instance
    pub constructions: u64,
    /// Constructor calls that returned an error; nothing was cached for them
    pub failed_constructions: u64,
    /// Instances dropped by the built-in LRU to stay within capacity
    pub evictions: u64,
    /// Instances currently held (always 0 for a custom backend)
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Share of acquisitions that reused an instance, 0.0 before the first one.
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_construction(&mut self) {
        self.constructions += 1;
    }

    pub fn record_failed_construction(&mut self) {
        self.failed_constructions += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_construction_outcomes() {
        let mut stats = CacheStats::new();
        stats.record_miss();
        stats.record_miss();
        stats.record_miss();
        stats.record_construction();
        stats.record_failed_construction();

        assert_eq!(stats.constructions, 1);
        assert_eq!(stats.failed_constructions, 1);
        assert_eq!(stats.misses, 3);
    }

    #[test]
    fn test_record_eviction_and_entries() {
        let mut stats = CacheStats::new();
        stats.record_eviction();
        stats.record_eviction();
        stats.set_total_entries(42);
        assert_eq!(stats.evictions, 2);
        assert_eq!(stats.total_entries, 42);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = CacheStats::new();
        stats.record_miss();
        stats.record_construction();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["misses"], 1);
        assert_eq!(json["constructions"], 1);
        assert_eq!(json["failed_constructions"], 0);
        assert_eq!(json["total_entries"], 0);
    }
}
