//! Memoized rollup recomputation.
//!
//! The pipeline recomputes from scratch on every filter change; this cache
//! makes repeat selections over the same dataset free. Keys are content
//! addressed: the dataset id (hash of the raw bytes) plus the canonical
//! filter key, so a re-uploaded identical file hits and any byte change
//! misses. Purely a performance layer — a hit must be indistinguishable
//! from recomputing.

use crate::pipeline::{FilterSelection, RollupOutcome};
use mig_common::DatasetId;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Default number of (dataset, filter) outcomes kept.
pub const DEFAULT_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    dataset: DatasetId,
    filter: String,
}

/// In-memory rollup cache with insertion-order eviction.
#[derive(Debug)]
pub struct RollupCache {
    entries: HashMap<CacheKey, RollupOutcome>,
    order: VecDeque<CacheKey>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for RollupCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl RollupCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Fetch the outcome for (dataset, filter), computing on miss.
    pub fn get_or_compute<F>(
        &mut self,
        dataset: &DatasetId,
        selection: &FilterSelection,
        compute: F,
    ) -> RollupOutcome
    where
        F: FnOnce() -> RollupOutcome,
    {
        let key = CacheKey {
            dataset: dataset.clone(),
            filter: selection.cache_key(),
        };

        if let Some(outcome) = self.entries.get(&key) {
            self.hits += 1;
            debug!(dataset = %dataset.short(), "rollup cache hit");
            return outcome.clone();
        }

        self.misses += 1;
        debug!(dataset = %dataset.short(), "rollup cache miss");
        let outcome = compute();

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, outcome.clone());

        outcome
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline;
    use crate::table::RawRow;
    use mig_config::StageMap;

    fn raw_table() -> Vec<RawRow> {
        vec![
            RawRow {
                project: Some("Apollo".into()),
                dev_grp_name: Some("Core ETL".into()),
                status_raw: Some("QA".into()),
                ..RawRow::default()
            },
            RawRow {
                project: Some("Hermes".into()),
                dev_grp_name: Some("Reporting".into()),
                status_raw: Some("ETL".into()),
                ..RawRow::default()
            },
        ]
    }

    #[test]
    fn hit_returns_the_same_outcome_as_computing() {
        let map = StageMap::default();
        let table = raw_table();
        let dataset = DatasetId::from_bytes(b"dataset-1");
        let selection = FilterSelection::default();
        let mut cache = RollupCache::with_default_capacity();

        let first = cache.get_or_compute(&dataset, &selection, || {
            pipeline::run(&table, &map, &selection)
        });
        let second = cache.get_or_compute(&dataset, &selection, || {
            panic!("second lookup must not recompute")
        });

        assert_eq!(first, second);
        assert_eq!(first, pipeline::run(&table, &map, &selection));
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn different_filters_are_distinct_entries() {
        let map = StageMap::default();
        let table = raw_table();
        let dataset = DatasetId::from_bytes(b"dataset-1");
        let all = FilterSelection::default();
        let hermes = FilterSelection::from_lists(vec!["Hermes".into()], vec![]);
        let mut cache = RollupCache::with_default_capacity();

        let everything = cache.get_or_compute(&dataset, &all, || pipeline::run(&table, &map, &all));
        let filtered =
            cache.get_or_compute(&dataset, &hermes, || pipeline::run(&table, &map, &hermes));

        assert_ne!(everything, filtered);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn different_dataset_bytes_miss() {
        let map = StageMap::default();
        let table = raw_table();
        let selection = FilterSelection::default();
        let mut cache = RollupCache::with_default_capacity();

        cache.get_or_compute(&DatasetId::from_bytes(b"v1"), &selection, || {
            pipeline::run(&table, &map, &selection)
        });
        cache.get_or_compute(&DatasetId::from_bytes(b"v2"), &selection, || {
            pipeline::run(&table, &map, &selection)
        });

        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn default_cache_retains_entries() {
        let mut cache = RollupCache::default();
        let selection = FilterSelection::default();
        for i in 0..2u8 {
            cache.get_or_compute(&DatasetId::from_bytes(&[i]), &selection, RollupOutcome::default);
        }
        assert_eq!(cache.len(), 2);

        cache.get_or_compute(&DatasetId::from_bytes(&[0u8]), &selection, || {
            panic!("entry within capacity must not be evicted")
        });
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut cache = RollupCache::new(0);
        let selection = FilterSelection::default();
        let dataset = DatasetId::from_bytes(b"only");
        cache.get_or_compute(&dataset, &selection, RollupOutcome::default);
        cache.get_or_compute(&dataset, &selection, || {
            panic!("sole entry must hit, not evict itself")
        });
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn eviction_respects_capacity() {
        let mut cache = RollupCache::new(2);
        let selection = FilterSelection::default();
        for i in 0..3u8 {
            let dataset = DatasetId::from_bytes(&[i]);
            cache.get_or_compute(&dataset, &selection, RollupOutcome::default);
        }
        assert_eq!(cache.len(), 2);

        // Oldest entry was evicted, so it recomputes.
        let oldest = DatasetId::from_bytes(&[0u8]);
        cache.get_or_compute(&oldest, &selection, RollupOutcome::default);
        assert_eq!(cache.misses(), 4);
    }
}
