use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::domain::criteria::SearchCriteria;
use crate::domain::table::ResultTable;
use crate::ports::result_store::{ResultStore, StoredRow, StoredSearch};

const DEFAULT_MAX_SEARCHES: NonZeroUsize = NonZeroUsize::new(20).unwrap();

struct HistoryEntry {
    search: StoredSearch,
    stored_at: Instant,
}

/// Keeps the latest search plus a bounded history of earlier ones, keyed by
/// criteria.
pub struct MemoryResultStore {
    latest: RwLock<Option<StoredSearch>>,
    history: RwLock<LruCache<String, HistoryEntry>>,
}

impl MemoryResultStore {
    pub fn new(max_searches: usize) -> Self {
        let cap = NonZeroUsize::new(max_searches).unwrap_or_else(|| {
            tracing::warn!("Store max_searches was 0, defaulting to {DEFAULT_MAX_SEARCHES}");
            DEFAULT_MAX_SEARCHES
        });
        Self {
            latest: RwLock::new(None),
            history: RwLock::new(LruCache::new(cap)),
        }
    }
}

impl ResultStore for MemoryResultStore {
    fn replace_latest(&self, criteria: &SearchCriteria, table: &ResultTable) -> StoredSearch {
        let rows = table
            .records
            .iter()
            .zip(1_u64..)
            .map(|(record, id)| StoredRow {
                id,
                record: record.clone(),
            })
            .collect();
        let search = StoredSearch {
            criteria: criteria.clone(),
            rows,
        };

        self.set_latest(search.clone());
        if let Ok(mut history) = self.history.write() {
            history.put(
                criteria.cache_key(),
                HistoryEntry {
                    search: search.clone(),
                    stored_at: Instant::now(),
                },
            );
        } else {
            tracing::error!("Store history lock poisoned, skipping write");
        }

        tracing::debug!(rows = search.rows.len(), "Replaced latest stored search");
        search
    }

    fn set_latest(&self, search: StoredSearch) {
        match self.latest.write() {
            Ok(mut latest) => *latest = Some(search),
            Err(_) => tracing::error!("Store lock poisoned, latest search not replaced"),
        }
    }

    fn latest(&self) -> Option<StoredSearch> {
        self.latest.read().ok()?.clone()
    }

    fn recent(&self, criteria: &SearchCriteria, max_age: Duration) -> Option<StoredSearch> {
        let key = criteria.cache_key();
        let mut history = self.history.write().ok()?;
        let entry = history.get(&key)?;
        if entry.stored_at.elapsed() <= max_age {
            return Some(entry.search.clone());
        }
        history.pop(&key);
        None
    }
}
