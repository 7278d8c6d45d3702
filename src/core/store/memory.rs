use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Duration;
use tracing::warn;

use crate::shared::error::AppResult;
use crate::shared::types::{CacheEntry, HistoryEntry};

use super::{sort_newest_first, Storage};

/// In-memory storage, used when the database cannot be opened and in tests.
pub struct InMemoryStorage {
    ttl: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
    history: Mutex<Vec<HistoryEntry>>,
}

impl InMemoryStorage {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cache: Mutex::new(HashMap::new()),
            history: Mutex::new(Vec::new()),
        }
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{} mutex poisoned, recovering", what);
            poisoned.into_inner()
        }
    }
}

impl Storage for InMemoryStorage {
    fn ttl(&self) -> Duration {
        self.ttl
    }

    fn get_entry(&self, key: &str) -> AppResult<Option<CacheEntry>> {
        Ok(lock(&self.cache, "cache").get(key).cloned())
    }

    fn put_entry(&self, entry: &CacheEntry) -> AppResult<()> {
        lock(&self.cache, "cache").insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    fn delete_cached(&self, key: &str) -> AppResult<bool> {
        Ok(lock(&self.cache, "cache").remove(key).is_some())
    }

    fn cache_entries(&self) -> AppResult<Vec<CacheEntry>> {
        Ok(lock(&self.cache, "cache").values().cloned().collect())
    }

    fn clear_cache(&self) -> AppResult<usize> {
        let mut cache = lock(&self.cache, "cache");
        let count = cache.len();
        cache.clear();
        Ok(count)
    }

    fn append_history(&self, entry: &HistoryEntry) -> AppResult<()> {
        lock(&self.history, "history").insert(0, entry.clone());
        Ok(())
    }

    fn list_history(&self, limit: usize) -> AppResult<Vec<HistoryEntry>> {
        let mut entries = lock(&self.history, "history").clone();
        sort_newest_first(&mut entries);
        entries.truncate(limit);
        Ok(entries)
    }

    fn get_history(&self, id: &str) -> AppResult<Option<HistoryEntry>> {
        Ok(lock(&self.history, "history").iter().find(|e| e.id == id).cloned())
    }

    fn delete_history(&self, id: &str) -> AppResult<bool> {
        let mut history = lock(&self.history, "history");
        let before = history.len();
        history.retain(|e| e.id != id);
        Ok(history.len() != before)
    }

    fn clear_history(&self) -> AppResult<usize> {
        let mut history = lock(&self.history, "history");
        let count = history.len();
        history.clear();
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::test_support;

    #[test]
    fn shared_storage_contract() {
        test_support::exercise(&InMemoryStorage::new(Duration::days(7)));
    }
}
