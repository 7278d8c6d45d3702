//! Persistent store
//!
//! Two logical collections: an expiring key-value cache and an append-only
//! translation history. Implementations only provide raw access; the TTL
//! policy lives in the provided methods of [`Storage`] so every backend
//! enforces it the same way.

pub mod memory;
pub mod persistent;

use chrono::{Duration, Utc};
use tracing::debug;

use crate::shared::error::AppResult;
use crate::shared::types::{CacheEntry, CachedValue, HistoryEntry};

pub use memory::InMemoryStorage;
pub use persistent::RedbStorage;

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "lingo_bridge.redb";

pub trait Storage: Send + Sync {
    /// Retention window of cache entries.
    fn ttl(&self) -> Duration;

    /// Raw cache read, ignoring expiry.
    fn get_entry(&self, key: &str) -> AppResult<Option<CacheEntry>>;
    /// Insert or overwrite; last write wins.
    fn put_entry(&self, entry: &CacheEntry) -> AppResult<()>;
    fn delete_cached(&self, key: &str) -> AppResult<bool>;
    fn cache_entries(&self) -> AppResult<Vec<CacheEntry>>;
    fn clear_cache(&self) -> AppResult<usize>;

    fn append_history(&self, entry: &HistoryEntry) -> AppResult<()>;
    /// Newest first, at most `limit` entries.
    fn list_history(&self, limit: usize) -> AppResult<Vec<HistoryEntry>>;
    fn get_history(&self, id: &str) -> AppResult<Option<HistoryEntry>>;
    fn delete_history(&self, id: &str) -> AppResult<bool>;
    fn clear_history(&self) -> AppResult<usize>;

    /// Cache read with the TTL applied. Expired entries are deleted and
    /// reported as absent.
    fn get_cached(&self, key: &str) -> AppResult<Option<CachedValue>> {
        let Some(entry) = self.get_entry(key)? else {
            return Ok(None);
        };

        if entry.is_expired(Utc::now(), self.ttl()) {
            debug!(key, "Dropping expired cache entry");
            self.delete_cached(key)?;
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    fn put_cached(&self, key: &str, value: CachedValue) -> AppResult<()> {
        self.put_entry(&CacheEntry::new(key, value))
    }

    /// Sweep the whole cache, returning how many entries were removed.
    fn purge_expired(&self) -> AppResult<usize> {
        let now = Utc::now();
        let ttl = self.ttl();
        let mut removed = 0;
        for entry in self.cache_entries()? {
            if entry.is_expired(now, ttl) && self.delete_cached(&entry.key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn cache_len(&self) -> AppResult<usize> {
        Ok(self.cache_entries()?.len())
    }
}

/// Newest first. Ties keep their existing relative order.
fn sort_newest_first(entries: &mut [HistoryEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::shared::types::{TranslationResult, TranslationSource};
    use chrono::DateTime;

    pub fn snapshot(text: &str) -> CachedValue {
        CachedValue::Translation(TranslationResult {
            translated_text: text.to_string(),
            detected_language: None,
            from_lang: Some("en".to_string()),
            source: TranslationSource::PrimaryBackend,
            provider: Some("LibreTranslate".to_string()),
            served_from_cache: false,
        })
    }

    pub fn history(id: &str, timestamp: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            source_text: format!("text {}", id),
            translated_text: format!("texto {}", id),
            from_lang: "en".to_string(),
            to_lang: "es".to_string(),
            source: TranslationSource::PrimaryBackend,
            provider: None,
            timestamp,
        }
    }

    /// Behaviour every storage backend must share.
    pub fn exercise(storage: &dyn Storage) {
        let now = Utc::now();

        // Cache roundtrip and overwrite
        storage.put_cached("translate:en:es:hello", snapshot("hola")).unwrap();
        storage.put_cached("translate:en:es:hello", snapshot("¡hola!")).unwrap();
        assert_eq!(
            storage.get_cached("translate:en:es:hello").unwrap(),
            Some(snapshot("¡hola!"))
        );
        assert_eq!(storage.get_cached("translate:en:es:missing").unwrap(), None);

        // Expired entries read as absent and are removed
        let mut stale = CacheEntry::new("detect:bonjour", CachedValue::Detection("fr".into()));
        stale.stored_at = now - storage.ttl() - Duration::minutes(1);
        storage.put_entry(&stale).unwrap();
        assert!(storage.get_entry("detect:bonjour").unwrap().is_some());
        assert_eq!(storage.get_cached("detect:bonjour").unwrap(), None);
        assert!(storage.get_entry("detect:bonjour").unwrap().is_none());

        // Sweep
        let mut stale = CacheEntry::new("detect:hallo", CachedValue::Detection("de".into()));
        stale.stored_at = now - storage.ttl();
        storage.put_entry(&stale).unwrap();
        assert_eq!(storage.cache_len().unwrap(), 2);
        assert_eq!(storage.purge_expired().unwrap(), 1);
        assert_eq!(storage.cache_len().unwrap(), 1);

        assert!(storage.delete_cached("translate:en:es:hello").unwrap());
        assert!(!storage.delete_cached("translate:en:es:hello").unwrap());

        storage.put_cached("a", snapshot("a")).unwrap();
        storage.put_cached("b", snapshot("b")).unwrap();
        assert_eq!(storage.clear_cache().unwrap(), 2);
        assert_eq!(storage.cache_len().unwrap(), 0);

        // History ordering and limits
        storage.append_history(&history("old", now - Duration::hours(2))).unwrap();
        storage.append_history(&history("new", now)).unwrap();
        storage.append_history(&history("mid", now - Duration::hours(1))).unwrap();

        let ids: Vec<_> = storage
            .list_history(10)
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
        assert_eq!(storage.list_history(2).unwrap().len(), 2);

        assert_eq!(storage.get_history("mid").unwrap().map(|e| e.id).as_deref(), Some("mid"));
        assert!(storage.delete_history("mid").unwrap());
        assert!(!storage.delete_history("mid").unwrap());
        assert_eq!(storage.get_history("mid").unwrap(), None);

        assert_eq!(storage.clear_history().unwrap(), 2);
        assert!(storage.list_history(10).unwrap().is_empty());
    }
}
