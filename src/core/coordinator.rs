//! History/cache coordinator
//!
//! Turns orchestrator outcomes into persistence calls. Recording is
//! best-effort: failures are logged and swallowed.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::store::Storage;
use crate::shared::error::AppResult;
use crate::shared::types::{
    translation_cache_key, CachedValue, HistoryEntry, TranslationRequest, TranslationResult,
};

#[derive(Clone)]
pub struct HistoryCoordinator {
    store: Arc<dyn Storage>,
}

impl HistoryCoordinator {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Storage> {
        &self.store
    }

    /// Cached translation snapshot for `key`; read errors count as a miss.
    pub fn cached_translation(&self, key: &str) -> Option<TranslationResult> {
        match self.store.get_cached(key) {
            Ok(Some(CachedValue::Translation(snapshot))) => Some(snapshot),
            Ok(Some(CachedValue::Detection(_))) => {
                warn!(key, "Unexpected detection entry under a translation key");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed, treating as miss: {}", e);
                None
            }
        }
    }

    /// Cache remote results, then log every success to history.
    ///
    /// The cache write finishes (or fails) before the history write starts.
    pub fn record_success(&self, request: &TranslationRequest, result: &TranslationResult) {
        if result.source.is_remote() {
            let key = translation_cache_key(
                &request.source_lang,
                &request.target_lang,
                &request.source_text,
            );
            match self.store.put_cached(&key, CachedValue::Translation(result.clone())) {
                Ok(()) => debug!(key = %key, "Cached translation"),
                Err(e) => warn!("Failed to cache translation: {}", e),
            }
        }

        let entry = HistoryEntry::from_result(request, result);
        match self.store.append_history(&entry) {
            Ok(()) => debug!(id = %entry.id, "Saved history entry"),
            Err(e) => warn!("Failed to save history entry: {}", e),
        }
    }

    pub fn history(&self, limit: usize) -> AppResult<Vec<HistoryEntry>> {
        self.store.list_history(limit)
    }

    pub fn history_entry(&self, id: &str) -> AppResult<Option<HistoryEntry>> {
        self.store.get_history(id)
    }

    pub fn delete_history(&self, id: &str) -> AppResult<bool> {
        self.store.delete_history(id)
    }

    pub fn clear_history(&self) -> AppResult<usize> {
        self.store.clear_history()
    }

    pub fn clear_cache(&self) -> AppResult<usize> {
        self.store.clear_cache()
    }

    pub fn purge_expired(&self) -> AppResult<usize> {
        self.store.purge_expired()
    }

    pub fn cache_len(&self) -> AppResult<usize> {
        self.store.cache_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::InMemoryStorage;
    use crate::shared::error::AppError;
    use crate::shared::types::{CacheEntry, TranslationSource};
    use chrono::Duration;

    /// Storage whose every write fails.
    struct Broken;

    impl Storage for Broken {
        fn ttl(&self) -> Duration {
            Duration::days(7)
        }
        fn get_entry(&self, _key: &str) -> AppResult<Option<CacheEntry>> {
            Err(AppError::Persistence("disk on fire".into()))
        }
        fn put_entry(&self, _entry: &CacheEntry) -> AppResult<()> {
            Err(AppError::Persistence("disk on fire".into()))
        }
        fn delete_cached(&self, _key: &str) -> AppResult<bool> {
            Err(AppError::Persistence("disk on fire".into()))
        }
        fn cache_entries(&self) -> AppResult<Vec<CacheEntry>> {
            Err(AppError::Persistence("disk on fire".into()))
        }
        fn clear_cache(&self) -> AppResult<usize> {
            Err(AppError::Persistence("disk on fire".into()))
        }
        fn append_history(&self, _entry: &HistoryEntry) -> AppResult<()> {
            Err(AppError::Persistence("disk on fire".into()))
        }
        fn list_history(&self, _limit: usize) -> AppResult<Vec<HistoryEntry>> {
            Err(AppError::Persistence("disk on fire".into()))
        }
        fn get_history(&self, _id: &str) -> AppResult<Option<HistoryEntry>> {
            Err(AppError::Persistence("disk on fire".into()))
        }
        fn delete_history(&self, _id: &str) -> AppResult<bool> {
            Err(AppError::Persistence("disk on fire".into()))
        }
        fn clear_history(&self) -> AppResult<usize> {
            Err(AppError::Persistence("disk on fire".into()))
        }
    }

    fn result(source: TranslationSource) -> TranslationResult {
        TranslationResult {
            translated_text: "hola".into(),
            detected_language: None,
            from_lang: Some("en".into()),
            source,
            provider: None,
            served_from_cache: false,
        }
    }

    #[test]
    fn caches_only_remote_results() {
        let coordinator = HistoryCoordinator::new(Arc::new(InMemoryStorage::new(Duration::days(7))));
        let request = TranslationRequest::new("hello", "en", "es");

        coordinator.record_success(&request, &result(TranslationSource::OfflineDictionary));
        assert_eq!(coordinator.cache_len().unwrap(), 0);

        coordinator.record_success(&request, &result(TranslationSource::SecondaryBackend));
        let cached = coordinator.cached_translation("translate:en:es:hello").unwrap();
        assert_eq!(cached.source, TranslationSource::SecondaryBackend);

        // Both successes were logged
        assert_eq!(coordinator.history(10).unwrap().len(), 2);
    }

    #[test]
    fn broken_store_is_swallowed() {
        let coordinator = HistoryCoordinator::new(Arc::new(Broken));
        let request = TranslationRequest::new("hello", "en", "es");

        coordinator.record_success(&request, &result(TranslationSource::PrimaryBackend));
        assert_eq!(coordinator.cached_translation("translate:en:es:hello"), None);
        assert!(coordinator.history(10).is_err());
    }
}
