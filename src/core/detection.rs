//! Source language detection step.
//!
//! Never fails: cache trouble, detector errors and unusable answers all end
//! in [`DEFAULT_LANGUAGE`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::backends::LanguageDetector;
use crate::core::catalog;
use crate::core::store::Storage;
use crate::shared::types::{detection_cache_key, CachedValue};

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedSource {
    /// Concrete catalog code, never `auto`.
    pub language: String,
    /// False when `language` is the fallback rather than a real answer.
    pub detected: bool,
}

impl DetectedSource {
    fn fallback() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            detected: false,
        }
    }

    fn found(language: &str) -> Self {
        Self {
            language: language.to_string(),
            detected: true,
        }
    }
}

pub struct DetectionService {
    detector: Option<Arc<dyn LanguageDetector>>,
    store: Arc<dyn Storage>,
}

impl DetectionService {
    pub fn new(detector: Option<Arc<dyn LanguageDetector>>, store: Arc<dyn Storage>) -> Self {
        Self { detector, store }
    }

    pub async fn detect(&self, text: &str) -> DetectedSource {
        let key = detection_cache_key(text);

        match self.store.get_cached(&key) {
            Ok(Some(CachedValue::Detection(code))) => {
                if let Some(code) = catalog::normalize_code(&code) {
                    debug!(language = code, "Detection cache hit");
                    return DetectedSource::found(code);
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Detection cache read failed: {}", e),
        }

        let Some(detector) = &self.detector else {
            debug!("No detector configured, assuming {}", DEFAULT_LANGUAGE);
            return DetectedSource::fallback();
        };

        let candidates = match detector.detect(text).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Language detection failed, assuming {}: {}", DEFAULT_LANGUAGE, e);
                return DetectedSource::fallback();
            }
        };

        let Some(best) = candidates.first() else {
            debug!("Detector returned no candidates, assuming {}", DEFAULT_LANGUAGE);
            return DetectedSource::fallback();
        };

        let Some(code) = catalog::normalize_code(&best.language) else {
            warn!(language = %best.language, "Detected language is not in the catalog");
            return DetectedSource::fallback();
        };

        if let Err(e) = self
            .store
            .put_cached(&key, CachedValue::Detection(code.to_string()))
        {
            warn!("Failed to cache detected language: {}", e);
        }

        debug!(language = code, confidence = best.confidence, "Detected source language");
        DetectedSource::found(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backends::Detection;
    use crate::core::store::InMemoryStorage;
    use crate::shared::error::{AppError, AppResult};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        answer: AppResult<Vec<Detection>>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(answer: AppResult<Vec<Detection>>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LanguageDetector for Fixed {
        async fn detect(&self, _text: &str) -> AppResult<Vec<Detection>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    fn candidate(language: &str) -> Detection {
        Detection {
            language: language.to_string(),
            confidence: 90.0,
        }
    }

    fn store() -> Arc<dyn Storage> {
        Arc::new(InMemoryStorage::new(Duration::days(7)))
    }

    #[tokio::test]
    async fn detects_and_caches() {
        let store = store();
        let detector = Fixed::new(Ok(vec![candidate("fr-FR"), candidate("it")]));
        let service = DetectionService::new(Some(detector.clone() as Arc<dyn LanguageDetector>), store.clone());

        assert_eq!(service.detect("bonjour").await, DetectedSource::found("fr"));
        assert_eq!(service.detect("bonjour").await, DetectedSource::found("fr"));
        assert_eq!(detector.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.get_cached("detect:bonjour").unwrap(),
            Some(CachedValue::Detection("fr".into()))
        );
    }

    #[tokio::test]
    async fn failures_default_to_english_without_caching() {
        let store = store();
        let cases = vec![
            Fixed::new(Err(AppError::Detection("timeout".into()))),
            Fixed::new(Ok(vec![])),
            Fixed::new(Ok(vec![candidate("tlh")])),
        ];

        for detector in cases {
            let service = DetectionService::new(Some(detector as Arc<dyn LanguageDetector>), store.clone());
            let outcome = service.detect("qapla").await;
            assert_eq!(outcome.language, "en");
            assert!(!outcome.detected);
        }
        assert_eq!(store.cache_len().unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_detector_defaults_to_english() {
        let service = DetectionService::new(None, store());
        assert_eq!(service.detect("hola").await, DetectedSource::fallback());
    }
}
