//! Translation orchestrator
//!
//! Resolution order for one request:
//!
//! 1. validation
//! 2. same-language short-circuit
//! 3. cache, keyed on the languages as given
//! 4. detection, when the source is `auto` (then the short-circuit again)
//! 5. remote backends, strictly in list order, no retries
//! 6. offline dictionary
//!
//! Only validation errors and [`AppError::AllBackendsFailed`] leave this
//! module. Every success is handed to the [`HistoryCoordinator`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::core::backends::{LanguageDetector, TranslationBackend};
use crate::core::catalog;
use crate::core::coordinator::HistoryCoordinator;
use crate::core::detection::{DetectedSource, DetectionService};
use crate::core::offline::OfflineDictionary;
use crate::core::store::Storage;
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{
    is_auto, translation_cache_key, TranslationRequest, TranslationResult, TranslationSource,
    AUTO_DETECT, MAX_TEXT_CHARS,
};

pub struct Translator {
    backends: Vec<Arc<dyn TranslationBackend>>,
    detection: DetectionService,
    coordinator: HistoryCoordinator,
    offline: Arc<OfflineDictionary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendHealth {
    pub name: String,
    pub source: TranslationSource,
    pub reachable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendStatus {
    pub backends: Vec<BackendHealth>,
    pub offline_available: bool,
    pub offline_languages: Vec<String>,
}

impl BackendStatus {
    pub fn any_remote_reachable(&self) -> bool {
        self.backends.iter().any(|b| b.reachable)
    }
}

impl Translator {
    /// `backends` is the priority order: the first is the primary, every
    /// later one is a secondary.
    pub fn new(
        backends: Vec<Arc<dyn TranslationBackend>>,
        detector: Option<Arc<dyn LanguageDetector>>,
        store: Arc<dyn Storage>,
    ) -> Self {
        Self {
            backends,
            detection: DetectionService::new(detector, store.clone()),
            coordinator: HistoryCoordinator::new(store),
            offline: Arc::new(OfflineDictionary::builtin().clone()),
        }
    }

    pub fn with_offline(mut self, offline: OfflineDictionary) -> Self {
        self.offline = Arc::new(offline);
        self
    }

    pub fn coordinator(&self) -> &HistoryCoordinator {
        &self.coordinator
    }

    pub fn offline(&self) -> &OfflineDictionary {
        &self.offline
    }

    /// Detection step on its own, with the same caching and fallback.
    pub async fn detect(&self, text: &str) -> DetectedSource {
        self.detection.detect(text).await
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    #[instrument(
        skip(self, request),
        fields(from = %request.source_lang, to = %request.target_lang, chars = request.source_text.chars().count())
    )]
    pub async fn resolve(&self, request: &TranslationRequest) -> AppResult<TranslationResult> {
        let request = validate(request)?;
        let result = self.resolve_validated(&request).await?;

        info!(
            source = %result.source,
            provider = result.provider.as_deref().unwrap_or("-"),
            "Translation resolved"
        );
        self.coordinator.record_success(&request, &result);
        Ok(result)
    }

    async fn resolve_validated(&self, request: &TranslationRequest) -> AppResult<TranslationResult> {
        let text = request.source_text.as_str();
        let target = request.target_lang.as_str();

        if !request.is_auto() && request.source_lang == target {
            return Ok(TranslationResult::same_language(text, None).translated_from(target));
        }

        let key = translation_cache_key(&request.source_lang, target, text);
        if let Some(snapshot) = self.coordinator.cached_translation(&key) {
            debug!(key = %key, "Cache hit");
            return Ok(snapshot.served_from_cache());
        }
        debug!(key = %key, "Cache miss");

        let (source, detected_language) = if request.is_auto() {
            let detected = self.detection.detect(text).await;
            let reported = detected.detected.then(|| detected.language.clone());
            if detected.language == target {
                return Ok(TranslationResult::same_language(text, reported).translated_from(target));
            }
            (detected.language, reported)
        } else {
            (request.source_lang.clone(), None)
        };

        for (rank, backend) in self.backends.iter().enumerate() {
            match backend.translate(text, &source, target).await {
                Ok(translation) if !translation.translated_text.trim().is_empty() => {
                    // Trust the backend's own report of the language it used
                    let from_lang = translation
                        .detected_language
                        .as_deref()
                        .and_then(catalog::normalize_code)
                        .unwrap_or(source.as_str())
                        .to_string();
                    return Ok(TranslationResult {
                        translated_text: translation.translated_text,
                        detected_language,
                        from_lang: Some(from_lang),
                        source: TranslationSource::for_rank(rank),
                        provider: Some(backend.name().to_string()),
                        served_from_cache: false,
                    });
                }
                Ok(_) => warn!(backend = backend.name(), "Backend returned an empty translation"),
                Err(e) => warn!(backend = backend.name(), "Backend failed, falling through: {}", e),
            }
        }

        // Detection always yields a concrete code; a literal `auto` here
        // would mean no usable source, and the dictionaries need one.
        if is_auto(&source) {
            warn!("Source language undetermined, skipping offline dictionary");
        } else if let Some(translated) = self.offline.lookup(text, &source, target) {
            return Ok(TranslationResult::offline(translated, detected_language).translated_from(source));
        }

        error!(from = %source, to = target, "All translation methods failed");
        Err(AppError::AllBackendsFailed {
            from: source,
            to: target.to_string(),
        })
    }

    /// Probe every backend with a tiny request, in priority order.
    pub async fn backend_status(&self) -> BackendStatus {
        let mut backends = Vec::with_capacity(self.backends.len());
        for (rank, backend) in self.backends.iter().enumerate() {
            let reachable = backend.probe().await;
            debug!(backend = backend.name(), reachable, "Probed backend");
            backends.push(BackendHealth {
                name: backend.name().to_string(),
                source: TranslationSource::for_rank(rank),
                reachable,
            });
        }

        let offline_languages = self.offline.offline_languages();
        BackendStatus {
            backends,
            offline_available: !offline_languages.is_empty(),
            offline_languages,
        }
    }
}

/// Normalized copy of `request`, or the reason it cannot be translated.
pub fn validate(request: &TranslationRequest) -> AppResult<TranslationRequest> {
    if request.source_text.trim().is_empty() {
        return Err(AppError::Validation("Please enter text to translate".to_string()));
    }

    let chars = request.source_text.chars().count();
    if chars > MAX_TEXT_CHARS {
        return Err(AppError::Validation(format!(
            "Text is too long ({} characters, maximum {})",
            chars, MAX_TEXT_CHARS
        )));
    }

    let target = request.target_lang.trim().to_ascii_lowercase();
    if target.is_empty() {
        return Err(AppError::Validation("Please select a target language".to_string()));
    }
    if !catalog::is_target_code(&target) {
        return Err(AppError::Validation(format!(
            "Unsupported target language: {}",
            request.target_lang
        )));
    }

    let source = match request.source_lang.trim().to_ascii_lowercase() {
        s if s.is_empty() || is_auto(&s) => AUTO_DETECT.to_string(),
        s if catalog::is_target_code(&s) => s,
        _ => {
            return Err(AppError::Validation(format!(
                "Unsupported source language: {}",
                request.source_lang
            )))
        }
    };

    Ok(TranslationRequest {
        source_text: request.source_text.clone(),
        source_lang: source,
        target_lang: target,
    })
}
