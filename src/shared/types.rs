use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pseudo language code asking the core to detect the source language.
pub const AUTO_DETECT: &str = "auto";

/// Longest source text accepted by the core, in characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Number of leading characters of the source text that go into cache keys.
pub const CACHE_KEY_PREFIX_CHARS: usize = 100;

pub fn is_auto(code: &str) -> bool {
    code.eq_ignore_ascii_case(AUTO_DETECT)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub source_text: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslationRequest {
    pub fn new(
        source_text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            source_text: source_text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }

    pub fn is_auto(&self) -> bool {
        is_auto(&self.source_lang)
    }
}

/// Where the text of a [`TranslationResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranslationSource {
    Cache,
    PrimaryBackend,
    SecondaryBackend,
    OfflineDictionary,
    SameLanguage,
}

impl TranslationSource {
    /// Source tag for the backend at `rank` in the priority list.
    /// Everything after the first backend counts as a secondary.
    pub fn for_rank(rank: usize) -> Self {
        if rank == 0 {
            TranslationSource::PrimaryBackend
        } else {
            TranslationSource::SecondaryBackend
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            TranslationSource::PrimaryBackend | TranslationSource::SecondaryBackend
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            TranslationSource::Cache => "Cache",
            TranslationSource::PrimaryBackend => "Primary Backend",
            TranslationSource::SecondaryBackend => "Secondary Backend",
            TranslationSource::OfflineDictionary => "Offline Dictionary",
            TranslationSource::SameLanguage => "Same Language",
        }
    }
}

impl fmt::Display for TranslationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub translated_text: String,
    pub detected_language: Option<String>,
    /// Concrete language the text was translated from. Unlike
    /// `detected_language` this is also set for the `en` detection fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_lang: Option<String>,
    pub source: TranslationSource,
    /// Name of the remote service that produced the text, when there was one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub served_from_cache: bool,
}

impl TranslationResult {
    pub fn same_language(text: &str, detected_language: Option<String>) -> Self {
        Self {
            translated_text: text.to_string(),
            detected_language,
            from_lang: None,
            source: TranslationSource::SameLanguage,
            provider: None,
            served_from_cache: false,
        }
    }

    pub fn offline(text: String, detected_language: Option<String>) -> Self {
        Self {
            translated_text: text,
            detected_language,
            from_lang: None,
            source: TranslationSource::OfflineDictionary,
            provider: None,
            served_from_cache: false,
        }
    }

    pub fn translated_from(mut self, code: impl Into<String>) -> Self {
        self.from_lang = Some(code.into());
        self
    }

    /// Copy of a stored snapshot as handed out on a cache hit.
    pub fn served_from_cache(mut self) -> Self {
        self.source = TranslationSource::Cache;
        self.served_from_cache = true;
        self
    }
}

/// Payload stored under a cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CachedValue {
    Translation(TranslationResult),
    Detection(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: String,
    pub value: CachedValue,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, value: CachedValue) -> Self {
        Self {
            key: key.into(),
            value,
            stored_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.stored_at) >= ttl
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub source_text: String,
    pub translated_text: String,
    pub from_lang: String,
    pub to_lang: String,
    pub source: TranslationSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_result(request: &TranslationRequest, result: &TranslationResult) -> Self {
        let from_lang = result
            .from_lang
            .clone()
            .or_else(|| result.detected_language.clone())
            .unwrap_or_else(|| request.source_lang.clone());

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_text: request.source_text.clone(),
            translated_text: result.translated_text.clone(),
            from_lang,
            to_lang: request.target_lang.clone(),
            source: result.source,
            provider: result.provider.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Human readable age of the entry relative to `now`.
    pub fn relative_age(&self, now: DateTime<Utc>) -> String {
        let elapsed = now.signed_duration_since(self.timestamp);

        if elapsed < Duration::minutes(1) {
            return "Just now".to_string();
        }
        if elapsed < Duration::hours(1) {
            let minutes = elapsed.num_minutes();
            return format!("{} minute{} ago", minutes, if minutes > 1 { "s" } else { "" });
        }
        if elapsed < Duration::days(1) {
            let hours = elapsed.num_hours();
            return format!("{} hour{} ago", hours, if hours > 1 { "s" } else { "" });
        }

        self.timestamp.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// First [`CACHE_KEY_PREFIX_CHARS`] characters of `text`.
pub fn text_prefix(text: &str) -> String {
    text.chars().take(CACHE_KEY_PREFIX_CHARS).collect()
}

pub fn translation_cache_key(source_lang: &str, target_lang: &str, text: &str) -> String {
    format!("translate:{}:{}:{}", source_lang, target_lang, text_prefix(text))
}

pub fn detection_cache_key(text: &str) -> String {
    format!("detect:{}", text_prefix(text))
}
