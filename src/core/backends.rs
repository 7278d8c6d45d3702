//! Remote translation backends
//!
//! Every remote service implements [`TranslationBackend`]; the orchestrator
//! walks an ordered list of them. Language detection is a separate
//! capability ([`LanguageDetector`]) because not every service offers it.

pub mod libre;
pub mod mymemory;

use async_trait::async_trait;
use reqwest::Response;

use crate::shared::error::{AppError, AppResult};

pub use libre::{LibreDetector, LibreTranslateBackend};
pub use mymemory::MyMemoryBackend;

/// Text returned by a backend, plus the source language it reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTranslation {
    pub translated_text: String,
    pub detected_language: Option<String>,
}

#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Display name, also recorded as the result's provider.
    fn name(&self) -> &str;

    async fn translate(&self, text: &str, from: &str, to: &str) -> AppResult<BackendTranslation>;

    /// Reachability check used by the status report.
    async fn probe(&self) -> bool {
        self.translate("test", "en", "es").await.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub language: String,
    pub confidence: f64,
}

#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Candidates, best first. An empty list means "no idea".
    async fn detect(&self, text: &str) -> AppResult<Vec<Detection>>;
}

/// Body of a successful response; non-2xx statuses become backend errors.
pub(crate) async fn success_body(backend: &str, response: Response) -> AppResult<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::backend(backend, format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        let snippet: String = body.chars().take(200).collect();
        return Err(AppError::backend(
            backend,
            format!("HTTP {}: {}", status.as_u16(), snippet),
        ));
    }

    Ok(body)
}
