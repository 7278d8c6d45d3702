// LibreTranslate translate + detect endpoints

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::shared::error::{AppError, AppResult};
use crate::shared::types::is_auto;

use super::{success_body, BackendTranslation, Detection, LanguageDetector, TranslationBackend};

pub const NAME: &str = "LibreTranslate";

#[derive(Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Serialize)]
struct DetectBody<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: Option<String>,
    detected_language: Option<DetectedLanguage>,
}

#[derive(Deserialize)]
struct DetectedLanguage {
    language: Option<String>,
}

#[derive(Deserialize)]
struct DetectCandidate {
    language: String,
    #[serde(default)]
    confidence: f64,
}

pub struct LibreTranslateBackend {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl LibreTranslateBackend {
    pub fn new(client: Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
        }
    }
}

/// Parse a `/translate` response. With an `auto` source the service's own
/// detection is reported; otherwise the concrete source is echoed back.
pub fn parse_translate_response(body: &str, from: &str) -> AppResult<BackendTranslation> {
    let parsed: TranslateResponse = serde_json::from_str(body)
        .map_err(|e| AppError::backend(NAME, format!("JSON parse error: {}", e)))?;

    let translated_text = parsed
        .translated_text
        .ok_or_else(|| AppError::backend(NAME, "Missing translatedText"))?;

    let detected_language = if is_auto(from) {
        parsed.detected_language.and_then(|d| d.language)
    } else {
        Some(from.to_string())
    };

    Ok(BackendTranslation {
        translated_text,
        detected_language,
    })
}

#[async_trait]
impl TranslationBackend for LibreTranslateBackend {
    fn name(&self) -> &str {
        NAME
    }

    async fn translate(&self, text: &str, from: &str, to: &str) -> AppResult<BackendTranslation> {
        let body = TranslateBody {
            q: text,
            source: from,
            target: to,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        debug!(url = %self.url, from, to, "POST translate");
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::backend(NAME, format!("Request failed: {}", e)))?;

        let body = success_body(NAME, response).await?;
        parse_translate_response(&body, from)
    }
}

pub struct LibreDetector {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl LibreDetector {
    pub fn new(client: Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
        }
    }
}

pub fn parse_detect_response(body: &str) -> AppResult<Vec<Detection>> {
    let candidates: Vec<DetectCandidate> = serde_json::from_str(body)
        .map_err(|e| AppError::Detection(format!("JSON parse error: {}", e)))?;

    Ok(candidates
        .into_iter()
        .map(|c| Detection {
            language: c.language,
            confidence: c.confidence,
        })
        .collect())
}

#[async_trait]
impl LanguageDetector for LibreDetector {
    async fn detect(&self, text: &str) -> AppResult<Vec<Detection>> {
        let body = DetectBody {
            q: text,
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Detection(format!("Request failed: {}", e)))?;

        let body = success_body(NAME, response)
            .await
            .map_err(|e| AppError::Detection(e.to_string()))?;
        parse_detect_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_translation_with_detection() {
        let body = r#"{"translatedText":"hola","detectedLanguage":{"confidence":90.0,"language":"en"}}"#;
        let parsed = parse_translate_response(body, "auto").unwrap();
        assert_eq!(parsed.translated_text, "hola");
        assert_eq!(parsed.detected_language.as_deref(), Some("en"));
    }

    #[test]
    fn concrete_source_is_echoed() {
        let body = r#"{"translatedText":"bonjour","detectedLanguage":{"language":"de"}}"#;
        let parsed = parse_translate_response(body, "en").unwrap();
        assert_eq!(parsed.detected_language.as_deref(), Some("en"));
    }

    #[test]
    fn missing_text_is_a_backend_error() {
        let err = parse_translate_response(r#"{"error":"Invalid request"}"#, "en").unwrap_err();
        assert!(matches!(err, AppError::Backend { ref backend, .. } if backend == NAME));

        assert!(parse_translate_response("<html>", "en").is_err());
    }

    #[test]
    fn request_body_omits_missing_api_key() {
        let body = TranslateBody {
            q: "hello",
            source: "en",
            target: "es",
            format: "text",
            api_key: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"q": "hello", "source": "en", "target": "es", "format": "text"})
        );
    }

    #[test]
    fn parses_detect_candidates() {
        let parsed = parse_detect_response(r#"[{"confidence":87.5,"language":"fr"},{"language":"it"}]"#).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].language, "fr");
        assert_eq!(parsed[0].confidence, 87.5);
        assert_eq!(parsed[1].confidence, 0.0);

        assert!(parse_detect_response("[]").unwrap().is_empty());
        assert!(matches!(parse_detect_response("{}"), Err(AppError::Detection(_))));
    }
}
