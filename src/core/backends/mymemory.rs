// MyMemory GET endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::shared::error::{AppError, AppResult};
use crate::shared::types::is_auto;

use super::{success_body, BackendTranslation, TranslationBackend};

pub const NAME: &str = "MyMemory";

/// MyMemory cannot detect; an `auto` source is sent as English.
const AUTO_FALLBACK_SOURCE: &str = "en";

pub struct MyMemoryBackend {
    client: Client,
    url: String,
    email: Option<String>,
}

impl MyMemoryBackend {
    pub fn new(client: Client, url: impl Into<String>, email: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            email,
        }
    }

    fn request_url(&self, text: &str, from: &str, to: &str) -> String {
        let mut url = format!(
            "{}?q={}&langpair={}",
            self.url,
            urlencoding::encode(text),
            urlencoding::encode(&lang_pair(from, to))
        );
        if let Some(email) = &self.email {
            url.push_str(&format!("&de={}", urlencoding::encode(email)));
        }
        url
    }
}

pub fn lang_pair(from: &str, to: &str) -> String {
    let from = if is_auto(from) { AUTO_FALLBACK_SOURCE } else { from };
    format!("{}|{}", from, to)
}

/// The service answers HTTP 200 even for failures; the verdict is in
/// `responseStatus`, which some deployments send as a string.
pub fn parse_response(body: &str) -> AppResult<String> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| AppError::backend(NAME, format!("JSON parse error: {}", e)))?;

    let status = match json.get("responseStatus") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };

    if status != Some(200) {
        let details = json
            .get("responseDetails")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(AppError::backend(
            NAME,
            format!("responseStatus {:?}: {}", status, details),
        ));
    }

    let translated = json
        .get("responseData")
        .and_then(|d| d.get("translatedText"))
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::backend(NAME, "Missing responseData.translatedText"))?;

    if translated.trim().is_empty() {
        return Err(AppError::backend(NAME, "Empty translation"));
    }

    Ok(translated.to_string())
}

#[async_trait]
impl TranslationBackend for MyMemoryBackend {
    fn name(&self) -> &str {
        NAME
    }

    async fn translate(&self, text: &str, from: &str, to: &str) -> AppResult<BackendTranslation> {
        let url = self.request_url(text, from, to);
        debug!(from, to, "GET mymemory");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::backend(NAME, format!("Request failed: {}", e)))?;

        let body = success_body(NAME, response).await?;
        let translated_text = parse_response(&body)?;

        Ok(BackendTranslation {
            translated_text,
            detected_language: Some(from.to_string()).filter(|f| !is_auto(f)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_source_becomes_english() {
        assert_eq!(lang_pair("auto", "fr"), "en|fr");
        assert_eq!(lang_pair("de", "fr"), "de|fr");
    }

    #[test]
    fn url_is_encoded_and_carries_contact() {
        let backend = MyMemoryBackend::new(
            Client::new(),
            "https://api.mymemory.translated.net/get",
            Some("me@example.com".to_string()),
        );
        assert_eq!(
            backend.request_url("good night", "en", "es"),
            "https://api.mymemory.translated.net/get?q=good%20night&langpair=en%7Ces&de=me%40example.com"
        );
    }

    #[test]
    fn accepts_numeric_and_string_status() {
        let numeric = r#"{"responseStatus":200,"responseData":{"translatedText":"hola"}}"#;
        let string = r#"{"responseStatus":"200","responseData":{"translatedText":"hola"}}"#;
        assert_eq!(parse_response(numeric).unwrap(), "hola");
        assert_eq!(parse_response(string).unwrap(), "hola");
    }

    #[test]
    fn non_200_status_is_a_failure() {
        let body = r#"{"responseStatus":403,"responseDetails":"'XX' IS AN INVALID TARGET LANGUAGE","responseData":{"translatedText":"'XX' IS AN INVALID TARGET LANGUAGE"}}"#;
        let err = parse_response(body).unwrap_err();
        assert!(err.to_string().contains("INVALID TARGET LANGUAGE"));

        assert!(parse_response(r#"{"responseData":{"translatedText":"hola"}}"#).is_err());
        assert!(parse_response(r#"{"responseStatus":200,"responseData":{"translatedText":"  "}}"#).is_err());
        assert!(parse_response("not json").is_err());
    }
}
