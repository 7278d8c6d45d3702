use serde::Serialize;

use super::CommandContext;
use crate::core::catalog;
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{TranslationRequest, TranslationResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectReport {
    pub language: String,
    pub name: String,
    pub detected: bool,
}

/// Translate `text`, filling unset languages from the user's preferences.
pub async fn translate(
    ctx: &CommandContext,
    text: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> AppResult<TranslationResult> {
    let preferences = &ctx.settings.preferences;
    let request = TranslationRequest::new(
        text,
        from.unwrap_or(&preferences.default_source_lang),
        to.unwrap_or(&preferences.default_target_lang),
    );
    ctx.translator.resolve(&request).await
}

pub async fn detect(ctx: &CommandContext, text: &str) -> AppResult<DetectReport> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("Please enter text to detect".to_string()));
    }

    let detected = ctx.translator.detect(text).await;
    Ok(DetectReport {
        name: catalog::name_for(&detected.language),
        language: detected.language,
        detected: detected.detected,
    })
}

/// Dictionary lookup only, no network.
pub fn offline(ctx: &CommandContext, text: &str, from: &str, to: &str) -> Option<String> {
    ctx.translator.offline().lookup(text, from, to)
}
