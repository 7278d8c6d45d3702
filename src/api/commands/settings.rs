//! Effective configuration, for `lingo-bridge settings`.

use serde::Serialize;

use super::CommandContext;
use crate::shared::settings::AppSettings;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsReport {
    pub path: Option<String>,
    pub settings: AppSettings,
}

/// Settings after environment overrides, with secrets masked.
pub fn show(ctx: &CommandContext) -> SettingsReport {
    let mut settings = ctx.settings.clone();
    if settings.backends.libre_api_key.is_some() {
        settings.backends.libre_api_key = Some("********".to_string());
    }

    SettingsReport {
        path: ctx.settings_path.as_ref().map(|p| p.display().to_string()),
        settings,
    }
}
