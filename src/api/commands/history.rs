use chrono::Utc;
use serde::Serialize;

use super::CommandContext;
use crate::core::catalog;
use crate::shared::error::AppResult;
use crate::shared::types::HistoryEntry;

/// History entry plus the strings a list view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    #[serde(flatten)]
    pub entry: HistoryEntry,
    pub age: String,
    pub from_name: String,
    pub to_name: String,
}

impl HistoryRow {
    fn from_entry(entry: HistoryEntry) -> Self {
        let now = Utc::now();
        Self {
            age: entry.relative_age(now),
            from_name: catalog::name_for(&entry.from_lang),
            to_name: catalog::name_for(&entry.to_lang),
            entry,
        }
    }
}

/// Newest first; `limit` defaults to the configured page size.
pub fn list(ctx: &CommandContext, limit: Option<usize>) -> AppResult<Vec<HistoryRow>> {
    let limit = limit.unwrap_or(ctx.settings.storage.history_limit);
    Ok(ctx
        .translator
        .coordinator()
        .history(limit)?
        .into_iter()
        .map(HistoryRow::from_entry)
        .collect())
}

pub fn show(ctx: &CommandContext, id: &str) -> AppResult<Option<HistoryRow>> {
    Ok(ctx
        .translator
        .coordinator()
        .history_entry(id)?
        .map(HistoryRow::from_entry))
}

pub fn delete(ctx: &CommandContext, id: &str) -> AppResult<bool> {
    ctx.translator.coordinator().delete_history(id)
}

pub fn clear(ctx: &CommandContext) -> AppResult<usize> {
    ctx.translator.coordinator().clear_history()
}
