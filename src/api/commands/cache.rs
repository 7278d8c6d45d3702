use serde::Serialize;

use super::CommandContext;
use crate::shared::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub ttl_days: i64,
}

pub fn stats(ctx: &CommandContext) -> AppResult<CacheStats> {
    Ok(CacheStats {
        entries: ctx.translator.coordinator().cache_len()?,
        ttl_days: ctx.settings.storage.cache_ttl_days,
    })
}

pub fn purge(ctx: &CommandContext) -> AppResult<usize> {
    ctx.translator.coordinator().purge_expired()
}

pub fn clear(ctx: &CommandContext) -> AppResult<usize> {
    ctx.translator.coordinator().clear_cache()
}
