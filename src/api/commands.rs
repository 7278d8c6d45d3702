//! Command handlers for the CLI front end
//!
//! Each handler returns plain serializable data; rendering it is the
//! binary's job. Handlers are grouped by concern (no mod.rs pattern).
//!
//! - `translate`: translate, detect, offline lookup
//! - `history`: list, show, delete, clear
//! - `cache`: stats, purge, clear
//! - `languages`: catalog listing
//! - `status`: backend probe and environment report
//! - `settings`: effective configuration
//! - `interactive`: line-based session driving [`Session`](crate::core::session::Session)

pub mod translate;
pub mod history;
pub mod cache;
pub mod languages;
pub mod status;
pub mod settings;
pub mod interactive;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config;
use crate::core::orchestrator::Translator;
use crate::core::store::Storage;
use crate::shared::error::AppResult;
use crate::shared::settings::AppSettings;

/// Everything a handler needs, built once per process.
#[derive(Clone)]
pub struct CommandContext {
    pub settings: AppSettings,
    pub settings_path: Option<PathBuf>,
    pub translator: Arc<Translator>,
}

impl CommandContext {
    pub async fn load(config_path: Option<&Path>) -> AppResult<Self> {
        let settings = AppSettings::load(config_path).await?;
        let settings_path = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => AppSettings::get_settings_path().ok(),
        };

        let store = config::open_storage(&settings);
        let translator = config::build_translator(&settings, store)?;

        Ok(Self {
            settings,
            settings_path,
            translator: Arc::new(translator),
        })
    }

    pub fn new(settings: AppSettings, translator: Arc<Translator>) -> Self {
        Self {
            settings,
            settings_path: None,
            translator,
        }
    }

    pub fn store(&self) -> &Arc<dyn Storage> {
        self.translator.coordinator().store()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::store::InMemoryStorage;

    /// Context with no remote backends and an in-memory store.
    pub fn offline_context() -> CommandContext {
        let settings = AppSettings::default();
        let store: Arc<dyn Storage> = Arc::new(InMemoryStorage::new(settings.cache_ttl()));
        let translator = Translator::new(Vec::new(), None, store);
        CommandContext::new(settings, Arc::new(translator))
    }
}
