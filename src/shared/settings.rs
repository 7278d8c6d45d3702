use serde::{Deserialize, Serialize};
use tokio::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;

use crate::shared::error::{AppError, AppResult};

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "lingobridge";
const APPLICATION: &str = "lingo-bridge";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub backends: BackendSettings,
    pub storage: StorageSettings,
    pub preferences: UserPreferences,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub libre_url: String,
    pub libre_detect_url: String,
    pub libre_api_key: Option<String>,
    pub mymemory_url: String,
    /// Contact address sent to MyMemory; raises the anonymous daily quota.
    pub mymemory_email: Option<String>,
    /// Unset keeps the HTTP client's own defaults.
    pub request_timeout_secs: Option<u64>,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: Option<PathBuf>,
    pub cache_ttl_days: i64,
    pub history_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub default_source_lang: String,
    pub default_target_lang: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            libre_url: "https://libretranslate.com/translate".to_string(),
            libre_detect_url: "https://libretranslate.com/detect".to_string(),
            libre_api_key: None,
            mymemory_url: "https://api.mymemory.translated.net/get".to_string(),
            mymemory_email: None,
            request_timeout_secs: None,
            user_agent: format!("lingo-bridge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            cache_ttl_days: 7,
            history_limit: 50,
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_source_lang: "auto".to_string(),
            default_target_lang: "es".to_string(),
        }
    }
}

impl AppSettings {
    pub fn get_settings_path() -> AppResult<PathBuf> {
        ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| AppError::Config("Failed to determine config directory".to_string()))
    }

    /// Load settings from `path`, or from the platform config directory.
    ///
    /// A missing file is created with defaults. Environment overrides are
    /// applied on top of whatever was read.
    pub async fn load(path: Option<&Path>) -> AppResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::get_settings_path()?,
        };

        let mut settings = if !fs::try_exists(&path).await.unwrap_or(false) {
            let settings = Self::default();
            settings.save_to(&path).await?;
            settings
        } else {
            let content = fs::read_to_string(&path).await
                .map_err(|e| AppError::Config(format!("Failed to read settings file: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| AppError::Config(format!("Failed to parse settings: {}", e)))?
        };

        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    pub async fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await
                .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize settings: {}", e)))?;

        fs::write(path, content).await
            .map_err(|e| AppError::Config(format!("Failed to write settings file: {}", e)))
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("LINGO_LIBRE_URL") {
            self.backends.libre_url = url;
        }
        if let Some(url) = non_empty("LINGO_LIBRE_DETECT_URL") {
            self.backends.libre_detect_url = url;
        }
        if let Some(url) = non_empty("LINGO_MYMEMORY_URL") {
            self.backends.mymemory_url = url;
        }
        if let Some(key) = non_empty("LINGO_LIBRE_API_KEY") {
            self.backends.libre_api_key = Some(key);
        }
        if let Some(dir) = non_empty("LINGO_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.storage.cache_ttl_days <= 0 {
            return Err(AppError::Config("cache_ttl_days must be positive".to_string()));
        }
        if self.storage.history_limit == 0 {
            return Err(AppError::Config("history_limit must be positive".to_string()));
        }
        Ok(())
    }

    /// Directory holding the redb database.
    pub fn data_dir(&self) -> AppResult<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| AppError::Config("Unable to determine data directory".to_string()))
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.storage.cache_ttl_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_public_endpoints() {
        let settings = AppSettings::default();
        assert_eq!(settings.backends.libre_url, "https://libretranslate.com/translate");
        assert_eq!(settings.backends.mymemory_url, "https://api.mymemory.translated.net/get");
        assert_eq!(settings.storage.cache_ttl_days, 7);
        assert_eq!(settings.preferences.default_source_lang, "auto");
        assert_eq!(settings.preferences.default_target_lang, "es");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let parsed: AppSettings =
            serde_json::from_str(r#"{"storage": {"history_limit": 10}}"#).unwrap();
        assert_eq!(parsed.storage.history_limit, 10);
        assert_eq!(parsed.storage.cache_ttl_days, 7);
        assert_eq!(parsed.backends, BackendSettings::default());
    }

    #[test]
    fn overrides_ignore_blank_values() {
        let vars: HashMap<&str, &str> = [
            ("LINGO_LIBRE_URL", "http://127.0.0.1:5000/translate"),
            ("LINGO_LIBRE_API_KEY", "   "),
            ("LINGO_DATA_DIR", "/tmp/lingo"),
        ]
        .into_iter()
        .collect();

        let mut settings = AppSettings::default();
        settings.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(settings.backends.libre_url, "http://127.0.0.1:5000/translate");
        assert_eq!(settings.backends.libre_api_key, None);
        assert_eq!(settings.storage.data_dir, Some(PathBuf::from("/tmp/lingo")));
    }

    #[test]
    fn rejects_non_positive_ttl() {
        let mut settings = AppSettings::default();
        settings.storage.cache_ttl_days = 0;
        assert!(matches!(settings.validate(), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn load_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = AppSettings::load(Some(&path)).await.unwrap();
        assert!(path.exists());
        assert_eq!(settings.storage.history_limit, 50);

        let reloaded = AppSettings::load(Some(&path)).await.unwrap();
        assert_eq!(reloaded.storage, settings.storage);
    }
}
