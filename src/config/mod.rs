//! Backend registry
//!
//! Builds the ordered backend list, the detector and the store from
//! [`AppSettings`]. Reordering or dropping a backend only touches
//! [`build_backends`].

use std::sync::Arc;
use std::time::Duration;

use keyring::Entry;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::core::backends::{
    LanguageDetector, LibreDetector, LibreTranslateBackend, MyMemoryBackend, TranslationBackend,
};
use crate::core::orchestrator::Translator;
use crate::core::store::{InMemoryStorage, RedbStorage, Storage};
use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::{AppSettings, BackendSettings};

const KEYRING_SERVICE: &str = "lingo-bridge";
const KEYRING_ACCOUNT: &str = "libretranslate-api-key";

pub fn http_client(settings: &BackendSettings) -> AppResult<Client> {
    let mut builder = Client::builder().user_agent(settings.user_agent.clone());
    if let Some(secs) = settings.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// LibreTranslate API key: settings (env already applied), then the OS
/// keyring. None is fine, public instances accept anonymous calls.
pub fn resolve_libre_api_key(settings: &BackendSettings) -> Option<String> {
    resolve_api_key_with(settings, keyring_api_key)
}

fn resolve_api_key_with<F>(settings: &BackendSettings, keyring: F) -> Option<String>
where
    F: FnOnce() -> Option<String>,
{
    settings
        .libre_api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(keyring)
        .filter(|k| !k.trim().is_empty())
}

fn keyring_api_key() -> Option<String> {
    let entry = match Entry::new(KEYRING_SERVICE, KEYRING_ACCOUNT) {
        Ok(entry) => entry,
        Err(e) => {
            debug!("Keyring unavailable: {}", e);
            return None;
        }
    };

    match entry.get_password() {
        Ok(key) => Some(key),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!("Keyring access failed: {}", e);
            None
        }
    }
}

/// LibreTranslate first, MyMemory second.
pub fn build_backends(
    settings: &BackendSettings,
    client: &Client,
    api_key: Option<String>,
) -> Vec<Arc<dyn TranslationBackend>> {
    let primary: Arc<dyn TranslationBackend> = Arc::new(LibreTranslateBackend::new(
        client.clone(),
        settings.libre_url.clone(),
        api_key,
    ));
    let secondary: Arc<dyn TranslationBackend> = Arc::new(MyMemoryBackend::new(
        client.clone(),
        settings.mymemory_url.clone(),
        settings.mymemory_email.clone(),
    ));
    vec![primary, secondary]
}

pub fn build_detector(
    settings: &BackendSettings,
    client: &Client,
    api_key: Option<String>,
) -> Arc<dyn LanguageDetector> {
    Arc::new(LibreDetector::new(
        client.clone(),
        settings.libre_detect_url.clone(),
        api_key,
    ))
}

/// redb store in the data directory, or memory if that cannot be opened.
pub fn open_storage(settings: &AppSettings) -> Arc<dyn Storage> {
    let ttl = settings.cache_ttl();
    let opened = settings
        .data_dir()
        .and_then(|dir| RedbStorage::open_in(&dir, ttl));

    match opened {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            warn!("Failed to open database, using in-memory storage: {}", e);
            Arc::new(InMemoryStorage::new(ttl))
        }
    }
}

pub fn build_translator(settings: &AppSettings, store: Arc<dyn Storage>) -> AppResult<Translator> {
    let client = http_client(&settings.backends)?;
    let api_key = resolve_libre_api_key(&settings.backends);

    let backends = build_backends(&settings.backends, &client, api_key.clone());
    let detector = build_detector(&settings.backends, &client, api_key);

    let translator = Translator::new(backends, Some(detector), store);
    info!(backends = ?translator.backend_names(), "Translator ready");
    Ok(translator)
}
