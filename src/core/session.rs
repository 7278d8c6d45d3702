//! Interactive translation session
//!
//! [`AppState`] is the explicit state object a front end renders from.
//! [`Session`] drives the orchestrator on its behalf and tags each call with
//! a sequence number so a slow, superseded response never overwrites the
//! display state of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, warn};

use crate::core::orchestrator::Translator;
use crate::shared::error::AppResult;
use crate::shared::settings::UserPreferences;
use crate::shared::types::{
    is_auto, HistoryEntry, TranslationRequest, TranslationResult, TranslationSource,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub source_lang: String,
    pub target_lang: String,
    pub source_text: String,
    pub translated_text: String,
    pub detected_language: Option<String>,
    pub translation_source: Option<TranslationSource>,
    pub is_translating: bool,
    pub error: Option<String>,
    pub history: Vec<HistoryEntry>,
}

impl AppState {
    pub fn new(preferences: &UserPreferences) -> Self {
        Self {
            source_lang: preferences.default_source_lang.clone(),
            target_lang: preferences.default_target_lang.clone(),
            source_text: String::new(),
            translated_text: String::new(),
            detected_language: None,
            translation_source: None,
            is_translating: false,
            error: None,
            history: Vec::new(),
        }
    }
}

/// Hands out increasing request numbers and remembers the latest one.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        self.latest() == seq
    }
}

/// What became of one [`Session::translate`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied(TranslationResult),
    /// A newer request was issued while this one was in flight.
    Superseded(u64),
    Failed(String),
}

#[derive(Clone)]
pub struct Session {
    translator: Arc<Translator>,
    state: Arc<Mutex<AppState>>,
    sequencer: Arc<RequestSequencer>,
    history_limit: usize,
}

impl Session {
    pub fn new(translator: Arc<Translator>, preferences: &UserPreferences, history_limit: usize) -> Self {
        Self {
            translator,
            state: Arc::new(Mutex::new(AppState::new(preferences))),
            sequencer: Arc::new(RequestSequencer::new()),
            history_limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Session state mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    pub fn snapshot(&self) -> AppState {
        self.lock().clone()
    }

    pub fn set_source_text(&self, text: impl Into<String>) {
        self.lock().source_text = text.into();
    }

    pub fn set_source_lang(&self, code: impl Into<String>) {
        self.lock().source_lang = code.into();
    }

    pub fn set_target_lang(&self, code: impl Into<String>) {
        self.lock().target_lang = code.into();
    }

    /// Swap languages and texts. Refused while the source is `auto`.
    pub fn swap_languages(&self) -> bool {
        let mut state = self.lock();
        if is_auto(&state.source_lang) {
            return false;
        }

        let state = &mut *state;
        std::mem::swap(&mut state.source_lang, &mut state.target_lang);
        std::mem::swap(&mut state.source_text, &mut state.translated_text);
        if state.detected_language.is_some() {
            state.detected_language = Some(state.source_lang.clone());
        }
        true
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.source_text.clear();
        state.translated_text.clear();
        state.error = None;
        state.detected_language = None;
        state.translation_source = None;
    }

    /// Load a history entry back into the editor.
    pub fn reuse_history(&self, entry: &HistoryEntry) {
        let mut state = self.lock();
        state.source_text = entry.source_text.clone();
        state.translated_text = entry.translated_text.clone();
        state.source_lang = entry.from_lang.clone();
        state.target_lang = entry.to_lang.clone();
        state.translation_source = Some(entry.source);
        state.detected_language = None;
        state.error = None;
    }

    pub fn refresh_history(&self) -> AppResult<()> {
        let history = self.translator.coordinator().history(self.history_limit)?;
        self.lock().history = history;
        Ok(())
    }

    /// Translate the current editor contents.
    ///
    /// The result is applied to the state only if no newer request was
    /// issued meanwhile. History is written by the orchestrator either way.
    pub async fn translate(&self) -> Outcome {
        let seq = self.sequencer.issue();
        let request = {
            let mut state = self.lock();
            state.is_translating = true;
            state.error = None;
            state.translation_source = None;
            TranslationRequest::new(
                state.source_text.clone(),
                state.source_lang.clone(),
                state.target_lang.clone(),
            )
        };

        let resolved = self.translator.resolve(&request).await;

        if !self.sequencer.is_latest(seq) {
            debug!(seq, latest = self.sequencer.latest(), "Discarding superseded response");
            return Outcome::Superseded(seq);
        }

        let outcome = {
            let mut state = self.lock();
            state.is_translating = false;
            match resolved {
                Ok(result) => {
                    state.translated_text = result.translated_text.clone();
                    state.detected_language = result.detected_language.clone();
                    state.translation_source = Some(result.source);
                    Outcome::Applied(result)
                }
                Err(e) => {
                    let message = e.to_string();
                    state.error = Some(message.clone());
                    state.translated_text.clear();
                    Outcome::Failed(message)
                }
            }
        };

        if matches!(outcome, Outcome::Applied(_)) {
            if let Err(e) = self.refresh_history() {
                warn!("Failed to reload history: {}", e);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{InMemoryStorage, Storage};
    use chrono::Duration;

    fn session() -> Session {
        let store: Arc<dyn Storage> = Arc::new(InMemoryStorage::new(Duration::days(7)));
        let translator = Arc::new(Translator::new(Vec::new(), None, store));
        Session::new(translator, &UserPreferences::default(), 50)
    }

    #[test]
    fn sequencer_tracks_latest() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();
        assert!(second > first);
        assert!(!sequencer.is_latest(first));
        assert!(sequencer.is_latest(second));
    }

    #[test]
    fn swap_is_refused_for_auto_source() {
        let session = session();
        assert!(!session.swap_languages());

        session.set_source_lang("en");
        session.set_source_text("hello");
        {
            let mut state = session.lock();
            state.translated_text = "hola".into();
            state.detected_language = Some("en".into());
        }
        assert!(session.swap_languages());

        let state = session.snapshot();
        assert_eq!(state.source_lang, "es");
        assert_eq!(state.target_lang, "en");
        assert_eq!(state.source_text, "hola");
        assert_eq!(state.translated_text, "hello");
        assert_eq!(state.detected_language.as_deref(), Some("es"));
    }

    #[tokio::test]
    async fn offline_translation_updates_state_and_history() {
        let session = session();
        session.set_source_lang("en");
        session.set_target_lang("es");
        session.set_source_text("Hello");

        let outcome = session.translate().await;
        assert!(matches!(outcome, Outcome::Applied(ref r) if r.translated_text == "Hola"));

        let state = session.snapshot();
        assert!(!state.is_translating);
        assert_eq!(state.translated_text, "Hola");
        assert_eq!(state.translation_source, Some(TranslationSource::OfflineDictionary));
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].source_text, "Hello");
    }

    #[tokio::test]
    async fn errors_land_in_state() {
        let session = session();
        session.set_source_text("   ");

        assert!(matches!(session.translate().await, Outcome::Failed(_)));
        let state = session.snapshot();
        assert_eq!(
            state.error.as_deref(),
            Some("Validation Error: Please enter text to translate")
        );
        assert!(!state.is_translating);
    }

    #[test]
    fn reuse_and_clear() {
        let session = session();
        let entry = HistoryEntry {
            id: "1".into(),
            source_text: "bonjour".into(),
            translated_text: "hello".into(),
            from_lang: "fr".into(),
            to_lang: "en".into(),
            source: TranslationSource::PrimaryBackend,
            provider: None,
            timestamp: chrono::Utc::now(),
        };

        session.reuse_history(&entry);
        let state = session.snapshot();
        assert_eq!(state.source_lang, "fr");
        assert_eq!(state.translated_text, "hello");

        session.clear();
        let state = session.snapshot();
        assert!(state.source_text.is_empty());
        assert!(state.translated_text.is_empty());
        assert_eq!(state.source_lang, "fr");
    }
}
