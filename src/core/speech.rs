//! Speech capability boundary.
//!
//! Recognition and synthesis are provided by the host platform, if at all.
//! Each is optional and independently detected; a missing or failing engine
//! hides the matching control instead of raising an error.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use crate::core::catalog;
use crate::shared::error::AppResult;
use crate::shared::types::is_auto;

/// Tag used when the language is still `auto`.
const DEFAULT_TAG: &str = "en-US";

pub type TranscriptCallback = Box<dyn Fn(&str) + Send + Sync>;

/// A running recognition session.
pub trait RecognitionHandle: Send {
    /// Finish listening and deliver the final transcript.
    fn stop(&mut self);
    /// Drop the session without a final transcript.
    fn abort(&mut self);
}

pub trait SpeechRecognizer: Send + Sync {
    fn recognize(
        &self,
        language_tag: &str,
        on_partial: TranscriptCallback,
        on_final: TranscriptCallback,
    ) -> AppResult<Box<dyn RecognitionHandle>>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Resolves when the utterance has finished.
    async fn speak(&self, text: &str, language_tag: &str) -> AppResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechControls {
    pub voice_input: bool,
    pub voice_output: bool,
}

#[derive(Clone, Default)]
pub struct SpeechCapabilities {
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
}

pub fn language_tag(code: &str) -> String {
    if is_auto(code) {
        DEFAULT_TAG.to_string()
    } else {
        catalog::speech_tag_for(code)
    }
}

impl SpeechCapabilities {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn controls(&self) -> SpeechControls {
        SpeechControls {
            voice_input: self.recognizer.is_some(),
            voice_output: self.synthesizer.is_some(),
        }
    }

    /// Start listening in `code`. `None` when recognition is unavailable.
    pub fn listen(
        &self,
        code: &str,
        on_partial: TranscriptCallback,
        on_final: TranscriptCallback,
    ) -> Option<Box<dyn RecognitionHandle>> {
        let recognizer = self.recognizer.as_ref()?;
        match recognizer.recognize(&language_tag(code), on_partial, on_final) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Speech recognition unavailable: {}", e);
                None
            }
        }
    }

    /// Read `text` aloud. Returns whether anything was spoken.
    pub async fn speak(&self, text: &str, code: &str) -> bool {
        let Some(synthesizer) = &self.synthesizer else {
            return false;
        };
        if text.trim().is_empty() {
            return false;
        }

        match synthesizer.speak(text, &language_tag(code)).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Speech synthesis failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::AppError;
    use std::sync::Mutex;

    struct Recorder {
        spoken: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for Recorder {
        async fn speak(&self, text: &str, language_tag: &str) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Io("audio device busy".into()));
            }
            self.spoken
                .lock()
                .unwrap()
                .push((text.to_string(), language_tag.to_string()));
            Ok(())
        }
    }

    struct Echo;

    struct EchoHandle {
        on_final: TranscriptCallback,
    }

    impl RecognitionHandle for EchoHandle {
        fn stop(&mut self) {
            (self.on_final)("hello world");
        }
        fn abort(&mut self) {}
    }

    impl SpeechRecognizer for Echo {
        fn recognize(
            &self,
            language_tag: &str,
            on_partial: TranscriptCallback,
            on_final: TranscriptCallback,
        ) -> AppResult<Box<dyn RecognitionHandle>> {
            on_partial(language_tag);
            Ok(Box::new(EchoHandle { on_final }))
        }
    }

    #[tokio::test]
    async fn absent_capabilities_hide_controls() {
        let speech = SpeechCapabilities::none();
        assert_eq!(
            speech.controls(),
            SpeechControls {
                voice_input: false,
                voice_output: false
            }
        );
        assert!(!speech.speak("hola", "es").await);
        assert!(speech.listen("es", Box::new(|_| {}), Box::new(|_| {})).is_none());
    }

    #[tokio::test]
    async fn speaks_with_language_tag() {
        let recorder = Arc::new(Recorder {
            spoken: Mutex::new(Vec::new()),
            fail: false,
        });
        let speech = SpeechCapabilities::none().with_synthesizer(recorder.clone());

        assert!(speech.controls().voice_output);
        assert!(speech.speak("hola", "es").await);
        assert!(!speech.speak("  ", "es").await);
        assert_eq!(
            recorder.spoken.lock().unwrap().as_slice(),
            &[("hola".to_string(), "es-ES".to_string())]
        );
    }

    #[tokio::test]
    async fn synthesis_errors_degrade_to_false() {
        let speech = SpeechCapabilities::none().with_synthesizer(Arc::new(Recorder {
            spoken: Mutex::new(Vec::new()),
            fail: true,
        }));
        assert!(!speech.speak("hola", "es").await);
    }

    #[test]
    fn recognition_uses_tag_and_delivers_final() {
        let partials = Arc::new(Mutex::new(Vec::new()));
        let finals = Arc::new(Mutex::new(Vec::new()));
        let speech = SpeechCapabilities::none().with_recognizer(Arc::new(Echo));

        let (p, f) = (partials.clone(), finals.clone());
        let mut handle = speech
            .listen(
                "auto",
                Box::new(move |t| p.lock().unwrap().push(t.to_string())),
                Box::new(move |t| f.lock().unwrap().push(t.to_string())),
            )
            .unwrap();
        handle.stop();

        assert_eq!(partials.lock().unwrap().as_slice(), &["en-US".to_string()]);
        assert_eq!(finals.lock().unwrap().as_slice(), &["hello world".to_string()]);
    }
}
