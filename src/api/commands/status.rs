use std::path::PathBuf;

use serde::Serialize;

use super::CommandContext;
use crate::core::orchestrator::BackendStatus;
use crate::core::speech::{SpeechCapabilities, SpeechControls};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    #[serde(flatten)]
    pub backends: BackendStatus,
    pub online: bool,
    pub speech: SpeechControls,
    pub data_dir: Option<PathBuf>,
    pub cache_entries: Option<usize>,
}

pub async fn status(ctx: &CommandContext) -> StatusReport {
    let backends = ctx.translator.backend_status().await;
    StatusReport {
        online: backends.any_remote_reachable(),
        backends,
        // The CLI has no audio stack
        speech: SpeechCapabilities::none().controls(),
        data_dir: ctx.settings.data_dir().ok(),
        cache_entries: ctx.translator.coordinator().cache_len().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::commands::test_support::offline_context;

    #[tokio::test]
    async fn offline_only_context() {
        let report = status(&offline_context()).await;
        assert!(report.backends.backends.is_empty());
        assert!(!report.online);
        assert!(report.backends.offline_available);
        assert!(!report.speech.voice_input);
        assert_eq!(report.cache_entries, Some(0));
    }
}
