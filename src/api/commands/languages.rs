use serde::Serialize;

use crate::core::catalog::{self, Language};
use crate::core::offline::OfflineDictionary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageRow {
    #[serde(flatten)]
    pub language: Language,
    pub speech_tag: Option<String>,
    pub offline: bool,
}

/// Source list (with `auto`) or target list (without).
pub fn list(targets_only: bool) -> Vec<LanguageRow> {
    let offline = OfflineDictionary::builtin().offline_languages();

    let languages: Vec<&Language> = if targets_only {
        catalog::list_target().collect()
    } else {
        catalog::list_source().iter().collect()
    };

    languages
        .into_iter()
        .map(|language| LanguageRow {
            speech_tag: catalog::is_target_code(language.code)
                .then(|| catalog::speech_tag_for(language.code)),
            offline: offline.iter().any(|code| code == language.code),
            language: *language,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_list_includes_auto_without_speech_tag() {
        let rows = list(false);
        assert_eq!(rows[0].language.code, "auto");
        assert_eq!(rows[0].speech_tag, None);
        assert!(!rows[0].offline);

        let targets = list(true);
        assert_eq!(targets.len(), rows.len() - 1);
        let spanish = targets.iter().find(|r| r.language.code == "es").unwrap();
        assert_eq!(spanish.speech_tag.as_deref(), Some("es-ES"));
        assert!(spanish.offline);
        let russian = targets.iter().find(|r| r.language.code == "ru").unwrap();
        assert!(!russian.offline);
    }
}
