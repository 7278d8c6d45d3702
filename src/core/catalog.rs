//! Language catalog
//!
//! Fixed, curated list of languages offered for translation. Order is stable
//! and is the order shown in language pickers.

use isolang::Language as IsoLanguage;
use serde::Serialize;

use crate::shared::types::AUTO_DETECT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
}

const fn lang(code: &'static str, name: &'static str, native_name: &'static str) -> Language {
    Language { code, name, native_name }
}

pub const LANGUAGES: &[Language] = &[
    lang(AUTO_DETECT, "Auto Detect", "Auto Detect"),
    lang("en", "English", "English"),
    lang("es", "Spanish", "Español"),
    lang("fr", "French", "Français"),
    lang("de", "German", "Deutsch"),
    lang("it", "Italian", "Italiano"),
    lang("pt", "Portuguese", "Português"),
    lang("ru", "Russian", "Русский"),
    lang("zh", "Chinese (Simplified)", "中文(简体)"),
    lang("ja", "Japanese", "日本語"),
    lang("ko", "Korean", "한국어"),
    lang("ar", "Arabic", "العربية"),
    lang("hi", "Hindi", "हिन्दी"),
    lang("bn", "Bengali", "বাংলা"),
    lang("tr", "Turkish", "Türkçe"),
    lang("vi", "Vietnamese", "Tiếng Việt"),
    lang("th", "Thai", "ไทย"),
    lang("pl", "Polish", "Polski"),
    lang("nl", "Dutch", "Nederlands"),
    lang("uk", "Ukrainian", "Українська"),
    lang("cs", "Czech", "Čeština"),
    lang("sv", "Swedish", "Svenska"),
    lang("da", "Danish", "Dansk"),
    lang("fi", "Finnish", "Suomi"),
    lang("el", "Greek", "Ελληνικά"),
    lang("he", "Hebrew", "עברית"),
    lang("id", "Indonesian", "Bahasa Indonesia"),
    lang("ms", "Malay", "Bahasa Melayu"),
    lang("no", "Norwegian", "Norsk"),
    lang("ro", "Romanian", "Română"),
    lang("hu", "Hungarian", "Magyar"),
    lang("sk", "Slovak", "Slovenčina"),
    lang("bg", "Bulgarian", "Български"),
    lang("hr", "Croatian", "Hrvatski"),
    lang("sr", "Serbian", "Српски"),
    lang("lt", "Lithuanian", "Lietuvių"),
    lang("lv", "Latvian", "Latviešu"),
    lang("et", "Estonian", "Eesti"),
    lang("sl", "Slovenian", "Slovenščina"),
    lang("fa", "Persian", "فارسی"),
    lang("ur", "Urdu", "اردو"),
    lang("sw", "Swahili", "Kiswahili"),
    lang("ta", "Tamil", "தமிழ்"),
    lang("te", "Telugu", "తెలుగు"),
    lang("mr", "Marathi", "मराठी"),
    lang("ml", "Malayalam", "മലയാളം"),
    lang("kn", "Kannada", "ಕನ್ನಡ"),
    lang("gu", "Gujarati", "ગુજરાતી"),
    lang("pa", "Punjabi", "ਪੰਜਾਬੀ"),
];

/// BCP 47 tags handed to speech engines, keyed by catalog code.
const SPEECH_TAGS: &[(&str, &str)] = &[
    ("en", "en-US"), ("es", "es-ES"), ("fr", "fr-FR"), ("de", "de-DE"),
    ("it", "it-IT"), ("pt", "pt-PT"), ("ru", "ru-RU"), ("zh", "zh-CN"),
    ("ja", "ja-JP"), ("ko", "ko-KR"), ("ar", "ar-SA"), ("hi", "hi-IN"),
    ("bn", "bn-IN"), ("tr", "tr-TR"), ("vi", "vi-VN"), ("th", "th-TH"),
    ("pl", "pl-PL"), ("nl", "nl-NL"), ("uk", "uk-UA"), ("cs", "cs-CZ"),
    ("sv", "sv-SE"), ("da", "da-DK"), ("fi", "fi-FI"), ("el", "el-GR"),
    ("he", "he-IL"), ("id", "id-ID"), ("ms", "ms-MY"), ("no", "no-NO"),
    ("ro", "ro-RO"), ("hu", "hu-HU"), ("sk", "sk-SK"), ("bg", "bg-BG"),
    ("hr", "hr-HR"), ("sr", "sr-RS"), ("lt", "lt-LT"), ("lv", "lv-LV"),
    ("et", "et-EE"), ("sl", "sl-SI"), ("fa", "fa-IR"), ("ur", "ur-PK"),
    ("sw", "sw-KE"), ("ta", "ta-IN"), ("te", "te-IN"), ("mr", "mr-IN"),
    ("ml", "ml-IN"), ("kn", "kn-IN"), ("gu", "gu-IN"), ("pa", "pa-IN"),
];

pub fn get(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// English display name, or the raw code when it is not in the catalog.
pub fn name_for(code: &str) -> String {
    get(code).map(|l| l.name.to_string()).unwrap_or_else(|| code.to_string())
}

pub fn native_name_for(code: &str) -> String {
    get(code).map(|l| l.native_name.to_string()).unwrap_or_else(|| code.to_string())
}

pub fn is_valid_code(code: &str) -> bool {
    get(code).is_some()
}

/// A concrete, translatable code: in the catalog and not `auto`.
pub fn is_target_code(code: &str) -> bool {
    code != AUTO_DETECT && is_valid_code(code)
}

/// Languages for the source picker, `auto` first.
pub fn list_source() -> &'static [Language] {
    LANGUAGES
}

/// Languages for the target picker; same order, without `auto`.
pub fn list_target() -> impl Iterator<Item = &'static Language> {
    LANGUAGES.iter().filter(|l| l.code != AUTO_DETECT)
}

/// Map a code reported by a detector (`en-US`, `pt_BR`, `eng`, `EN`) onto a
/// catalog code.
pub fn normalize_code(raw: &str) -> Option<&'static str> {
    let lowered = raw.trim().to_ascii_lowercase();
    let primary = lowered.split(|c: char| c == '-' || c == '_').next().unwrap_or_default();

    if let Some(language) = get(primary).filter(|l| l.code != AUTO_DETECT) {
        return Some(language.code);
    }

    let iso = match primary.len() {
        2 => IsoLanguage::from_639_1(primary),
        3 => IsoLanguage::from_639_3(primary),
        _ => None,
    }?;

    iso.to_639_1().and_then(get).map(|l| l.code)
}

/// Speech engine tag for a catalog code (`en` -> `en-US`).
pub fn speech_tag_for(code: &str) -> String {
    SPEECH_TAGS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, tag)| tag.to_string())
        .unwrap_or_else(|| format!("{}-{}", code, code.to_uppercase()))
}
