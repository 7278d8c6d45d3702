//! Offline dictionary matcher
//!
//! Small phrase tables used when every remote backend is unreachable.
//! Tables are keyed by ordered pair (`en-es`); a missing pair can be served
//! by inverting the reverse table at lookup time.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

/// Phrase table for one ordered language pair. Keys are stored lowercase.
/// Insertion order is kept so inversion is deterministic: when two phrases
/// share a translation, the later one wins.
#[derive(Debug, Clone, Default)]
pub struct PhraseTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl PhraseTable {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::default();
        for (phrase, translation) in entries {
            table.insert(phrase.into().to_lowercase(), translation.into());
        }
        table
    }

    fn insert(&mut self, phrase: String, translation: String) {
        match self.index.get(&phrase) {
            Some(&pos) => self.entries[pos].1 = translation,
            None => {
                self.index.insert(phrase.clone(), self.entries.len());
                self.entries.push((phrase, translation));
            }
        }
    }

    pub fn get(&self, phrase: &str) -> Option<&str> {
        self.index.get(phrase).map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translation -> phrase table, matched case-insensitively.
    fn inverted(&self) -> PhraseTable {
        PhraseTable::from_entries(
            self.entries
                .iter()
                .map(|(phrase, translation)| (translation.to_lowercase(), phrase.clone())),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct OfflineDictionary {
    pairs: HashMap<String, PhraseTable>,
}

fn pair_key(from: &str, to: &str) -> String {
    format!("{}-{}", from, to)
}

impl OfflineDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dictionaries shipped with the crate, loaded once.
    pub fn builtin() -> &'static OfflineDictionary {
        static BUILTIN: OnceLock<OfflineDictionary> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut dictionary = OfflineDictionary::new();
            for (from, to, entries) in BUILTIN_TABLES {
                dictionary.add_pair(from, to, PhraseTable::from_entries(entries.iter().copied()));
            }
            dictionary
        })
    }

    pub fn with_pair(mut self, from: &str, to: &str, table: PhraseTable) -> Self {
        self.add_pair(from, to, table);
        self
    }

    pub fn add_pair(&mut self, from: &str, to: &str, table: PhraseTable) {
        self.pairs.insert(pair_key(from, to), table);
    }

    /// Forward table, or the inverted reverse table when only that exists.
    fn table_for(&self, from: &str, to: &str) -> Option<Cow<'_, PhraseTable>> {
        if let Some(table) = self.pairs.get(&pair_key(from, to)) {
            return Some(Cow::Borrowed(table));
        }
        self.pairs
            .get(&pair_key(to, from))
            .map(|reverse| Cow::Owned(reverse.inverted()))
    }

    /// Translate `text` from `from` to `to`.
    ///
    /// Tries the whole phrase first, then token by token. A token-by-token
    /// pass that changes nothing is a miss, not an echo of the input.
    pub fn lookup(&self, text: &str, from: &str, to: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let table = self.table_for(from, to)?;
        let normalized = trimmed.to_lowercase();

        let translated = match table.get(&normalized) {
            Some(hit) => hit.to_string(),
            None => substitute_words(&table, &normalized)?,
        };

        let starts_upper = trimmed.chars().next().map(char::is_uppercase).unwrap_or(false);
        Some(if starts_upper { capitalize_first(&translated) } else { translated })
    }

    pub fn is_available(&self, from: &str, to: &str) -> bool {
        self.pairs.contains_key(&pair_key(from, to)) || self.pairs.contains_key(&pair_key(to, from))
    }

    /// Every language that appears on either side of a table, sorted.
    pub fn offline_languages(&self) -> Vec<String> {
        let mut languages = BTreeSet::new();
        for key in self.pairs.keys() {
            if let Some((from, to)) = key.split_once('-') {
                languages.insert(from.to_string());
                languages.insert(to.to_string());
            }
        }
        languages.into_iter().collect()
    }

    pub fn dictionary_size(&self, from: &str, to: &str) -> usize {
        self.pairs
            .get(&pair_key(from, to))
            .or_else(|| self.pairs.get(&pair_key(to, from)))
            .map(PhraseTable::len)
            .unwrap_or(0)
    }
}

/// Tokens are split on single spaces so the input's spacing survives.
fn substitute_words(table: &PhraseTable, normalized: &str) -> Option<String> {
    let words: Vec<&str> = normalized.split(' ').collect();
    if words.iter().filter(|w| !w.is_empty()).count() < 2 {
        return None;
    }

    let mut changed = false;
    let translated: Vec<&str> = words
        .iter()
        .map(|word| match table.get(word) {
            Some(hit) => {
                changed |= hit != *word;
                hit
            }
            None => *word,
        })
        .collect();

    changed.then(|| translated.join(" "))
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

type BuiltinTable = (&'static str, &'static str, &'static [(&'static str, &'static str)]);

const BUILTIN_TABLES: &[BuiltinTable] = &[
    ("en", "es", &[
        ("hello", "hola"), ("goodbye", "adiós"), ("thank you", "gracias"),
        ("please", "por favor"), ("yes", "sí"), ("no", "no"),
        ("good morning", "buenos días"), ("good night", "buenas noches"),
        ("how are you", "cómo estás"), ("i love you", "te amo"),
        ("welcome", "bienvenido"), ("sorry", "lo siento"), ("excuse me", "disculpe"),
        ("help", "ayuda"), ("food", "comida"), ("water", "agua"), ("bathroom", "baño"),
        ("restaurant", "restaurante"), ("hotel", "hotel"), ("airport", "aeropuerto"),
    ]),
    ("en", "fr", &[
        ("hello", "bonjour"), ("goodbye", "au revoir"), ("thank you", "merci"),
        ("please", "s'il vous plaît"), ("yes", "oui"), ("no", "non"),
        ("good morning", "bonjour"), ("good night", "bonne nuit"),
        ("how are you", "comment allez-vous"), ("i love you", "je t'aime"),
        ("welcome", "bienvenue"), ("sorry", "désolé"), ("excuse me", "excusez-moi"),
        ("help", "aide"), ("food", "nourriture"), ("water", "eau"), ("bathroom", "toilette"),
        ("restaurant", "restaurant"), ("hotel", "hôtel"), ("airport", "aéroport"),
    ]),
    ("en", "de", &[
        ("hello", "hallo"), ("goodbye", "auf wiedersehen"), ("thank you", "danke"),
        ("please", "bitte"), ("yes", "ja"), ("no", "nein"),
        ("good morning", "guten morgen"), ("good night", "gute nacht"),
        ("how are you", "wie geht es dir"), ("i love you", "ich liebe dich"),
        ("welcome", "willkommen"), ("sorry", "entschuldigung"),
        ("excuse me", "entschuldigen sie"), ("help", "hilfe"), ("food", "essen"),
        ("water", "wasser"), ("bathroom", "badezimmer"), ("restaurant", "restaurant"),
        ("hotel", "hotel"), ("airport", "flughafen"),
    ]),
    ("en", "it", &[
        ("hello", "ciao"), ("goodbye", "arrivederci"), ("thank you", "grazie"),
        ("please", "per favore"), ("yes", "sì"), ("no", "no"),
        ("good morning", "buongiorno"), ("good night", "buona notte"),
        ("how are you", "come stai"), ("i love you", "ti amo"),
        ("welcome", "benvenuto"), ("sorry", "scusa"), ("excuse me", "mi scusi"),
        ("help", "aiuto"), ("food", "cibo"), ("water", "acqua"), ("bathroom", "bagno"),
        ("restaurant", "ristorante"), ("hotel", "hotel"), ("airport", "aeroporto"),
    ]),
    ("en", "pt", &[
        ("hello", "olá"), ("goodbye", "tchau"), ("thank you", "obrigado"),
        ("please", "por favor"), ("yes", "sim"), ("no", "não"),
        ("good morning", "bom dia"), ("good night", "boa noite"),
        ("how are you", "como você está"), ("i love you", "eu te amo"),
        ("welcome", "bem-vindo"), ("sorry", "desculpe"), ("excuse me", "com licença"),
        ("help", "ajuda"), ("food", "comida"), ("water", "água"), ("bathroom", "banheiro"),
        ("restaurant", "restaurante"), ("hotel", "hotel"), ("airport", "aeroporto"),
    ]),
    ("en", "zh", &[
        ("hello", "你好"), ("goodbye", "再见"), ("thank you", "谢谢"), ("please", "请"),
        ("yes", "是"), ("no", "不"), ("good morning", "早上好"), ("good night", "晚安"),
        ("how are you", "你好吗"), ("i love you", "我爱你"), ("welcome", "欢迎"),
        ("sorry", "对不起"), ("excuse me", "打扰一下"), ("help", "帮助"),
        ("food", "食物"), ("water", "水"), ("bathroom", "洗手间"),
        ("restaurant", "餐厅"), ("hotel", "酒店"), ("airport", "机场"),
    ]),
    ("en", "ja", &[
        ("hello", "こんにちは"), ("goodbye", "さようなら"), ("thank you", "ありがとう"),
        ("please", "お願いします"), ("yes", "はい"), ("no", "いいえ"),
        ("good morning", "おはよう"), ("good night", "おやすみ"),
        ("how are you", "元気ですか"), ("i love you", "愛してる"),
        ("welcome", "ようこそ"), ("sorry", "ごめんなさい"), ("excuse me", "すみません"),
        ("help", "助けて"), ("food", "食べ物"), ("water", "水"), ("bathroom", "トイレ"),
        ("restaurant", "レストラン"), ("hotel", "ホテル"), ("airport", "空港"),
    ]),
    ("en", "ko", &[
        ("hello", "안녕하세요"), ("goodbye", "안녕히 가세요"), ("thank you", "감사합니다"),
        ("please", "부탁합니다"), ("yes", "네"), ("no", "아니요"),
        ("good morning", "좋은 아침"), ("good night", "안녕히 주무세요"),
        ("how are you", "어떻게 지내세요"), ("i love you", "사랑해요"),
        ("welcome", "환영합니다"), ("sorry", "미안합니다"), ("excuse me", "실례합니다"),
        ("help", "도움"), ("food", "음식"), ("water", "물"), ("bathroom", "화장실"),
        ("restaurant", "레스토랑"), ("hotel", "호텔"), ("airport", "공항"),
    ]),
];
