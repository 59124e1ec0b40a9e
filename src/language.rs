use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en", alias = "english")]
    #[value(name = "en", alias = "english")]
    English,
    #[serde(rename = "ru", alias = "russian")]
    #[value(name = "ru", alias = "russian")]
    Russian,
    #[serde(rename = "uz", alias = "uzbek")]
    #[value(name = "uz", alias = "uzbek")]
    Uzbek,
}

const RUSSIAN_KEYWORDS: &[&str] = &["russian", "рус"];
const UZBEK_KEYWORDS: &[&str] = &["uzbek", "o'zbek", "uzbekcha"];
const ENGLISH_KEYWORDS: &[&str] = &["english", "англ"];

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Russian, Language::Uzbek];

    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Russian => "ru",
            Language::Uzbek => "uz",
        }
    }

    /// BCP-47 tag passed to recognizers.
    pub fn locale(self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Russian => "ru-RU",
            Language::Uzbek => "uz-UZ",
        }
    }

    /// Picks the language a caller asked for. Russian is checked before Uzbek,
    /// Uzbek before English.
    pub fn detect(reply: &str) -> Option<Language> {
        let reply = reply.to_lowercase();
        let table = [
            (Language::Russian, RUSSIAN_KEYWORDS),
            (Language::Uzbek, UZBEK_KEYWORDS),
            (Language::English, ENGLISH_KEYWORDS),
        ];
        table
            .into_iter()
            .find(|(_, keywords)| keywords.iter().any(|k| reply.contains(k)))
            .map(|(language, _)| language)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}
