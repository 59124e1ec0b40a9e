use crate::config::TtsConfig;
use crate::language::Language;
use crate::tts::provider::TtsBackend;
use anyhow::{bail, Context};
use reqwest::blocking::Client;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// The endpoint rejects requests longer than this many characters.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Google Translate text-to-speech. Returns MP3.
pub struct GttsBackend;

impl GttsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GttsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TtsBackend for GttsBackend {
    fn name(&self) -> &str {
        "gtts"
    }

    fn synthesize(&self, text: &str, language: Language, config: &TtsConfig) -> anyhow::Result<Vec<u8>> {
        let endpoint = config.gtts.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .context("build gtts client")?;
        let speed = if config.gtts.slow { "0.3" } else { "1" };

        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        let total = chunks.len();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let total_str = total.to_string();
            let idx_str = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            let response = client
                .get(endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("q", chunk.as_str()),
                    ("tl", language.code()),
                    ("client", "tw-ob"),
                    ("ttsspeed", speed),
                    ("total", total_str.as_str()),
                    ("idx", idx_str.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .with_context(|| format!("request gtts chunk {idx}"))?;

            let status = response.status();
            if !status.is_success() {
                bail!("gtts returned {status} for chunk {idx}");
            }
            // MP3 frames concatenate cleanly
            let bytes = response.bytes().context("read gtts audio")?;
            audio.extend_from_slice(&bytes);
        }

        Ok(audio)
    }

    fn extension(&self) -> &'static str {
        "mp3"
    }
}

/// Splits on whitespace into chunks of at most `max_chars` characters.
/// Words longer than the limit are cut.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            chunks.push(word.into_iter().collect());
            word = rest;
        }

        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("  Goodbye!  ", 100), vec!["Goodbye!"]);
        assert!(chunk_text("   ", 100).is_empty());
    }

    #[test]
    fn splits_at_word_boundaries() {
        let chunks = chunk_text("aa bb cc dd", 5);
        assert_eq!(chunks, vec!["aa bb", "cc dd"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "К вашему сведению: тарифы были изменены. Плата за обслуживание увеличена на 10 процентов.";
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn cuts_overlong_words() {
        let chunks = chunk_text("ab abcdefgh c", 3);
        assert_eq!(chunks, vec!["ab", "abc", "def", "gh", "c"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 3));
    }
}
