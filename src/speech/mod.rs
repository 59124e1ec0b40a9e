pub mod console;
pub mod google;
pub mod recorder;

use crate::dialogue::Voice;
use crate::language::Language;
use crate::phrases::{phrase, PhraseKey};
use regex::Regex;
use std::fmt;
use std::io::{self, Write};
use std::sync::OnceLock;
use thiserror::Error;

pub use console::{ConsoleRecognizer, ScriptedRecognizer};
pub use google::GoogleRecognizer;

#[derive(Debug, Error)]
pub enum SttError {
    #[error("speech was not recognized")]
    Unrecognized,
    #[error("recognition service error: {0}")]
    Service(String),
}

pub trait SpeechRecognizer {
    fn name(&self) -> &str;
    fn recognize(&mut self, language: Language) -> Result<String, SttError>;
}

impl<R: SpeechRecognizer + ?Sized> SpeechRecognizer for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn recognize(&mut self, language: Language) -> Result<String, SttError> {
        (**self).recognize(language)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Heard(String),
    /// Nothing usable after every retry.
    Unknown,
    /// The recognition service failed; no retry was attempted.
    Error,
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Heard(text) => text,
            Reply::Unknown => "unknown",
            Reply::Error => "error",
        }
    }

    pub fn is_heard(&self) -> bool {
        matches!(self, Reply::Heard(_))
    }

    /// Heard text, or an empty string when the caller said nothing usable.
    pub fn heard_or_empty(&self) -> &str {
        match self {
            Reply::Heard(text) => text,
            Reply::Unknown | Reply::Error => "",
        }
    }
}

/// Where the spoken side of a call is echoed as text. Stderr keeps stdout
/// free for machine-readable output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Echo {
    #[default]
    Stdout,
    Stderr,
}

impl Echo {
    pub fn line(self, text: &str) {
        self.write(format_args!("{text}\n"));
    }

    /// Writes without a newline, for input prompts.
    pub fn prompt(self, text: &str) {
        self.write(format_args!("{text}"));
    }

    fn write(self, args: fmt::Arguments<'_>) {
        let result = match self {
            Echo::Stdout => {
                let mut out = io::stdout().lock();
                out.write_fmt(args).and_then(|()| out.flush())
            }
            Echo::Stderr => {
                let mut out = io::stderr().lock();
                out.write_fmt(args).and_then(|()| out.flush())
            }
        };
        if let Err(err) = result {
            tracing::debug!(error = %err, "transcript write failed");
        }
    }
}

pub fn normalize(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    re.replace_all(text.trim(), " ").to_lowercase()
}

/// Listens for one reply. An unrecognized attempt asks the caller to repeat,
/// up to `retries` attempts in total; a service failure ends listening at
/// once.
pub fn listen<V, R>(recognizer: &mut R, voice: &mut V, language: Language, retries: u32) -> Reply
where
    V: Voice + ?Sized,
    R: SpeechRecognizer + ?Sized,
{
    for attempt in 1..=retries.max(1) {
        tracing::debug!(attempt, locale = language.locale(), "listening");
        match recognizer.recognize(language) {
            Ok(text) => {
                let text = normalize(&text);
                if text.is_empty() {
                    say_or_warn(voice, language, PhraseKey::Reask);
                    continue;
                }
                tracing::debug!(reply = %text, "heard");
                return Reply::Heard(text);
            }
            Err(SttError::Unrecognized) => {
                tracing::debug!(attempt, "speech not recognized");
                say_or_warn(voice, language, PhraseKey::Reask);
            }
            Err(SttError::Service(message)) => {
                tracing::warn!(recognizer = recognizer.name(), error = %message, "recognition failed");
                say_or_warn(voice, language, PhraseKey::ServiceError);
                return Reply::Error;
            }
        }
    }

    Reply::Unknown
}

fn say_or_warn<V: Voice + ?Sized>(voice: &mut V, language: Language, key: PhraseKey) {
    if let Err(err) = voice.say(language, phrase(language, key)) {
        tracing::warn!(error = ?err, "failed to speak prompt");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Transcript(Vec<String>);

    impl Voice for Transcript {
        fn say(&mut self, _language: Language, text: &str) -> anyhow::Result<()> {
            self.0.push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn normalizes_case_and_spacing() {
        assert_eq!(normalize("  Yes   I\tPAID "), "yes i paid");
    }

    #[test]
    fn heard_reply_returns_immediately() {
        let mut recognizer = ScriptedRecognizer::new(["Yes"]);
        let mut voice = Transcript::default();
        let reply = listen(&mut recognizer, &mut voice, Language::English, 2);
        assert_eq!(reply, Reply::Heard("yes".to_string()));
        assert!(voice.0.is_empty());
    }

    #[test]
    fn retries_then_gives_up_as_unknown() {
        let mut recognizer = ScriptedRecognizer::new(["", "   ", "too late"]);
        let mut voice = Transcript::default();
        let reply = listen(&mut recognizer, &mut voice, Language::Russian, 2);
        assert_eq!(reply, Reply::Unknown);
        assert_eq!(reply.text(), "unknown");
        assert_eq!(voice.0, vec![phrase(Language::Russian, PhraseKey::Reask); 2]);
        assert_eq!(recognizer.remaining(), 1);
    }

    #[test]
    fn second_attempt_can_succeed() {
        let mut recognizer = ScriptedRecognizer::new(["", "no"]);
        let mut voice = Transcript::default();
        let reply = listen(&mut recognizer, &mut voice, Language::English, 2);
        assert_eq!(reply.text(), "no");
        assert_eq!(voice.0.len(), 1);
    }

    #[test]
    fn service_error_stops_without_retry() {
        let mut recognizer = ScriptedRecognizer::new(["!error", "yes"]);
        let mut voice = Transcript::default();
        let reply = listen(&mut recognizer, &mut voice, Language::English, 2);
        assert_eq!(reply, Reply::Error);
        assert_eq!(voice.0, vec![phrase(Language::English, PhraseKey::ServiceError)]);
        assert_eq!(recognizer.remaining(), 1);
    }
}
