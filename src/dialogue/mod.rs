//! The call scripts: prompts, replies and the branching between them.

mod collections;
mod survey;

use crate::config::Config;
use crate::intent::{Intent, IntentClassifier, RuleSet};
use crate::language::Language;
use crate::phrases::{phrase, PhraseKey};
use crate::record::CallRecord;
use crate::speech::{self, Reply, SpeechRecognizer};
use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Anything that can say a line to the caller.
pub trait Voice {
    fn say(&mut self, language: Language, text: &str) -> anyhow::Result<()>;
}

impl<V: Voice + ?Sized> Voice for Box<V> {
    fn say(&mut self, language: Language, text: &str) -> anyhow::Result<()> {
        (**self).say(language, text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    /// Payment reminder followed by the customer questionnaire.
    #[default]
    Collections,
    /// Profile questions first, then a debt or tariff notice.
    Survey,
}

#[derive(Debug, Clone)]
pub struct CallContext {
    pub client_id: u64,
    pub started_at: DateTime<Local>,
    pub retries: u32,
    pub help_hold: Duration,
    pub default_language: Language,
    pub extra_keywords: HashMap<Intent, Vec<String>>,
}

impl CallContext {
    /// Default call settings for a call that started at `started_at`.
    pub fn new(client_id: u64, started_at: DateTime<Local>) -> Self {
        Self {
            started_at,
            ..Self::from_config(&Config::default(), Some(client_id))
        }
    }

    pub fn from_config(config: &Config, client_id: Option<u64>) -> Self {
        Self {
            client_id: client_id.unwrap_or(config.call.client_id),
            started_at: Local::now(),
            retries: config.call.retries,
            help_hold: Duration::from_secs(config.call.help_hold_seconds),
            default_language: config.call.default_language,
            extra_keywords: config.intents.extra_keywords.clone(),
        }
    }

    pub fn classifier(&self, set: RuleSet, language: Language) -> IntentClassifier {
        IntentClassifier::for_set(set, language).with_extra_keywords(&self.extra_keywords)
    }
}

pub fn run_call<V, R>(
    script: Script,
    ctx: &CallContext,
    voice: &mut V,
    recognizer: &mut R,
) -> anyhow::Result<CallRecord>
where
    V: Voice + ?Sized,
    R: SpeechRecognizer + ?Sized,
{
    tracing::info!(client_id = ctx.client_id, ?script, recognizer = recognizer.name(), "call started");
    let mut conversation = Conversation {
        ctx,
        voice,
        recognizer,
    };
    let record = match script {
        Script::Collections => collections::run(&mut conversation)?,
        Script::Survey => survey::run(&mut conversation)?,
    };
    tracing::info!(
        client_id = record.client_id,
        result = %record.result,
        comment = %record.comment,
        "call finished"
    );
    Ok(record)
}

/// One call in progress: the prompt side and the listening side together.
struct Conversation<'a, V: ?Sized, R: ?Sized> {
    ctx: &'a CallContext,
    voice: &'a mut V,
    recognizer: &'a mut R,
}

impl<V, R> Conversation<'_, V, R>
where
    V: Voice + ?Sized,
    R: SpeechRecognizer + ?Sized,
{
    fn say(&mut self, language: Language, key: PhraseKey) -> anyhow::Result<()> {
        self.say_text(language, phrase(language, key))
    }

    fn say_text(&mut self, language: Language, text: &str) -> anyhow::Result<()> {
        tracing::debug!(language = %language, text, "prompt");
        self.voice.say(language, text)
    }

    fn listen(&mut self, language: Language) -> Reply {
        speech::listen(&mut *self.recognizer, &mut *self.voice, language, self.ctx.retries)
    }

    fn ask(&mut self, language: Language, key: PhraseKey) -> anyhow::Result<Reply> {
        self.say(language, key)?;
        Ok(self.listen(language))
    }
}
