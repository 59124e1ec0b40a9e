use crate::language::Language;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CALL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Log columns in the order `CallRecord` serializes them.
pub const LOG_COLUMNS: [&str; 13] = [
    "client_id",
    "result",
    "comment",
    "language",
    "name",
    "age",
    "notification",
    "channel",
    "payment_status",
    "intent",
    "call_time",
    "history_confirmation",
    "response",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Fail,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Fail => "fail",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One row of the call log. Fields a script never asks about stay empty so
/// every row has the same columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub client_id: u64,
    pub result: Outcome,
    pub comment: String,
    pub language: Language,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub notification: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub intent: String,
    pub call_time: String,
    #[serde(default)]
    pub history_confirmation: String,
    #[serde(default)]
    pub response: String,
}

impl CallRecord {
    pub fn new(
        client_id: u64,
        result: Outcome,
        comment: impl Into<String>,
        language: Language,
        started_at: DateTime<Local>,
    ) -> Self {
        Self {
            client_id,
            result,
            comment: comment.into(),
            language,
            name: String::new(),
            age: String::new(),
            notification: String::new(),
            channel: String::new(),
            payment_status: String::new(),
            intent: String::new(),
            call_time: started_at.format(CALL_TIME_FORMAT).to_string(),
            history_confirmation: String::new(),
            response: String::new(),
        }
    }

    /// A call that stopped before the questionnaire finished.
    pub fn early_exit(
        client_id: u64,
        language: Language,
        comment: impl Into<String>,
        started_at: DateTime<Local>,
    ) -> Self {
        Self::new(client_id, Outcome::Fail, comment, language, started_at)
    }
}
