use super::{Echo, SpeechRecognizer, SttError};
use crate::language::Language;
use anyhow::Context;
use std::collections::VecDeque;
use std::fs;
use std::io::BufRead;
use std::path::Path;

/// Marker line in a transcript that simulates a recognition service outage.
pub const SERVICE_ERROR_MARKER: &str = "!error";

/// Reads typed replies instead of recording audio.
pub struct ConsoleRecognizer<R> {
    input: R,
    echo: Echo,
}

impl ConsoleRecognizer<std::io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(std::io::stdin().lock())
    }
}

impl<R: BufRead> ConsoleRecognizer<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            echo: Echo::default(),
        }
    }

    pub fn with_echo(mut self, echo: Echo) -> Self {
        self.echo = echo;
        self
    }
}

impl<R: BufRead> SpeechRecognizer for ConsoleRecognizer<R> {
    fn name(&self) -> &str {
        "console"
    }

    fn recognize(&mut self, language: Language) -> Result<String, SttError> {
        self.echo.prompt(&format!("You ({}): ", language.locale()));

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|err| SttError::Service(err.to_string()))?;
        if read == 0 {
            return Err(SttError::Service("input closed".to_string()));
        }

        let line = line.trim();
        if line.is_empty() {
            return Err(SttError::Unrecognized);
        }
        Ok(line.to_string())
    }
}

/// Replays canned replies in order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRecognizer {
    replies: VecDeque<String>,
}

impl ScriptedRecognizer {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
        }
    }

    /// One reply per line. Blank lines are silence.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read transcript {}", path.display()))?;
        Ok(Self::new(raw.lines().map(str::to_string)))
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn name(&self) -> &str {
        "scripted"
    }

    fn recognize(&mut self, _language: Language) -> Result<String, SttError> {
        match self.replies.pop_front() {
            Some(reply) if reply.trim() == SERVICE_ERROR_MARKER => {
                Err(SttError::Service("scripted service error".to_string()))
            }
            Some(reply) if reply.trim().is_empty() => Err(SttError::Unrecognized),
            Some(reply) => Ok(reply),
            None => Err(SttError::Unrecognized),
        }
    }
}
