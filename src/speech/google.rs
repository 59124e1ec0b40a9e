use super::recorder::Recorder;
use super::{Echo, SpeechRecognizer, SttError};
use crate::config::Config;
use crate::language::Language;
use anyhow::Context;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://www.google.com/speech-api/v2/recognize";

/// Records an utterance locally and sends it to the Google speech v2 API.
pub struct GoogleRecognizer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    recorder: Recorder,
    sample_rate: u32,
    record_seconds: u64,
    echo: Echo,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    result: Vec<RecognizeResult>,
}

#[derive(Debug, Deserialize)]
struct RecognizeResult {
    #[serde(default)]
    alternative: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    confidence: Option<f64>,
}

impl GoogleRecognizer {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.stt.timeout_seconds.max(1)))
            .build()
            .context("build speech client")?;
        let api_key = config.stt_api_key();
        if api_key.is_none() {
            tracing::warn!("no speech api key configured; requests may be rejected");
        }

        Ok(Self {
            client,
            endpoint: config
                .stt
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key,
            recorder: Recorder::from_config(&config.stt.recorder),
            sample_rate: config.stt.sample_rate,
            record_seconds: config.stt.record_seconds,
            echo: Echo::default(),
        })
    }

    pub fn with_echo(mut self, echo: Echo) -> Self {
        self.echo = echo;
        self
    }

    fn transcribe(&self, pcm: Vec<u8>, sample_rate: u32, language: Language) -> Result<String, SttError> {
        let mut query = vec![("client", "chromium".to_string()), ("lang", language.locale().to_string())];
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .query(&query)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("audio/l16; rate={sample_rate}"),
            )
            .body(pcm)
            .send()
            .map_err(|err| SttError::Service(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| SttError::Service(err.to_string()))?;
        if !status.is_success() {
            return Err(SttError::Service(format!("speech api returned {status}: {body}")));
        }

        parse_transcript(&body).ok_or(SttError::Unrecognized)
    }
}

impl SpeechRecognizer for GoogleRecognizer {
    fn name(&self) -> &str {
        "google"
    }

    fn recognize(&mut self, language: Language) -> Result<String, SttError> {
        self.echo.line("Listening...");
        let utterance = self
            .recorder
            .record(self.sample_rate, self.record_seconds)
            .map_err(|err| SttError::Service(format!("{err:#}")))?;
        if utterance.is_empty() {
            return Err(SttError::Unrecognized);
        }

        let text = self.transcribe(utterance.to_le_bytes(), utterance.sample_rate, language)?;
        self.echo.line(&format!("User: {text}"));
        Ok(text)
    }
}

/// The API answers with one JSON object per line; the first is usually an
/// empty result. Takes the first non-empty result and prefers the alternative
/// carrying a confidence score.
pub fn parse_transcript(body: &str) -> Option<String> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<RecognizeResponse>(line).ok())
        .find_map(|response| response.result.into_iter().next())
        .and_then(|result| {
            let mut alternatives = result.alternative;
            let index = alternatives
                .iter()
                .position(|a| a.confidence.is_some())
                .unwrap_or(0);
            (index < alternatives.len()).then(|| alternatives.swap_remove(index))
        })
        .map(|alternative| alternative.transcript.trim().to_string())
        .filter(|transcript| !transcript.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_non_empty_result() {
        let body = concat!(
            "{\"result\":[]}\n",
            "{\"result\":[{\"alternative\":[{\"transcript\":\"yes I paid\"},",
            "{\"transcript\":\"yes I paid it\",\"confidence\":0.92}],\"final\":true}],\"result_index\":0}\n"
        );
        assert_eq!(parse_transcript(body).as_deref(), Some("yes I paid it"));
    }

    #[test]
    fn falls_back_to_first_alternative() {
        let body = r#"{"result":[{"alternative":[{"transcript":"нет"},{"transcript":"нет ещё"}]}]}"#;
        assert_eq!(parse_transcript(body).as_deref(), Some("нет"));
    }

    #[test]
    fn empty_response_is_none() {
        assert_eq!(parse_transcript("{\"result\":[]}\n"), None);
        assert_eq!(parse_transcript(""), None);
        assert_eq!(parse_transcript("not json"), None);
    }
}
