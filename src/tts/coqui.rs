use crate::config::TtsConfig;
use crate::language::Language;
use crate::tts::provider::TtsBackend;
use anyhow::{bail, Context};
use reqwest::blocking::Client;
use std::time::Duration;

/// A Coqui `tts-server` hosting a multilingual model such as `your_tts`.
pub struct CoquiBackend;

impl CoquiBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn endpoint(base_url: &str) -> String {
        format!("{}/api/tts", base_url.trim_end_matches('/'))
    }
}

impl Default for CoquiBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TtsBackend for CoquiBackend {
    fn name(&self) -> &str {
        "coqui"
    }

    fn synthesize(&self, text: &str, language: Language, config: &TtsConfig) -> anyhow::Result<Vec<u8>> {
        let base_url = config
            .coqui
            .url
            .as_deref()
            .context("coqui backend requires tts.coqui.url")?;
        let language_id = config
            .coqui
            .languages
            .get(&language)
            .map(String::as_str)
            .unwrap_or(language.code());
        let speaker = config.coqui.speaker.as_deref().unwrap_or("");

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .context("build coqui client")?;

        tracing::debug!(language_id, speaker, "requesting coqui synthesis");
        let response = client
            .get(Self::endpoint(base_url))
            .query(&[
                ("text", text),
                ("speaker_id", speaker),
                ("style_wav", ""),
                ("language_id", language_id),
            ])
            .send()
            .with_context(|| format!("request coqui server at {base_url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("coqui server returned {status}: {body}");
        }
        let audio = response.bytes().context("read coqui audio")?;
        if !audio.starts_with(b"RIFF") {
            bail!("coqui server did not return wav audio");
        }
        Ok(audio.to_vec())
    }

    fn extension(&self) -> &'static str {
        "wav"
    }
}
