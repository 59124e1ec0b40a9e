use crate::call_log::LogFormat;
use crate::dialogue::Script;
use crate::intent::Intent;
use crate::language::Language;
use anyhow::{bail, Context};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_STT_KEY_ENV: &str = "COLLECTIONS_BOT_STT_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tts: TtsConfig,
    #[serde(default)]
    pub stt: SttConfig,
    #[serde(default)]
    pub call: CallConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub intents: IntentsConfig,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub cache_max_mb: Option<u64>,
    #[serde(default)]
    pub cache_max_entries: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub system: SystemTtsConfig,
    #[serde(default)]
    pub gtts: GttsConfig,
    #[serde(default)]
    pub coqui: CoquiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SystemTtsConfig {
    pub program: Option<String>,
    #[serde(default)]
    pub voices: HashMap<Language, String>,
    pub rate: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GttsConfig {
    pub endpoint: Option<String>,
    #[serde(default)]
    pub slow: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CoquiConfig {
    pub url: Option<String>,
    pub speaker: Option<String>,
    #[serde(default)]
    pub languages: HashMap<Language, String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SttBackendKind {
    #[default]
    Google,
    Console,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    #[serde(default)]
    pub backend: SttBackendKind,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_record_seconds")]
    pub record_seconds: u64,
    #[serde(default)]
    pub recorder: RecorderConfig,
}

/// External command that records one utterance into `{output}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallConfig {
    #[serde(default = "default_client_id")]
    pub client_id: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_help_hold_seconds")]
    pub help_hold_seconds: u64,
    #[serde(default)]
    pub default_language: Language,
    #[serde(default)]
    pub script: Script,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntentsConfig {
    #[serde(default)]
    pub extra_keywords: HashMap<Intent, Vec<String>>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = Self::project_path() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        if let Ok(path) = Self::default_path() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config at {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parse config at {}", path.display()))?;
        config.apply_defaults();
        Ok(config)
    }

    pub fn init_default() -> anyhow::Result<PathBuf> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config = Self::default();
        fs::write(&path, serde_json::to_string_pretty(&config)?)?;
        Ok(path)
    }

    pub fn default_path() -> anyhow::Result<PathBuf> {
        let base = BaseDirs::new().context("unable to resolve home directory")?;
        Ok(base.config_dir().join("collections-bot").join("config.json"))
    }

    pub fn default_cache_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        let base = BaseDirs::new().context("unable to resolve home directory")?;
        Ok(base.cache_dir().join("collections-bot"))
    }

    pub fn cache_limits(&self) -> (u64, usize) {
        let max_mb = self.cache_max_mb.unwrap_or(100);
        let max_entries = self.cache_max_entries.unwrap_or(1000);
        (max_mb * 1024 * 1024, max_entries)
    }

    pub fn tts_backend(&self) -> &str {
        self.tts.backend.as_deref().unwrap_or("system")
    }

    pub fn stt_api_key(&self) -> Option<String> {
        if let Some(key) = self.stt.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }
        let var = self
            .stt
            .api_key_env
            .as_deref()
            .unwrap_or(DEFAULT_STT_KEY_ENV);
        std::env::var(var).ok().filter(|k| !k.is_empty())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            bail!("volume must be between 0.0 and 1.0");
        }

        match self.tts_backend() {
            "system" | "gtts" | "coqui" | "silent" => {}
            other => bail!("unsupported tts backend: {other}"),
        }

        if self.tts_backend() == "coqui" && self.tts.coqui.url.is_none() {
            bail!("coqui backend requires tts.coqui.url to be set");
        }

        if self.call.retries == 0 {
            bail!("call.retries must be at least 1");
        }

        if self.stt.sample_rate == 0 {
            bail!("stt.sample_rate must be greater than 0");
        }

        if self.stt.backend == SttBackendKind::Google && self.stt.recorder.program.trim().is_empty()
        {
            bail!("stt.recorder.program must be set for the google backend");
        }

        if let Some(max_mb) = self.cache_max_mb {
            if max_mb == 0 {
                bail!("cache_max_mb must be greater than 0");
            }
        }

        if let Some(max_entries) = self.cache_max_entries {
            if max_entries == 0 {
                bail!("cache_max_entries must be greater than 0");
            }
        }

        Ok(())
    }

    fn apply_defaults(&mut self) {
        if self.tts.backend.is_none() {
            self.tts.backend = Some("system".to_string());
        }

        for language in Language::ALL {
            self.tts
                .system
                .voices
                .entry(language)
                .or_insert_with(|| default_system_voice(language).to_string());
            self.tts
                .coqui
                .languages
                .entry(language)
                .or_insert_with(|| default_coqui_language(language).to_string());
        }

        if self.cache_max_mb.is_none() {
            self.cache_max_mb = Some(100);
        }

        if self.cache_max_entries.is_none() {
            self.cache_max_entries = Some(1000);
        }
    }

    fn project_path() -> Option<PathBuf> {
        Some(PathBuf::from("collections-bot.json"))
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self {
            tts: TtsConfig::default(),
            stt: SttConfig::default(),
            call: CallConfig::default(),
            log: LogConfig::default(),
            intents: IntentsConfig::default(),
            volume: default_volume(),
            player: None,
            cache_dir: None,
            cache_max_mb: Some(100),
            cache_max_entries: Some(1000),
        };
        config.apply_defaults();
        config
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            backend: Some("system".to_string()),
            timeout_seconds: default_timeout_seconds(),
            system: SystemTtsConfig::default(),
            gtts: GttsConfig::default(),
            coqui: CoquiConfig::default(),
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            backend: SttBackendKind::default(),
            endpoint: None,
            api_key: None,
            api_key_env: None,
            sample_rate: default_sample_rate(),
            timeout_seconds: default_timeout_seconds(),
            record_seconds: default_record_seconds(),
            recorder: RecorderConfig::default(),
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        // sox: start on speech, stop after 1.5s of silence, cap at {seconds}
        let args = [
            "-q", "-c", "1", "-r", "{rate}", "-b", "16", "{output}", "silence", "1", "0.1", "1%",
            "1", "1.5", "1%", "trim", "0", "{seconds}",
        ];
        Self {
            program: "rec".to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            retries: default_retries(),
            help_hold_seconds: default_help_hold_seconds(),
            default_language: Language::default(),
            script: Script::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            format: LogFormat::default(),
        }
    }
}

fn default_system_voice(language: Language) -> &'static str {
    match language {
        Language::English => "en+m3",
        Language::Russian => "ru+m3",
        Language::Uzbek => "uz+m3",
    }
}

fn default_coqui_language(language: Language) -> &'static str {
    match language {
        Language::English => "en",
        Language::Russian => "ru",
        Language::Uzbek => "uz",
    }
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_record_seconds() -> u64 {
    10
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_volume() -> f32 {
    0.8
}

fn default_client_id() -> u64 {
    10001
}

fn default_retries() -> u32 {
    2
}

fn default_help_hold_seconds() -> u64 {
    5
}

fn default_log_path() -> PathBuf {
    PathBuf::from("call_logs.csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn partial_json_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.json");
        fs::write(&path, r#"{"call":{"retries":3},"tts":{"backend":"gtts"}}"#).unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.call.retries, 3);
        assert_eq!(config.call.client_id, 10001);
        assert_eq!(config.call.help_hold_seconds, 5);
        assert_eq!(config.tts_backend(), "gtts");
        assert_eq!(config.tts.system.voices[&Language::Russian], "ru+m3");
        assert_eq!(config.log.path, PathBuf::from("call_logs.csv"));
    }

    #[test]
    fn coqui_requires_url() {
        let mut config = Config::default();
        config.tts.backend = Some("coqui".to_string());
        assert!(config.validate().is_err());
        config.tts.coqui.url = Some("http://localhost:5002".to_string());
        config.validate().unwrap();
    }

    #[test]
    fn rejects_zero_retries_and_unknown_backend() {
        let mut config = Config::default();
        config.call.retries = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.tts.backend = Some("festival".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_api_key_wins() {
        let mut config = Config::default();
        config.stt.api_key = Some("abc".to_string());
        assert_eq!(config.stt_api_key().as_deref(), Some("abc"));
    }
}
