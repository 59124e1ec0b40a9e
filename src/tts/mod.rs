pub mod coqui;
pub mod gtts;
pub mod provider;
pub mod system;

use crate::audio::{cache::AudioCache, renderer};
use crate::config::Config;
use crate::dialogue::Voice;
use crate::language::Language;
use crate::phrases::{phrase, PhraseKey};
use crate::speech::Echo;
use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct BackendInfo {
    pub name: String,
    pub available: bool,
    pub network: bool,
}

#[derive(Debug, Serialize)]
pub struct BackendsInfo {
    pub backends: Vec<BackendInfo>,
    pub cache_dir: Option<PathBuf>,
}

/// Synthesized audio plus the extension a player needs to recognise it.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub audio: Vec<u8>,
    pub extension: &'static str,
}

pub fn resolve_backend_name(config: &Config, backend_override: Option<&str>) -> String {
    backend_override
        .map(str::to_string)
        .unwrap_or_else(|| config.tts_backend().to_string())
}

pub fn synthesize(
    text: &str,
    language: Language,
    config: &Config,
    backend_override: Option<&str>,
) -> anyhow::Result<Rendered> {
    let backend_name = resolve_backend_name(config, backend_override);
    let backend = provider::select_backend(&backend_name)?;
    let extension = backend.extension();

    let cache = open_cache(config)?;
    let config_json = serde_json::to_string(&config.tts).context("serialize tts config")?;
    let cache_key = AudioCache::key(&backend_name, language.code(), text, &config_json);
    if let Some(audio) = cache.get(&cache_key, extension) {
        return Ok(Rendered { audio, extension });
    }

    let audio = backend
        .synthesize(text, language, &config.tts)
        .with_context(|| format!("synthesize with {backend_name}"))?;

    if let Err(err) = cache.put(&cache_key, extension, &audio) {
        tracing::debug!(error = ?err, "cache write failed");
    }

    Ok(Rendered { audio, extension })
}

pub fn play_audio(rendered: &Rendered, config: &Config) -> anyhow::Result<()> {
    renderer::play_bytes(
        &rendered.audio,
        rendered.extension,
        config.volume,
        config.player.as_deref(),
    )
}

pub fn synthesize_and_play(
    text: &str,
    language: Language,
    config: &Config,
    backend_override: Option<&str>,
) -> anyhow::Result<()> {
    let rendered = synthesize(text, language, config, backend_override)?;
    play_audio(&rendered, config)
}

/// Renders every fixed prompt for `languages` into the cache. Returns how
/// many were synthesized and how many were already cached.
pub fn prerender(
    config: &Config,
    languages: &[Language],
    backend_override: Option<&str>,
) -> anyhow::Result<(usize, usize)> {
    let backend_name = resolve_backend_name(config, backend_override);
    let extension = provider::select_backend(&backend_name)?.extension();
    let cache = open_cache(config)?;
    let config_json = serde_json::to_string(&config.tts).context("serialize tts config")?;

    let mut rendered = 0;
    let mut skipped = 0;
    for language in languages {
        for key in PhraseKey::all().iter().filter(|k| !k.is_prefix()) {
            let text = phrase(*language, *key);
            let cache_key = AudioCache::key(&backend_name, language.code(), text, &config_json);
            if cache.contains(&cache_key, extension) {
                skipped += 1;
                continue;
            }
            tracing::info!(language = %language, key = ?key, "rendering prompt");
            synthesize(text, *language, config, Some(&backend_name))?;
            rendered += 1;
        }
    }
    Ok((rendered, skipped))
}

pub fn backends_info(config: &Config) -> BackendsInfo {
    let system_program = config
        .tts
        .system
        .program
        .clone()
        .unwrap_or_else(|| system::SystemTtsBackend::default_program().to_string());

    let backends = provider::BACKEND_NAMES
        .iter()
        .map(|name| {
            let (available, network) = match *name {
                "system" => (crate::system::which(&system_program).is_some(), false),
                "coqui" => (config.tts.coqui.url.is_some(), true),
                "gtts" => (true, true),
                _ => (true, false),
            };
            BackendInfo {
                name: name.to_string(),
                available,
                network,
            }
        })
        .collect();

    BackendsInfo {
        backends,
        cache_dir: config.default_cache_dir().ok(),
    }
}

fn open_cache(config: &Config) -> anyhow::Result<AudioCache> {
    let cache_dir = config.default_cache_dir()?;
    let (max_size_bytes, max_entries) = config.cache_limits();
    Ok(AudioCache::new(cache_dir, max_size_bytes, max_entries))
}

/// Speaks through the configured backend. Every line is also printed, so a
/// failed synthesis degrades to a console transcript instead of ending the
/// call.
pub struct TtsVoice<'a> {
    config: &'a Config,
    backend: String,
    echo: Echo,
}

impl<'a> TtsVoice<'a> {
    pub fn new(config: &'a Config, backend_override: Option<&str>) -> Self {
        Self {
            config,
            backend: resolve_backend_name(config, backend_override),
            echo: Echo::default(),
        }
    }

    pub fn with_echo(mut self, echo: Echo) -> Self {
        self.echo = echo;
        self
    }
}

impl Voice for TtsVoice<'_> {
    fn say(&mut self, language: Language, text: &str) -> anyhow::Result<()> {
        self.echo.line(&format!("Bot: {text}"));
        if self.backend == "silent" {
            return Ok(());
        }
        if let Err(err) = synthesize_and_play(text, language, self.config, Some(&self.backend)) {
            tracing::warn!(error = ?err, backend = %self.backend, "tts failed; continuing with text only");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.cache_dir = Some(dir.to_path_buf());
        config
    }

    #[test]
    fn override_beats_config_backend() {
        let config = Config::default();
        assert_eq!(resolve_backend_name(&config, None), "system");
        assert_eq!(resolve_backend_name(&config, Some("gtts")), "gtts");
    }

    #[test]
    fn silent_backend_renders_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(dir.path());
        let rendered = synthesize("Goodbye!", Language::English, &config, Some("silent")).unwrap();
        assert!(rendered.audio.is_empty());
        play_audio(&rendered, &config).unwrap();
    }

    #[test]
    fn silent_prerender_never_caches() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(dir.path());
        let (rendered, skipped) = prerender(&config, &[Language::Uzbek], Some("silent")).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(
            rendered,
            PhraseKey::all().iter().filter(|k| !k.is_prefix()).count()
        );
    }

    #[test]
    fn lists_all_backends() {
        let info = backends_info(&Config::default());
        let names: Vec<_> = info.backends.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, provider::BACKEND_NAMES);
        let coqui = info.backends.iter().find(|b| b.name == "coqui").unwrap();
        assert!(!coqui.available);
    }
}
