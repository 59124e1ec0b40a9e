use crate::config::TtsConfig;
use crate::language::Language;
use anyhow::bail;

use super::{coqui::CoquiBackend, gtts::GttsBackend, system::SystemTtsBackend};

pub const BACKEND_NAMES: [&str; 4] = ["system", "gtts", "coqui", "silent"];

pub trait TtsBackend: Send + Sync {
    fn name(&self) -> &str;
    fn synthesize(&self, text: &str, language: Language, config: &TtsConfig) -> anyhow::Result<Vec<u8>>;
    /// File extension of the audio `synthesize` returns.
    fn extension(&self) -> &'static str;
}

pub fn select_backend(name: &str) -> anyhow::Result<Box<dyn TtsBackend>> {
    match name {
        "system" => Ok(Box::new(SystemTtsBackend::new())),
        "gtts" => Ok(Box::new(GttsBackend::new())),
        "coqui" => Ok(Box::new(CoquiBackend::new())),
        "silent" => Ok(Box::new(SilentBackend)),
        _ => bail!("unknown backend: {name}"),
    }
}

/// Console-only runs: nothing is rendered.
pub struct SilentBackend;

impl TtsBackend for SilentBackend {
    fn name(&self) -> &str {
        "silent"
    }

    fn synthesize(&self, _text: &str, _language: Language, _config: &TtsConfig) -> anyhow::Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn extension(&self) -> &'static str {
        "wav"
    }
}
