use crate::config::Config;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct ToolStatus {
    pub name: String,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu_cores: Option<usize>,
    pub speech_engines: Vec<ToolStatus>,
    pub players: Vec<ToolStatus>,
    pub recorders: Vec<ToolStatus>,
    pub stt_key_configured: bool,
}

const SPEECH_ENGINES: &[&str] = &["espeak-ng", "espeak", "say"];
const PLAYERS: &[&str] = &["afplay", "ffplay", "mpg123", "aplay"];
const RECORDERS: &[&str] = &["rec", "sox", "arecord"];

pub fn detect(config: &Config) -> SystemInfo {
    let os = std::env::consts::OS.to_string();
    let arch = std::env::consts::ARCH.to_string();
    let cpu_cores = std::thread::available_parallelism().ok().map(|n| n.get());

    SystemInfo {
        os,
        arch,
        cpu_cores,
        speech_engines: probe(SPEECH_ENGINES),
        players: probe(PLAYERS),
        recorders: probe(RECORDERS),
        stt_key_configured: config.stt_api_key().is_some(),
    }
}

fn probe(names: &[&str]) -> Vec<ToolStatus> {
    names
        .iter()
        .map(|name| ToolStatus {
            name: name.to_string(),
            path: which(name),
        })
        .collect()
}

/// Resolves a program the way a shell would: paths are checked directly,
/// bare names are searched on `PATH`.
pub fn which(program: &str) -> Option<PathBuf> {
    let candidate = PathBuf::from(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then_some(candidate);
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_none() {
        assert!(which("surely-not-installed-anywhere-1234").is_none());
        assert!(which("/nonexistent/dir/player").is_none());
    }

    #[test]
    fn reports_every_probed_tool() {
        let info = detect(&Config::default());
        assert_eq!(info.speech_engines.len(), SPEECH_ENGINES.len());
        assert_eq!(info.players.len(), PLAYERS.len());
        assert_eq!(info.recorders.len(), RECORDERS.len());
        assert!(!info.os.is_empty());
    }
}
