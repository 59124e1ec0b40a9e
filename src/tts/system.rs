use crate::config::TtsConfig;
use crate::language::Language;
use crate::tts::provider::TtsBackend;
use anyhow::{bail, Context};
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Local speech engine run as a child process: espeak-ng, or `say` on macOS.
pub struct SystemTtsBackend;

impl SystemTtsBackend {
    pub fn new() -> Self {
        Self
    }

    pub fn default_program() -> &'static str {
        if cfg!(target_os = "macos") {
            "say"
        } else {
            "espeak-ng"
        }
    }

    pub fn command_args(
        program: &str,
        output: &Path,
        voice: Option<&str>,
        rate: Option<u32>,
        text: &str,
    ) -> Vec<String> {
        let is_say = Path::new(program)
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n == "say")
            .unwrap_or(false);

        let mut args = Vec::new();
        if is_say {
            args.push("-o".to_string());
            args.push(output.display().to_string());
            args.push("--data-format=LEI16@22050".to_string());
            // espeak voice variants like "en+m3" mean nothing to `say`
            if let Some(voice) = voice.filter(|v| !v.contains('+')) {
                args.push("-v".to_string());
                args.push(voice.to_string());
            }
            if let Some(rate) = rate {
                args.push("-r".to_string());
                args.push(rate.to_string());
            }
        } else {
            args.push("-w".to_string());
            args.push(output.display().to_string());
            if let Some(voice) = voice {
                args.push("-v".to_string());
                args.push(voice.to_string());
            }
            if let Some(rate) = rate {
                args.push("-s".to_string());
                args.push(rate.to_string());
            }
        }
        args.push(text.to_string());
        args
    }
}

impl Default for SystemTtsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TtsBackend for SystemTtsBackend {
    fn name(&self) -> &str {
        "system"
    }

    fn synthesize(&self, text: &str, language: Language, config: &TtsConfig) -> anyhow::Result<Vec<u8>> {
        let program = config
            .system
            .program
            .as_deref()
            .unwrap_or(Self::default_program());
        let voice = config.system.voices.get(&language).map(String::as_str);

        let output = tempfile::Builder::new()
            .suffix(".wav")
            .tempfile()
            .context("create temp wav")?;
        let args = Self::command_args(program, output.path(), voice, config.system.rate, text);

        let mut cmd = Command::new(program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());
        run_with_timeout(cmd, program, config.timeout_seconds)?;

        let audio = fs::read(output.path()).context("read synthesized wav")?;
        if audio.is_empty() {
            bail!("{program} produced no audio");
        }
        Ok(audio)
    }

    fn extension(&self) -> &'static str {
        "wav"
    }
}

/// Waits for the engine, killing it once `timeout_seconds` pass. Zero waits
/// forever.
fn run_with_timeout(mut cmd: Command, program: &str, timeout_seconds: u64) -> anyhow::Result<()> {
    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawn {program}"))?;

    let deadline = Duration::from_secs(timeout_seconds);
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().context("poll speech engine")? {
            if !status.success() {
                bail!("{program} exited with status {status}");
            }
            return Ok(());
        }

        if timeout_seconds > 0 && start.elapsed() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            bail!("{program} timed out after {timeout_seconds}s");
        }

        thread::sleep(Duration::from_millis(25));
    }
}
