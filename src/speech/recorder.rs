use crate::config::RecorderConfig;
use anyhow::{bail, Context};
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs the configured recording command for one utterance.
#[derive(Debug, Clone)]
pub struct Recorder {
    program: String,
    args: Vec<String>,
}

/// 16-bit mono PCM as read back from the recorder's WAV output.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl Utterance {
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Recorder {
    pub fn from_config(config: &RecorderConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    /// Arguments with `{output}`, `{rate}` and `{seconds}` filled in.
    pub fn expand_args(&self, output: &Path, sample_rate: u32, seconds: u64) -> Vec<String> {
        let output = output.display().to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{output}", &output)
                    .replace("{rate}", &sample_rate.to_string())
                    .replace("{seconds}", &seconds.to_string())
            })
            .collect()
    }

    pub fn record(&self, sample_rate: u32, seconds: u64) -> anyhow::Result<Utterance> {
        let temp = tempfile::Builder::new()
            .prefix("utterance-")
            .suffix(".wav")
            .tempfile()
            .context("create temp recording")?;
        let args = self.expand_args(temp.path(), sample_rate, seconds);

        tracing::debug!(program = %self.program, ?args, "recording");
        let status = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("run recorder {}", self.program))?;
        if !status.success() {
            bail!("{} exited with status {status}", self.program);
        }

        read_wav(temp.path())
    }
}

pub fn read_wav(path: &Path) -> anyhow::Result<Utterance> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("open recording {}", path.display()))?;
    let spec = reader.spec();
    if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        bail!(
            "recording must be 16-bit integer PCM, got {} bits {:?}",
            spec.bits_per_sample,
            spec.sample_format
        );
    }

    let channels = spec.channels.max(1) as usize;
    let interleaved = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .context("read recording samples")?;
    // keep the first channel only
    let samples = interleaved.into_iter().step_by(channels).collect();

    Ok(Utterance {
        samples,
        sample_rate: spec.sample_rate,
    })
}
