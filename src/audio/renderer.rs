use anyhow::{bail, Context};
use std::path::Path;
use std::process::Command;

pub fn default_player() -> &'static str {
    if cfg!(target_os = "macos") {
        "afplay"
    } else {
        "ffplay"
    }
}

/// Volume flags for the players we know; anything else plays at its own level.
pub fn player_args(player: &str, volume: f32) -> Vec<String> {
    let name = Path::new(player)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(player);
    match name {
        "afplay" => vec!["-v".to_string(), volume.to_string()],
        "ffplay" => vec![
            "-nodisp".to_string(),
            "-autoexit".to_string(),
            "-loglevel".to_string(),
            "quiet".to_string(),
            "-volume".to_string(),
            ((volume * 100.0).round() as u32).to_string(),
        ],
        "mpg123" => vec![
            "-q".to_string(),
            "-f".to_string(),
            ((volume * 32768.0).round() as u32).to_string(),
        ],
        _ => Vec::new(),
    }
}

pub fn play_file(path: &Path, volume: f32, player: Option<&str>) -> anyhow::Result<()> {
    let player = player.unwrap_or(default_player());
    let status = Command::new(player)
        .args(player_args(player, volume))
        .arg(path)
        .status()
        .with_context(|| format!("play audio with {player}: {}", path.display()))?;

    if !status.success() {
        bail!("{player} exited with status {status}");
    }

    Ok(())
}

pub fn play_bytes(
    bytes: &[u8],
    extension: &str,
    volume: f32,
    player: Option<&str>,
) -> anyhow::Result<()> {
    if bytes.is_empty() {
        return Ok(());
    }
    let mut temp = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .context("create temp file")?;
    std::io::Write::write_all(&mut temp, bytes).context("write audio bytes")?;
    play_file(temp.path(), volume, player)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_volume_per_player() {
        assert_eq!(player_args("afplay", 0.5), vec!["-v", "0.5"]);
        assert_eq!(player_args("/usr/bin/ffplay", 0.8).last().map(String::as_str), Some("80"));
        assert_eq!(player_args("mpg123", 1.0), vec!["-q", "-f", "32768"]);
        assert!(player_args("paplay", 0.8).is_empty());
    }

    #[test]
    fn empty_audio_is_not_played() {
        play_bytes(&[], "wav", 1.0, Some("definitely-not-a-player")).unwrap();
    }
}
