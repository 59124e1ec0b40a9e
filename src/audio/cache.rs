use anyhow::Context;
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::PathBuf;

/// Rendered prompts on disk, evicted oldest-first once over either limit.
#[derive(Debug, Clone)]
pub struct AudioCache {
    pub dir: PathBuf,
    pub max_size_bytes: u64,
    pub max_entries: usize,
}

impl AudioCache {
    pub fn new(dir: PathBuf, max_size_bytes: u64, max_entries: usize) -> Self {
        Self {
            dir,
            max_size_bytes,
            max_entries,
        }
    }

    pub fn key(backend: &str, language: &str, text: &str, config_json: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        for part in [backend, language, text, config_json] {
            hasher.update(part.as_bytes());
            hasher.update(b"\0");
        }
        hasher.finalize().to_hex().to_string()
    }

    pub fn get(&self, key: &str, extension: &str) -> Option<Vec<u8>> {
        let path = self.path_for_key(key, extension);
        let data = fs::read(&path).ok()?;
        let _ = set_file_mtime(&path, FileTime::now());
        Some(data)
    }

    pub fn contains(&self, key: &str, extension: &str) -> bool {
        self.path_for_key(key, extension).is_file()
    }

    pub fn put(&self, key: &str, extension: &str, audio: &[u8]) -> anyhow::Result<()> {
        if audio.is_empty() || audio.len() as u64 > self.max_size_bytes {
            return Ok(());
        }

        fs::create_dir_all(&self.dir).context("create cache dir")?;
        let path = self.path_for_key(key, extension);
        let tmp = self.dir.join(format!("{key}.tmp"));

        fs::write(&tmp, audio).context("write cache temp")?;
        fs::rename(&tmp, &path).context("rename cache file")?;

        self.prune()
    }

    fn path_for_key(&self, key: &str, extension: &str) -> PathBuf {
        self.dir.join(format!("{key}.{extension}"))
    }

    fn prune(&self) -> anyhow::Result<()> {
        if !self.dir.is_dir() {
            return Ok(());
        }

        let mut entries = Vec::new();
        let mut total_size = 0u64;

        for entry in fs::read_dir(&self.dir).context("read cache dir")? {
            let entry = entry?;
            let path = entry.path();
            match path.extension().and_then(|e| e.to_str()) {
                Some("wav") | Some("mp3") => {}
                _ => continue,
            }
            let meta = entry.metadata()?;
            let size = meta.len();
            total_size += size;
            let mtime = FileTime::from_last_modification_time(&meta);
            entries.push((path, mtime, size));
        }

        entries.sort_by_key(|(_, mtime, _)| (mtime.seconds(), mtime.nanoseconds()));

        let mut current_entries = entries.len();
        let mut current_size = total_size;

        for (path, _mtime, size) in entries {
            if current_size <= self.max_size_bytes && current_entries <= self.max_entries {
                break;
            }
            let _ = fs::remove_file(&path);
            current_size = current_size.saturating_sub(size);
            current_entries = current_entries.saturating_sub(1);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_depends_on_language() {
        let en = AudioCache::key("gtts", "en", "Goodbye!", "{}");
        let ru = AudioCache::key("gtts", "ru", "Goodbye!", "{}");
        assert_ne!(en, ru);
        assert_eq!(en, AudioCache::key("gtts", "en", "Goodbye!", "{}"));
    }

    #[test]
    fn round_trips_and_skips_empty_audio() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioCache::new(dir.path().to_path_buf(), 1024, 10);

        cache.put("a", "mp3", b"ID3 data").unwrap();
        cache.put("b", "wav", b"").unwrap();

        assert_eq!(cache.get("a", "mp3").as_deref(), Some(&b"ID3 data"[..]));
        assert!(cache.get("a", "wav").is_none());
        assert!(!cache.contains("b", "wav"));
    }

    #[test]
    fn evicts_oldest_over_entry_limit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioCache::new(dir.path().to_path_buf(), 1024, 2);

        cache.put("first", "wav", b"1").unwrap();
        set_file_mtime(dir.path().join("first.wav"), FileTime::from_unix_time(1, 0)).unwrap();
        cache.put("second", "wav", b"2").unwrap();
        cache.put("third", "wav", b"3").unwrap();

        assert!(!cache.contains("first", "wav"));
        assert!(cache.contains("second", "wav"));
        assert!(cache.contains("third", "wav"));
    }
}
