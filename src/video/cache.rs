//! VideoCache - persistent disk cache for generated videos.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Errors from the on-disk video cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("No cache directory available on this platform")]
    NoCacheDir,

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistent disk cache of downloaded videos, keyed by prompt.
pub struct VideoCache {
    cache_dir: PathBuf,
}

impl VideoCache {
    /// Create a new VideoCache with the given cache directory.
    /// Does not create the directory - call `ensure_dir_exists()` to create it.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Create a VideoCache with the default cache directory.
    /// Default: ~/.cache/viralflow/videos/
    pub fn with_default_dir() -> Result<Self, CacheError> {
        let cache_dir = dirs::cache_dir()
            .ok_or(CacheError::NoCacheDir)?
            .join("viralflow")
            .join("videos");
        Ok(Self::new(cache_dir))
    }

    /// Ensure the cache directory exists, creating it if necessary.
    pub fn ensure_dir_exists(&self) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.cache_dir)?;
        Ok(())
    }

    /// Get cached video by prompt hash, if exists.
    pub fn get(&self, prompt: &str) -> Option<PathBuf> {
        let video_path = self.video_path(prompt);
        video_path.is_file().then_some(video_path)
    }

    /// Store video bytes under the prompt hash, replacing any earlier entry.
    pub fn store(&self, prompt: &str, bytes: &[u8]) -> Result<PathBuf, CacheError> {
        self.ensure_dir_exists()?;
        let cached_path = self.video_path(prompt);
        std::fs::write(&cached_path, bytes)?;
        log::debug!("Cached video at {}", cached_path.display());
        Ok(cached_path)
    }

    /// Store and then trim the cache to `max_size_mb`.
    pub fn store_with_cleanup(
        &self,
        prompt: &str,
        bytes: &[u8],
        max_size_mb: u64,
    ) -> Result<PathBuf, CacheError> {
        let cached_path = self.store(prompt, bytes)?;
        self.cleanup_if_needed(max_size_mb)?;
        Ok(cached_path)
    }

    /// Generate deterministic SHA256 hash for prompt.
    /// Returns a 32-character hex string (first 16 bytes of SHA256).
    pub fn hash_prompt(prompt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(prompt.as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..16])
    }

    /// Get the cache directory path.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn video_path(&self, prompt: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.mp4", Self::hash_prompt(prompt)))
    }

    /// Remove old files if cache exceeds max size.
    /// Deletes oldest files first (by modification time) until under limit.
    pub fn cleanup_if_needed(&self, max_size_mb: u64) -> Result<(), CacheError> {
        let max_size_bytes = max_size_mb * 1024 * 1024;

        if !self.cache_dir.exists() {
            return Ok(());
        }

        let mut files: Vec<(PathBuf, std::fs::Metadata)> = Vec::new();
        let mut total_size: u64 = 0;

        for entry in std::fs::read_dir(&self.cache_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) == Some("mp4") {
                if let Ok(metadata) = entry.metadata() {
                    if metadata.is_file() {
                        total_size += metadata.len();
                        files.push((path, metadata));
                    }
                }
            }
        }

        if total_size <= max_size_bytes {
            return Ok(());
        }

        // Oldest first
        files.sort_by_key(|(_, metadata)| {
            metadata
                .modified()
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });

        for (path, metadata) in files {
            if total_size <= max_size_bytes {
                break;
            }
            if std::fs::remove_file(&path).is_ok() {
                log::debug!("Evicted cached video {}", path.display());
                total_size = total_size.saturating_sub(metadata.len());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_dir_path_structure() {
        if let Ok(cache) = VideoCache::with_default_dir() {
            assert!(cache.cache_dir().ends_with("viralflow/videos"));
        }
    }

    #[test]
    fn test_hash_prompt_deterministic() {
        let prompt = "a day in the life of a barista";
        assert_eq!(VideoCache::hash_prompt(prompt), VideoCache::hash_prompt(prompt));
        assert_ne!(
            VideoCache::hash_prompt(prompt),
            VideoCache::hash_prompt("another script")
        );
    }

    #[test]
    fn test_hash_prompt_is_filesystem_safe() {
        let hash = VideoCache::hash_prompt("SCRIPT:\n#viral !@#$%");
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash.len(), 32);
    }

    #[test]
    fn test_store_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VideoCache::new(temp_dir.path().join("cache"));

        assert!(cache.get("prompt").is_none());
        let cached_path = cache.store("prompt", b"fake mp4").unwrap();

        assert_eq!(cache.get("prompt"), Some(cached_path.clone()));
        assert_eq!(fs::read(&cached_path).unwrap(), b"fake mp4");
    }

    #[test]
    fn test_store_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VideoCache::new(temp_dir.path().to_path_buf());

        cache.store("same", b"content 1").unwrap();
        let cached_path = cache.store("same", b"content 2").unwrap();
        assert_eq!(fs::read(cached_path).unwrap(), b"content 2");
    }

    #[test]
    fn test_cleanup_removes_until_under_limit() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VideoCache::new(temp_dir.path().to_path_buf());
        let big = vec![0u8; 600 * 1024];

        cache.store("first", &big).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        cache.store_with_cleanup("second", &big, 1).unwrap();

        assert!(cache.get("first").is_none());
        assert!(cache.get("second").is_some());
    }

    #[test]
    fn test_cleanup_ignores_non_video_files() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VideoCache::new(temp_dir.path().to_path_buf());
        let notes = temp_dir.path().join("notes.txt");
        fs::write(&notes, vec![0u8; 2 * 1024 * 1024]).unwrap();

        cache.cleanup_if_needed(1).unwrap();
        assert!(notes.exists());
    }
}
