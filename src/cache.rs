//! Incremental transform cache.
//!
//! One JSON entry per file, keyed by a content hash over mode + source.
//! Entries carry the generated rules so a build-mode hit can replay them
//! into the collector without re-running the pipeline. Reads invalidate
//! corrupt entries; writes are best-effort.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

use crate::transform::{Mode, TransformOutput};

#[derive(Serialize, Deserialize)]
pub struct CacheEntry {
    pub hash: String,
    pub output: TransformOutput,
}

pub struct TransformCache {
    cache_dir: PathBuf,
}

impl TransformCache {
    pub fn new() -> Self {
        TransformCache::with_dir(PathBuf::from(".nicecss/cache"))
    }

    pub fn with_dir(cache_dir: PathBuf) -> Self {
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).ok();
        }
        TransformCache { cache_dir }
    }

    pub fn compute_hash(source: &str, mode: Mode) -> String {
        let mut hasher = Sha256::new();
        hasher.update(mode.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn cache_path(&self, file_path: &str) -> PathBuf {
        // Stable file name for the cache entry
        let safe_name = file_path
            .replace("/", "_")
            .replace("\\", "_")
            .replace(":", "_");
        self.cache_dir.join(format!("{}.json", safe_name))
    }

    pub fn get(&self, file_path: &str, source: &str, mode: Mode) -> Option<TransformOutput> {
        let cache_path = self.cache_path(file_path);
        if !cache_path.exists() {
            return None;
        }

        let data = fs::read_to_string(&cache_path).ok()?;
        let entry: CacheEntry = match serde_json::from_str(&data) {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!(
                    "[nicecss] cache deserialization failed for {}: {}",
                    file_path, e
                );
                // Invalidate corrupt cache file
                fs::remove_file(cache_path).ok();
                return None;
            }
        };

        if entry.hash == Self::compute_hash(source, mode) {
            Some(entry.output)
        } else {
            None
        }
    }

    pub fn set(&self, file_path: &str, source: &str, mode: Mode, output: &TransformOutput) {
        let entry = CacheEntry {
            hash: Self::compute_hash(source, mode),
            output: output.clone(),
        };

        if let Ok(data) = serde_json::to_string(&entry) {
            fs::write(self.cache_path(file_path), data).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache(tag: &str) -> (TransformCache, PathBuf) {
        let dir = std::env::temp_dir().join(format!("nicecss-cache-{}-{}", tag, std::process::id()));
        (TransformCache::with_dir(dir.clone()), dir)
    }

    fn sample_output() -> TransformOutput {
        TransformOutput {
            code: "export const Box = 1;".to_string(),
            warnings: vec![],
            rules: vec![".Box-box { color: red; }".to_string()],
        }
    }

    #[test]
    fn test_round_trip_hit() {
        let (cache, dir) = temp_cache("hit");
        cache.set("src/Box.jsx", "source text", Mode::Build, &sample_output());

        let hit = cache.get("src/Box.jsx", "source text", Mode::Build).unwrap();
        assert_eq!(hit.code, "export const Box = 1;");
        assert_eq!(hit.rules.len(), 1);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_changed_source_misses() {
        let (cache, dir) = temp_cache("miss");
        cache.set("src/Box.jsx", "source text", Mode::Build, &sample_output());

        assert!(cache.get("src/Box.jsx", "edited text", Mode::Build).is_none());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_mode_partitions_entries() {
        let (cache, dir) = temp_cache("mode");
        cache.set("src/Box.jsx", "source text", Mode::Build, &sample_output());

        // Hash covers the mode, so a dev lookup of a build entry misses.
        assert!(cache.get("src/Box.jsx", "source text", Mode::Dev).is_none());

        fs::remove_dir_all(dir).ok();
    }
}
