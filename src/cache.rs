use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

use crate::options::LiftOptions;
use crate::pass::TransformResult;

#[derive(Serialize, Deserialize)]
pub struct CacheEntry {
    pub hash: String,
    /// Fingerprint of the session options the entry was produced under.
    pub options: String,
    pub result: TransformResult,
}

/// Content-hash keyed incremental cache: a file whose source and session
/// options are unchanged since the last session short-circuits to its
/// previous transform result.
pub struct TransformCache {
    cache_dir: PathBuf,
}

impl TransformCache {
    pub fn new() -> Self {
        let cache_dir = PathBuf::from(".scope-lift/cache");
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).ok();
        }
        Self { cache_dir }
    }

    pub fn compute_hash(source: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Stable fingerprint of the session options. Entries cached under one
    /// configuration are never served to another; `LiftOptions` serializes
    /// with ordered collections, so the JSON is deterministic.
    pub fn options_fingerprint(options: &LiftOptions) -> String {
        let json = serde_json::to_string(options).unwrap_or_default();
        Self::compute_hash(&json)
    }

    fn get_cache_path(&self, file_path: &str) -> PathBuf {
        // Create a stable file name for the cache entry
        let safe_name = file_path
            .replace("/", "_")
            .replace("\\", "_")
            .replace(":", "_");
        self.cache_dir.join(format!("{}.json", safe_name))
    }

    pub fn get(
        &self,
        file_path: &str,
        source: &str,
        options_fingerprint: &str,
    ) -> Option<TransformResult> {
        let cache_path = self.get_cache_path(file_path);
        if !cache_path.exists() {
            return None;
        }

        let data = match fs::read_to_string(&cache_path) {
            Ok(d) => d,
            Err(_) => return None,
        };

        let entry: CacheEntry = match serde_json::from_str(&data) {
            Ok(e) => e,
            Err(_) => {
                // Invalidate corrupt cache file
                fs::remove_file(cache_path).ok();
                return None;
            }
        };

        let current_hash = Self::compute_hash(source);
        if entry.hash == current_hash && entry.options == options_fingerprint {
            Some(entry.result)
        } else {
            None
        }
    }

    pub fn set(
        &self,
        file_path: &str,
        source: &str,
        options_fingerprint: &str,
        result: &TransformResult,
    ) {
        let cache_path = self.get_cache_path(file_path);
        let hash = Self::compute_hash(source);
        let entry = CacheEntry {
            hash,
            options: options_fingerprint.to_string(),
            result: result.clone(),
        };

        if let Ok(data) = serde_json::to_string(&entry) {
            fs::write(cache_path, data).ok();
        }
    }
}

impl Default for TransformCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::{TransformOutcome, TransformResult};

    fn unchanged_result(file: &str) -> TransformResult {
        TransformResult {
            file: file.to_string(),
            outcome: TransformOutcome::Unchanged,
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        assert_eq!(
            TransformCache::compute_hash("source"),
            TransformCache::compute_hash("source")
        );
        assert_ne!(
            TransformCache::compute_hash("source"),
            TransformCache::compute_hash("source ")
        );
    }

    #[test]
    fn test_options_fingerprint_tracks_configuration() {
        let default_print = TransformCache::options_fingerprint(&LiftOptions::default());
        assert_eq!(
            default_print,
            TransformCache::options_fingerprint(&LiftOptions::default())
        );

        let other = LiftOptions {
            module_specifiers: vec!["@other/kit".to_string()],
            ..LiftOptions::default()
        };
        assert_ne!(default_print, TransformCache::options_fingerprint(&other));
    }

    #[test]
    fn test_hit_on_unchanged_source_miss_on_edit() {
        let cache = TransformCache::new();
        let key = format!("cache-test-{}.tsx", std::process::id());
        let source = "export function Panel() {}";
        let fingerprint = TransformCache::options_fingerprint(&LiftOptions::default());

        assert!(cache.get(&key, source, &fingerprint).is_none());
        cache.set(&key, source, &fingerprint, &unchanged_result(&key));

        let hit = cache
            .get(&key, source, &fingerprint)
            .expect("unchanged source must hit");
        assert_eq!(hit.file, key);

        assert!(cache.get(&key, "export function Other() {}", &fingerprint).is_none());
    }

    #[test]
    fn test_miss_on_changed_options() {
        let cache = TransformCache::new();
        let key = format!("cache-options-test-{}.tsx", std::process::id());
        let source = "export function Panel() {}";
        let fingerprint = TransformCache::options_fingerprint(&LiftOptions::default());
        cache.set(&key, source, &fingerprint, &unchanged_result(&key));

        let other = LiftOptions {
            module_specifiers: vec!["@other/kit".to_string()],
            ..LiftOptions::default()
        };
        let other_fingerprint = TransformCache::options_fingerprint(&other);
        assert!(cache.get(&key, source, &other_fingerprint).is_none());
    }
}
