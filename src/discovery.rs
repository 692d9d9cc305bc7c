//! Discovery Module for the Scope-Lift Pass
//!
//! Recursively scans a directory for markup source files eligible for the
//! transform. Hosts that drive the pass file-by-file never need this; it
//! exists for pipelines that hand the whole source tree to the native side.

#[cfg(feature = "napi")]
use napi_derive::napi;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::options::LiftOptions;

/// Finds every file under `base_dir` whose extension marks it as
/// declarative markup. Plain-code files are skipped without inspection.
pub fn find_markup_files(base_dir: &Path, options: &LiftOptions) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if !base_dir.exists() {
        return files;
    }
    for entry in WalkDir::new(base_dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if let Some(path_str) = path.to_str() {
            if options.is_markup_path(path_str) {
                files.push(path.to_path_buf());
            }
        }
    }
    files.sort();
    files
}


#[cfg(feature = "napi")]
#[napi]
pub fn discover_markup_files_native(
    base_dir: String,
    options_json: Option<String>,
) -> napi::Result<Vec<String>> {
    let options = match options_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| napi::Error::from_reason(format!("Options parse error: {}", e)))?,
        None => LiftOptions::default(),
    };
    Ok(find_markup_files(Path::new(&base_dir), &options)
        .into_iter()
        .filter_map(|p| p.to_str().map(|s| s.to_string()))
        .collect())
}
