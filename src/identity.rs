// Stable project identity and content fingerprints

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Truncation length for fingerprints. Collisions at 48 bits are accepted as
/// astronomically unlikely for per-user project counts.
const FINGERPRINT_LEN: usize = 12;

/// Short deterministic SHA-256 fingerprint of a string.
pub fn fingerprint(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..FINGERPRINT_LEN].to_string()
}

/// Fingerprint of a file's UTF-8 content, or `None` when the file is absent
/// or unreadable. Absence is expected, never an error.
pub fn file_fingerprint(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    fs::read_to_string(path).ok().map(|content| fingerprint(&content))
}

/// Stable project ID.
///
/// Prefers the git remote URL (clone-safe); falls back to the canonicalized
/// absolute path. Recomputed on every registration, so a project that gains a
/// remote later changes ID — `name` remains the registry's real key.
pub fn project_id(project_dir: &Path, git_remote: Option<&str>) -> String {
    match git_remote {
        Some(remote) if !remote.is_empty() => fingerprint(remote),
        _ => fingerprint(&normalize_path(project_dir).to_string_lossy()),
    }
}

/// Resolve to an absolute path, canonicalizing when possible so symlinked and
/// relative spellings of the same directory hash identically.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}
