// Per-user application data locations
//
// Everything lolipop persists lives under one per-user root:
//   <data_dir>/lolipop/.assets/tracking/   project records
//   <data_dir>/lolipop/envs/               managed virtual environments
//
// The root is resolved once and passed explicitly so tests can point the
// whole stack at a temporary directory.

use eyre::{Result, eyre};
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "lolipop";

/// Resolved application data root.
#[derive(Debug, Clone)]
pub struct AppDirs {
    root: PathBuf,
}

impl AppDirs {
    /// Resolve the platform-specific per-user data root
    /// (e.g. `~/.local/share/lolipop` on Linux,
    /// `~/Library/Application Support/lolipop` on macOS).
    pub fn resolve() -> Result<Self> {
        let base = dirs::data_dir().ok_or_else(|| eyre!("Could not determine user data directory"))?;
        Ok(Self {
            root: base.join(APP_NAME),
        })
    }

    /// Use an explicit root instead of the platform default.
    pub fn at<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one `<project-name>.json` per tracked project.
    pub fn tracking_dir(&self) -> PathBuf {
        self.root.join(".assets").join("tracking")
    }

    /// Home of managed virtual environments. Directory name == env name.
    pub fn envs_dir(&self) -> PathBuf {
        self.root.join("envs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_root() {
        let dirs = AppDirs::at("/tmp/lolipop-test");
        assert_eq!(
            dirs.tracking_dir(),
            PathBuf::from("/tmp/lolipop-test/.assets/tracking")
        );
        assert_eq!(dirs.envs_dir(), PathBuf::from("/tmp/lolipop-test/envs"));
    }
}
