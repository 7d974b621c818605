// File-backed metadata store: one JSON document per tracked project

use crate::models::ProjectRecord;
use crate::paths::AppDirs;
use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const LOCK_FILE: &str = ".lock";

/// Durable per-project record storage inside the tracking directory.
///
/// `load` treats absence as `None`, never as an error. `save` replaces the
/// whole file atomically (write-temp, fsync, rename) so a concurrent `list`
/// never observes a half-written record.
pub struct TrackingStore {
    tracking_dir: PathBuf,
}

impl TrackingStore {
    /// Open or create the store under the given application data root.
    pub fn open(dirs: &AppDirs) -> Result<Self> {
        let tracking_dir = dirs.tracking_dir();
        fs::create_dir_all(&tracking_dir).context("Failed to create tracking directory")?;
        Ok(Self { tracking_dir })
    }

    pub fn tracking_dir(&self) -> &Path {
        &self.tracking_dir
    }

    /// Path of the record file for a project name.
    pub fn tracking_file(&self, name: &str) -> Result<PathBuf> {
        Self::validate_name(name)?;
        Ok(self.tracking_dir.join(format!("{}.json", name)))
    }

    /// Load a record by name. `None` when the project is not tracked;
    /// `Err` only for unreadable or corrupt storage.
    pub fn load(&self, name: &str) -> Result<Option<ProjectRecord>> {
        let path = self.tracking_file(name)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read record file {:?}", path))?;
        let record: ProjectRecord = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt record file {:?}", path))?;
        Ok(Some(record))
    }

    /// Persist a record, keyed by its name. Full overwrite, pretty-printed
    /// UTF-8 JSON, atomic from the reader's perspective.
    pub fn save(&self, record: &ProjectRecord) -> Result<()> {
        let path = self.tracking_file(&record.name)?;
        let json = serde_json::to_string_pretty(record).context("Failed to serialize record")?;

        let tmp = self.tracking_dir.join(format!(".{}.json.tmp", record.name));
        {
            use std::io::Write;
            let mut file = File::create(&tmp)
                .with_context(|| format!("Failed to write record file {:?}", tmp))?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace record file {:?}", path))?;

        debug!(name = %record.name, file = ?path, "Saved project record");
        Ok(())
    }

    /// All currently parseable records, in arbitrary order.
    ///
    /// A corrupt record file is skipped with a warning rather than aborting
    /// the whole listing; one bad file must not take down `project list`.
    pub fn list(&self) -> Result<Vec<ProjectRecord>> {
        let mut records = Vec::new();

        for entry in fs::read_dir(&self.tracking_dir).context("Failed to read tracking directory")? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let content = match fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!(file = ?path, error = ?e, "Failed to read record file, skipping");
                    continue;
                }
            };

            match serde_json::from_str::<ProjectRecord>(&content) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(file = ?path, error = ?e, "Failed to parse record file, skipping");
                }
            }
        }

        Ok(records)
    }

    /// Take the store-wide advisory lock. Held for the duration of the
    /// full-store rewrite in activation; released when the guard drops.
    pub fn lock(&self) -> Result<File> {
        let lock_path = self.tracking_dir.join(LOCK_FILE);
        let file = File::options()
            .create(true)
            .write(true)
            .open(&lock_path)
            .context("Failed to open store lock file")?;
        file.lock_exclusive().context("Failed to acquire store lock")?;
        Ok(file)
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(eyre!("Project name cannot be empty"));
        }
        if name.len() > 128 {
            return Err(eyre!("Project name too long: {} (max 128 chars)", name.len()));
        }
        if name.contains('/') || name.contains('\\') || name.starts_with('.') {
            return Err(eyre!("Invalid project name: {}", name));
        }
        Ok(())
    }
}
