// Project tracking registry
//
// Business logic over the tracking store: registration merges freshly
// observed facts (git state, config fingerprints) with previously recorded
// history, activation enforces the single-active-project invariant, and
// events append to each record's history.

use crate::config::Descriptor;
use crate::git;
use crate::identity::{file_fingerprint, normalize_path, project_id};
use crate::models::{EnvironmentInfo, HistoryEntry, ProjectMetadata, ProjectRecord, now};
use crate::paths::AppDirs;
use crate::store::TrackingStore;
use eyre::Result;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Well-known files fingerprinted on every registration. A missing file is
/// recorded as a null fingerprint, not an error.
const CONFIG_FINGERPRINT_FILES: [&str; 4] =
    ["lolipop.yaml", "loli.yaml", "pyproject.toml", "requirements.txt"];

/// Central registry of tracked projects.
pub struct Tracker {
    store: TrackingStore,
}

impl Tracker {
    pub fn new(store: TrackingStore) -> Self {
        Self { store }
    }

    /// Open the registry under the given application data root.
    pub fn open(dirs: &AppDirs) -> Result<Self> {
        Ok(Self::new(TrackingStore::open(dirs)?))
    }

    pub fn store(&self) -> &TrackingStore {
        &self.store
    }

    /// Register or update a project.
    ///
    /// Does not require a descriptor; scans git if present but never forces
    /// it. Observed facts (path, git, config fingerprints, metadata,
    /// dependencies) fully overwrite the previous values, while
    /// user-accumulated state (`created_at`, `opened_in_vscode`, `features`,
    /// `templates_used`, `history`) is preserved. The record is saved with
    /// `active = false`; activation is a separate full-store pass.
    pub fn register_project(
        &self,
        project_dir: &Path,
        cfg: Option<&Descriptor>,
        activate: bool,
    ) -> Result<ProjectRecord> {
        let project_dir = normalize_path(project_dir);

        let name = cfg
            .and_then(|c| c.name.as_deref())
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                project_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });

        let existing = self.store.load(&name)?;

        // Scan failure is indistinguishable from "no repository" here.
        let git_info = git::scan(&project_dir).unwrap_or_default();

        let id = project_id(&project_dir, git_info.remote.as_deref());

        let config_files: BTreeMap<String, Option<String>> = CONFIG_FINGERPRINT_FILES
            .iter()
            .map(|file| (file.to_string(), file_fingerprint(&project_dir.join(file))))
            .collect();

        let environment = cfg
            .and_then(|c| c.environment.as_ref())
            .map(|env| EnvironmentInfo {
                name: env.name.clone(),
                path: env.path.clone(),
                python_version: env.version.clone(),
            })
            .unwrap_or_default();

        let project_metadata = cfg
            .map(|c| ProjectMetadata {
                version: c.version.clone(),
                description: c.description.clone(),
                author: c.author.clone(),
            })
            .unwrap_or_default();

        let mut record = ProjectRecord {
            id,
            name: name.clone(),
            path: project_dir.to_string_lossy().into_owned(),
            created_at: existing.as_ref().map(|e| e.created_at).unwrap_or_else(now),
            last_seen: now(),
            active: false,
            opened_in_vscode: existing.as_ref().map(|e| e.opened_in_vscode).unwrap_or(false),
            environment,
            git: git_info,
            config_files,
            project_metadata,
            dependencies: cfg.map(|c| c.dependencies.clone()).unwrap_or_default(),
            features: existing.as_ref().map(|e| e.features.clone()).unwrap_or_default(),
            templates_used: existing
                .as_ref()
                .map(|e| e.templates_used.clone())
                .unwrap_or_default(),
            history: existing.as_ref().map(|e| e.history.clone()).unwrap_or_default(),
        };

        if existing.is_none() {
            record
                .history
                .push(HistoryEntry::new("init", serde_json::json!({})));
        }

        self.store.save(&record)?;
        debug!(name = %record.name, id = %record.id, "Registered project");

        if activate {
            self.set_active_project(&name)?;
        }

        Ok(record)
    }

    /// Mark exactly one project as active.
    ///
    /// Rewrites every record in the store under the store-wide advisory lock;
    /// `last_seen` is refreshed on all of them. O(N), intentionally simple
    /// for the expected tens of projects.
    pub fn set_active_project(&self, name: &str) -> Result<()> {
        let _lock = self.store.lock()?;

        for mut record in self.store.list()? {
            record.active = record.name == name;
            record.last_seen = now();
            self.store.save(&record)?;
        }

        info!(name, "Switched active project");
        Ok(())
    }

    /// The currently active project, if any. Multiple actives (possible after
    /// a crash mid-activation) are a recoverable inconsistency; the first
    /// found wins.
    pub fn get_active_project(&self) -> Result<Option<ProjectRecord>> {
        Ok(self.store.list()?.into_iter().find(|record| record.active))
    }

    /// All tracked projects.
    pub fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
        self.store.list()
    }

    /// Load one project by name.
    pub fn load_project(&self, name: &str) -> Result<Option<ProjectRecord>> {
        self.store.load(name)
    }

    /// Append an entry to a project's history. No-op with a warning when the
    /// project is not tracked; never creates a record.
    pub fn record_event(&self, name: &str, action: &str, details: serde_json::Value) -> Result<()> {
        let Some(mut record) = self.store.load(name)? else {
            warn!(name, "Project not found in tracking");
            return Ok(());
        };

        record.last_seen = now();
        record.history.push(HistoryEntry::new(action, details));
        self.store.save(&record)
    }

    /// Sticky editor-integration flag; silently ignores unknown projects.
    pub fn mark_opened_in_vscode(&self, name: &str, opened: bool) -> Result<()> {
        let Some(mut record) = self.store.load(name)? else {
            return Ok(());
        };

        record.opened_in_vscode = opened;
        record.last_seen = now();
        self.store.save(&record)
    }
}
