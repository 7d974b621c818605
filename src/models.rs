// Data models for the project tracking registry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One tracked project, persisted as `<name>.json` in the tracking directory.
///
/// Field names are part of the on-disk contract shared with the TUI and the
/// VS Code extension; renaming any of them is a breaking format change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub active: bool,
    pub opened_in_vscode: bool,
    pub environment: EnvironmentInfo,
    pub git: GitInfo,
    pub config_files: BTreeMap<String, Option<String>>,
    pub project_metadata: ProjectMetadata,
    pub dependencies: Vec<String>,
    /// Written by external integrations, preserved verbatim across
    /// re-registrations.
    #[serde(default)]
    pub features: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub templates_used: Vec<String>,
    /// Append-only event log. Exactly one "init" entry per project.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Freshest git scan result, fully overwritten on every registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitInfo {
    pub initialized: bool,
    pub remote: Option<String>,
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub dirty: bool,
}

/// Last-known environment binding for a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub name: Option<String>,
    pub path: Option<String>,
    pub python_version: Option<String>,
}

/// Descriptor-sourced metadata; all-null when no descriptor was given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub version: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    #[serde(default)]
    pub details: serde_json::Value,
}

impl HistoryEntry {
    pub fn new(action: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            timestamp: now(),
            action: action.into(),
            details,
        }
    }
}

/// Current UTC time, serialized as RFC 3339 on disk.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ProjectRecord {
        ProjectRecord {
            id: "abc123def456".to_string(),
            name: "demo".to_string(),
            path: "/tmp/demo".to_string(),
            created_at: now(),
            last_seen: now(),
            active: false,
            opened_in_vscode: false,
            environment: EnvironmentInfo::default(),
            git: GitInfo::default(),
            config_files: BTreeMap::new(),
            project_metadata: ProjectMetadata::default(),
            dependencies: vec!["requests".to_string()],
            features: serde_json::Map::new(),
            templates_used: Vec::new(),
            history: vec![HistoryEntry::new("init", serde_json::json!({}))],
        }
    }

    #[test]
    fn test_record_round_trip() {
        let record = sample_record();
        let json = serde_json::to_string_pretty(&record).unwrap();
        let parsed: ProjectRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, "demo");
        assert_eq!(parsed.dependencies, vec!["requests".to_string()]);
        assert_eq!(parsed.history.len(), 1);
        assert_eq!(parsed.history[0].action, "init");
    }

    #[test]
    fn test_on_disk_field_names() {
        let record = sample_record();
        let value = serde_json::to_value(&record).unwrap();
        for field in [
            "id",
            "name",
            "path",
            "created_at",
            "last_seen",
            "active",
            "opened_in_vscode",
            "environment",
            "git",
            "config_files",
            "project_metadata",
            "dependencies",
            "features",
            "templates_used",
            "history",
        ] {
            assert!(value.get(field).is_some(), "missing field: {}", field);
        }
        let git = value.get("git").unwrap();
        assert_eq!(git.get("initialized"), Some(&serde_json::json!(false)));
        assert!(git.get("remote").unwrap().is_null());
    }

    #[test]
    fn test_missing_optional_collections_default() {
        // Records written by older builds may lack these fields entirely.
        let json = r#"{
            "id": "abc123def456",
            "name": "legacy",
            "path": "/tmp/legacy",
            "created_at": "2024-01-01T00:00:00Z",
            "last_seen": "2024-01-01T00:00:00Z",
            "active": false,
            "opened_in_vscode": false,
            "environment": {"name": null, "path": null, "python_version": null},
            "git": {"initialized": false, "remote": null, "branch": null, "commit": null, "dirty": false},
            "config_files": {},
            "project_metadata": {"version": null, "description": null, "author": null},
            "dependencies": []
        }"#;
        let record: ProjectRecord = serde_json::from_str(json).unwrap();
        assert!(record.features.is_empty());
        assert!(record.templates_used.is_empty());
        assert!(record.history.is_empty());
    }
}
