// Project descriptor loading
//
// Descriptors come from lolipop.yaml / lolipop.yml / loli.yaml / loli.yml,
// or from a [tool.lolipop] table in pyproject.toml. Every field is optional;
// a partially-specified descriptor is normal and defaults are supplied here
// rather than probed for by callers.

use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Descriptor filenames, in resolution order.
pub const DESCRIPTOR_FILES: [&str; 4] = ["lolipop.yaml", "lolipop.yml", "loli.yaml", "loli.yml"];

/// Parsed project descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Descriptor {
    pub name: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub environment: Option<EnvSpec>,
    /// Named script lists, e.g. `scripts.run`.
    #[serde(default)]
    pub scripts: HashMap<String, Vec<String>>,
    /// Commands run once after files are materialized.
    #[serde(default)]
    pub setup: Vec<String>,
    /// Relative path -> file content, materialized on init.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

/// Requested environment, e.g. `{name: Demo, lang: python, type: venv, version: "3.11"}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvSpec {
    pub name: Option<String>,
    pub lang: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub version: Option<String>,
    /// Explicit environment root; normally derived from `name` instead.
    pub path: Option<String>,
}

impl Descriptor {
    /// Script list for a named target, empty when undefined.
    pub fn script(&self, target: &str) -> &[String] {
        self.scripts.get(target).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Load a YAML descriptor. The root must be a mapping; an empty file yields
/// an empty descriptor.
pub fn load_yaml(path: &Path) -> Result<Descriptor> {
    if !path.exists() {
        return Err(eyre!("Config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(Descriptor::default());
    }

    let value: serde_yaml::Value = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to load YAML {}", path.display()))?;
    if !value.is_mapping() {
        return Err(eyre!("Invalid YAML structure (expected mapping)"));
    }

    serde_yaml::from_value(value).with_context(|| format!("Failed to load YAML {}", path.display()))
}

#[derive(Deserialize)]
struct PyProject {
    tool: Option<PyProjectTool>,
}

#[derive(Deserialize)]
struct PyProjectTool {
    lolipop: Option<Descriptor>,
}

/// Load the `[tool.lolipop]` table from a pyproject.toml, if both exist.
/// A pyproject that cannot be parsed is treated as having no table.
pub fn load_pyproject(path: &Path) -> Result<Option<Descriptor>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match toml::from_str::<PyProject>(&content) {
        Ok(pyproject) => Ok(pyproject.tool.and_then(|t| t.lolipop)),
        Err(e) => {
            debug!(file = ?path, error = %e, "Ignoring unparseable pyproject.toml");
            Ok(None)
        }
    }
}

/// First descriptor file present in the directory, in resolution order.
pub fn find_descriptor(project_dir: &Path) -> Option<PathBuf> {
    DESCRIPTOR_FILES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|path| path.exists())
}

/// Resolve the project's configuration: descriptor files first, then
/// pyproject.toml.
pub fn load_project_config(project_dir: &Path) -> Result<Descriptor> {
    if let Some(path) = find_descriptor(project_dir) {
        return load_yaml(&path);
    }

    if let Some(descriptor) = load_pyproject(&project_dir.join("pyproject.toml"))? {
        return Ok(descriptor);
    }

    Err(eyre!(
        "No lolipop.yaml/.yml, loli.yaml/.yml, or [tool.lolipop] found"
    ))
}
