// Managed virtual environments
//
// Environments live under `<data root>/envs/`, one directory per environment,
// directory name == environment name. Creation shells out to the Python
// toolchain; an existing directory is always reused as-is.

use crate::config::EnvSpec;
use crate::paths::AppDirs;
use eyre::{Context, Result, eyre};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tracing::info;

/// Fallback environment used when a project requests none.
pub const BASE_ENV_NAME: &str = "lolipop-base";

const DEFAULT_PYTHON: &str = "python3.11";

/// Root directory of a named environment.
pub fn env_path(dirs: &AppDirs, name: &str) -> PathBuf {
    dirs.envs_dir().join(name)
}

pub fn environment_exists(dirs: &AppDirs, name: &str) -> bool {
    env_path(dirs, name).exists()
}

/// Create a venv with the requested interpreter version
/// (`python<version> -m venv`).
pub fn create_venv(dirs: &AppDirs, name: &str, python_version: Option<&str>) -> Result<PathBuf> {
    let path = env_path(dirs, name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create environments directory")?;
    }

    let python_cmd = match python_version {
        Some(version) => format!("python{}", version),
        None => DEFAULT_PYTHON.to_string(),
    };

    info!(name, python = %python_cmd, "Creating virtual environment");
    let status = Command::new(&python_cmd)
        .args(["-m", "venv"])
        .arg(&path)
        .status()
        .with_context(|| format!("Failed to run {}", python_cmd))?;

    if !status.success() {
        return Err(eyre!("Failed to create venv '{}'", name));
    }

    Ok(path)
}

/// Resolve the environment requested by a descriptor: reuse it when it
/// already exists, create it otherwise. Only `venv` environments are
/// supported for now.
pub fn resolve_environment(dirs: &AppDirs, spec: &EnvSpec) -> Result<PathBuf> {
    let name = spec
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| eyre!("Environment name is required"))?;

    if environment_exists(dirs, name) {
        return Ok(env_path(dirs, name));
    }

    let kind = spec.kind.as_deref().unwrap_or("venv");
    if kind != "venv" {
        return Err(eyre!("Only venv environments are supported for now"));
    }

    create_venv(dirs, name, spec.version.as_deref())
}

/// Ensure the shared base environment exists and return its path.
pub fn create_base_environment(dirs: &AppDirs) -> Result<PathBuf> {
    if environment_exists(dirs, BASE_ENV_NAME) {
        return Ok(env_path(dirs, BASE_ENV_NAME));
    }

    info!("Creating base environment '{}'", BASE_ENV_NAME);
    create_venv(dirs, BASE_ENV_NAME, None)
}
