// Project initialization orchestrator
//
// Sequences the collaborators: directory, environment, file materialization,
// setup scripts, then exactly one activating registration. No state of its
// own.

use crate::config::Descriptor;
use crate::envs;
use crate::identity::normalize_path;
use crate::models::ProjectRecord;
use crate::paths::AppDirs;
use crate::scripts::run_scripts;
use crate::tracker::Tracker;
use eyre::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Initialize a project from a parsed descriptor in the target directory.
///
/// Reusing an existing non-empty directory is allowed. Descriptor `files`
/// overwrite unconditionally. Ends by registering the project as active.
pub fn init_project(
    cfg: &Descriptor,
    project_dir: &Path,
    dirs: &AppDirs,
    tracker: &Tracker,
) -> Result<ProjectRecord> {
    let project_dir = normalize_path(project_dir);

    if project_dir.exists() && project_dir.read_dir()?.next().is_some() {
        info!(dir = ?project_dir, "Using existing directory");
    } else {
        fs::create_dir_all(&project_dir).context("Failed to create project directory")?;
    }

    let project_name = cfg
        .name
        .clone()
        .unwrap_or_else(|| project_dir.file_name().unwrap_or_default().to_string_lossy().into_owned());
    info!(name = %project_name, "Initializing project");

    let env_root = match &cfg.environment {
        Some(spec) if spec.name.is_some() => {
            let path = envs::resolve_environment(dirs, spec)?;
            info!(env = ?path.file_name(), "Using environment");
            path
        }
        _ => {
            info!("No environment specified, using base environment");
            envs::create_base_environment(dirs)?
        }
    };

    for (rel_path, content) in &cfg.files {
        let file_path = project_dir.join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for {}", rel_path))?;
        }
        fs::write(&file_path, content).with_context(|| format!("Failed to write {}", rel_path))?;
        info!(file = ?file_path, "Created file");
    }

    if !cfg.setup.is_empty() {
        run_scripts(&cfg.setup, &project_dir, &env_root)?;
    }

    tracker.register_project(&project_dir, Some(cfg), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvSpec;
    use tempfile::TempDir;

    fn descriptor_with_env(name: &str, env_name: &str) -> Descriptor {
        Descriptor {
            name: Some(name.to_string()),
            environment: Some(EnvSpec {
                name: Some(env_name.to_string()),
                kind: Some("venv".to_string()),
                ..EnvSpec::default()
            }),
            ..Descriptor::default()
        }
    }

    fn setup(data: &TempDir, env_name: &str) -> (AppDirs, Tracker) {
        let dirs = AppDirs::at(data.path());
        // Pre-create the environment so no Python toolchain is needed.
        fs::create_dir_all(dirs.envs_dir().join(env_name)).unwrap();
        let tracker = Tracker::open(&dirs).unwrap();
        (dirs, tracker)
    }

    #[test]
    fn test_init_materializes_files_and_registers_active() {
        let data = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let (dirs, tracker) = setup(&data, "demo-env");

        let mut cfg = descriptor_with_env("demo", "demo-env");
        cfg.files
            .insert("app.py".to_string(), "print('hi')".to_string());
        cfg.files
            .insert("pkg/__init__.py".to_string(), String::new());

        let record = init_project(&cfg, target.path(), &dirs, &tracker).unwrap();
        assert_eq!(record.name, "demo");

        assert_eq!(
            fs::read_to_string(target.path().join("app.py")).unwrap(),
            "print('hi')"
        );
        assert!(target.path().join("pkg/__init__.py").exists());

        let stored = tracker.load_project("demo").unwrap().unwrap();
        assert!(stored.active);
        assert_eq!(stored.history.len(), 1);
        assert_eq!(stored.history[0].action, "init");
    }

    #[test]
    fn test_init_runs_setup_in_project_dir() {
        let data = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let (dirs, tracker) = setup(&data, "demo-env");

        let mut cfg = descriptor_with_env("demo", "demo-env");
        cfg.setup.push("echo done > setup.txt".to_string());

        init_project(&cfg, target.path(), &dirs, &tracker).unwrap();
        assert!(target.path().join("setup.txt").exists());
    }

    #[test]
    fn test_init_failing_setup_aborts_before_registration() {
        let data = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let (dirs, tracker) = setup(&data, "demo-env");

        let mut cfg = descriptor_with_env("demo", "demo-env");
        cfg.setup.push("exit 1".to_string());

        let err = init_project(&cfg, target.path(), &dirs, &tracker).unwrap_err();
        assert!(err.to_string().contains("Command failed"));
        assert!(tracker.load_project("demo").unwrap().is_none());
    }

    #[test]
    fn test_init_reuses_existing_directory() {
        let data = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        fs::write(target.path().join("existing.txt"), "keep me").unwrap();
        let (dirs, tracker) = setup(&data, "demo-env");

        let cfg = descriptor_with_env("demo", "demo-env");
        init_project(&cfg, target.path(), &dirs, &tracker).unwrap();

        assert_eq!(
            fs::read_to_string(target.path().join("existing.txt")).unwrap(),
            "keep me"
        );
    }
}
