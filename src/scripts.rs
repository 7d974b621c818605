// Shell script execution inside a project environment

use eyre::{Context, Result, eyre};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Run each command through the shell with the environment's `bin` directory
/// prepended to `PATH` and `VIRTUAL_ENV` pointing at the environment root.
///
/// Commands run sequentially in `project_dir`; the first non-zero exit aborts
/// the remainder with an error naming the failing command.
pub fn run_scripts(scripts: &[String], project_dir: &Path, env_root: &Path) -> Result<()> {
    if scripts.is_empty() {
        return Ok(());
    }

    let bin_dir = env_root.join("bin");
    let path_var = match std::env::var("PATH") {
        Ok(existing) => format!("{}:{}", bin_dir.display(), existing),
        Err(_) => bin_dir.display().to_string(),
    };

    for cmd in scripts {
        debug!(command = %cmd, "Running script command");
        let status = Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .current_dir(project_dir)
            .env("PATH", &path_var)
            .env("VIRTUAL_ENV", env_root)
            .status()
            .with_context(|| format!("Failed to spawn command: {}", cmd))?;

        if !status.success() {
            return Err(eyre!("Command failed: {}", cmd));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_script_list_is_noop() {
        let project = TempDir::new().unwrap();
        let env = TempDir::new().unwrap();
        run_scripts(&[], project.path(), env.path()).unwrap();
    }

    #[test]
    fn test_commands_run_in_project_dir() {
        let project = TempDir::new().unwrap();
        let env = TempDir::new().unwrap();

        run_scripts(
            &["echo marker > out.txt".to_string()],
            project.path(),
            env.path(),
        )
        .unwrap();

        let content = fs::read_to_string(project.path().join("out.txt")).unwrap();
        assert_eq!(content.trim(), "marker");
    }

    #[test]
    fn test_virtual_env_is_injected() {
        let project = TempDir::new().unwrap();
        let env = TempDir::new().unwrap();

        run_scripts(
            &["echo \"$VIRTUAL_ENV\" > venv.txt".to_string()],
            project.path(),
            env.path(),
        )
        .unwrap();

        let content = fs::read_to_string(project.path().join("venv.txt")).unwrap();
        assert_eq!(content.trim(), env.path().to_string_lossy());
    }

    #[cfg(unix)]
    #[test]
    fn test_env_bin_is_on_path() {
        use std::os::unix::fs::PermissionsExt;

        let project = TempDir::new().unwrap();
        let env = TempDir::new().unwrap();

        let bin_dir = env.path().join("bin");
        fs::create_dir_all(&bin_dir).unwrap();
        let tool = bin_dir.join("lolitool");
        fs::write(&tool, "#!/bin/sh\necho from-env\n").unwrap();
        let mut perms = fs::metadata(&tool).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&tool, perms).unwrap();

        run_scripts(
            &["lolitool > tool.txt".to_string()],
            project.path(),
            env.path(),
        )
        .unwrap();

        let content = fs::read_to_string(project.path().join("tool.txt")).unwrap();
        assert_eq!(content.trim(), "from-env");
    }

    #[test]
    fn test_failure_names_command_and_stops() {
        let project = TempDir::new().unwrap();
        let env = TempDir::new().unwrap();

        let err = run_scripts(
            &["exit 3".to_string(), "echo never > after.txt".to_string()],
            project.path(),
            env.path(),
        )
        .unwrap_err();

        assert!(err.to_string().contains("Command failed: exit 3"));
        assert!(!project.path().join("after.txt").exists());
    }
}
