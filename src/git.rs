// Git facts via the `git` binary
//
// Scanning is read-only: it never mutates the working tree and never forces
// a repository into existence. "Not a repository" is a normal answer, not an
// error; only a failure to run the tool itself surfaces as `Err`, and the
// registry absorbs that too.

use crate::models::GitInfo;
use eyre::{Context, Result, eyre};
use std::path::Path;
use std::process::Command;

/// Scan a directory for git state.
///
/// Returns the zero-value block (`initialized = false`) when the directory is
/// not inside a work tree. Branch, commit, and remote are each best-effort:
/// an unborn HEAD or a missing `origin` yields `None`, not a failure.
pub fn scan(project_dir: &Path) -> Result<GitInfo> {
    if !is_repo(project_dir)? {
        return Ok(GitInfo::default());
    }

    Ok(GitInfo {
        initialized: true,
        remote: run_git(project_dir, &["config", "--get", "remote.origin.url"]).ok(),
        branch: run_git(project_dir, &["rev-parse", "--abbrev-ref", "HEAD"]).ok(),
        commit: run_git(project_dir, &["rev-parse", "HEAD"]).ok(),
        dirty: run_git(project_dir, &["status", "--porcelain"])
            .map(|out| !out.is_empty())
            .unwrap_or(false),
    })
}

/// Whether the directory is inside a git work tree.
pub fn is_repo(project_dir: &Path) -> Result<bool> {
    let output = Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(project_dir)
        .output()
        .context("Failed to run git")?;
    Ok(output.status.success())
}

/// Initialize a new repository in the directory.
pub fn init_repo(project_dir: &Path) -> Result<()> {
    run_git(project_dir, &["init"])?;
    Ok(())
}

fn run_git(project_dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(project_dir)
        .output()
        .context("Failed to run git")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(eyre!(
            "git {} failed: {}",
            args.join(" "),
            if stderr.is_empty() { "non-zero exit".to_string() } else { stderr }
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
