use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::Error;

/// Run `git <args>` inside `repo_dir`, returning stdout.
///
/// This uses the system git command, so commit identity, signing and hooks
/// come from the user's normal git configuration.
fn run(repo_dir: &Path, args: &[&str]) -> Result<String, Error> {
    debug!("git {}", args.join(" "));
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: args.join(" "),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Stage `path` for the next commit
pub fn add(repo_dir: &Path, path: &Path) -> Result<(), Error> {
    let path = path.to_string_lossy();
    run(repo_dir, &["add", "--", &*path]).map(|_| ())
}

/// Commit everything currently staged
pub fn commit(repo_dir: &Path, message: &str) -> Result<(), Error> {
    run(repo_dir, &["commit", "-m", message]).map(|_| ())
}

/// Create an annotated tag on HEAD
pub fn tag_annotated(repo_dir: &Path, name: &str) -> Result<(), Error> {
    run(repo_dir, &["tag", "-a", name, "-m", name]).map(|_| ())
}

/// Reset index and working tree to HEAD
pub fn reset_hard(repo_dir: &Path) -> Result<(), Error> {
    run(repo_dir, &["reset", "--hard"]).map(|_| ())
}

/// List tag names in the repository
pub fn list_tags(repo_dir: &Path) -> Result<Vec<String>, Error> {
    let stdout = run(repo_dir, &["tag", "--list"])?;
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
