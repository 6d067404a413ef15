//! # Version-Control Seam
//!
//! The synchronizer records every change as a commit plus tag in the
//! repository that holds the build directories. It only ever needs four
//! primitives, captured by the [`GitOperations`] trait:
//!
//! - **stage** a path for the pending commit,
//! - **commit** everything staged,
//! - **tag** the new commit,
//! - **hard reset** the working tree back to the committed state.
//!
//! In the main application `DefaultGitOperations` wraps the system `git`
//! command (see [`crate::git`]). In tests the trait is replaced with a
//! recording mock so the writer and orchestrator can be checked without a
//! real repository.

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Trait for git operations - allows mocking in tests
pub trait GitOperations {
    /// Stages `path` (absolute or relative to the repository root).
    fn stage(&self, path: &Path) -> Result<()>;

    /// Commits all staged paths as one commit.
    fn commit(&self, message: &str) -> Result<()>;

    /// Creates an annotated tag named `name` on the new commit.
    fn tag(&self, name: &str) -> Result<()>;

    /// Resets index and working tree to the last commit.
    fn hard_reset(&self) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command against the repository at `root`.
#[derive(Debug, Clone)]
pub struct DefaultGitOperations {
    root: PathBuf,
}

impl DefaultGitOperations {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl GitOperations for DefaultGitOperations {
    fn stage(&self, path: &Path) -> Result<()> {
        crate::git::add(&self.root, path)
    }

    fn commit(&self, message: &str) -> Result<()> {
        crate::git::commit(&self.root, message)
    }

    fn tag(&self, name: &str) -> Result<()> {
        crate::git::tag_annotated(&self.root, name)
    }

    fn hard_reset(&self) -> Result<()> {
        crate::git::reset_hard(&self.root)
    }
}

impl<T: GitOperations + ?Sized> GitOperations for &T {
    fn stage(&self, path: &Path) -> Result<()> {
        (**self).stage(path)
    }

    fn commit(&self, message: &str) -> Result<()> {
        (**self).commit(message)
    }

    fn tag(&self, name: &str) -> Result<()> {
        (**self).tag(name)
    }

    fn hard_reset(&self) -> Result<()> {
        (**self).hard_reset()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{GitEvent, MockGitOperations};
    use super::*;

    fn checkpoint<G: GitOperations>(git: G) -> Result<()> {
        git.stage(Path::new("base/Dockerfile"))?;
        git.commit("CI: base_1.0.01")?;
        git.tag("base_1.0.01")?;
        git.hard_reset()
    }

    #[test]
    fn test_reference_delegates_to_inner() {
        let git = MockGitOperations::new();
        checkpoint(&git).unwrap();

        assert_eq!(
            git.events(),
            vec![
                GitEvent::Stage(PathBuf::from("base/Dockerfile")),
                GitEvent::Commit("CI: base_1.0.01".to_string()),
                GitEvent::Tag("base_1.0.01".to_string()),
                GitEvent::Reset,
            ]
        );
        assert_eq!(git.tags(), vec!["base_1.0.01"]);
    }

    #[test]
    fn test_default_git_operations_reports_failures() {
        let temp = tempfile::TempDir::new().unwrap();
        let git = DefaultGitOperations::new(temp.path().join("not-a-repo"));
        assert!(git.hard_reset().is_err());
    }
}
