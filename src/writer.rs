//! # Diff-and-Commit Writer
//!
//! Turns proposed file content into version-control checkpoints. A unit of
//! work (one template or one image) calls [`SyncWriter::sync_file`] for each
//! file it manages; files whose content actually differs are written and
//! staged. Once the unit is done, [`SyncWriter::checkpoint`] commits the
//! staged paths, tags the commit and hard-resets the working tree, so
//! nothing left behind by one unit can leak into the next.
//!
//! A checkpoint is only possible when something was staged, and only under a
//! tag name git accepts. Both are checked before anything is committed, so a
//! commit never lands without its tag.

use std::path::PathBuf;

use log::info;

use crate::config::VERSION_FILE;
use crate::diff::line_diff;
use crate::error::{Error, Result};
use crate::filesystem::BuildTree;
use crate::repository::GitOperations;
use crate::revision::next_revision;

/// A commit plus its tag, created for one changed build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// Tag name, `<directory>_<revision>`.
    pub tag: String,
    /// Files committed with this checkpoint.
    pub paths: Vec<PathBuf>,
}

/// Characters git refuses in ref names. Debian versions carry `~` routinely.
const FORBIDDEN_TAG_CHARS: &[char] = &[' ', '~', '^', ':', '?', '*', '[', '\\'];

/// Tag name of the checkpoint for `revision` of build directory `dir`.
///
/// Characters git does not allow in tag names are replaced by `_`, so
/// `1.25.4-1~bookworm.01` is tagged `web_1.25.4-1_bookworm.01`.
pub fn checkpoint_tag(dir: &str, revision: &str) -> String {
    format!("{}_{}", dir, revision)
        .chars()
        .map(|c| {
            if c.is_control() || FORBIDDEN_TAG_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Checks `tag` against git's ref name rules (`git check-ref-format`).
pub fn validate_tag(tag: &str) -> Result<()> {
    let reason = if tag.is_empty() || tag == "@" {
        Some("empty or reserved name")
    } else if tag.starts_with('-') {
        Some("starts with '-'")
    } else if let Some(c) = tag
        .chars()
        .find(|c| c.is_control() || FORBIDDEN_TAG_CHARS.contains(c))
    {
        return Err(Error::InvalidTagName {
            tag: tag.to_string(),
            reason: format!("contains {:?}", c),
        });
    } else if tag.contains("..") || tag.contains("@{") || tag.contains("//") {
        Some("contains '..', '@{' or '//'")
    } else if tag.ends_with('.') || tag.ends_with('/') {
        Some("ends with '.' or '/'")
    } else if tag
        .split('/')
        .any(|part| part.starts_with('.') || part.ends_with(".lock"))
    {
        Some("a component starts with '.' or ends with '.lock'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidTagName {
            tag: tag.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Writes changed files into the build tree and records them in git.
pub struct SyncWriter<G> {
    tree: BuildTree,
    git: G,
    staged: Vec<PathBuf>,
}

impl<G: GitOperations> SyncWriter<G> {
    pub fn new(tree: BuildTree, git: G) -> Self {
        Self {
            tree,
            git,
            staged: Vec::new(),
        }
    }

    /// The build tree this writer operates on.
    pub fn tree(&self) -> &BuildTree {
        &self.tree
    }

    /// Paths staged for the pending checkpoint.
    pub fn pending(&self) -> &[PathBuf] {
        &self.staged
    }

    /// Writes `proposed` if it differs from what is on disk.
    ///
    /// Returns `true` when the file was written and staged, `false` when the
    /// content was already current.
    pub fn sync_file(&mut self, dir: &str, filename: &str, proposed: &str) -> Result<bool> {
        let current = self.tree.read(dir, filename)?;
        if current == proposed {
            return Ok(false);
        }

        info!("Updating {}/{}", dir, filename);
        info!("DIFF:\n{}", line_diff(&current, proposed));
        self.write_staged(dir, filename, proposed)?;
        Ok(true)
    }

    /// Writes and stages `content` without comparing it first.
    pub fn write_staged(&mut self, dir: &str, filename: &str, content: &str) -> Result<()> {
        let path = self.tree.write(dir, filename, content)?;
        self.git.stage(&path)?;
        if !self.staged.contains(&path) {
            self.staged.push(path);
        }
        Ok(())
    }

    /// Advances the build revision of `dir` for `upstream` and syncs the
    /// `version` file. Returns the new revision.
    pub fn write_revision(&mut self, dir: &str, upstream: &str) -> Result<String> {
        let previous = self.tree.read(dir, VERSION_FILE)?;
        let revision = next_revision(&previous, upstream)?;
        self.sync_file(dir, VERSION_FILE, &revision)?;
        Ok(revision)
    }

    /// Commits everything staged, tags it `tag` and resets the working tree.
    ///
    /// An invalid `tag` is rejected before the commit, leaving the changes
    /// staged.
    pub fn checkpoint(&mut self, tag: &str) -> Result<Checkpoint> {
        if self.staged.is_empty() {
            return Err(Error::NothingToCommit {
                tag: tag.to_string(),
            });
        }
        validate_tag(tag)?;

        self.git.commit(&format!("CI: {}", tag))?;
        self.git.tag(tag)?;
        self.git.hard_reset()?;

        let paths = std::mem::take(&mut self.staged);
        info!("Created checkpoint {} ({} file(s))", tag, paths.len());
        Ok(Checkpoint {
            tag: tag.to_string(),
            paths,
        })
    }
}
