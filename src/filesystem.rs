//! On-disk access to the build directories of the repository.
//!
//! Every template and image owns one directory directly below the repository
//! root. Files are addressed as `(directory, filename)` pairs; a file that
//! does not exist reads as an empty string so callers can compare proposed
//! content without special-casing the first run.

use crate::error::Result;
use log::info;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The repository working tree holding all build directories.
#[derive(Debug, Clone)]
pub struct BuildTree {
    root: PathBuf,
}

impl BuildTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Repository root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `filename` inside build directory `dir`.
    pub fn path(&self, dir: &str, filename: &str) -> PathBuf {
        self.root.join(dir).join(filename)
    }

    /// Reads a file, treating a missing file as empty.
    pub fn read(&self, dir: &str, filename: &str) -> Result<String> {
        info!("Reading file: {}/{}", dir, filename);
        match fs::read_to_string(self.path(dir, filename)) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Missing file: {}/{}", dir, filename);
                Ok(String::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Creates build directory `dir` if it does not exist yet.
    pub fn ensure_dir(&self, dir: &str) -> Result<()> {
        let path = self.root.join(dir);
        if !path.exists() {
            info!("Dir: {} doesn't exist, creating", path.display());
            fs::create_dir_all(&path)?;
        }
        Ok(())
    }

    /// Writes `content`, creating the directory first, and returns the path written.
    pub fn write(&self, dir: &str, filename: &str, content: &str) -> Result<PathBuf> {
        info!("Writing file: {}/{}", dir, filename);
        self.ensure_dir(dir)?;
        let path = self.path(dir, filename);
        fs::write(&path, content)?;
        Ok(path)
    }
}
