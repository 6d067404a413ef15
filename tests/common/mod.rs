//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_catalog(catalogs::TEMPLATE_ONLY);
//! ```

use assert_fs::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};

use image_updater::http::{HttpFetch, TransportError};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::catalogs;
    #[allow(unused_imports)]
    pub use super::{git_available, FakeHttp, TestFixture};
}

/// Catalog snippets used across tests.
#[allow(dead_code)]
pub mod catalogs {
    /// One template with no images.
    pub const TEMPLATE_ONLY: &str = r#"
config:
  user: acme
templates:
  - name: base-template
    tagfilter: '\d+\.\d+'
    dockerfilecontent: "FROM base:latest\nRUN true\n"
"#;

    /// Missing `config.user`.
    pub const MISSING_USER: &str = "templates: []\n";

    /// Not YAML at all.
    pub const INVALID_YAML: &str = "config: [unclosed";
}

/// In-memory transport with canned bodies, keyed by URL.
#[derive(Default, Clone)]
#[allow(dead_code)]
pub struct FakeHttp {
    bodies: HashMap<String, Vec<u8>>,
    pub requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.to_string(), body.into());
        self
    }
}

impl HttpFetch for FakeHttp {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| TransportError::new("HTTP 404 Not Found"))
    }
}

/// Whether a `git` binary is on the PATH.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

/// A temporary repository directory with an optional catalog.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `images.yaml` with the given content.
    pub fn with_catalog(self, content: &str) -> Self {
        self.temp_dir
            .child("images.yaml")
            .write_str(content)
            .expect("Failed to write catalog");
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Turn the directory into a git repository with a local identity.
    pub fn with_git(self) -> Self {
        for args in [
            vec!["init", "-q"],
            vec!["config", "user.email", "ci@example.com"],
            vec!["config", "user.name", "CI"],
            vec!["config", "commit.gpgsign", "false"],
            vec!["config", "tag.gpgsign", "false"],
        ] {
            let status = Command::new("git")
                .arg("-C")
                .arg(self.path())
                .args(&args)
                .status()
                .expect("Failed to run git");
            assert!(status.success(), "git {:?} failed", args);
        }
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Read a file below the fixture root.
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    /// Create a command for the binary pointed at this fixture.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("image-updater");
        cmd.arg("--dir").arg(self.path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
