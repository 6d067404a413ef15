//! # Error Handling
//!
//! This module defines the centralized error type for `image-updater`. It uses
//! the `thiserror` library to build one `Error` enum covering every failure
//! the synchronization engine can hit, each with enough context to tell the
//! operator which upstream or which build directory was involved.
//!
//! ## Taxonomy
//!
//! - **Configuration**: `ConfigParse` for a missing or malformed
//!   `images.yaml`, raised before any network call is made.
//! - **Transport**: `RegistryUnavailable` and `RepositoryUnavailable` when an
//!   upstream cannot be reached or returns something unusable.
//! - **Resolution**: `NoMatchingTag` and `PackageNotFound` when the upstream
//!   answered but has nothing satisfying the filter or package name.
//! - **Local state**: `Io`, `GitCommand`, `InvalidTagName`, `MissingFromLine`
//!   and `RevisionOverflow`.
//!
//! None of these are retried. Every error bubbles up to the binary, which
//! aborts the run with a non-zero exit code.

use thiserror::Error;

/// Main error type for image-updater operations
#[derive(Error, Debug)]
pub enum Error {
    /// The catalog file could not be read or does not match the expected
    /// schema.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the catalog
        hint: Option<String>,
    },

    /// The container registry could not be queried.
    #[error("Registry unavailable: {url} - {message}")]
    RegistryUnavailable { url: String, message: String },

    /// The registry answered, but no tag matched the template's filter.
    #[error("No tag of {image} matches filter '{filter}'")]
    NoMatchingTag { image: String, filter: String },

    /// A package index could not be downloaded or decompressed.
    #[error("Package repository unavailable: {url} - {message}")]
    RepositoryUnavailable { url: String, message: String },

    /// No component of the repository carries the requested package.
    #[error("Package {package} not found in repository '{repository}'")]
    PackageNotFound { package: String, repository: String },

    /// A repository descriptor that cannot be split into label, root URL,
    /// distribution and at least one component.
    #[error("Invalid repository descriptor '{descriptor}': {message}")]
    InvalidRepository { descriptor: String, message: String },

    /// A build definition without a base-image declaration.
    #[error("No FROM line found in {context}")]
    MissingFromLine { context: String },

    /// The two-digit build counter cannot be advanced.
    #[error("Cannot advance build revision '{revision}': {message}")]
    RevisionOverflow { revision: String, message: String },

    /// A checkpoint was requested although no file changed.
    #[error("Refusing to create checkpoint {tag}: no staged changes")]
    NothingToCommit { tag: String },

    /// A checkpoint tag that git would refuse as a ref name.
    #[error("Invalid tag name '{tag}': {reason}")]
    InvalidTagName { tag: String, reason: String },

    /// A git command exited unsuccessfully.
    #[error("Git command failed: {command} - {stderr}")]
    GitCommand { command: String, stderr: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
