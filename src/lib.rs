//! # Image Updater Library
//!
//! This library keeps a repository of container build definitions in sync
//! with their upstreams. It is used by the `image-updater` command-line tool
//! but every component can be driven on its own, with injected transport and
//! version-control implementations.
//!
//! ## Core Concepts
//!
//! - **Catalog (`config`)**: The `images.yaml` file listing templates (base
//!   images tracked against a container registry) and the images derived
//!   from them (tracked against a Debian package repository).
//! - **Upstream clients (`registry`, `packages`)**: Resolve the newest
//!   registry tag by upload time, and the newest package version by Debian
//!   ordering (`debversion`).
//! - **Build revisions (`revision`)**: `<upstream>.<NN>` strings stored in
//!   each directory's `version` file.
//! - **Writer (`writer`)**: Writes changed files, stages them, and turns each
//!   changed unit into one commit plus tag (`repository`, `git`).
//! - **Orchestrator (`sync`)**: Walks the catalog and threads each
//!   template's version into its images.
//!
//! ## Execution Flow
//!
//! ```text
//! catalog -> Synchronizer -> RegistryClient | PackageClient
//!         -> next_revision -> SyncWriter -> commit + tag + reset
//! ```
//!
//! Runs are sequential. A failed upstream lookup aborts the run; checkpoints
//! already created stay in the history.

pub mod config;
pub mod debversion;
pub mod diff;
pub mod dockerfile;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod http;
pub mod packages;
pub mod registry;
pub mod repository;
pub mod revision;
pub mod sync;
pub mod writer;
