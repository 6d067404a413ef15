//! CLI argument parsing and run wiring

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use image_updater::config;
use image_updater::filesystem::BuildTree;
use image_updater::http::BlockingHttp;
use image_updater::packages::PackageClient;
use image_updater::registry::RegistryClient;
use image_updater::repository::DefaultGitOperations;
use image_updater::sync::Synchronizer;
use image_updater::writer::SyncWriter;

/// Image Updater - Sync container build definitions with upstream versions
#[derive(Parser, Debug)]
#[command(name = "image-updater")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Repository directory containing images.yaml and the build directories
    #[arg(long, value_name = "DIR")]
    dir: PathBuf,
}

impl Cli {
    /// Execute one synchronization run
    pub fn execute(self) -> Result<()> {
        init_logging();

        let dir = self
            .dir
            .canonicalize()
            .with_context(|| format!("Failed to resolve repository directory {}", self.dir.display()))?;

        let catalog = config::from_dir(&dir)
            .with_context(|| format!("Failed to load catalog from {}", dir.display()))?;

        let http = BlockingHttp::new()?;
        let writer = SyncWriter::new(BuildTree::new(&dir), DefaultGitOperations::new(&dir));
        let mut synchronizer = Synchronizer::new(
            catalog.config.user.clone(),
            RegistryClient::new(&http),
            PackageClient::new(&http),
            writer,
        );

        synchronizer.run(&catalog)?;
        Ok(())
    }
}

/// `LEVEL message` lines on stdout, `info` unless `RUST_LOG` says otherwise.
fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{} {}", record.level(), record.args()))
        .target(env_logger::Target::Stdout)
        .try_init();
}
