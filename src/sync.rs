//! # Synchronization Orchestrator
//!
//! Drives one run over the catalog. Templates are processed in catalog order
//! and each one is finished, images included, before the next starts:
//!
//! 1. **Template**: resolve the newest registry tag for the template's base
//!    image, rewrite `Dockerfile` if the resolved `FROM` line differs, bump
//!    the build revision and checkpoint. The template version handed to its
//!    images is the new revision, or the one already on disk when nothing
//!    changed.
//! 2. **Images**: resolve the newest package version, render the local and
//!    hub build definitions against the template version, sync
//!    `entrypoint.sh`, and checkpoint when anything changed.
//!
//! Every upstream lookup failure aborts the run. Checkpoints made for earlier
//! units stay in the history; there is no cross-unit rollback.

use log::{info, warn};

use crate::config::{
    Catalog, Image, Template, DOCKERFILE, DOCKERFILE_HUB, DOCKERFILE_LOCAL, ENTRYPOINT_FILE,
    REPOSITORY_PLACEHOLDER, VERSION_FILE,
};
use crate::diff::line_diff;
use crate::dockerfile::{decode_from, render_from, replace_from, require_from_line};
use crate::error::Result;
use crate::http::HttpFetch;
use crate::packages::PackageClient;
use crate::registry::RegistryClient;
use crate::repository::GitOperations;
use crate::revision::bare_version;
use crate::writer::{checkpoint_tag, Checkpoint, SyncWriter};

/// Outcome of synchronizing one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSync {
    /// Build revision the template's images are based on. Empty when the
    /// template has never been built.
    pub version: String,
    /// Checkpoint created for the template, if its content changed.
    pub checkpoint: Option<Checkpoint>,
}

/// Everything a run recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub checkpoints: Vec<Checkpoint>,
}

/// Explicit context of a synchronization run.
pub struct Synchronizer<H, G> {
    user: String,
    registry: RegistryClient<H>,
    packages: PackageClient<H>,
    writer: SyncWriter<G>,
}

impl<H: HttpFetch, G: GitOperations> Synchronizer<H, G> {
    /// `user` is the hub namespace hub-facing images are published under.
    pub fn new(
        user: impl Into<String>,
        registry: RegistryClient<H>,
        packages: PackageClient<H>,
        writer: SyncWriter<G>,
    ) -> Self {
        Self {
            user: user.into(),
            registry,
            packages,
            writer,
        }
    }

    /// Synchronizes every template and image of `catalog`, in order.
    pub fn run(&mut self, catalog: &Catalog) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for template in &catalog.templates {
            let synced = self.sync_template(template)?;
            report.checkpoints.extend(synced.checkpoint);

            for image in &template.images {
                if let Some(checkpoint) = self.sync_image(image, &synced.version)? {
                    report.checkpoints.push(checkpoint);
                }
            }
        }

        info!("Synchronized {} checkpoint(s)", report.checkpoints.len());
        Ok(report)
    }

    /// Brings a template's `Dockerfile` up to the newest matching registry tag.
    pub fn sync_template(&mut self, template: &Template) -> Result<TemplateSync> {
        let dir = template.name.as_str();
        let current = self.writer.tree().read(dir, DOCKERFILE)?;

        let context = format!("template '{}'", dir);
        let from = require_from_line(&template.dockerfilecontent, &context)?;
        let base = decode_from(from, &context)?;
        let latest = self.registry.latest_tag(&base.image, &template.tagfilter)?;

        let proposed = replace_from(
            &template.dockerfilecontent,
            from,
            &render_from(&base.image, &latest),
        );
        if proposed == current {
            info!("Template {} is up to date", dir);
            return Ok(TemplateSync {
                version: self.writer.tree().read(dir, VERSION_FILE)?,
                checkpoint: None,
            });
        }

        info!("Updating template {}", dir);
        self.writer.sync_file(dir, DOCKERFILE, &proposed)?;
        let revision = self.writer.write_revision(dir, &latest)?;
        let checkpoint = self.writer.checkpoint(&checkpoint_tag(dir, &revision))?;

        Ok(TemplateSync {
            version: revision,
            checkpoint: Some(checkpoint),
        })
    }

    /// Brings an image's build definitions and entrypoint in line with its
    /// template version and newest package version.
    pub fn sync_image(
        &mut self,
        image: &Image,
        template_version: &str,
    ) -> Result<Option<Checkpoint>> {
        let dir = image.name.as_str();
        let latest = self
            .packages
            .latest_package_version(&image.repository, &image.package)?;

        if template_version.is_empty() {
            warn!(
                "Template of image {} has never been built, base image tag will be empty",
                dir
            );
        }

        let current_hub = self.writer.tree().read(dir, DOCKERFILE_HUB)?;

        let context = format!("image '{}'", dir);
        let from = require_from_line(&image.dockerfilecontent, &context)?;
        let base = decode_from(from, &context)?;

        let content = image
            .dockerfilecontent
            .replace(REPOSITORY_PLACEHOLDER, &image.repository);
        let local = replace_from(&content, from, &render_from(&base.image, template_version));
        let hub = replace_from(
            &content,
            from,
            &render_from(&format!("{}/{}", self.user, base.image), template_version),
        );

        let mut changed = false;
        if hub != current_hub {
            info!("Updating image {}", dir);
            info!("DIFF:\n{}", line_diff(&current_hub, &hub));
            self.writer.write_staged(dir, DOCKERFILE_LOCAL, &local)?;
            self.writer.write_staged(dir, DOCKERFILE_HUB, &hub)?;
            changed = true;
        }

        changed |= self
            .writer
            .sync_file(dir, ENTRYPOINT_FILE, &image.entrypointcontent)?;

        if !changed {
            info!("Image {} is up to date", dir);
            return Ok(None);
        }

        let version = bare_version(&latest);
        let revision = self.writer.write_revision(dir, version)?;
        let checkpoint = self.writer.checkpoint(&checkpoint_tag(dir, &revision))?;
        Ok(Some(checkpoint))
    }
}
