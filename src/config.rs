//! # Catalog Schema and Parsing
//!
//! This module defines the data structures that represent the `images.yaml`
//! catalog and the logic for loading it. The catalog is read once per run and
//! never mutated; every other module borrows views into it.
//!
//! ## Shape
//!
//! ```yaml
//! config:
//!   user: acme
//! templates:
//!   - name: base
//!     tagfilter: '^bookworm-\d+$'
//!     dockerfilecontent: |
//!       FROM debian:bookworm
//!       RUN apt-get update
//!     images:
//!       - name: nginx
//!         package: nginx
//!         repository: deb http://nginx.org/packages/debian bookworm nginx
//!         entrypointcontent: |
//!           #!/bin/sh
//!           exec nginx -g 'daemon off;'
//!         dockerfilecontent: |
//!           FROM base
//!           RUN echo "REPLACE_REPOSITORY" > /etc/apt/sources.list.d/nginx.list
//! ```
//!
//! Loading validates what can be checked offline (regexes compile, directory
//! names are present and unique) so that a broken catalog fails before any
//! upstream is contacted.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// File name of the catalog inside the repository directory.
pub const CATALOG_FILE: &str = "images.yaml";

/// Build definition written for templates.
pub const DOCKERFILE: &str = "Dockerfile";

/// Build definition of an image, based on the locally built template.
pub const DOCKERFILE_LOCAL: &str = "Dockerfile-local";

/// Build definition of an image, based on the template published on the hub.
pub const DOCKERFILE_HUB: &str = "Dockerfile-hub";

/// Companion script written next to image build definitions.
pub const ENTRYPOINT_FILE: &str = "entrypoint.sh";

/// Plain-text file holding the current build revision of a directory.
pub const VERSION_FILE: &str = "version";

/// Token in an image's `dockerfilecontent` replaced by its repository descriptor.
pub const REPOSITORY_PLACEHOLDER: &str = "REPLACE_REPOSITORY";

/// Root of the catalog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Global settings.
    pub config: CatalogConfig,
    /// Base-image build units, processed in this order.
    #[serde(default)]
    pub templates: Vec<Template>,
}

/// Global catalog settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Namespace under which hub-facing images are published.
    pub user: String,
}

/// A base-image build unit tracked against a container registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Name of the template, also its build directory.
    pub name: String,
    /// Build definition with exactly one `FROM` line.
    pub dockerfilecontent: String,
    /// Regular expression that upstream tags must match (from the start).
    pub tagfilter: String,
    /// Images built on top of this template.
    #[serde(default)]
    pub images: Vec<Image>,
}

/// A derived build unit tracked against a Debian-style package repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Name of the image, also its build directory.
    pub name: String,
    /// Build definition with one `FROM` line and the repository placeholder.
    pub dockerfilecontent: String,
    /// Literal content of `entrypoint.sh`.
    pub entrypointcontent: String,
    /// Space-separated descriptor: label, root URL, distribution, components.
    pub repository: String,
    /// Package whose newest version drives the image revision.
    pub package: String,
}

/// Parse a catalog from a YAML string and validate it.
pub fn parse(yaml_content: &str) -> Result<Catalog> {
    let catalog: Catalog = serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some("The catalog needs a 'config.user' value and a 'templates' list".to_string()),
    })?;
    validate(&catalog)?;
    Ok(catalog)
}

/// Load and validate `images.yaml` from the given repository directory.
pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Catalog> {
    let path = dir.as_ref().join(CATALOG_FILE);
    let content = std::fs::read_to_string(&path).map_err(|e| Error::ConfigParse {
        message: format!("Failed to read {}: {}", path.display(), e),
        hint: Some(format!("Point --dir at a directory containing {}", CATALOG_FILE)),
    })?;
    parse(&content)
}

/// Checks the parts of a catalog that can be verified without network access.
pub fn validate(catalog: &Catalog) -> Result<()> {
    if catalog.config.user.trim().is_empty() {
        return Err(Error::ConfigParse {
            message: "config.user must not be empty".to_string(),
            hint: None,
        });
    }

    let mut seen = HashSet::new();
    for template in &catalog.templates {
        check_name(&template.name, &mut seen)?;
        Regex::new(&template.tagfilter).map_err(|e| Error::ConfigParse {
            message: format!("Invalid tagfilter for template '{}': {}", template.name, e),
            hint: None,
        })?;
        for image in &template.images {
            check_name(&image.name, &mut seen)?;
            if image.package.trim().is_empty() {
                return Err(Error::ConfigParse {
                    message: format!("Image '{}' has an empty package name", image.name),
                    hint: None,
                });
            }
        }
    }
    Ok(())
}

fn check_name<'a>(name: &'a str, seen: &mut HashSet<&'a str>) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::ConfigParse {
            message: "Template and image names must not be empty".to_string(),
            hint: Some("The name doubles as the build directory".to_string()),
        });
    }
    if !seen.insert(name) {
        return Err(Error::ConfigParse {
            message: format!("Duplicate build directory '{}'", name),
            hint: Some("Every template and image needs its own directory".to_string()),
        });
    }
    Ok(())
}
