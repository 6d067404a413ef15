//! # Debian Package Repository Lookups
//!
//! Resolves the newest version of a package published in a Debian-style
//! repository. The repository is described by the catalog as one
//! space-separated string, the same shape as a `sources.list` entry:
//!
//! ```text
//! deb http://nginx.org/packages/debian bookworm nginx
//! ^   ^                                ^        ^
//! |   root URL                         dist     components...
//! label (ignored)
//! ```
//!
//! For every component the gzip-compressed `Packages` index for `amd64` is
//! downloaded and parsed. All stanzas whose `Package` field equals the
//! requested name are collected across components and the highest `Version`
//! under Debian ordering wins.
//!
//! ## Index format
//!
//! An index is a list of stanzas separated by blank lines. Each stanza holds
//! `Field: value` lines. A line starting with a space or tab continues the
//! previous field. Field names are split off at the first colon only, so
//! values such as `Description: tool: does things` keep their text.

use std::collections::HashMap;
use std::io::Read;

use flate2::read::GzDecoder;
use log::{debug, info, warn};
use url::Url;

use crate::debversion::DebVersion;
use crate::error::{Error, Result};
use crate::http::HttpFetch;

/// Architecture whose package index is consulted.
pub const ARCHITECTURE: &str = "amd64";

/// A parsed repository descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    pub label: String,
    pub root: String,
    pub distribution: String,
    pub components: Vec<String>,
}

impl RepositoryDescriptor {
    /// Parses `label root distribution component...`.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let tokens: Vec<&str> = descriptor.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(Error::InvalidRepository {
                descriptor: descriptor.to_string(),
                message: "expected '<label> <root-url> <distribution> <component>...'".to_string(),
            });
        }

        Url::parse(tokens[1]).map_err(|e| Error::InvalidRepository {
            descriptor: descriptor.to_string(),
            message: format!("invalid root URL '{}': {}", tokens[1], e),
        })?;

        Ok(Self {
            label: tokens[0].to_string(),
            root: tokens[1].trim_end_matches('/').to_string(),
            distribution: tokens[2].to_string(),
            components: tokens[3..].iter().map(|c| c.to_string()).collect(),
        })
    }

    /// URL of the compressed package index of `component`.
    pub fn index_url(&self, component: &str) -> String {
        format!(
            "{}/dists/{}/{}/binary-{}/Packages.gz",
            self.root, self.distribution, component, ARCHITECTURE
        )
    }
}

/// One record of a package index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stanza {
    fields: HashMap<String, String>,
}

impl Stanza {
    /// Value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parses the text of a `Packages` index into stanzas.
pub fn parse_index(text: &str) -> Vec<Stanza> {
    let mut stanzas = Vec::new();
    let mut current = Stanza::default();
    let mut last_field: Option<String> = None;

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                stanzas.push(std::mem::take(&mut current));
            }
            last_field = None;
            continue;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            match last_field.as_ref().and_then(|f| current.fields.get_mut(f)) {
                Some(value) => {
                    value.push('\n');
                    value.push_str(&line[1..]);
                }
                None => debug!("Ignoring continuation line without a field: {:?}", line),
            }
            continue;
        }

        match line.split_once(':') {
            Some((key, value)) if !key.is_empty() && !key.contains(char::is_whitespace) => {
                current
                    .fields
                    .insert(key.to_string(), value.trim().to_string());
                last_field = Some(key.to_string());
            }
            _ => {
                debug!("Ignoring malformed index line: {:?}", line);
                last_field = None;
            }
        }
    }

    if !current.is_empty() {
        stanzas.push(current);
    }
    stanzas
}

/// Returns the highest version of `package` among `stanzas`.
///
/// When several stanzas carry equal versions the first one is kept.
pub fn latest_version<'a>(stanzas: &'a [Stanza], package: &str) -> Option<&'a str> {
    let mut best: Option<(DebVersion, &str)> = None;

    for stanza in stanzas.iter().filter(|s| s.get("Package") == Some(package)) {
        let Some(version) = stanza.get("Version") else {
            warn!("Stanza for {} has no Version field, skipping", package);
            continue;
        };
        let parsed = DebVersion::parse(version);
        let replace = match &best {
            Some((current, _)) => parsed > *current,
            None => true,
        };
        if replace {
            best = Some((parsed, version));
        }
    }

    best.map(|(_, version)| version)
}

/// Client for Debian-style package repositories.
pub struct PackageClient<H> {
    http: H,
}

impl<H: HttpFetch> PackageClient<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }

    /// Downloads and decompresses one package index.
    pub fn fetch_index(&self, url: &str) -> Result<String> {
        debug!("Fetching package index: {}", url);
        let compressed = self.http.get(url).map_err(|e| Error::RepositoryUnavailable {
            url: url.to_string(),
            message: e.message,
        })?;

        let mut text = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut text)
            .map_err(|e| Error::RepositoryUnavailable {
                url: url.to_string(),
                message: format!("Failed to decompress package index: {}", e),
            })?;
        Ok(text)
    }

    /// Returns the newest version of `package` across all components of
    /// `descriptor`.
    pub fn latest_package_version(&self, descriptor: &str, package: &str) -> Result<String> {
        let repository = RepositoryDescriptor::parse(descriptor)?;

        let mut matching = Vec::new();
        for component in &repository.components {
            let index = self.fetch_index(&repository.index_url(component))?;
            let stanzas = parse_index(&index);
            debug!(
                "Component {} lists {} packages",
                component,
                stanzas.len()
            );
            matching.extend(
                stanzas
                    .into_iter()
                    .filter(|s| s.get("Package") == Some(package)),
            );
        }

        let version = latest_version(&matching, package).ok_or_else(|| Error::PackageNotFound {
            package: package.to_string(),
            repository: descriptor.to_string(),
        })?;

        info!("Package: {}, latest version: {}", package, version);
        Ok(version.to_string())
    }
}
