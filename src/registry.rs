//! # Container Registry Lookups
//!
//! Resolves the newest tag of a base image on a Docker Hub style registry.
//! "Newest" means the most recent upload, not the highest version number:
//! the tags are filtered by the template's `tagfilter` and ranked by their
//! `last_updated` timestamp.
//!
//! The filter follows prefix-match semantics. It is anchored at the start of
//! the tag name but not at the end, so `bookworm-` accepts
//! `bookworm-20240311`.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::http::HttpFetch;

/// Registry queried when no other base URL is configured.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.hub.docker.com";

/// One entry of the tag listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagEntry {
    pub name: String,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    results: Vec<TagEntry>,
}

/// A tag chosen as latest, with its upload time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestTag {
    pub name: String,
    pub uploaded: DateTime<Utc>,
}

/// Client for the registry tag listing API.
pub struct RegistryClient<H> {
    http: H,
    base_url: String,
}

impl<H: HttpFetch> RegistryClient<H> {
    /// Create a client against [`DEFAULT_REGISTRY_URL`].
    pub fn new(http: H) -> Self {
        Self {
            http,
            base_url: DEFAULT_REGISTRY_URL.to_string(),
        }
    }

    /// Use a different registry root (no trailing slash needed).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// URL of the tag listing for `image_ref`.
    pub fn tags_url(&self, image_ref: &str) -> String {
        let (owner, image) = split_image_ref(image_ref);
        format!("{}/v2/repositories/{}/{}/tags", self.base_url, owner, image)
    }

    /// Returns the most recently uploaded tag of `image_ref` matching `tag_filter`.
    pub fn latest_tag(&self, image_ref: &str, tag_filter: &str) -> Result<String> {
        let url = self.tags_url(image_ref);
        debug!("Listing tags from: {}", url);

        let body = self.http.get(&url).map_err(|e| Error::RegistryUnavailable {
            url: url.clone(),
            message: e.message,
        })?;
        let response: TagsResponse =
            serde_json::from_slice(&body).map_err(|e| Error::RegistryUnavailable {
                url: url.clone(),
                message: format!("Failed to parse tags response: {}", e),
            })?;

        let latest = select_latest(&response.results, tag_filter)?.ok_or_else(|| {
            Error::NoMatchingTag {
                image: image_ref.to_string(),
                filter: tag_filter.to_string(),
            }
        })?;

        info!(
            "Registry latest image: {}, tag: {}, upload: {}",
            image_ref, latest.name, latest.uploaded
        );
        Ok(latest.name)
    }
}

/// Splits `image` or `owner/image` into `(owner, image)`.
///
/// Official images live under the implicit `library` namespace.
pub fn split_image_ref(image_ref: &str) -> (&str, &str) {
    match image_ref.split_once('/') {
        Some((owner, image)) => (owner, image),
        None => ("library", image_ref),
    }
}

/// Picks the matching tag with the latest upload time.
///
/// Ties keep the tag listed first. Entries whose timestamp is missing or
/// unparseable are skipped.
pub fn select_latest(tags: &[TagEntry], tag_filter: &str) -> Result<Option<LatestTag>> {
    let filter = Regex::new(&format!("^(?:{})", tag_filter))?;
    let mut newest: Option<LatestTag> = None;

    for tag in tags.iter().filter(|t| filter.is_match(&t.name)) {
        let Some(uploaded) = tag.last_updated.as_deref().and_then(parse_timestamp) else {
            warn!(
                "Skipping tag {} with unusable last_updated {:?}",
                tag.name, tag.last_updated
            );
            continue;
        };

        let replace = match &newest {
            Some(current) => uploaded > current.uploaded,
            None => true,
        };
        if replace {
            newest = Some(LatestTag {
                name: tag.name.clone(),
                uploaded,
            });
        }
    }

    Ok(newest)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
