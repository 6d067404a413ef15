//! Base-image declaration handling for build definitions.
//!
//! Each build definition in the catalog carries exactly one `FROM` line. The
//! synchronizer reads the image name out of it, asks an upstream for a new
//! tag, and writes the line back with the resolved reference.

use crate::error::{Error, Result};

/// The image reference named by a `FROM` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseImage {
    /// Image name, possibly namespaced (`owner/image`).
    pub image: String,
    /// Tag after the `:`, if any.
    pub tag: Option<String>,
}

/// Returns the first line of `content` that declares a base image.
pub fn from_line(content: &str) -> Option<&str> {
    content.lines().find(|line| line.starts_with("FROM "))
}

/// Like [`from_line`], but fails with `MissingFromLine` naming `context`.
pub fn require_from_line<'a>(content: &'a str, context: &str) -> Result<&'a str> {
    from_line(content).ok_or_else(|| Error::MissingFromLine {
        context: context.to_string(),
    })
}

/// Decodes `FROM image[:tag] [AS name]` into its image reference.
pub fn decode_from(line: &str, context: &str) -> Result<BaseImage> {
    let reference = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| Error::MissingFromLine {
            context: context.to_string(),
        })?;

    let mut parts = reference.splitn(2, ':');
    let image = parts.next().unwrap_or_default().to_string();
    let tag = parts.next().map(str::to_string);
    Ok(BaseImage { image, tag })
}

/// Renders a `FROM` line for `image:tag`.
pub fn render_from(image: &str, tag: &str) -> String {
    format!("FROM {}:{}", image, tag)
}

/// Replaces every occurrence of `old_line` in `content` with `new_line`.
pub fn replace_from(content: &str, old_line: &str, new_line: &str) -> String {
    content.replace(old_line, new_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_line_first_line() {
        let content = "FROM debian:bookworm\nRUN apt-get update\n";
        assert_eq!(from_line(content), Some("FROM debian:bookworm"));
    }

    #[test]
    fn test_from_line_after_comments() {
        let content = "# syntax=docker/dockerfile:1\nFROM alpine:3.19\n";
        assert_eq!(from_line(content), Some("FROM alpine:3.19"));
    }

    #[test]
    fn test_from_line_missing() {
        assert_eq!(from_line("RUN true\n"), None);
        let err = require_from_line("", "base/Dockerfile").unwrap_err();
        assert!(err.to_string().contains("base/Dockerfile"));
    }

    #[test]
    fn test_decode_from_with_tag() {
        let decoded = decode_from("FROM library/debian:12.5", "t").unwrap();
        assert_eq!(decoded.image, "library/debian");
        assert_eq!(decoded.tag.as_deref(), Some("12.5"));
    }

    #[test]
    fn test_decode_from_without_tag() {
        let decoded = decode_from("FROM base AS build", "t").unwrap();
        assert_eq!(decoded.image, "base");
        assert_eq!(decoded.tag, None);
    }

    #[test]
    fn test_decode_from_empty_reference() {
        assert!(decode_from("FROM ", "t").is_err());
    }

    #[test]
    fn test_replace_from() {
        let content = "FROM debian:bookworm\nRUN true\n";
        let replaced = replace_from(content, "FROM debian:bookworm", &render_from("debian", "bookworm-20240311"));
        assert_eq!(replaced, "FROM debian:bookworm-20240311\nRUN true\n");
    }
}
