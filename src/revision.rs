//! Build revision numbering.
//!
//! A build revision is `<upstream>.<NN>`: the upstream version the directory
//! was last synchronized to, followed by a two-digit counter of how many
//! times content changed while that upstream version stayed the same.

use crate::error::{Error, Result};

/// Highest counter a revision can carry.
pub const MAX_COUNTER: u32 = 99;

/// Computes the revision that follows `previous` for `upstream`.
///
/// `previous` is the current content of the `version` file, empty when the
/// directory has never been built. A different upstream prefix restarts the
/// counter at `01`.
pub fn next_revision(previous: &str, upstream: &str) -> Result<String> {
    let previous = previous.trim();
    let Some((prefix, counter)) = previous.rsplit_once('.') else {
        return Ok(first_revision(upstream));
    };
    if prefix != upstream {
        return Ok(first_revision(upstream));
    }

    let counter: u32 = counter.parse().map_err(|_| Error::RevisionOverflow {
        revision: previous.to_string(),
        message: format!("counter '{}' is not a number", counter),
    })?;
    if counter >= MAX_COUNTER {
        return Err(Error::RevisionOverflow {
            revision: previous.to_string(),
            message: format!("counter exceeds {}", MAX_COUNTER),
        });
    }
    Ok(format!("{}.{:02}", upstream, counter + 1))
}

fn first_revision(upstream: &str) -> String {
    format!("{}.01", upstream)
}

/// Strips everything up to and including the last `:` of a package version.
///
/// `2:1.4.2-3` becomes `1.4.2-3`; versions without a colon are unchanged.
pub fn bare_version(package_version: &str) -> &str {
    match package_version.rfind(':') {
        Some(idx) => &package_version[idx + 1..],
        None => package_version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_next_revision_without_previous() {
        assert_eq!(next_revision("", "3.4").unwrap(), "3.4.01");
    }

    #[test]
    fn test_next_revision_increments() {
        assert_eq!(next_revision("3.4.01", "3.4").unwrap(), "3.4.02");
        assert_eq!(next_revision("3.4.09", "3.4").unwrap(), "3.4.10");
        assert_eq!(next_revision("3.4.01\n", "3.4").unwrap(), "3.4.02");
    }

    #[test]
    fn test_next_revision_resets_on_new_upstream() {
        assert_eq!(next_revision("3.4.05", "3.5").unwrap(), "3.5.01");
        assert_eq!(
            next_revision("bookworm-20240101.03", "bookworm-20240311").unwrap(),
            "bookworm-20240311.01"
        );
    }

    #[test]
    fn test_next_revision_upstream_without_dots() {
        // "12" has no prefix of its own; the counter starts over.
        assert_eq!(next_revision("12", "12").unwrap(), "12.01");
        assert_eq!(next_revision("12.01", "12").unwrap(), "12.02");
    }

    #[test]
    fn test_next_revision_overflow() {
        let err = next_revision("3.4.99", "3.4").unwrap_err();
        assert!(matches!(err, Error::RevisionOverflow { .. }));
    }

    #[test]
    fn test_next_revision_garbage_counter() {
        assert!(next_revision("3.4.xx", "3.4").is_err());
    }

    #[test]
    fn test_bare_version() {
        assert_eq!(bare_version("2:1.4.2-3"), "1.4.2-3");
        assert_eq!(bare_version("1.4.2-3"), "1.4.2-3");
        assert_eq!(bare_version("1:2:3"), "3");
    }

    proptest! {
        #[test]
        fn prop_first_revision(v in "[0-9a-z.-]{1,12}") {
            prop_assert_eq!(next_revision("", &v).unwrap(), format!("{}.01", v));
        }

        #[test]
        fn prop_counter_increments(v in "[0-9a-z.-]{1,12}", n in 1u32..99) {
            let previous = format!("{}.{:02}", v, n);
            prop_assert_eq!(next_revision(&previous, &v).unwrap(), format!("{}.{:02}", v, n + 1));
        }

        #[test]
        fn prop_new_upstream_resets(v1 in "[0-9a-z]{1,8}", v2 in "[0-9a-z]{1,8}") {
            prop_assume!(v1 != v2);
            prop_assert_eq!(next_revision(&format!("{}.05", v1), &v2).unwrap(), format!("{}.01", v2));
        }
    }
}
