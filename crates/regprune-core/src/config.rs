//! Configuration file parsing.
//!
//! The retention configuration is a flat `key=value` file:
//!
//! ```text
//! # repository = number of most recent tags to keep
//! apps/web = 10
//! apps/worker=3
//! ```
//!
//! Lines starting with `#` are comments. A line without `=`, or whose key is
//! empty, is ignored. Keys and values are trimmed. There are no sections,
//! escapes or multi-line values.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::rule::RetentionPolicy;

/// Parses configuration text into a raw repository → value mapping.
///
/// Values are not validated here; see [`RetentionPolicy::from_entries`].
/// When a key appears twice the last occurrence wins.
///
/// # Examples
///
/// ```
/// use regprune_core::parse_config;
///
/// let entries = parse_config("# comment\nrepoA = 3\n");
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries["repoA"], "3");
/// ```
#[must_use]
pub fn parse_config(text: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();

    for line in text.lines() {
        let line = line.trim_start();
        if line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        entries.insert(key.to_string(), value.trim().to_string());
    }

    entries
}

/// Loads and validates the retention policy from a configuration file.
///
/// An empty path yields an empty policy, so a run without a configuration
/// file is a no-op rather than an error.
///
/// # Errors
///
/// Returns [`Error::ConfigRead`] if the file cannot be read. Malformed
/// rules are not errors here; they are collected in
/// [`RetentionPolicy::rejected`].
pub fn load_policy(path: &Path) -> Result<RetentionPolicy> {
    tracing::info!(path = %path.display(), "parsing configuration");

    if path.as_os_str().is_empty() {
        return Ok(RetentionPolicy::default());
    }

    let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(RetentionPolicy::from_entries(parse_config(&text)))
}
