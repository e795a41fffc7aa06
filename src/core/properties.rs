//! core::properties
//!
//! The published key/value mapping and its renderings.
//!
//! Every extraction publishes exactly the keys in [`keys::ALL`], all as
//! strings. When extraction fails, the caller publishes
//! [`BuildProperties::unknown`] instead so downstream build steps always
//! see a complete set. Partial results are never published.
//!
//! # Renderings
//!
//! - [`OutputFormat::Properties`]: `git.revision=...` lines with
//!   Java-properties escaping
//! - [`OutputFormat::Json`]: a flat JSON object
//! - [`OutputFormat::Env`]: `GIT_REVISION=...` lines for CI environment files

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Published property names.
pub mod keys {
    pub const REVISION: &str = "revision";
    pub const SHORT_REVISION: &str = "shortRevision";
    pub const DIRTY: &str = "dirty";
    pub const BRANCH: &str = "branch";
    pub const TAG: &str = "tag";
    pub const PARENT: &str = "parent";
    pub const COMMITS_COUNT: &str = "commitsCount";
    pub const AUTHOR_DATE: &str = "authorDate";
    pub const COMMIT_DATE: &str = "commitDate";
    pub const DESCRIBE: &str = "describe";
    pub const BUILD_DATE: &str = "buildDate";
    pub const BUILDNUMBER: &str = "buildnumber";

    /// Every published key.
    pub const ALL: [&str; 12] = [
        REVISION,
        SHORT_REVISION,
        DIRTY,
        BRANCH,
        TAG,
        PARENT,
        COMMITS_COUNT,
        AUTHOR_DATE,
        COMMIT_DATE,
        DESCRIBE,
        BUILD_DATE,
        BUILDNUMBER,
    ];
}

/// Default prefix prepended to every key when publishing.
pub const DEFAULT_PREFIX: &str = "git.";

/// How properties are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Java-style `key=value` lines
    #[default]
    Properties,
    /// A JSON object
    Json,
    /// `KEY=value` lines
    Env,
}

/// Published key/value pairs, sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildProperties(BTreeMap<&'static str, String>);

impl BuildProperties {
    pub(crate) fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, String)>,
    {
        Self(pairs.into_iter().collect())
    }

    /// The placeholder set published when extraction fails.
    ///
    /// # Example
    ///
    /// ```
    /// use gitbuildnumber::core::properties::{keys, BuildProperties};
    ///
    /// let unknown = BuildProperties::unknown();
    /// assert_eq!(unknown.get(keys::REVISION), Some("UNKNOWN_REVISION"));
    /// assert_eq!(unknown.get(keys::COMMITS_COUNT), Some("-1"));
    /// assert_eq!(unknown.len(), keys::ALL.len());
    /// ```
    pub fn unknown() -> Self {
        Self::from_pairs([
            (keys::REVISION, "UNKNOWN_REVISION".to_string()),
            (keys::SHORT_REVISION, "UNKNOWN_REVISION".to_string()),
            (keys::DIRTY, "UNKNOWN_DIRTY".to_string()),
            (keys::BRANCH, "UNKNOWN_BRANCH".to_string()),
            (keys::TAG, "UNKNOWN_TAG".to_string()),
            (keys::PARENT, "UNKNOWN_PARENT".to_string()),
            (keys::COMMITS_COUNT, "-1".to_string()),
            (keys::AUTHOR_DATE, "UNKNOWN_AUTHOR_DATE".to_string()),
            (keys::COMMIT_DATE, "UNKNOWN_COMMIT_DATE".to_string()),
            (keys::DESCRIBE, "UNKNOWN_DESCRIBE".to_string()),
            (keys::BUILD_DATE, "UNKNOWN_BUILD_DATE".to_string()),
            (keys::BUILDNUMBER, "UNKNOWN_BUILDNUMBER".to_string()),
        ])
    }

    /// Value of a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render with every key prefixed by `prefix`.
    pub fn render(&self, format: OutputFormat, prefix: &str) -> String {
        match format {
            OutputFormat::Properties => self
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}={}\n",
                        escape_property(&format!("{prefix}{k}"), true),
                        escape_property(v, false)
                    )
                })
                .collect(),
            OutputFormat::Json => {
                let map: BTreeMap<String, &str> =
                    self.iter().map(|(k, v)| (format!("{prefix}{k}"), v)).collect();
                // A map of strings always serializes.
                let mut out = serde_json::to_string_pretty(&map).unwrap_or_default();
                out.push('\n');
                out
            }
            OutputFormat::Env => self
                .iter()
                .map(|(k, v)| format!("{}={}\n", env_key(prefix, k), v.replace('\n', " ")))
                .collect(),
        }
    }
}

/// Escape a key or value for a Java properties file.
fn escape_property(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '=' | ':' | '#' | '!' if is_key || i == 0 => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

/// `git.` + `shortRevision` -> `GIT_SHORT_REVISION`.
fn env_key(prefix: &str, key: &str) -> String {
    let mut out = String::new();
    for c in prefix.chars().chain(key.chars()) {
        if c.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c);
        } else if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_uppercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out
}
