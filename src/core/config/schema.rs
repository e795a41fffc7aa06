//! core::config::schema
//!
//! Configuration schema types.
//!
//! The global and repo scopes share one schema; every key is optional so
//! a file only needs to mention what it overrides.
//!
//! # Validation
//!
//! Config values are validated after parsing: date patterns and the zone
//! must be usable, the two count boundaries are mutually exclusive, and
//! values that end up in line-oriented output may not contain line breaks.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::dates::DateFormat;

/// One configuration file.
///
/// # Example
///
/// ```toml
/// git_date_format = "%Y-%m-%d"
/// build_date_format = "%Y-%m-%dT%H:%M:%S%z"
/// time_zone = "UTC"
/// dirty_value = "SNAPSHOT"
/// include_untracked = false
/// count_commits_since_exclusive = "v1.0"
/// buildnumber_template = "{tag}.{commitsCount}.{shortRevision}"
/// property_prefix = "git."
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Pattern for both author and commit dates
    pub git_date_format: Option<String>,

    /// Pattern for the author date, overrides `git_date_format`
    pub author_date_format: Option<String>,

    /// Pattern for the commit date, overrides `git_date_format`
    pub commit_date_format: Option<String>,

    /// Pattern for the build timestamp
    pub build_date_format: Option<String>,

    /// IANA zone name or fixed offset applied to all dates
    pub time_zone: Option<String>,

    /// Marker published when the working tree is dirty
    pub dirty_value: Option<String>,

    /// Whether untracked files make the tree dirty
    pub include_untracked: Option<bool>,

    /// Count down to and including this tag or sha
    pub count_commits_since_inclusive: Option<String>,

    /// Count down to but excluding this tag or sha
    pub count_commits_since_exclusive: Option<String>,

    /// Build-number template with `{placeholder}` fields
    pub buildnumber_template: Option<String>,

    /// Prefix for published property names
    pub property_prefix: Option<String>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count_commits_since_inclusive.is_some()
            && self.count_commits_since_exclusive.is_some()
        {
            return Err(ConfigError::InvalidValue(
                "count_commits_since_inclusive and count_commits_since_exclusive are mutually exclusive"
                    .to_string(),
            ));
        }

        let zone = self.time_zone.as_deref();
        for pattern in [
            &self.git_date_format,
            &self.author_date_format,
            &self.commit_date_format,
            &self.build_date_format,
        ]
        .into_iter()
        .flatten()
        {
            DateFormat::new(pattern, zone)
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        }
        if let Some(zone) = zone {
            DateFormat::new("%Y", Some(zone))
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        }

        for (key, value) in [
            ("dirty_value", &self.dirty_value),
            ("property_prefix", &self.property_prefix),
        ] {
            if value.as_deref().is_some_and(|v| v.contains(['\n', '\r'])) {
                return Err(ConfigError::InvalidValue(format!(
                    "{key} cannot contain line breaks"
                )));
            }
        }

        if let Some(template) = &self.buildnumber_template {
            if template.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "buildnumber_template cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Whether this file sets either count boundary.
    pub fn has_boundary(&self) -> bool {
        self.count_commits_since_inclusive.is_some()
            || self.count_commits_since_exclusive.is_some()
    }
}
