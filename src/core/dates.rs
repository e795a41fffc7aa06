//! core::dates
//!
//! Date patterns and time zones for the author, commit and build dates.
//!
//! Patterns use chrono's strftime syntax (`%Y-%m-%d %H:%M:%S`). They are
//! validated when a [`DateFormat`] is constructed so a bad pattern fails
//! before any repository work starts.
//!
//! Zones are IANA names (`Europe/Berlin`, `UTC`) or fixed offsets
//! (`+05:30`). Without a zone, dates render in the local time zone.

use std::fmt::{Display, Write};
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use thiserror::Error;

/// Default pattern for author and commit dates.
pub const DEFAULT_GIT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default pattern for the build timestamp.
pub const DEFAULT_BUILD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors from date pattern and zone handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date format '{pattern}'")]
    InvalidFormat { pattern: String },

    #[error("unknown time zone '{0}'")]
    InvalidTimeZone(String),
}

/// A time zone override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// IANA zone from the tz database.
    Named(chrono_tz::Tz),
    /// Fixed UTC offset.
    Fixed(FixedOffset),
}

impl FromStr for Zone {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(tz) = s.parse::<chrono_tz::Tz>() {
            return Ok(Zone::Named(tz));
        }
        if let Ok(offset) = s.parse::<FixedOffset>() {
            return Ok(Zone::Fixed(offset));
        }
        Err(DateError::InvalidTimeZone(s.to_string()))
    }
}

/// A validated pattern with an optional zone override.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use gitbuildnumber::core::dates::DateFormat;
///
/// let fmt = DateFormat::new("%Y-%m-%d %H:%M", Some("Asia/Tokyo")).unwrap();
/// let when = Utc.with_ymd_and_hms(2024, 3, 1, 20, 30, 0).unwrap();
/// assert_eq!(fmt.format(&when).unwrap(), "2024-03-02 05:30");
///
/// assert!(DateFormat::new("%Y-%Q", None).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
    zone: Option<Zone>,
}

impl DateFormat {
    /// Validate `pattern` and parse the optional zone.
    ///
    /// # Errors
    ///
    /// - [`DateError::InvalidFormat`] if the pattern has an unknown or
    ///   incomplete specifier
    /// - [`DateError::InvalidTimeZone`] if the zone is not recognised
    pub fn new(pattern: &str, zone: Option<&str>) -> Result<Self, DateError> {
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(DateError::InvalidFormat {
                pattern: pattern.to_string(),
            });
        }

        let zone = zone.map(Zone::from_str).transpose()?;

        Ok(Self {
            pattern: pattern.to_string(),
            zone,
        })
    }

    /// Render an instant with this pattern in the configured zone.
    pub fn format<T: TimeZone>(&self, when: &DateTime<T>) -> Result<String, DateError> {
        let utc = when.with_timezone(&Utc);
        let rendered = match self.zone {
            Some(Zone::Named(tz)) => render(&utc.with_timezone(&tz), &self.pattern),
            Some(Zone::Fixed(offset)) => render(&utc.with_timezone(&offset), &self.pattern),
            None => render(&utc.with_timezone(&Local), &self.pattern),
        };

        rendered.map_err(|_| DateError::InvalidFormat {
            pattern: self.pattern.clone(),
        })
    }
}

fn render<T>(when: &DateTime<T>, pattern: &str) -> Result<String, std::fmt::Error>
where
    T: TimeZone,
    T::Offset: Display,
{
    let mut out = String::new();
    write!(out, "{}", when.format(pattern))?;
    Ok(out)
}

/// The three date renderings of one extraction.
///
/// Each field has its own pattern; the zone override is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormats {
    pub author: DateFormat,
    pub commit: DateFormat,
    pub build: DateFormat,
}

impl DateFormats {
    /// Independent patterns for every field.
    pub fn with_patterns(
        author_pattern: &str,
        commit_pattern: &str,
        build_pattern: &str,
        zone: Option<&str>,
    ) -> Result<Self, DateError> {
        Ok(Self {
            author: DateFormat::new(author_pattern, zone)?,
            commit: DateFormat::new(commit_pattern, zone)?,
            build: DateFormat::new(build_pattern, zone)?,
        })
    }
}
