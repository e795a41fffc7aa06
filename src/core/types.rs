//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA), the resolved form of a commit ref
//! - [`CommitCount`] - Result of an ancestry count, or the shallow sentinel
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use gitbuildnumber::core::types::{CommitCount, Oid};
//!
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! assert_eq!(oid.short_revision(), "abc123d");
//!
//! assert!(Oid::new("not-a-sha").is_err());
//! assert_eq!(CommitCount::Shallow.to_string(), "-1");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the abbreviated revision used in build numbers.
pub const SHORT_REVISION_LEN: usize = 7;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency. Once resolved, an
/// `Oid` never changes; the abbreviated form is derived on demand.
///
/// # Example
///
/// ```
/// use gitbuildnumber::core::types::Oid;
///
/// // Create from hex string (normalized to lowercase)
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
///
/// // Get abbreviated form
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters. If `len` exceeds the OID length,
    /// returns the full OID.
    ///
    /// # Example
    ///
    /// ```
    /// use gitbuildnumber::core::types::Oid;
    ///
    /// let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
    /// assert_eq!(oid.short(7), "abc123d");
    /// assert_eq!(oid.short(4), "abc1");
    /// ```
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// The short revision shown in build numbers (first 7 characters).
    pub fn short_revision(&self) -> &str {
        self.short(SHORT_REVISION_LEN)
    }

    /// Check whether this OID starts with the given (possibly abbreviated) prefix.
    ///
    /// Matching is case-insensitive on the prefix. Every id starts with the
    /// empty prefix.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(&prefix.to_ascii_lowercase())
    }

    /// Validate an object id.
    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of commits reachable from a start commit.
///
/// `Shallow` is distinct from a zero count: it means the repository
/// history was truncated by a shallow clone and the true number cannot
/// be known. It renders as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitCount {
    /// The walk completed (or hit its boundary) with this many commits.
    Counted(usize),
    /// History is shallow; the count is unknown.
    Shallow,
}

impl CommitCount {
    /// The count as a signed integer, `-1` for shallow history.
    pub fn as_i64(&self) -> i64 {
        match self {
            CommitCount::Counted(n) => *n as i64,
            CommitCount::Shallow => -1,
        }
    }

    /// Check if the count is the shallow sentinel.
    pub fn is_shallow(&self) -> bool {
        matches!(self, CommitCount::Shallow)
    }
}

impl std::fmt::Display for CommitCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}
