//! core::walk
//!
//! Ancestry counting over a lazy commit walk.
//!
//! The walk itself is produced by the git layer as an iterator of
//! [`WalkEvent`]s in reverse-chronological topological order (every commit
//! after all of its descendants). Only commit identities flow through it.
//! This module decides what to count and when to stop.
//!
//! # Boundaries
//!
//! - No boundary: every visited commit is counted.
//! - [`Boundary::Inclusive`]: the matching commit is counted, then the walk stops.
//! - [`Boundary::Exclusive`]: the walk stops at the matching commit without counting it.
//!
//! A commit matches when its id starts with the boundary's resolved sha
//! prefix, so an empty boundary matches the start commit. A boundary that
//! is never met is not an error; the full reachable history is counted.
//!
//! # Shallow history
//!
//! When the walk reports [`WalkEvent::Truncated`] the result is
//! [`CommitCount::Shallow`], never a partial count.

use super::types::{CommitCount, Oid};

/// One step of a commit walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    /// A commit reachable from the start.
    Commit(Oid),
    /// Ancestors beyond this point are missing (shallow clone).
    Truncated,
}

/// Where a bounded count stops.
///
/// The contained string is either a tag name or a (possibly abbreviated)
/// sha. Before counting, the engine resolves tag names to the peeled
/// commit sha with [`Boundary::resolved`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Boundary {
    /// Count down to and including the named ancestor.
    Inclusive(String),
    /// Count down to but excluding the named ancestor.
    Exclusive(String),
}

impl Boundary {
    /// Build a boundary from the two optional settings.
    ///
    /// Inclusive wins if both are given; configuration validation rejects
    /// that combination before it gets here.
    pub fn from_options(inclusive: Option<&str>, exclusive: Option<&str>) -> Option<Self> {
        match (inclusive, exclusive) {
            (Some(r), _) => Some(Boundary::Inclusive(r.to_string())),
            (None, Some(r)) => Some(Boundary::Exclusive(r.to_string())),
            (None, None) => None,
        }
    }

    /// The tag name or sha prefix this boundary refers to.
    pub fn reference(&self) -> &str {
        match self {
            Boundary::Inclusive(r) | Boundary::Exclusive(r) => r,
        }
    }

    /// Same kind of boundary, pointing at a resolved sha prefix.
    pub fn resolved(&self, sha_prefix: impl Into<String>) -> Self {
        match self {
            Boundary::Inclusive(_) => Boundary::Inclusive(sha_prefix.into()),
            Boundary::Exclusive(_) => Boundary::Exclusive(sha_prefix.into()),
        }
    }
}

/// Count commits produced by `walk`, honouring an optional boundary.
///
/// Backend errors other than truncation are propagated unchanged.
///
/// # Example
///
/// ```
/// use gitbuildnumber::core::types::{CommitCount, Oid};
/// use gitbuildnumber::core::walk::{count_commits, Boundary, WalkEvent};
///
/// let ids: Vec<Oid> = ('a'..='e')
///     .map(|c| Oid::new(c.to_string().repeat(40)).unwrap())
///     .collect();
/// let walk = || ids.iter().cloned().map(|id| Ok::<_, ()>(WalkEvent::Commit(id)));
///
/// assert_eq!(count_commits(walk(), None), Ok(CommitCount::Counted(5)));
///
/// let inclusive = Boundary::Inclusive("ccc".into());
/// assert_eq!(count_commits(walk(), Some(&inclusive)), Ok(CommitCount::Counted(3)));
///
/// let exclusive = Boundary::Exclusive("ccc".into());
/// assert_eq!(count_commits(walk(), Some(&exclusive)), Ok(CommitCount::Counted(2)));
/// ```
pub fn count_commits<I, E>(walk: I, boundary: Option<&Boundary>) -> Result<CommitCount, E>
where
    I: IntoIterator<Item = Result<WalkEvent, E>>,
{
    let mut count = 0usize;

    for event in walk {
        let oid = match event? {
            WalkEvent::Commit(oid) => oid,
            WalkEvent::Truncated => return Ok(CommitCount::Shallow),
        };

        match boundary {
            None => count += 1,
            Some(Boundary::Inclusive(prefix)) => {
                count += 1;
                if oid.has_prefix(prefix) {
                    return Ok(CommitCount::Counted(count));
                }
            }
            Some(Boundary::Exclusive(prefix)) => {
                if oid.has_prefix(prefix) {
                    return Ok(CommitCount::Counted(count));
                }
                count += 1;
            }
        }
    }

    Ok(CommitCount::Counted(count))
}
