//! engine
//!
//! Orchestrates one extraction: open -> resolve HEAD -> gather -> compose.
//!
//! # Architecture
//!
//! The engine is the only layer that talks to both the [`crate::git`]
//! adapter and the pure [`crate::core`] logic. It owns the repository
//! handle for the duration of a single call and releases it on return,
//! success or failure.
//!
//! - [`extract`] - The extraction sequence and its options
//! - [`refs`] - Branch, tag, parent and boundary resolution
//!
//! # Invariants
//!
//! - A repository is opened at most once per extraction
//! - Misses (no tag, detached HEAD, shallow history) become empty strings
//!   or sentinels; errors are propagated and nothing partial is returned
//! - Results are immutable once returned
//!
//! # Example
//!
//! ```no_run
//! use gitbuildnumber::core::walk::Boundary;
//! use gitbuildnumber::engine::{extract, ExtractOptions};
//! use std::path::Path;
//!
//! let options = ExtractOptions::default()
//!     .with_boundary(Boundary::Exclusive("v1.0".into()));
//! let metadata = extract(Path::new("."), &options)?;
//! println!("{} ({})", metadata.buildnumber, metadata.commits_count);
//! # Ok::<(), gitbuildnumber::engine::ExtractError>(())
//! ```

pub mod extract;
pub mod refs;

pub use extract::{count, count_commits, extract, extract_with, locate, ExtractOptions};

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::dates::DateError;
use crate::git::GitError;

/// Errors from an extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The path is not inside a (non-bare) git repository.
    #[error("not a git repository: {}", path.display())]
    NotAGitRepository { path: PathBuf },

    /// HEAD does not resolve to a commit.
    #[error("repository has no commits: {}", path.display())]
    NoCommits { path: PathBuf },

    /// The describe step failed.
    #[error("git describe failed: {0}")]
    DescribeUnavailable(#[source] GitError),

    /// A date pattern could not be used.
    #[error("invalid date format: {pattern}")]
    InvalidDateFormat { pattern: String },

    /// A time zone name could not be resolved.
    #[error("invalid time zone: {zone}")]
    InvalidTimeZone { zone: String },

    /// The build-number formatter produced nothing usable.
    #[error("build number formatter produced no value")]
    CallbackFailure,

    /// Any other repository failure.
    #[error(transparent)]
    Git(#[from] GitError),
}

impl From<DateError> for ExtractError {
    fn from(e: DateError) -> Self {
        match e {
            DateError::InvalidFormat { pattern } => ExtractError::InvalidDateFormat { pattern },
            DateError::InvalidTimeZone(zone) => ExtractError::InvalidTimeZone { zone },
        }
    }
}

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// Directory the command operates on.
    pub fn work_dir(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir(),
        }
    }

    /// Resolve a user-supplied repository path against the working directory.
    pub fn repo_path(&self, repo: Option<&Path>) -> std::io::Result<PathBuf> {
        match repo {
            Some(path) if path.is_absolute() => Ok(path.to_path_buf()),
            Some(path) => Ok(self.work_dir()?.join(path)),
            None => self.work_dir(),
        }
    }
}
