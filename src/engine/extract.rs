//! engine::extract
//!
//! The extraction sequence against one opened repository.
//!
//! ```text
//! open -> resolve HEAD -> { tags, branch, parents, count, dates, describe, dirty }
//!      -> compose build number -> release
//! ```
//!
//! Failures opening the repository or resolving HEAD abort the whole
//! extraction. Every other step is best-effort inside its own contract
//! (empty string or sentinel on a miss), but errors they raise are
//! propagated, never swallowed.

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::core::buildnumber::{BuildNumberFormatter, BuildNumberInputs, DefaultBuildNumber};
use crate::core::config::{RepoDirs, DEFAULT_DIRTY_VALUE};
use crate::core::dates::{DateFormats, DEFAULT_BUILD_DATE_FORMAT, DEFAULT_GIT_DATE_FORMAT};
use crate::core::metadata::BuildMetadata;
use crate::core::types::{CommitCount, Oid};
use crate::core::walk::{self, Boundary};
use crate::git::{Git, GitError};

use super::refs;
use super::ExtractError;

/// Settings for one extraction.
///
/// Passed explicitly into every call; nothing is read from shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// strftime pattern for the author date
    pub author_date_format: String,
    /// strftime pattern for the commit date
    pub commit_date_format: String,
    /// strftime pattern for the build timestamp
    pub build_date_format: String,
    /// Zone override applied to all three dates
    pub time_zone: Option<String>,
    /// Optional stop point for the commit count
    pub boundary: Option<Boundary>,
    /// Marker published when the tree is dirty
    pub dirty_value: String,
    /// Whether untracked files make the tree dirty
    pub include_untracked: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            author_date_format: DEFAULT_GIT_DATE_FORMAT.to_string(),
            commit_date_format: DEFAULT_GIT_DATE_FORMAT.to_string(),
            build_date_format: DEFAULT_BUILD_DATE_FORMAT.to_string(),
            time_zone: None,
            boundary: None,
            dirty_value: DEFAULT_DIRTY_VALUE.to_string(),
            include_untracked: true,
        }
    }
}

impl ExtractOptions {
    /// Use one pattern for both author and commit dates.
    pub fn with_git_date_format(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        self.author_date_format = pattern.clone();
        self.commit_date_format = pattern;
        self
    }

    pub fn with_build_date_format(mut self, pattern: impl Into<String>) -> Self {
        self.build_date_format = pattern.into();
        self
    }

    pub fn with_time_zone(mut self, zone: impl Into<String>) -> Self {
        self.time_zone = Some(zone.into());
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn with_dirty_value(mut self, value: impl Into<String>) -> Self {
        self.dirty_value = value.into();
        self
    }

    /// Validate the date settings.
    pub fn date_formats(&self) -> Result<DateFormats, ExtractError> {
        Ok(DateFormats::with_patterns(
            &self.author_date_format,
            &self.commit_date_format,
            &self.build_date_format,
            self.time_zone.as_deref(),
        )?)
    }
}

/// Extract build metadata using the default build-number rule.
///
/// # Example
///
/// ```no_run
/// use gitbuildnumber::engine::{extract, ExtractOptions};
/// use std::path::Path;
///
/// let metadata = extract(Path::new("."), &ExtractOptions::default()).unwrap();
/// println!("{}", metadata.buildnumber);
/// ```
pub fn extract(path: &Path, options: &ExtractOptions) -> Result<BuildMetadata, ExtractError> {
    extract_with(path, options, &DefaultBuildNumber)
}

/// Extract build metadata, composing the build number with `formatter`.
///
/// # Errors
///
/// - [`ExtractError::InvalidDateFormat`] / [`ExtractError::InvalidTimeZone`]
///   for bad date settings
/// - [`ExtractError::NotAGitRepository`] if `path` is not inside a repository
/// - [`ExtractError::NoCommits`] if HEAD cannot be resolved
/// - [`ExtractError::DescribeUnavailable`] if describe fails
/// - [`ExtractError::CallbackFailure`] if the formatter yields nothing usable
/// - [`ExtractError::Git`] for any other repository failure
pub fn extract_with(
    path: &Path,
    options: &ExtractOptions,
    formatter: &dyn BuildNumberFormatter,
) -> Result<BuildMetadata, ExtractError> {
    let dates = options.date_formats()?;

    // The handle lives for this scope only and is released on every exit path.
    let git = open(path)?;
    let head = resolve_head(&git, path)?;
    debug!(revision = %head, "resolved HEAD");

    let tags = refs::build_tag_index(&git)?;
    let tag = refs::current_tag(&tags, &head);
    let branch = refs::current_branch(git.head_branch_name()?.as_deref(), &head);
    debug!(%tag, %branch, tagged_commits = tags.len(), "resolved refs");

    let commit = git.commit_info(&head)?;
    let parent = refs::parents_of(&commit);

    let commits_count = count(&git, &head, options.boundary.as_ref())?;
    debug!(%commits_count, "counted commits");

    let author_date = dates.author.format(&commit.author_time)?;
    let commit_date = dates.commit.format(&commit.commit_time)?;

    let describe = git.describe().map_err(ExtractError::DescribeUnavailable)?;

    let worktree_dirty = git.is_worktree_dirty(options.include_untracked)?;
    let dirty = if worktree_dirty {
        options.dirty_value.clone()
    } else {
        String::new()
    };

    let build_date = dates.build.format(&Utc::now())?;

    let inputs = BuildNumberInputs {
        tag: &tag,
        branch: &branch,
        revision: head.as_str(),
        parent: &parent,
        short_revision: head.short_revision(),
        commits_count,
        author_date: &author_date,
        commit_date: &commit_date,
        dirty: &dirty,
        describe: &describe,
    };
    let buildnumber = formatter
        .format(&inputs)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ExtractError::CallbackFailure)?;
    info!(%buildnumber, "extracted build number");

    Ok(BuildMetadata {
        revision: head,
        branch,
        tag,
        parents: commit.parents,
        commits_count,
        author_date,
        commit_date,
        build_date,
        describe,
        worktree_dirty,
        dirty,
        buildnumber,
    })
}

/// Discover the repository containing `path` and return its directories.
///
/// Paths come back canonical, so symlinked or `..`-laden inputs resolve to
/// the same repository that extraction would open.
pub fn locate(path: &Path) -> Result<RepoDirs, ExtractError> {
    let info = open(path)?.info()?;
    debug!(work_dir = %info.work_dir.display(), git_dir = %info.git_dir.display(), "located repository");
    Ok(RepoDirs {
        work_dir: info.work_dir,
        git_dir: info.git_dir,
    })
}

/// Count commits reachable from HEAD of the repository at `path`.
pub fn count_commits(
    path: &Path,
    boundary: Option<&Boundary>,
) -> Result<CommitCount, ExtractError> {
    let git = open(path)?;
    let head = resolve_head(&git, path)?;
    Ok(count(&git, &head, boundary)?)
}

/// Count commits from `start` on an already opened repository.
pub fn count(git: &Git, start: &Oid, boundary: Option<&Boundary>) -> Result<CommitCount, GitError> {
    let resolved = boundary
        .map(|b| refs::resolve_boundary(git, b))
        .transpose()?;
    if let Some(b) = &resolved {
        debug!(boundary = ?b, "resolved count boundary");
    }

    let count = walk::count_commits(git.walk_from(start)?, resolved.as_ref())?;
    if count.is_shallow() {
        warn!("history is shallow, commit count is unknown");
    }
    Ok(count)
}

fn open(path: &Path) -> Result<Git, ExtractError> {
    Git::open(path).map_err(|e| match e {
        GitError::NotARepo { .. } | GitError::BareRepo => ExtractError::NotAGitRepository {
            path: path.to_path_buf(),
        },
        other => ExtractError::Git(other),
    })
}

fn resolve_head(git: &Git, path: &Path) -> Result<Oid, ExtractError> {
    git.head_oid().map_err(|e| match e {
        GitError::UnbornHead | GitError::RefNotFound { .. } => ExtractError::NoCommits {
            path: path.to_path_buf(),
        },
        other => ExtractError::Git(other),
    })
}
