//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all Git operations in
//! git-buildnumber. Every repository read flows through [`Git`], which
//! returns strong types and normalizes git2 errors into typed failure
//! categories. Nothing here writes to the repository.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Path missing, not a directory, or not inside a repository
//! - [`GitError::UnbornHead`]: Repository has no commits yet
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//! - [`GitError::ObjectNotFound`]: Requested object does not exist
//!
//! # Example
//!
//! ```ignore
//! use gitbuildnumber::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.head_oid()?;
//! println!("HEAD is at {}", head.short_revision());
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::core::tags::TagRef;
use crate::core::types::{Oid, TypeError, SHORT_REVISION_LEN};
use crate::core::walk::WalkEvent;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// HEAD does not point at a commit yet.
    #[error("repository has no commits")]
    UnbornHead,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context.contains("ref") {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::RefNotFound {
                refname: err.message().to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: err.message().to_string(),
            },
            _ => GitError::Internal {
                message: err.message().to_string(),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
        }
    }
}

/// Information about a Git repository.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Path to .git directory
    pub git_dir: PathBuf,
    /// Path to working directory
    pub work_dir: PathBuf,
}

/// Summary of working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked files (if requested)
    pub untracked: usize,
    /// Whether there are unresolved conflicts
    pub has_conflicts: bool,
}

impl WorktreeStatus {
    /// Check if tracked files are clean (untracked files ignored).
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && !self.has_conflicts
    }

    /// Check if the tree differs from HEAD, optionally counting untracked files.
    pub fn is_dirty(&self, include_untracked: bool) -> bool {
        !self.is_clean() || (include_untracked && self.untracked > 0)
    }
}

/// Identity, parents and timestamps of a commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// Parent OIDs in parent order
    pub parents: Vec<Oid>,
    /// Author timestamp, in the author's recorded offset
    pub author_time: DateTime<FixedOffset>,
    /// Committer timestamp, in the committer's recorded offset
    pub commit_time: DateTime<FixedOffset>,
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. No other module
/// imports `git2`. Dropping a `Git` releases the underlying repository
/// handle and its file descriptors.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open the repository enclosing `path`.
    ///
    /// The path is canonicalized (symlinks and relative components
    /// resolved) before searching upward for the repository, so `path`
    /// can be any directory within the working tree.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if the path does not exist, is not a
    ///   directory, or no repository encloses it
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let not_a_repo = || GitError::NotARepo {
            path: path.to_path_buf(),
        };

        if !path.is_dir() {
            return Err(not_a_repo());
        }
        let canonical = path.canonicalize().map_err(|_| not_a_repo())?;

        let repo = git2::Repository::discover(&canonical).map_err(|_| not_a_repo())?;

        // Ensure it's not a bare repository
        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Get repository information (git_dir and work_dir paths).
    pub fn info(&self) -> Result<RepoInfo, GitError> {
        let git_dir = self.repo.path().to_path_buf();
        let work_dir = self.repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();

        Ok(RepoInfo { git_dir, work_dir })
    }

    // =========================================================================
    // Ref Resolution
    // =========================================================================

    /// Get HEAD commit OID.
    ///
    /// # Errors
    ///
    /// - [`GitError::UnbornHead`] if HEAD does not resolve to a commit
    ///   (freshly initialized repository)
    pub fn head_oid(&self) -> Result<Oid, GitError> {
        let head = self.repo.head().map_err(|e| match e.code() {
            git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound => GitError::UnbornHead,
            _ => GitError::from_git2(e, "HEAD"),
        })?;

        let oid = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?
            .id();

        Ok(Oid::new(oid.to_string())?)
    }

    /// Name of the branch HEAD points at.
    ///
    /// Like many git backends, a detached HEAD reports the commit sha in
    /// place of a branch name. Returns `None` only when HEAD is unborn.
    pub fn head_branch_name(&self) -> Result<Option<String>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            return Ok(head.shorthand().map(String::from));
        }

        // Detached HEAD
        Ok(head.target().map(|oid| oid.to_string()))
    }

    /// Resolve `refs/tags/<name>` to the commit it identifies.
    ///
    /// Returns `None` if no such tag exists.
    pub fn resolve_tag(&self, name: &str) -> Result<Option<Oid>, GitError> {
        let refname = format!("refs/tags/{}", name);
        let reference = match self.repo.find_reference(&refname) {
            Ok(r) => r,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) if e.code() == git2::ErrorCode::InvalidSpec => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, &refname)),
        };

        let object = reference
            .peel(git2::ObjectType::Any)
            .map_err(|e| GitError::from_git2(e, &refname))?;

        Ok(Some(Oid::new(object.id().to_string())?))
    }

    // =========================================================================
    // Ref Enumeration
    // =========================================================================

    /// List every tag ref with its direct and peeled targets.
    ///
    /// Order is the backend's enumeration order.
    pub fn tag_refs(&self) -> Result<Vec<TagRef>, GitError> {
        let refs = self
            .repo
            .references_glob("refs/tags/*")
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;

        let mut tags = Vec::new();
        for reference in refs {
            let reference = reference.map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;

            // Skip refs with non-UTF8 names
            let name = match reference.name().and_then(|n| n.strip_prefix("refs/tags/")) {
                Some(n) => n.to_string(),
                None => continue,
            };

            // Symbolic tag refs have no direct target
            let target = match reference.target() {
                Some(oid) => oid,
                None => continue,
            };

            let peeled = match reference.peel(git2::ObjectType::Any) {
                Ok(object) if object.id() != target => Some(Oid::new(object.id().to_string())?),
                Ok(_) => None,
                Err(_) => None,
            };

            tags.push(TagRef {
                name,
                target: Oid::new(target.to_string())?,
                peeled,
            });
        }

        Ok(tags)
    }

    // =========================================================================
    // Working Tree Status
    // =========================================================================

    /// Get working tree status summary.
    ///
    /// If `include_untracked` is false, untracked files are not counted.
    /// Ignored files are never counted.
    pub fn worktree_status(&self, include_untracked: bool) -> Result<WorktreeStatus, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(include_untracked)
            .recurse_untracked_dirs(false)
            .include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;

        let mut result = WorktreeStatus::default();

        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_conflicted() {
                result.has_conflicts = true;
            }

            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
            }

            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
            }

            if status.is_wt_new() {
                result.untracked += 1;
            }
        }

        Ok(result)
    }

    /// Check if the working tree has uncommitted changes.
    pub fn is_worktree_dirty(&self, include_untracked: bool) -> Result<bool, GitError> {
        Ok(self
            .worktree_status(include_untracked)?
            .is_dirty(include_untracked))
    }

    // =========================================================================
    // Commit Information
    // =========================================================================

    /// Get parents and timestamps of a commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit doesn't exist
    pub fn commit_info(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let git_oid =
            git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let commit = self
            .repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let mut parents = Vec::new();
        for parent_id in commit.parent_ids() {
            parents.push(Oid::new(parent_id.to_string())?);
        }

        let author_time = to_datetime(commit.author().when());
        let commit_time = to_datetime(commit.committer().when());

        Ok(CommitInfo {
            oid: oid.clone(),
            parents,
            author_time,
            commit_time,
        })
    }

    /// Long-form description of HEAD relative to the nearest tag.
    ///
    /// Lightweight and annotated tags are both considered. The output is
    /// always `<tag>-<distance>-g<abbrev>`, even exactly on a tag. With no
    /// reachable tag, the abbreviated commit id is returned instead.
    pub fn describe(&self) -> Result<String, GitError> {
        let mut opts = git2::DescribeOptions::new();
        opts.describe_tags().show_commit_oid_as_fallback(true);

        let description = self
            .repo
            .describe(&opts)
            .map_err(|e| GitError::from_git2(e, "describe"))?;

        let mut format = git2::DescribeFormatOptions::new();
        format
            .always_use_long_format(true)
            .abbreviated_size(SHORT_REVISION_LEN as u32);

        description
            .format(Some(&format))
            .map_err(|e| GitError::from_git2(e, "describe"))
    }

    // =========================================================================
    // History Walking
    // =========================================================================

    /// Walk commits reachable from `start`, newest first.
    ///
    /// Commits are yielded in topological order (every commit after all
    /// of its descendants), ties broken by commit time. Only ids are
    /// produced; commit bodies are never parsed by the caller.
    pub fn walk_from(&self, start: &Oid) -> Result<CommitWalk<'_>, GitError> {
        let start_oid = git2::Oid::from_str(start.as_str())
            .map_err(|e| GitError::from_git2(e, start.as_str()))?;

        let mut revwalk = self.repo.revwalk().map_err(|e| GitError::Internal {
            message: e.message().to_string(),
        })?;
        revwalk
            .set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;
        revwalk
            .push(start_oid)
            .map_err(|e| GitError::from_git2(e, start.as_str()))?;

        Ok(CommitWalk {
            revwalk,
            shallow: self.shallow_roots()?,
            truncated: false,
            finished: false,
        })
    }

    /// Commits at the edge of a shallow clone.
    ///
    /// Their parents are missing from the object database. git records
    /// them one per line in the `shallow` file of the common git dir.
    fn shallow_roots(&self) -> Result<HashSet<git2::Oid>, GitError> {
        if !self.repo.is_shallow() {
            return Ok(HashSet::new());
        }

        let path = self.repo.commondir().join("shallow");
        let contents = std::fs::read_to_string(&path).map_err(|e| GitError::AccessError {
            message: format!("{}: {}", path.display(), e),
        })?;

        Ok(contents
            .lines()
            .filter_map(|line| git2::Oid::from_str(line.trim()).ok())
            .collect())
    }
}

/// Lazy walk over commit ids, produced by [`Git::walk_from`].
///
/// After yielding a shallow-boundary commit the walk reports
/// [`WalkEvent::Truncated`] and ends. A missing object mid-walk is
/// reported the same way.
pub struct CommitWalk<'repo> {
    revwalk: git2::Revwalk<'repo>,
    shallow: HashSet<git2::Oid>,
    truncated: bool,
    finished: bool,
}

impl Iterator for CommitWalk<'_> {
    type Item = Result<WalkEvent, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.truncated {
            self.finished = true;
            return Some(Ok(WalkEvent::Truncated));
        }

        let step = match self.revwalk.next() {
            Some(step) => step,
            None => {
                self.finished = true;
                return None;
            }
        };

        match step {
            Ok(id) => {
                if self.shallow.contains(&id) {
                    self.truncated = true;
                }
                match Oid::new(id.to_string()) {
                    Ok(oid) => Some(Ok(WalkEvent::Commit(oid))),
                    Err(e) => {
                        self.finished = true;
                        Some(Err(e.into()))
                    }
                }
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                self.finished = true;
                Some(Ok(WalkEvent::Truncated))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(GitError::from_git2(e, "revwalk")))
            }
        }
    }
}

fn to_datetime(time: git2::Time) -> DateTime<FixedOffset> {
    let utc = DateTime::from_timestamp(time.seconds(), 0).unwrap_or(DateTime::UNIX_EPOCH);
    match FixedOffset::east_opt(time.offset_minutes() * 60) {
        Some(offset) => utc.with_timezone(&offset),
        None => utc.fixed_offset(),
    }
}
