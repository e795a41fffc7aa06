//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads flow
//! through this interface. Direct parsing of `.git` internal files outside
//! this module is prohibited. No other module should import `git2`.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - HEAD, branch and tag resolution (with tag peeling)
//! - Lazy commit walks, including shallow-clone detection
//! - Working tree status
//! - Describe
//!
//! # Invariants
//!
//! - The repository is never written to
//! - No other module calls git2 directly
//! - All operations return strong types (Oid, TagRef, WalkEvent)
//!
//! # Example
//!
//! ```ignore
//! use gitbuildnumber::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.head_oid()?;
//! let walked = git.walk_from(&head)?.count();
//! ```

mod interface;

pub use interface::{CommitInfo, CommitWalk, Git, GitError, RepoInfo, WorktreeStatus};
