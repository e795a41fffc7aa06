//! engine::refs
//!
//! Ref resolution: current branch, tags on a commit, parent lists and
//! boundary references for bounded counting.

use crate::core::tags::{join_ids, TagIndex};
use crate::core::types::Oid;
use crate::core::walk::Boundary;
use crate::git::{CommitInfo, Git, GitError};

/// Branch name to publish for HEAD.
///
/// Empty when the backend cannot name a branch, or when the reported
/// "branch" is the revision itself (detached HEAD).
///
/// # Example
///
/// ```
/// use gitbuildnumber::core::types::Oid;
/// use gitbuildnumber::engine::refs::current_branch;
///
/// let head = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
/// assert_eq!(current_branch(Some("main"), &head), "main");
/// assert_eq!(current_branch(Some(head.as_str()), &head), "");
/// assert_eq!(current_branch(None, &head), "");
/// ```
pub fn current_branch(reported: Option<&str>, head: &Oid) -> String {
    match reported {
        Some(name) if name.eq_ignore_ascii_case(head.as_str()) => String::new(),
        Some(name) => name.to_string(),
        None => String::new(),
    }
}

/// Tag name(s) on `head`, empty when untagged.
pub fn current_tag(index: &TagIndex, head: &Oid) -> String {
    index.tags_for(head)
}

/// Build the commit -> tag-names index from every tag ref.
pub fn build_tag_index(git: &Git) -> Result<TagIndex, GitError> {
    Ok(TagIndex::build(git.tag_refs()?))
}

/// Parent shas of a commit joined with `;`, first parent first.
pub fn parents_of(commit: &CommitInfo) -> String {
    join_ids(&commit.parents)
}

/// Resolve a boundary reference to a sha prefix.
///
/// A reference naming an existing tag becomes the tag's peeled commit
/// sha; anything else is kept as a literal (possibly abbreviated) sha.
pub fn resolve_boundary(git: &Git, boundary: &Boundary) -> Result<Boundary, GitError> {
    match git.resolve_tag(boundary.reference())? {
        Some(commit) => Ok(boundary.resolved(commit.as_str())),
        None => Ok(boundary.clone()),
    }
}
