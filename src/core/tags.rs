//! core::tags
//!
//! Reverse index from commit id to the tag name(s) pointing at it.
//!
//! # Peeling
//!
//! A lightweight tag ref points straight at a commit. An annotated tag ref
//! points at a tag object, which in turn references the commit. The index
//! always keys by the commit, so every ref is peeled first with
//! [`peeled_commit_id`].
//!
//! # Ordering
//!
//! When several tags share a commit their names are joined with `;` in the
//! order the refs were enumerated. That order comes from the backend and
//! is not guaranteed to be sorted.

use std::collections::HashMap;

use super::types::Oid;

/// Separator used when several names or ids are joined into one value.
pub const JOIN_SEPARATOR: &str = ";";

/// A tag ref as enumerated from the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    /// Short tag name (without `refs/tags/`)
    pub name: String,
    /// The object the ref points at directly
    pub target: Oid,
    /// The object reached after peeling, if it differs from `target`
    pub peeled: Option<Oid>,
}

/// Resolve a tag ref to the commit it identifies.
///
/// Annotated tags carry a peeled id; lightweight tags already point at the
/// commit, so the direct target is used.
///
/// # Example
///
/// ```
/// use gitbuildnumber::core::tags::peeled_commit_id;
/// use gitbuildnumber::core::types::Oid;
///
/// let tag_object = Oid::new("1111111111111111111111111111111111111111").unwrap();
/// let commit = Oid::new("2222222222222222222222222222222222222222").unwrap();
///
/// assert_eq!(peeled_commit_id(&tag_object, Some(&commit)), &commit);
/// assert_eq!(peeled_commit_id(&commit, None), &commit);
/// ```
pub fn peeled_commit_id<'a>(target: &'a Oid, peeled: Option<&'a Oid>) -> &'a Oid {
    peeled.unwrap_or(target)
}

/// Mapping from commit id to `;`-joined tag names.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    by_commit: HashMap<Oid, String>,
}

impl TagIndex {
    /// Build the index from enumerated tag refs.
    ///
    /// Every ref contributes exactly one association.
    pub fn build<I>(refs: I) -> Self
    where
        I: IntoIterator<Item = TagRef>,
    {
        let mut index = Self::default();
        for tag in refs {
            index.insert(&tag);
        }
        index
    }

    fn insert(&mut self, tag: &TagRef) {
        let commit = peeled_commit_id(&tag.target, tag.peeled.as_ref()).clone();
        self.by_commit
            .entry(commit)
            .and_modify(|names| {
                names.push_str(JOIN_SEPARATOR);
                names.push_str(&tag.name);
            })
            .or_insert_with(|| tag.name.clone());
    }

    /// Look up the tag name(s) on a commit. Empty string when untagged.
    pub fn tags_for(&self, commit: &Oid) -> String {
        self.by_commit.get(commit).cloned().unwrap_or_default()
    }

    /// Number of distinct tagged commits.
    pub fn len(&self) -> usize {
        self.by_commit.len()
    }

    /// Check if no tags were indexed.
    pub fn is_empty(&self) -> bool {
        self.by_commit.is_empty()
    }
}

/// Join commit ids the way parent lists are published.
///
/// Empty for a root commit, a single id for a normal commit, and the ids
/// in parent order (first parent first) for a merge.
pub fn join_ids(ids: &[Oid]) -> String {
    ids.iter()
        .map(Oid::as_str)
        .collect::<Vec<_>>()
        .join(JOIN_SEPARATOR)
}
