//! core::metadata
//!
//! The build metadata produced by one extraction.
//!
//! A [`BuildMetadata`] is created once per extraction and never modified
//! afterwards. [`BuildMetadata::to_properties`] flattens it into the
//! published string mapping.

use serde::Serialize;

use super::properties::{keys, BuildProperties};
use super::tags::join_ids;
use super::types::{CommitCount, Oid};

/// Resolved facts about the current commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMetadata {
    /// Full sha of `HEAD`
    pub revision: Oid,
    /// Branch name, empty when detached
    pub branch: String,
    /// `;`-joined tag names on `HEAD`, empty when untagged
    pub tag: String,
    /// Parent commits, first parent first
    pub parents: Vec<Oid>,
    /// Ancestry count, or the shallow sentinel
    #[serde(serialize_with = "serialize_count")]
    pub commits_count: CommitCount,
    pub author_date: String,
    pub commit_date: String,
    pub build_date: String,
    /// Long-form describe string
    pub describe: String,
    /// Whether the working tree had uncommitted changes
    pub worktree_dirty: bool,
    /// The dirty marker when dirty, empty otherwise
    pub dirty: String,
    /// The composite build number
    pub buildnumber: String,
}

fn serialize_count<S: serde::Serializer>(count: &CommitCount, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(count.as_i64())
}

impl BuildMetadata {
    /// The first 7 characters of the revision.
    pub fn short_revision(&self) -> &str {
        self.revision.short_revision()
    }

    /// Parent shas joined with `;`.
    pub fn parent(&self) -> String {
        join_ids(&self.parents)
    }

    /// Flatten into the published key/value mapping.
    pub fn to_properties(&self) -> BuildProperties {
        BuildProperties::from_pairs([
            (keys::REVISION, self.revision.to_string()),
            (keys::SHORT_REVISION, self.short_revision().to_string()),
            (keys::DIRTY, self.dirty.clone()),
            (keys::BRANCH, self.branch.clone()),
            (keys::TAG, self.tag.clone()),
            (keys::PARENT, self.parent()),
            (keys::COMMITS_COUNT, self.commits_count.to_string()),
            (keys::AUTHOR_DATE, self.author_date.clone()),
            (keys::COMMIT_DATE, self.commit_date.clone()),
            (keys::DESCRIBE, self.describe.clone()),
            (keys::BUILD_DATE, self.build_date.clone()),
            (keys::BUILDNUMBER, self.buildnumber.clone()),
        ])
    }
}
