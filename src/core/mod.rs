//! core
//!
//! Core domain types and pure extraction logic.
//!
//! Nothing in here touches a repository; the [`crate::engine`] feeds these
//! modules data read through [`crate::git`].
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid, CommitCount
//! - [`tags`] - Commit -> tag-names index
//! - [`walk`] - Bounded ancestry counting over a commit walk
//! - [`dates`] - Date patterns and zone overrides
//! - [`buildnumber`] - Build-number composition (default rule, templates, closures)
//! - [`metadata`] - The extracted metadata record
//! - [`properties`] - Published key/value mapping and its renderings
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Every function here is deterministic given its inputs

pub mod buildnumber;
pub mod config;
pub mod dates;
pub mod metadata;
pub mod properties;
pub mod tags;
pub mod types;
pub mod walk;
