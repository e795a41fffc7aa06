//! git-buildnumber - Build numbers and git metadata for build pipelines
//!
//! Reads the state of a repository's `HEAD` (revision, branch, tags,
//! parents, ancestry count, dates, describe string, working-tree state)
//! and composes a build number from it. The result is published as a
//! fixed set of string properties for build tools to consume.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Runs one extraction against one repository handle
//! - [`core`] - Domain types, pure extraction logic, configuration
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - User-facing messages
//!
//! # Invariants
//!
//! 1. Every extraction publishes all twelve properties or none
//! 2. A repository handle never outlives the extraction that opened it
//! 3. Extraction never modifies the repository
//!
//! # Example
//!
//! ```no_run
//! use gitbuildnumber::core::properties::{OutputFormat, DEFAULT_PREFIX};
//! use gitbuildnumber::engine::{extract, ExtractOptions};
//! use std::path::Path;
//!
//! let metadata = extract(Path::new("."), &ExtractOptions::default())?;
//! print!(
//!     "{}",
//!     metadata.to_properties().render(OutputFormat::Properties, DEFAULT_PREFIX)
//! );
//! # Ok::<(), gitbuildnumber::engine::ExtractError>(())
//! ```

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
