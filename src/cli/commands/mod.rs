//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Resolves settings from flags and configuration
//! 2. Calls the engine
//! 3. Formats and writes output
//!
//! Handlers never open the repository themselves.

mod completion;
mod count;
mod extract;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use count::count;
pub use extract::extract;

use crate::cli::args::Command;
use crate::engine::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Extract(args) => extract::extract(ctx, &args),
        Command::Count { repo, boundary } => count::count(ctx, repo.as_deref(), &boundary),
        Command::Completion { shell } => completion::completion(shell),
    }
}
