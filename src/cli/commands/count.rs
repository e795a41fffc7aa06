//! count command - Print the commit count of HEAD

use anyhow::{Context as _, Result};

use crate::cli::args::BoundaryArgs;
use crate::core::config::Config;
use crate::core::walk::Boundary;
use crate::engine::{self, Context};
use crate::ui::output::{self, Verbosity};

/// Print the number of commits reachable from HEAD.
///
/// Flags take precedence over a boundary set in configuration.
pub fn count(ctx: &Context, repo: Option<&std::path::Path>, boundary: &BoundaryArgs) -> Result<()> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let repo = ctx
        .repo_path(repo)
        .context("Failed to determine working directory")?;

    let boundary = match Boundary::from_options(
        boundary.since_inclusive.as_deref(),
        boundary.since_exclusive.as_deref(),
    ) {
        Some(b) => Some(b),
        None => {
            let dirs = engine::locate(&repo).ok();
            let result =
                Config::load(dirs.as_ref()).context("Failed to load configuration")?;
            for warning in &result.warnings {
                output::warn(&warning.message, verbosity);
            }
            result.config.boundary()
        }
    };

    let count = engine::count_commits(&repo, boundary.as_ref())
        .with_context(|| format!("Failed to count commits in {}", repo.display()))?;
    println!("{}", count);
    Ok(())
}
