//! extract command - Extract build metadata and publish it as properties
//!
//! Settings resolve as CLI flag > repo config > global config > default.
//! When extraction fails the command publishes the full placeholder set
//! and succeeds, unless `--strict` is given.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::cli::args::ExtractArgs;
use crate::core::buildnumber::{BuildNumberFormatter, DefaultBuildNumber, TemplateBuildNumber};
use crate::core::config::Config;
use crate::core::metadata::BuildMetadata;
use crate::core::properties::{BuildProperties, DEFAULT_PREFIX};
use crate::core::walk::Boundary;
use crate::engine::{self, Context, ExtractOptions};
use crate::ui::output::{self, Verbosity};

/// Extract build metadata and write it in the requested format.
pub fn extract(ctx: &Context, args: &ExtractArgs) -> Result<()> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    let repo = ctx
        .repo_path(args.repo.as_deref())
        .context("Failed to determine working directory")?;

    let config = load_config(&repo, verbosity);
    let prefix = args
        .prefix
        .clone()
        .or_else(|| {
            config
                .as_ref()
                .ok()
                .map(|c| c.property_prefix().to_string())
        })
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

    let outcome = config.and_then(|config| run(&repo, &config, args));
    let properties = match outcome {
        Ok(metadata) => metadata.to_properties(),
        Err(e) if args.strict => return Err(e),
        Err(e) => {
            tracing::debug!(error = ?e, "extraction failed");
            output::warn(
                format!("{:#}; publishing placeholder values", e),
                verbosity,
            );
            BuildProperties::unknown()
        }
    };

    let rendered = properties.render(args.format.into(), &prefix);
    write_output(args.output.as_deref(), &rendered)
}

fn load_config(repo: &Path, verbosity: Verbosity) -> Result<Config> {
    // Outside a repository only global config applies; extraction reports the failure.
    let dirs = engine::locate(repo).ok();
    let result = Config::load(dirs.as_ref()).context("Failed to load configuration")?;
    for warning in &result.warnings {
        output::warn(&warning.message, verbosity);
    }
    if let Some(path) = result.config.repo_config_loaded_from() {
        tracing::debug!(path = %path.display(), "loaded repo config");
    }
    Ok(result.config)
}

fn run(repo: &Path, config: &Config, args: &ExtractArgs) -> Result<BuildMetadata> {
    let options = options(config, args);
    let formatter = formatter(config, args);
    let metadata = engine::extract_with(repo, &options, formatter.as_ref())
        .with_context(|| format!("Failed to extract build metadata from {}", repo.display()))?;
    Ok(metadata)
}

/// Merge flags over configuration.
fn options(config: &Config, args: &ExtractArgs) -> ExtractOptions {
    let git_date = args.git_date_format.as_deref();
    let boundary = Boundary::from_options(
        args.boundary.since_inclusive.as_deref(),
        args.boundary.since_exclusive.as_deref(),
    )
    .or_else(|| config.boundary());

    ExtractOptions {
        author_date_format: args
            .author_date_format
            .as_deref()
            .or(git_date)
            .unwrap_or(config.author_date_format())
            .to_string(),
        commit_date_format: args
            .commit_date_format
            .as_deref()
            .or(git_date)
            .unwrap_or(config.commit_date_format())
            .to_string(),
        build_date_format: args
            .build_date_format
            .as_deref()
            .unwrap_or(config.build_date_format())
            .to_string(),
        time_zone: args
            .time_zone
            .clone()
            .or_else(|| config.time_zone().map(str::to_string)),
        boundary,
        dirty_value: args
            .dirty_value
            .clone()
            .unwrap_or_else(|| config.dirty_value().to_string()),
        include_untracked: !args.ignore_untracked && config.include_untracked(),
    }
}

fn formatter(config: &Config, args: &ExtractArgs) -> Box<dyn BuildNumberFormatter> {
    match args.template.as_deref().or(config.buildnumber_template()) {
        Some(template) => Box::new(TemplateBuildNumber::new(template)),
        None => Box::new(DefaultBuildNumber),
    }
}

fn write_output(path: Option<&Path>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|_| stdout.flush())
                .context("Failed to write to stdout")
        }
    }
}
