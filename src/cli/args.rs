//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::properties::OutputFormat;

/// git-buildnumber - Derive build numbers and git metadata for build pipelines
#[derive(Parser, Debug)]
#[command(name = "git-buildnumber")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if git-buildnumber was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; only errors are logged
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract build metadata and print it as properties
    #[command(
        name = "extract",
        long_about = "Extract build metadata from the repository and print it.\n\n\
            Reads the revision, branch, tags, parents, commit count, dates, describe \
            string and working-tree state of HEAD, composes a build number from them \
            and prints all twelve values with a key prefix (default 'git.').\n\n\
            If extraction fails, a complete set of UNKNOWN_* placeholders is printed \
            instead and the exit status is 0, so downstream build steps always see \
            every key. Use --strict to fail the command instead.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Print properties for the current repository
    git-buildnumber extract

    # Write a properties file for a build
    git-buildnumber extract --output target/git.properties

    # Count only commits since the last release tag
    git-buildnumber extract --since-exclusive v1.4.0

    # Custom build number, machine-readable output
    git-buildnumber extract --template '{tag}.{commitsCount}.{shortRevision}' --format json

    # Export for a CI step
    git-buildnumber extract --format env >> \"$GITHUB_ENV\""
    )]
    Extract(ExtractArgs),

    /// Print the number of commits reachable from HEAD
    #[command(
        name = "count",
        long_about = "Print the number of commits reachable from HEAD.\n\n\
            With --since-inclusive or --since-exclusive the walk stops at the given \
            tag or sha. Prints -1 when the history is shallow and the count cannot \
            be known."
    )]
    Count {
        /// Repository path (defaults to the working directory)
        #[arg(long)]
        repo: Option<PathBuf>,

        #[command(flatten)]
        boundary: BoundaryArgs,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    git-buildnumber completion bash > ~/.local/share/bash-completion/completions/git-buildnumber

    # Zsh
    git-buildnumber completion zsh > ~/.zfunc/_git-buildnumber"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for `extract`.
///
/// Every option left unset falls back to configuration, then defaults.
#[derive(Args, Debug, Default)]
pub struct ExtractArgs {
    /// Repository path (defaults to the working directory)
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// strftime pattern for author and commit dates
    #[arg(long, value_name = "PATTERN")]
    pub git_date_format: Option<String>,

    /// strftime pattern for the author date
    #[arg(long, value_name = "PATTERN")]
    pub author_date_format: Option<String>,

    /// strftime pattern for the commit date
    #[arg(long, value_name = "PATTERN")]
    pub commit_date_format: Option<String>,

    /// strftime pattern for the build timestamp
    #[arg(long, value_name = "PATTERN")]
    pub build_date_format: Option<String>,

    /// Time zone for all dates (IANA name or offset such as +02:00)
    #[arg(long, value_name = "ZONE")]
    pub time_zone: Option<String>,

    #[command(flatten)]
    pub boundary: BoundaryArgs,

    /// Marker published when the working tree is dirty
    #[arg(long, value_name = "VALUE")]
    pub dirty_value: Option<String>,

    /// Ignore untracked files when checking for a dirty tree
    #[arg(long)]
    pub ignore_untracked: bool,

    /// Build-number template, e.g. '{tag}.{commitsCount}.{shortRevision}'
    #[arg(long, value_name = "TEMPLATE")]
    pub template: Option<String>,

    /// Prefix for published property names
    #[arg(long)]
    pub prefix: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Properties)]
    pub format: Format,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Fail instead of printing placeholders when extraction fails
    #[arg(long)]
    pub strict: bool,
}

/// Commit-count stop point.
#[derive(Args, Debug, Default, Clone)]
pub struct BoundaryArgs {
    /// Count down to and including this tag or sha
    #[arg(long, value_name = "REF", conflicts_with = "since_exclusive")]
    pub since_inclusive: Option<String>,

    /// Count down to but excluding this tag or sha
    #[arg(long, value_name = "REF")]
    pub since_exclusive: Option<String>,
}

/// Output formats.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// Java-style key=value lines
    #[default]
    Properties,
    /// JSON object
    Json,
    /// KEY=value lines for CI environment files
    Env,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Properties => OutputFormat::Properties,
            Format::Json => OutputFormat::Json,
            Format::Env => OutputFormat::Env,
        }
    }
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}
