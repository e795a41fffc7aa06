//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! There are two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$GIT_BUILDNUMBER_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/git-buildnumber/config.toml`
//! 3. `~/.git-buildnumber/config.toml`
//!
//! # Repo Config Locations
//!
//! Repository directories come from the git layer as [`RepoDirs`], already
//! canonicalized and discovered. Searched in order:
//! 1. `<git dir>/buildnumber.toml` (local, never committed)
//! 2. `<work dir>/.buildnumber.toml` (checked in with the project)
//!
//! # Example
//!
//! ```no_run
//! use gitbuildnumber::core::config::{Config, RepoDirs};
//!
//! let dirs = RepoDirs::new("/path/to/repo", "/path/to/repo/.git");
//! let result = Config::load(Some(&dirs)).unwrap();
//! let config = result.config;
//!
//! println!("Build date format: {}", config.build_date_format());
//! println!("Dirty marker: {}", config.dirty_value());
//! ```

pub mod schema;

pub use schema::ConfigFile;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::dates::{DEFAULT_BUILD_DATE_FORMAT, DEFAULT_GIT_DATE_FORMAT};
use crate::core::properties::DEFAULT_PREFIX;
use crate::core::walk::Boundary;

const CONFIG_ENV: &str = "GIT_BUILDNUMBER_CONFIG";
const GLOBAL_DIR: &str = "git-buildnumber";

/// Default marker published in `dirty` when the working tree is dirty.
pub const DEFAULT_DIRTY_VALUE: &str = "dirty";

/// Directories of a discovered, non-bare repository.
///
/// For a linked worktree `git_dir` is the worktree's private git dir, so
/// local config is per worktree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDirs {
    /// Root of the working tree
    pub work_dir: PathBuf,
    /// The repository's git dir
    pub git_dir: PathBuf,
}

impl RepoDirs {
    pub fn new(work_dir: impl Into<PathBuf>, git_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            git_dir: git_dir.into(),
        }
    }
}

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// This struct provides accessor methods that apply precedence rules
/// automatically. Repo config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ConfigFile,
    /// Repository configuration (if in a repo)
    pub repo: Option<ConfigFile>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Merge already parsed files without touching the filesystem.
    pub fn new(global: ConfigFile, repo: Option<ConfigFile>) -> Self {
        Self {
            global,
            repo,
            global_path: None,
            repo_path: None,
        }
    }

    /// Load configuration from default locations.
    ///
    /// If `repo` is provided, also loads repo-specific config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(repo: Option<&RepoDirs>) -> Result<ConfigLoadResult, ConfigError> {
        let global_path = Self::find_global();
        Self::load_from(global_path.as_deref(), repo)
    }

    /// Load configuration from an explicit global file and repository.
    pub fn load_from(
        global_file: Option<&Path>,
        repo: Option<&RepoDirs>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let global = match global_file {
            Some(path) => Self::read_config(path)?,
            None => ConfigFile::default(),
        };

        let (repo, repo_path_found) = match repo {
            Some(dirs) => Self::load_repo(dirs, &mut warnings)?,
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                repo,
                global_path: global_file.map(Path::to_path_buf),
                repo_path: repo_path_found,
            },
            warnings,
        })
    }

    /// Locate the global configuration file.
    fn find_global() -> Option<PathBuf> {
        // 1. Check $GIT_BUILDNUMBER_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/git-buildnumber/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join(GLOBAL_DIR).join("config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.git-buildnumber/config.toml
        dirs::home_dir()
            .map(|home| home.join(format!(".{GLOBAL_DIR}")).join("config.toml"))
            .filter(|path| path.exists())
    }

    /// Load repository configuration from standard locations.
    fn load_repo(
        dirs: &RepoDirs,
        warnings: &mut Vec<ConfigWarning>,
    ) -> Result<(Option<ConfigFile>, Option<PathBuf>), ConfigError> {
        let local = dirs.git_dir.join("buildnumber.toml");
        let shared = dirs.work_dir.join(".buildnumber.toml");

        if local.is_file() {
            if shared.is_file() {
                warnings.push(ConfigWarning {
                    message: format!("Ignoring '{}', overridden by local config", shared.display()),
                    path: shared,
                });
            }
            let config = Self::read_config(&local)?;
            return Ok((Some(config), Some(local)));
        }

        if shared.is_file() {
            let config = Self::read_config(&shared)?;
            return Ok((Some(config), Some(shared)));
        }

        Ok((None, None))
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Scopes from highest to lowest precedence.
    fn scopes(&self) -> impl Iterator<Item = &ConfigFile> {
        self.repo.iter().chain(std::iter::once(&self.global))
    }

    fn first<'a, T: ?Sized>(&'a self, pick: impl Fn(&'a ConfigFile) -> Option<&'a T>) -> Option<&'a T> {
        self.scopes().find_map(pick)
    }

    /// Pattern for the author date.
    ///
    /// A scope's `author_date_format` beats its `git_date_format`.
    /// Defaults to `%Y-%m-%d`.
    pub fn author_date_format(&self) -> &str {
        self.first(|c| {
            c.author_date_format
                .as_deref()
                .or(c.git_date_format.as_deref())
        })
        .unwrap_or(DEFAULT_GIT_DATE_FORMAT)
    }

    /// Pattern for the commit date.
    ///
    /// Defaults to `%Y-%m-%d`.
    pub fn commit_date_format(&self) -> &str {
        self.first(|c| {
            c.commit_date_format
                .as_deref()
                .or(c.git_date_format.as_deref())
        })
        .unwrap_or(DEFAULT_GIT_DATE_FORMAT)
    }

    /// Pattern for the build timestamp.
    ///
    /// Defaults to `%Y-%m-%d %H:%M:%S`.
    pub fn build_date_format(&self) -> &str {
        self.first(|c| c.build_date_format.as_deref())
            .unwrap_or(DEFAULT_BUILD_DATE_FORMAT)
    }

    /// Zone override, `None` for local time.
    pub fn time_zone(&self) -> Option<&str> {
        self.first(|c| c.time_zone.as_deref())
    }

    /// Dirty marker.
    ///
    /// Defaults to "dirty".
    pub fn dirty_value(&self) -> &str {
        self.first(|c| c.dirty_value.as_deref())
            .unwrap_or(DEFAULT_DIRTY_VALUE)
    }

    /// Whether untracked files make the tree dirty.
    ///
    /// Defaults to `true`.
    pub fn include_untracked(&self) -> bool {
        self.scopes()
            .find_map(|c| c.include_untracked)
            .unwrap_or(true)
    }

    /// Count boundary from the highest scope that sets one.
    pub fn boundary(&self) -> Option<Boundary> {
        self.scopes().find(|c| c.has_boundary()).and_then(|c| {
            Boundary::from_options(
                c.count_commits_since_inclusive.as_deref(),
                c.count_commits_since_exclusive.as_deref(),
            )
        })
    }

    /// Build-number template, `None` for the default rule.
    pub fn buildnumber_template(&self) -> Option<&str> {
        self.first(|c| c.buildnumber_template.as_deref())
    }

    /// Prefix for published property names.
    ///
    /// Defaults to "git.".
    pub fn property_prefix(&self) -> &str {
        self.first(|c| c.property_prefix.as_deref())
            .unwrap_or(DEFAULT_PREFIX)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
