//! ui::output
//!
//! User-facing messages on stderr.
//!
//! # Design
//!
//! Messages respect the quiet flag. Command output itself (rendered
//! properties, counts) goes to stdout and is never routed through here,
//! so `--quiet` cannot swallow the data a build step is waiting for.

use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - errors only
    Quiet,
    /// Normal mode - warnings and errors
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Whether warnings are shown.
    pub fn shows_warnings(self) -> bool {
        self != Verbosity::Quiet
    }
}

/// Format an error message.
pub fn format_error(message: impl Display) -> String {
    format!("error: {}", message)
}

/// Format a warning message.
pub fn format_warning(message: impl Display) -> String {
    format!("warning: {}", message)
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("{}", format_error(message));
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows_warnings() {
        eprintln!("{}", format_warning(message));
    }
}
