//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Warning and error messages
//!
//! # Design
//!
//! All user-facing messages go through this module so quiet mode is
//! handled in one place.

pub mod output;
