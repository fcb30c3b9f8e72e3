//! version-guard: did the author forget to bump the version?
//!
//! This crate inspects a git working tree with uncommitted changes and
//! reports whether the build descriptor's version differs from the last
//! committed one.

pub mod config;
pub mod domain;
pub mod error;
pub mod services;

pub use config::ProjectConfig;
pub use domain::{CheckOutcome, CheckReport};
pub use error::{AppError, Result};
pub use services::{check_directory, check_target, GitService, GitTool, VersionChecker};
