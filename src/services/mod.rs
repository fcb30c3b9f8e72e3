//! Infrastructure services for version-guard.
//!
//! This module contains:
//! - ProcessRunner: Blocking process execution with a bounded wait
//! - GitTool / GitService: Git CLI access and repository status queries
//! - XmlFieldReader: Descriptor field lookup
//! - VersionChecker: The version check decision procedure

mod checker;
mod descriptor;
mod git;
pub mod process;

pub use checker::{check_directory, check_target, TempArtifact, VersionChecker};
pub use descriptor::{FieldReader, XmlFieldReader};
pub use git::{GitService, GitTool, RepositoryClient};
pub use process::{build_argv, ProcessHandle, ProcessRunner};
