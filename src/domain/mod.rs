//! Domain entities for version-guard.
//!
//! This module contains the core types:
//! - FileChangeStatus / StatusReport: Porcelain status of the working tree
//! - CheckOutcome: Terminal result of one check
//! - Project: The checked directory and its resolved paths

mod outcome;
mod project;
mod status;

pub use outcome::{CheckOutcome, CheckReport, ErrorKind};
pub use project::Project;
pub use status::{FileChangeStatus, StatusReport};
