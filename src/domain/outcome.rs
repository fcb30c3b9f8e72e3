//! Terminal result of a version check.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Closed error taxonomy carried by [`CheckOutcome::InternalError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ToolNotFound,
    ProcessLaunch,
    ProcessWait,
    ProcessTimeout,
    InvalidStatusToken,
    MalformedStatusLine,
    Repository,
    Export,
    Clone,
    DescriptorParse,
    NoRootElement,
    Cleanup,
    Config,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolNotFound => "tool not found",
            Self::ProcessLaunch => "process launch",
            Self::ProcessWait => "process wait",
            Self::ProcessTimeout => "process timeout",
            Self::InvalidStatusToken => "invalid status token",
            Self::MalformedStatusLine => "malformed status line",
            Self::Repository => "repository query",
            Self::Export => "export",
            Self::Clone => "clone",
            Self::DescriptorParse => "descriptor parse",
            Self::NoRootElement => "no root element",
            Self::Cleanup => "cleanup",
            Self::Config => "configuration",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one check run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// Directory is not under version control
    NotARepository,
    /// Working tree is clean
    NoUncommittedChanges,
    /// Descriptor is newly added
    NewProject,
    /// Descriptor untouched, version identical, or version missing on either side
    VersionUnchanged,
    /// Version text differs from the committed one
    VersionBumped { previous: String, current: String },
    /// The check could not complete
    InternalError { kind: ErrorKind, detail: String },
}

impl CheckOutcome {
    /// Whether the author has to act before committing
    pub fn needs_attention(&self) -> bool {
        matches!(self, Self::VersionUnchanged | Self::InternalError { .. })
    }

    /// Human-readable summary for a checked directory
    pub fn message(&self, directory: &Path) -> String {
        let dir = directory.display();
        match self {
            Self::NotARepository => format!("{} is not a git repository", dir),
            Self::NoUncommittedChanges => format!("{} has no uncommitted changes", dir),
            Self::NewProject => format!("{} is a new project", dir),
            Self::VersionUnchanged => format!("Version not updated: {}", dir),
            Self::VersionBumped { previous, current } => {
                format!("Version is up to date: {} ({} -> {})", dir, previous, current)
            }
            Self::InternalError { kind, detail } => {
                format!("Check failed for {} ({}): {}", dir, kind, detail)
            }
        }
    }
}

/// Outcome paired with the directory it belongs to
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub directory: PathBuf,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
}

impl CheckReport {
    pub fn new(directory: PathBuf, outcome: CheckOutcome) -> Self {
        Self { directory, outcome }
    }

    pub fn message(&self) -> String {
        self.outcome.message(&self.directory)
    }
}
