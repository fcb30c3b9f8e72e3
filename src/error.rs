//! Unified error types for version-guard.

use crate::domain::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("Failed to remove temporary file {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// Collapse the error into the closed taxonomy reported by a check
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Git(e) => e.kind(),
            Self::Descriptor(e) => e.kind(),
            Self::Cleanup { .. } => ErrorKind::Cleanup,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Subprocess lifecycle errors
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed reading output of {program}: {source}")]
    Read {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {timeout:?} and was killed")]
    Timeout { program: String, timeout: Duration },
}

impl ProcessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Launch { .. } => ErrorKind::ProcessLaunch,
            Self::Wait { .. } | Self::Read { .. } => ErrorKind::ProcessWait,
            Self::Timeout { .. } => ErrorKind::ProcessTimeout,
        }
    }
}

/// Git operation errors
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Git executable not usable: {0}")]
    ToolNotFound(String),

    #[error("Invalid status token: {0:?}")]
    InvalidStatusToken(String),

    #[error("Malformed status line: {0:?}")]
    MalformedStatusLine(String),

    #[error("Git operation failed: {0}")]
    Operation(String),

    #[error("Failed to export {path} at {revision}: {reason}")]
    Export {
        path: String,
        revision: String,
        reason: String,
    },

    #[error("Failed to clone {uri} into {destination}: {reason}")]
    Clone {
        uri: String,
        destination: PathBuf,
        reason: String,
    },

    #[error("{0}")]
    Process(#[from] ProcessError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ToolNotFound(_) => ErrorKind::ToolNotFound,
            Self::InvalidStatusToken(_) => ErrorKind::InvalidStatusToken,
            Self::MalformedStatusLine(_) => ErrorKind::MalformedStatusLine,
            Self::Operation(_) => ErrorKind::Repository,
            Self::Export { .. } => ErrorKind::Export,
            Self::Clone { .. } => ErrorKind::Clone,
            Self::Process(e) => e.kind(),
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Descriptor document errors
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("No root element in {0}")]
    NoRootElement(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DescriptorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::DescriptorParse,
            Self::NoRootElement(_) => ErrorKind::NoRootElement,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for Git operations
pub type GitResult<T> = std::result::Result<T, GitError>;

/// Result type alias for subprocess operations
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;

/// Result type alias for descriptor operations
pub type DescriptorResult<T> = std::result::Result<T, DescriptorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_nested_process_error() {
        let err = AppError::from(GitError::from(ProcessError::Timeout {
            program: "git".to_string(),
            timeout: Duration::from_millis(250),
        }));
        assert_eq!(err.kind(), ErrorKind::ProcessTimeout);
        assert_eq!(
            err.to_string(),
            "Git error: git did not finish within 250ms and was killed"
        );
    }

    #[test]
    fn test_kind_for_descriptor_errors() {
        let err = AppError::from(DescriptorError::NoRootElement(PathBuf::from("pom.xml")));
        assert_eq!(err.kind(), ErrorKind::NoRootElement);

        let err = AppError::from(DescriptorError::Parse {
            path: PathBuf::from("pom.xml"),
            reason: "unexpected end of stream".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::DescriptorParse);
    }
}
