//! Per-file change status as reported by `git status --porcelain`.

use crate::error::{GitError, GitResult};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Change state of a single file in the working tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileChangeStatus {
    /// Untracked file (`??`)
    Created,
    /// Modified file (`M`)
    Modified,
    /// Not present in the report
    Unchanged,
    /// Deleted file (`D`)
    Deleted,
}

impl FileChangeStatus {
    /// Token this status corresponds to in porcelain output
    pub fn token(&self) -> &'static str {
        match self {
            Self::Created => "??",
            Self::Modified => "M",
            Self::Unchanged => "",
            Self::Deleted => "D",
        }
    }

    /// Decode a status token emitted by git.
    ///
    /// `Unchanged` is never emitted, so the empty token is rejected like any
    /// other unknown one.
    pub fn decode(token: &str) -> GitResult<Self> {
        match token {
            "??" => Ok(Self::Created),
            "M" => Ok(Self::Modified),
            "D" => Ok(Self::Deleted),
            other => Err(GitError::InvalidStatusToken(other.to_string())),
        }
    }
}

impl FromStr for FileChangeStatus {
    type Err = GitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for FileChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Unchanged => "unchanged",
            Self::Deleted => "deleted",
        };
        write!(f, "{}", name)
    }
}

/// Snapshot of `git status --porcelain`, keyed by relative path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    entries: HashMap<String, FileChangeStatus>,
}

impl StatusReport {
    /// Parse porcelain lines; any malformed line fails the whole report
    pub fn from_lines<I, S>(lines: I) -> GitResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = HashMap::new();

        for line in lines {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let (token, path) = match (tokens.next(), tokens.next(), tokens.next()) {
                (Some(token), Some(path), None) => (token, path),
                _ => return Err(GitError::MalformedStatusLine(line.to_string())),
            };

            entries.insert(path.to_string(), FileChangeStatus::decode(token)?);
        }

        Ok(Self { entries })
    }

    /// Parse a whole porcelain output block
    pub fn parse(output: &str) -> GitResult<Self> {
        Self::from_lines(output.lines())
    }

    /// Status of a path, `Unchanged` when the report does not mention it
    pub fn status_of(&self, path: &str) -> FileChangeStatus {
        self.entries
            .get(path)
            .copied()
            .unwrap_or(FileChangeStatus::Unchanged)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
