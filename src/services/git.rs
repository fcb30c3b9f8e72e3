//! Git service for repository status queries.
//!
//! Shells out to the git CLI through [`ProcessRunner`].
//! All operations are blocking and should be wrapped with spawn_blocking.

use super::process::{build_argv, ProcessRunner};
use crate::config::GitConfig;
use crate::domain::StatusReport;
use crate::error::{GitError, GitResult};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Repository queries needed by the version checker
pub trait RepositoryClient {
    /// Whether the working directory is inside a repository
    fn is_repository(&self) -> GitResult<bool>;

    /// Top-level directory of the working tree; status and export paths are relative to it
    fn repository_root(&self) -> GitResult<PathBuf>;

    /// Whether `git status --porcelain` reports anything at all
    fn has_uncommitted_changes(&self) -> GitResult<bool>;

    /// Per-file status of the working tree
    fn status_report(&self) -> GitResult<StatusReport>;

    /// Write `relative_path` as of `revision` into `destination`
    fn export_file_at_revision(
        &self,
        relative_path: &str,
        revision: &str,
        destination: &Path,
    ) -> GitResult<()>;
}

/// A git executable known to be invocable.
///
/// Construct once and share between services; the `--version` probe runs
/// at most once per instance.
#[derive(Debug)]
pub struct GitTool {
    executable: String,
    runner: ProcessRunner,
    version: OnceLock<String>,
}

impl GitTool {
    pub fn new(executable: impl Into<String>, runner: ProcessRunner) -> Self {
        Self {
            executable: executable.into(),
            runner,
            version: OnceLock::new(),
        }
    }

    pub fn from_config(config: &GitConfig) -> Self {
        Self::new(config.executable.clone(), ProcessRunner::new(config.timeout()))
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    /// Verify the executable answers `--version`, returning the version line
    pub fn ensure_available(&self) -> GitResult<&str> {
        if let Some(version) = self.version.get() {
            return Ok(version);
        }

        let version = self.probe()?;
        tracing::debug!("Using {}", version);
        Ok(self.version.get_or_init(|| version))
    }

    fn probe(&self) -> GitResult<String> {
        let handle = self
            .runner
            .run(&self.executable, &build_argv("--version", &[]), Path::new("."))
            .map_err(|e| GitError::ToolNotFound(e.to_string()))?;
        let (code, lines) = handle
            .read_to_end()
            .map_err(|e| GitError::ToolNotFound(e.to_string()))?;

        match lines.into_iter().next() {
            Some(line) if code == 0 && !line.trim().is_empty() => Ok(line.trim().to_string()),
            _ => Err(GitError::ToolNotFound(format!(
                "`{} --version` exited with {} and printed no version",
                self.executable, code
            ))),
        }
    }
}

/// Git service bound to one working directory
#[derive(Debug)]
pub struct GitService {
    tool: Arc<GitTool>,
    repo_path: PathBuf,
}

impl GitService {
    /// Create a new GitService, failing if git itself is unusable
    pub fn new(tool: Arc<GitTool>, repo_path: PathBuf) -> GitResult<Self> {
        tool.ensure_available()?;
        Ok(Self { tool, repo_path })
    }

    /// Clone `source_uri` into `destination`
    pub fn clone(&self, source_uri: &str, destination: &Path) -> GitResult<()> {
        let destination = if destination.is_absolute() {
            destination.to_path_buf()
        } else {
            std::env::current_dir()?.join(destination)
        };
        let target = destination.to_string_lossy();

        let code = self.tool.runner().status(
            self.tool.executable(),
            &build_argv("clone", &[source_uri, target.as_ref()]),
            &self.repo_path,
        )?;

        if code != 0 {
            return Err(GitError::Clone {
                uri: source_uri.to_string(),
                destination,
                reason: format!("git clone exited with {}", code),
            });
        }

        Ok(())
    }
}

impl RepositoryClient for GitService {
    fn is_repository(&self) -> GitResult<bool> {
        if !self.repo_path.is_dir() {
            return Ok(false);
        }

        let code = self.tool.runner().status(
            self.tool.executable(),
            &build_argv("status", &[]),
            &self.repo_path,
        )?;
        Ok(code == 0)
    }

    fn repository_root(&self) -> GitResult<PathBuf> {
        let handle = self.tool.runner().run(
            self.tool.executable(),
            &build_argv("rev-parse", &["--show-toplevel"]),
            &self.repo_path,
        )?;
        let (code, lines) = handle.read_to_end()?;

        match lines.first().map(|line| line.trim()) {
            Some(root) if code == 0 && !root.is_empty() => Ok(PathBuf::from(root)),
            _ => Err(GitError::Operation(format!(
                "git rev-parse --show-toplevel exited with {} in {}",
                code,
                self.repo_path.display()
            ))),
        }
    }

    fn has_uncommitted_changes(&self) -> GitResult<bool> {
        let mut handle = self.tool.runner().run(
            self.tool.executable(),
            &build_argv("status", &["--porcelain"]),
            &self.repo_path,
        )?;

        // One line is enough; dropping the handle stops git
        Ok(handle.next_line()?.is_some())
    }

    fn status_report(&self) -> GitResult<StatusReport> {
        let handle = self.tool.runner().run(
            self.tool.executable(),
            &build_argv("status", &["--porcelain"]),
            &self.repo_path,
        )?;
        let (code, lines) = handle.read_to_end()?;

        if code != 0 {
            tracing::warn!(
                "git status --porcelain exited with {} in {}",
                code,
                self.repo_path.display()
            );
        }

        StatusReport::from_lines(lines)
    }

    fn export_file_at_revision(
        &self,
        relative_path: &str,
        revision: &str,
        destination: &Path,
    ) -> GitResult<()> {
        let export_error = |reason: String| GitError::Export {
            path: relative_path.to_string(),
            revision: revision.to_string(),
            reason,
        };

        let file = File::create(destination)
            .map_err(|e| export_error(format!("cannot create {}: {}", destination.display(), e)))?;

        let object = format!("{}:{}", revision, relative_path);
        let code = self.tool.runner().run_redirected(
            self.tool.executable(),
            &build_argv("show", &[object.as_str()]),
            &self.repo_path,
            file,
        )?;

        if code != 0 {
            return Err(export_error(format!("git show exited with {}", code)));
        }

        Ok(())
    }
}
