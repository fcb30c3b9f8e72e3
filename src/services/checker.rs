//! Version check orchestration.
//!
//! Sequences the repository queries and descriptor reads that decide whether
//! a modified descriptor carries a new version. Every failure is folded into
//! [`CheckOutcome::InternalError`]; the exported temp artifact is removed on
//! every path out of the comparison.

use super::descriptor::{FieldReader, XmlFieldReader};
use super::git::{GitService, GitTool, RepositoryClient};
use crate::config::ProjectConfig;
use crate::domain::{CheckOutcome, FileChangeStatus, Project};
use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Exported descriptor that is deleted when dropped
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    /// Claim `path`; nothing is written until the export runs
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remove(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        std::fs::remove_file(&self.path).map_err(|source| AppError::Cleanup {
            path: self.path.clone(),
            source,
        })
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        match self.remove() {
            Ok(()) => tracing::debug!("Removed {}", self.path.display()),
            Err(e) => tracing::warn!("{}", e),
        }
    }
}

/// Decides whether the descriptor version was bumped in one working directory
pub struct VersionChecker<C, R> {
    client: C,
    reader: R,
    project: Project,
}

impl<C: RepositoryClient, R: FieldReader> VersionChecker<C, R> {
    pub fn new(client: C, reader: R, project: Project) -> Self {
        Self {
            client,
            reader,
            project,
        }
    }

    /// Run the check; never fails, errors become `InternalError`
    pub fn check(&self) -> CheckOutcome {
        match self.evaluate() {
            Ok(outcome) => {
                tracing::debug!("{}: {:?}", self.project.root().display(), outcome);
                outcome
            }
            Err(e) => {
                tracing::error!("Check of {} failed: {}", self.project.root().display(), e);
                CheckOutcome::InternalError {
                    kind: e.kind(),
                    detail: e.to_string(),
                }
            }
        }
    }

    fn evaluate(&self) -> Result<CheckOutcome> {
        if !self.client.is_repository()? {
            return Ok(CheckOutcome::NotARepository);
        }

        // Porcelain and `rev:path` name files from the top of the working tree
        let project = self.project.at_root(self.client.repository_root()?);

        if !self.client.has_uncommitted_changes()? {
            return Ok(CheckOutcome::NoUncommittedChanges);
        }

        let status = self.client.status_report()?.status_of(&project.descriptor);
        tracing::debug!("{} is {}", project.descriptor, status);

        match status {
            FileChangeStatus::Created => Ok(CheckOutcome::NewProject),
            FileChangeStatus::Unchanged => Ok(CheckOutcome::VersionUnchanged),
            FileChangeStatus::Modified | FileChangeStatus::Deleted => {
                self.compare(&project, status)
            }
        }
    }

    /// Compare the working-copy version with the committed one
    fn compare(&self, project: &Project, status: FileChangeStatus) -> Result<CheckOutcome> {
        let artifact = TempArtifact::new(project.temp_artifact_path());

        self.client
            .export_file_at_revision(&project.descriptor, &project.revision, artifact.path())?;

        // A deleted descriptor has no working copy to read
        let current = if status == FileChangeStatus::Deleted {
            None
        } else {
            self.reader
                .read_field(&project.descriptor_path(), &project.version_field)?
        };
        let Some(current) = current else {
            return Ok(CheckOutcome::VersionUnchanged);
        };

        let Some(previous) = self.reader.read_field(artifact.path(), &project.version_field)?
        else {
            return Ok(CheckOutcome::VersionUnchanged);
        };

        if current == previous {
            Ok(CheckOutcome::VersionUnchanged)
        } else {
            Ok(CheckOutcome::VersionBumped { previous, current })
        }
    }
}

/// Check one directory with the git CLI and the XML descriptor reader
pub fn check_directory(
    tool: Arc<GitTool>,
    config: &ProjectConfig,
    directory: &Path,
) -> CheckOutcome {
    let client = match GitService::new(tool, directory.to_path_buf()) {
        Ok(client) => client,
        Err(e) => return setup_failure(directory, e.into()),
    };

    let project = Project::new(directory.to_path_buf(), config.clone());
    VersionChecker::new(client, XmlFieldReader::new(), project).check()
}

/// Load the target's own configuration, then check it like [`check_directory`]
pub fn check_target(tool: Arc<GitTool>, directory: &Path) -> CheckOutcome {
    match ProjectConfig::load_for(directory) {
        Ok(config) => check_directory(tool, &config, directory),
        Err(e) => setup_failure(directory, e.into()),
    }
}

fn setup_failure(directory: &Path, e: AppError) -> CheckOutcome {
    tracing::error!("Cannot check {}: {}", directory.display(), e);
    CheckOutcome::InternalError {
        kind: e.kind(),
        detail: e.to_string(),
    }
}
