//! Project entity representing one checked directory.

use crate::config::ProjectConfig;
use std::path::{Path, PathBuf};

/// A target directory with its resolved descriptor and temp artifact paths
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory the descriptor and temp artifact paths are joined onto
    pub root_path: PathBuf,
    /// Descriptor path relative to the repository root, as git reports it
    pub descriptor: String,
    /// Top-level field holding the version
    pub version_field: String,
    /// Revision holding the last committed descriptor
    pub revision: String,
    /// Loaded configuration
    pub config: ProjectConfig,
}

impl Project {
    /// Create a new Project from a root path and configuration
    pub fn new(root_path: PathBuf, config: ProjectConfig) -> Self {
        Self {
            root_path,
            descriptor: config.descriptor.file.clone(),
            version_field: config.descriptor.version_field.clone(),
            revision: config.git.revision.clone(),
            config,
        }
    }

    /// Same project anchored at the repository's top-level directory
    pub fn at_root(&self, root_path: PathBuf) -> Self {
        Self {
            root_path,
            ..self.clone()
        }
    }

    /// Discover the repository root by walking up from a start directory
    pub fn discover(start_path: Option<PathBuf>) -> Option<PathBuf> {
        let start = start_path
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let mut current = start.as_path();
        loop {
            // Check for .git directory or file (worktree)
            if current.join(".git").exists() {
                return Some(current.to_path_buf());
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }

    /// Working copy of the descriptor
    pub fn descriptor_path(&self) -> PathBuf {
        self.root_path.join(&self.descriptor)
    }

    /// Where the committed descriptor is exported during a check
    pub fn temp_artifact_path(&self) -> PathBuf {
        self.root_path.join(&self.config.git.temp_file)
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }
}
