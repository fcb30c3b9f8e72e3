//! Configuration management for version-guard.
//!
//! Supports layered configuration: defaults → project → user → env

use crate::domain::Project;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Project-local configuration file name
pub const PROJECT_CONFIG_FILE: &str = ".version-guard.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub descriptor: DescriptorConfig,
    #[serde(default)]
    pub git: GitConfig,
}

impl ProjectConfig {
    /// Load configuration with hierarchy: defaults → project → user → env
    pub fn load(project_root: Option<&Path>) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder();

        // 1. Start with defaults
        builder = builder.add_source(
            config::File::from_str(
                include_str!("../default_config.toml"),
                config::FileFormat::Toml,
            )
            .required(false),
        );

        // 2. Project-specific config (.version-guard.toml in project root)
        if let Some(root) = project_root {
            let project_config = root.join(PROJECT_CONFIG_FILE);
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }
        }

        // 3. User config (~/.config/version-guard/config.toml)
        if let Some(config_dir) =
            directories::ProjectDirs::from("com", "version-guard", "version-guard")
        {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config).required(false));
            }
        }

        // 4. Environment variables (VERSION_GUARD__*)
        builder = builder.add_source(
            Environment::with_prefix("VERSION_GUARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Configuration for a check target, read from its repository root when
    /// there is one and from the directory itself otherwise
    pub fn load_for(directory: &Path) -> Result<Self, ConfigError> {
        let root = Project::discover(Some(directory.to_path_buf()))
            .unwrap_or_else(|| directory.to_path_buf());
        Self::load(Some(&root))
    }

    /// Reject settings the checker cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("descriptor.file", &self.descriptor.file),
            ("descriptor.version_field", &self.descriptor.version_field),
            ("git.executable", &self.git.executable),
            ("git.revision", &self.git.revision),
            ("git.temp_file", &self.git.temp_file),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
            }
        }

        if self.git.temp_file == self.descriptor.file {
            return Err(ConfigError::Invalid(
                "git.temp_file must differ from descriptor.file".to_string(),
            ));
        }

        Ok(())
    }
}

/// Descriptor file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorConfig {
    /// Descriptor path relative to the repository root
    #[serde(default = "default_descriptor_file")]
    pub file: String,
    /// Top-level field holding the version
    #[serde(default = "default_version_field")]
    pub version_field: String,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            file: default_descriptor_file(),
            version_field: default_version_field(),
        }
    }
}

fn default_descriptor_file() -> String {
    "pom.xml".to_string()
}

fn default_version_field() -> String {
    "version".to_string()
}

/// Git-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Git executable name or path
    #[serde(default = "default_executable")]
    pub executable: String,
    /// Revision holding the last committed descriptor
    #[serde(default = "default_revision")]
    pub revision: String,
    /// File name of the exported descriptor inside the working directory
    #[serde(default = "default_temp_file")]
    pub temp_file: String,
    /// Bounded wait for each git process, 0 waits forever
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl GitConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            revision: default_revision(),
            temp_file: default_temp_file(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_executable() -> String {
    "git".to_string()
}

fn default_revision() -> String {
    "HEAD~0".to_string()
}

fn default_temp_file() -> String {
    ".version-guard-previous.xml".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();
        assert_eq!(config.descriptor.file, "pom.xml");
        assert_eq!(config.descriptor.version_field, "version");
        assert_eq!(config.git.executable, "git");
        assert_eq!(config.git.revision, "HEAD~0");
        assert_eq!(config.git.temp_file, ".version-guard-previous.xml");
        assert_eq!(config.git.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_timeout_disables_bound() {
        let git = GitConfig {
            timeout_seconds: 0,
            ..GitConfig::default()
        };
        assert_eq!(git.timeout(), None);
    }

    #[test]
    fn test_project_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(PROJECT_CONFIG_FILE),
            "[descriptor]\nfile = \"build.xml\"\n\n[git]\ntimeout_seconds = 5\n",
        )
        .unwrap();

        let config = ProjectConfig::load(Some(temp.path())).unwrap();
        assert_eq!(config.descriptor.file, "build.xml");
        assert_eq!(config.descriptor.version_field, "version");
        assert_eq!(config.git.timeout_seconds, 5);
    }

    #[test]
    fn test_load_for_reads_repository_root() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        std::fs::write(
            temp.path().join(PROJECT_CONFIG_FILE),
            "[descriptor]\nversion_field = \"revision\"\n",
        )
        .unwrap();
        let nested = temp.path().join("module");
        std::fs::create_dir(&nested).unwrap();

        let config = ProjectConfig::load_for(&nested).unwrap();
        assert_eq!(config.descriptor.version_field, "revision");
    }

    #[test]
    fn test_validate_rejects_temp_file_clash() {
        let mut config = ProjectConfig::default();
        config.git.temp_file = config.descriptor.file.clone();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_empty_field() {
        let mut config = ProjectConfig::default();
        config.descriptor.version_field = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
