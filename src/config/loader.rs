//! Configuration file loading

use super::ConfigValidator;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Checkout configuration, one immutable snapshot per run
///
/// Optional string fields treat blank values like missing ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub repository_url: String,
    pub clone_into_dir: String,

    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,

    #[serde(default)]
    pub pr_source_repository_url: Option<String>,
    #[serde(default)]
    pub pr_merge_branch: Option<String>,
    #[serde(default)]
    pub pr_unverified_merge_branch: Option<String>,
    #[serde(default)]
    pub pr_head_branch: Option<String>,
    #[serde(default)]
    pub pr_dest_branch: Option<String>,
    #[serde(default)]
    pub pr_id: Option<u64>,

    #[serde(default)]
    pub manual_merge: bool,
    #[serde(default = "default_true")]
    pub should_merge_pr: bool,

    /// Number of commits to fetch, 0 fetches the full history
    #[serde(default)]
    pub clone_depth: u32,
    #[serde(default)]
    pub fetch_tags: bool,
    #[serde(default = "default_true")]
    pub update_submodules: bool,
    #[serde(default)]
    pub submodule_update_depth: u32,
    #[serde(default)]
    pub sparse_directories: Vec<String>,
    #[serde(default)]
    pub reset_repository: bool,

    #[serde(default)]
    pub build_url: Option<String>,
    #[serde(default)]
    pub build_api_token: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Create a configuration with only the required fields set
    pub fn new(repository_url: impl Into<String>, clone_into_dir: impl Into<String>) -> Self {
        Self {
            repository_url: repository_url.into(),
            clone_into_dir: clone_into_dir.into(),
            commit: None,
            tag: None,
            branch: None,
            pr_source_repository_url: None,
            pr_merge_branch: None,
            pr_unverified_merge_branch: None,
            pr_head_branch: None,
            pr_dest_branch: None,
            pr_id: None,
            manual_merge: false,
            should_merge_pr: true,
            clone_depth: 0,
            fetch_tags: false,
            update_submodules: true,
            submodule_update_depth: 0,
            sparse_directories: Vec::new(),
            reset_repository: false,
            build_url: None,
            build_api_token: None,
        }
    }

    /// Load and validate configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config = Self::read(path)?;

        // Validate the loaded configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Read configuration from a file without validating it
    ///
    /// For callers that complete the configuration from other sources and
    /// validate the result themselves.
    pub fn read(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;

        Self::from_yaml(&content).with_context(|| format!("Invalid config file {}", path))
    }

    /// Parse configuration from YAML without validating it
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config")
    }

    pub fn commit(&self) -> Option<&str> {
        non_blank(&self.commit)
    }

    pub fn tag(&self) -> Option<&str> {
        non_blank(&self.tag)
    }

    pub fn branch(&self) -> Option<&str> {
        non_blank(&self.branch)
    }

    pub fn pr_source_repository_url(&self) -> Option<&str> {
        non_blank(&self.pr_source_repository_url)
    }

    pub fn pr_merge_branch(&self) -> Option<&str> {
        non_blank(&self.pr_merge_branch)
    }

    pub fn pr_unverified_merge_branch(&self) -> Option<&str> {
        non_blank(&self.pr_unverified_merge_branch)
    }

    pub fn pr_head_branch(&self) -> Option<&str> {
        non_blank(&self.pr_head_branch)
    }

    pub fn pr_dest_branch(&self) -> Option<&str> {
        non_blank(&self.pr_dest_branch)
    }

    pub fn build_url(&self) -> &str {
        self.build_url.as_deref().unwrap_or_default()
    }

    pub fn build_api_token(&self) -> &str {
        self.build_api_token.as_deref().unwrap_or_default()
    }

    /// Whether the build was triggered by a pull request
    pub fn is_pr(&self) -> bool {
        self.pr_source_repository_url().is_some()
            || self.pr_merge_branch().is_some()
            || self.pr_unverified_merge_branch().is_some()
            || self.pr_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_yaml_applies_defaults() {
        let config = Config::from_yaml(
            "repository_url: https://github.com/owner/repo.git\nclone_into_dir: ./src\n",
        )
        .unwrap();

        assert_eq!(config, Config::new("https://github.com/owner/repo.git", "./src"));
        assert!(config.should_merge_pr);
        assert!(config.update_submodules);
        assert!(!config.manual_merge);
        assert_eq!(config.clone_depth, 0);
    }

    #[test]
    fn test_from_yaml_full() {
        let yaml = r#"
repository_url: git@github.com:owner/repo.git
clone_into_dir: /tmp/src
commit: 76a934ae
branch: feature
pr_id: 42
pr_merge_branch: pull/42/merge
pr_dest_branch: main
clone_depth: 50
sparse_directories:
  - client
  - server
build_url: https://build.example.com/build/1
"#;
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.commit(), Some("76a934ae"));
        assert_eq!(config.branch(), Some("feature"));
        assert_eq!(config.pr_id, Some(42));
        assert_eq!(config.pr_merge_branch(), Some("pull/42/merge"));
        assert_eq!(config.clone_depth, 50);
        assert_eq!(config.sparse_directories, vec!["client", "server"]);
        assert_eq!(config.build_url(), "https://build.example.com/build/1");
        assert_eq!(config.build_api_token(), "");
    }

    #[test]
    fn test_blank_values_are_missing() {
        let mut config = Config::new("https://github.com/owner/repo.git", "./src");
        config.commit = Some("  ".to_string());
        config.pr_source_repository_url = Some(String::new());

        assert_eq!(config.commit(), None);
        assert!(!config.is_pr());
    }

    #[test]
    fn test_is_pr() {
        let base = Config::new("https://github.com/owner/repo.git", "./src");
        assert!(!base.is_pr());

        let mut with_id = base.clone();
        with_id.pr_id = Some(1);
        assert!(with_id.is_pr());

        let mut with_unverified = base.clone();
        with_unverified.pr_unverified_merge_branch = Some("pull/1/merge".to_string());
        assert!(with_unverified.is_pr());

        let mut with_dest_only = base;
        with_dest_only.pr_dest_branch = Some("main".to_string());
        assert!(!with_dest_only.is_pr());
    }

    #[test]
    fn test_load_validates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "repository_url: \"\"\nclone_into_dir: ./src").unwrap();

        let err = Config::load(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Repository URL cannot be empty"));
    }

    #[test]
    fn test_read_leaves_validation_to_the_caller() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "repository_url: \"\"\nclone_into_dir: ./src").unwrap();

        let config = Config::read(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.repository_url, "");
        assert_eq!(config.clone_into_dir, "./src");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/git-checkout.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
