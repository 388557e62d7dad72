//! Configuration validation utilities
//!
//! This module provides centralized validation logic for the checkout
//! configuration. Every rule is checked and all failures are reported at once.

use super::filesystem::is_clone_dir_dangerous;
use crate::config::Config;
use anyhow::anyhow;

/// Enumeration of possible validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Repository URL is empty
    EmptyRepositoryUrl,
    /// Repository URL format is invalid
    InvalidRepositoryUrl(String),
    /// PR source repository URL format is invalid
    InvalidPrRepositoryUrl(String),
    /// Clone directory is empty
    EmptyCloneDir,
    /// Clone directory would overwrite user or system files
    DangerousCloneDir(String),
    /// A sparse checkout directory is empty or whitespace-only
    EmptySparseDirectory,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyRepositoryUrl => {
                write!(f, "Repository URL cannot be empty")
            }
            ValidationError::InvalidRepositoryUrl(url) => {
                write!(f, "Repository URL is invalid: '{}'", url)
            }
            ValidationError::InvalidPrRepositoryUrl(url) => {
                write!(f, "Pull request repository URL is invalid: '{}'", url)
            }
            ValidationError::EmptyCloneDir => {
                write!(f, "Clone directory cannot be empty")
            }
            ValidationError::DangerousCloneDir(dir) => {
                write!(
                    f,
                    "Dangerous clone directory detected: '{}', the checkout could overwrite files in it",
                    dir
                )
            }
            ValidationError::EmptySparseDirectory => {
                write!(f, "Sparse checkout directories cannot be empty")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates a complete configuration object
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Check repository URLs
    if config.repository_url.trim().is_empty() {
        errors.push(ValidationError::EmptyRepositoryUrl);
    } else if !is_valid_repository_url(&config.repository_url) {
        errors.push(ValidationError::InvalidRepositoryUrl(
            config.repository_url.clone(),
        ));
    }

    if let Some(pr_url) = config.pr_source_repository_url() {
        if !is_valid_repository_url(pr_url) {
            errors.push(ValidationError::InvalidPrRepositoryUrl(pr_url.to_string()));
        }
    }

    // Check clone directory
    if config.clone_into_dir.trim().is_empty() {
        errors.push(ValidationError::EmptyCloneDir);
    } else if is_clone_dir_dangerous(&config.clone_into_dir) {
        errors.push(ValidationError::DangerousCloneDir(
            config.clone_into_dir.clone(),
        ));
    }

    if config
        .sparse_directories
        .iter()
        .any(|dir| dir.trim().is_empty())
    {
        errors.push(ValidationError::EmptySparseDirectory);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Helper function to check if a repository URL is valid
///
/// Git accepts `scheme://` URLs, scp-like `[user@]host:path` addresses and
/// local paths, relative or absolute. Rejected are values git would read as
/// an option, values with control characters and URLs with nothing after the
/// scheme.
fn is_valid_repository_url(url: &str) -> bool {
    if url.starts_with('-') || url.chars().any(char::is_control) {
        return false;
    }

    match url.split_once("://") {
        Some((scheme, rest)) => is_url_scheme(scheme) && !rest.is_empty(),
        None => true,
    }
}

fn is_url_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Converts validation errors to a user-friendly anyhow error
pub fn validation_errors_to_anyhow(errors: Vec<ValidationError>) -> anyhow::Error {
    let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    anyhow!("Validation errors: {}", error_messages.join("; "))
}
