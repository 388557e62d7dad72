//! Configuration validation utilities
//!
//! Thin wrappers turning the centralized rules in `utils::validators` into
//! `anyhow` errors for the command layer.

use super::Config;
use crate::utils::validators;
use anyhow::Result;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration, reporting every broken rule
    pub fn validate(config: &Config) -> Result<()> {
        validators::validate_config(config).map_err(validators::validation_errors_to_anyhow)
    }
}
