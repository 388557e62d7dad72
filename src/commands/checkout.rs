//! Checkout command implementation

use super::{Command, CommandContext};
use crate::build_service::{ApiMergeRefChecker, ApiPatchSource};
use crate::checkout::GitCloner;
use crate::config::Config;
use crate::git::{DefaultRunner, Logger};
use crate::output::export_commit_info;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Check out the configured revision and export its commit info
pub struct CheckoutCommand {
    /// Also write the commit info as JSON to this file
    pub output_file: Option<PathBuf>,
}

#[async_trait]
impl Command for CheckoutCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let config = context.config.clone();
        let output_file = self.output_file.clone();

        // git and the build service are driven synchronously
        tokio::task::spawn_blocking(move || run_checkout(&config, output_file.as_deref())).await?
    }
}

fn run_checkout(config: &Config, output_file: Option<&Path>) -> Result<()> {
    let logger = Logger;
    let runner = DefaultRunner::new();
    let patch_source = ApiPatchSource::new(config.build_url(), config.build_api_token());
    let merge_ref_checker = ApiMergeRefChecker::new(config.build_url(), config.build_api_token());

    let cloner = GitCloner::new(&runner, &patch_source, &merge_ref_checker);
    let result = cloner.checkout_state(config)?;

    match export_commit_info(&runner, &result)? {
        Some(info) => {
            info.print(&logger);
            if let Some(path) = output_file {
                info.write_json(path)?;
                logger.info(&format!("Commit info written to {}", path.display()));
            }
        }
        None => logger.info("Nothing was checked out, commit info is not exported"),
    }

    logger.success(&format!("Checkout finished ({})", result.method));
    Ok(())
}
