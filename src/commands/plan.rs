//! Plan command implementation

use super::{Command, CommandContext};
use crate::build_service::{ApiMergeRefChecker, ApiPatchSource, MergeRefChecker, PatchSource};
use crate::checkout::{CheckoutMethod, CheckoutPlan, Fallback, FetchOptions};
use anyhow::{Result, bail};
use async_trait::async_trait;
use colored::*;
use serde::Serialize;
use std::path::PathBuf;

/// Output format for a checkout plan in JSON mode
#[derive(Serialize)]
struct PlanOutput {
    method: CheckoutMethod,
    fetch_options: FetchOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback: Option<Fallback>,
    build_trigger_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit_info_ref: Option<String>,
}

/// Print the checkout that would run, without touching the repository
pub struct PlanCommand {
    /// Output in JSON format
    pub json: bool,
    /// Never contact the build service
    pub offline: bool,
}

/// Capabilities standing in for the build service when it must not be reached
struct Offline;

impl PatchSource for Offline {
    fn get_pr_patch(&self) -> Result<PathBuf> {
        bail!("diff file is not downloaded in offline mode")
    }
}

impl MergeRefChecker for Offline {
    fn is_merge_ref_up_to_date(&self, _merge_ref: &str) -> Result<bool> {
        bail!("merge ref is not checked in offline mode")
    }
}

#[async_trait]
impl Command for PlanCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let config = context.config.clone();
        let offline = self.offline;

        let plan = tokio::task::spawn_blocking(move || {
            if offline {
                CheckoutPlan::new(&config, &Offline, &Offline)
            } else {
                let patch_source = ApiPatchSource::new(config.build_url(), config.build_api_token());
                let checker = ApiMergeRefChecker::new(config.build_url(), config.build_api_token());
                CheckoutPlan::new(&config, &patch_source, &checker)
            }
        })
        .await??;

        let output = PlanOutput {
            method: plan.method(),
            fetch_options: plan.fetch_options,
            fallback: plan.fallback,
            build_trigger_ref: plan.strategy.build_trigger_ref(),
            commit_info_ref: plan.strategy.commit_info_ref(),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("{} {}", "Checkout method:".bold(), output.method.to_string().cyan());
        println!(
            "{} depth={} tags={} filter_tree={}",
            "Fetch options:".bold(),
            output.fetch_options.depth,
            output.fetch_options.tags,
            output.fetch_options.filter_tree
        );
        match output.fallback {
            Some(fallback) => println!("{} {:?}", "Fallback:".bold(), fallback),
            None => println!("{} none", "Fallback:".bold()),
        }
        println!("{} {}", "Build trigger ref:".bold(), output.build_trigger_ref);

        Ok(())
    }
}
