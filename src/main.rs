use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use git_checkout::commands::*;
use git_checkout::config::{Config, ConfigValidator};
use git_checkout::constants;
use git_checkout::errors::StepError;
use git_checkout::git::Logger;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "git-checkout")]
#[command(about = "Check out the revision a CI build was triggered for")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare the repository and check out the build revision
    Checkout {
        #[command(flatten)]
        config: ConfigArgs,

        /// Write the exported commit info as JSON to this file
        #[arg(long)]
        output_file: Option<PathBuf>,
    },

    /// Show the checkout method, fetch options and fallback without running git
    Plan {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output in JSON format for machine consumption
        #[arg(long)]
        json: bool,

        /// Do not contact the build service for diff files or merge ref status
        #[arg(long)]
        offline: bool,
    },
}

/// Configuration file plus per-field overrides
///
/// A flag (or its environment variable) wins over the file value. The file
/// is optional when the required fields are given as flags.
#[derive(Args)]
struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long, default_value_t = constants::config::DEFAULT_CONFIG_FILE.to_string())]
    config: String,

    #[arg(long, env = "GIT_CHECKOUT_REPOSITORY_URL")]
    repository_url: Option<String>,

    #[arg(long, env = "GIT_CHECKOUT_CLONE_INTO_DIR")]
    clone_into_dir: Option<String>,

    #[arg(long, env = "GIT_CHECKOUT_COMMIT")]
    commit: Option<String>,

    #[arg(long, env = "GIT_CHECKOUT_TAG")]
    tag: Option<String>,

    #[arg(long, env = "GIT_CHECKOUT_BRANCH")]
    branch: Option<String>,

    #[arg(long, env = "GIT_CHECKOUT_PR_SOURCE_REPOSITORY_URL")]
    pr_source_repository_url: Option<String>,

    #[arg(long, env = "GIT_CHECKOUT_PR_MERGE_BRANCH")]
    pr_merge_branch: Option<String>,

    #[arg(long, env = "GIT_CHECKOUT_PR_UNVERIFIED_MERGE_BRANCH")]
    pr_unverified_merge_branch: Option<String>,

    #[arg(long, env = "GIT_CHECKOUT_PR_HEAD_BRANCH")]
    pr_head_branch: Option<String>,

    #[arg(long, env = "GIT_CHECKOUT_PR_DEST_BRANCH")]
    pr_dest_branch: Option<String>,

    #[arg(long, env = "GIT_CHECKOUT_PR_ID")]
    pr_id: Option<u64>,

    #[arg(long, env = "GIT_CHECKOUT_MANUAL_MERGE", value_name = "BOOL")]
    manual_merge: Option<bool>,

    #[arg(long, env = "GIT_CHECKOUT_MERGE_PR", value_name = "BOOL")]
    merge_pr: Option<bool>,

    /// Number of commits to fetch, 0 fetches the full history
    #[arg(long, env = "GIT_CHECKOUT_CLONE_DEPTH")]
    clone_depth: Option<u32>,

    #[arg(long, env = "GIT_CHECKOUT_FETCH_TAGS", value_name = "BOOL")]
    fetch_tags: Option<bool>,

    #[arg(long, env = "GIT_CHECKOUT_UPDATE_SUBMODULES", value_name = "BOOL")]
    update_submodules: Option<bool>,

    #[arg(long, env = "GIT_CHECKOUT_SUBMODULE_UPDATE_DEPTH")]
    submodule_update_depth: Option<u32>,

    /// Limit the checkout to these directories (can be specified multiple times)
    #[arg(long = "sparse-directory")]
    sparse_directories: Vec<String>,

    #[arg(long, env = "GIT_CHECKOUT_RESET_REPOSITORY", value_name = "BOOL")]
    reset_repository: Option<bool>,

    #[arg(long, env = "GIT_CHECKOUT_BUILD_URL")]
    build_url: Option<String>,

    #[arg(long, env = "GIT_CHECKOUT_BUILD_API_TOKEN", hide_env_values = true)]
    build_api_token: Option<String>,
}

impl ConfigArgs {
    fn resolve(self) -> Result<Config> {
        let mut config = if Path::new(&self.config).exists() {
            Config::read(&self.config)?
        } else if self.repository_url.is_some() {
            Config::new("", "")
        } else {
            anyhow::bail!("Config file {} not found", self.config);
        };

        override_with(&mut config.repository_url, self.repository_url);
        override_with(&mut config.clone_into_dir, self.clone_into_dir);
        override_optional(&mut config.commit, self.commit);
        override_optional(&mut config.tag, self.tag);
        override_optional(&mut config.branch, self.branch);
        override_optional(&mut config.pr_source_repository_url, self.pr_source_repository_url);
        override_optional(&mut config.pr_merge_branch, self.pr_merge_branch);
        override_optional(
            &mut config.pr_unverified_merge_branch,
            self.pr_unverified_merge_branch,
        );
        override_optional(&mut config.pr_head_branch, self.pr_head_branch);
        override_optional(&mut config.pr_dest_branch, self.pr_dest_branch);
        override_optional(&mut config.pr_id, self.pr_id);
        override_with(&mut config.manual_merge, self.manual_merge);
        override_with(&mut config.should_merge_pr, self.merge_pr);
        override_with(&mut config.clone_depth, self.clone_depth);
        override_with(&mut config.fetch_tags, self.fetch_tags);
        override_with(&mut config.update_submodules, self.update_submodules);
        override_with(&mut config.submodule_update_depth, self.submodule_update_depth);
        override_with(&mut config.reset_repository, self.reset_repository);
        override_optional(&mut config.build_url, self.build_url);
        override_optional(&mut config.build_api_token, self.build_api_token);

        if !self.sparse_directories.is_empty() {
            config.sparse_directories = self.sparse_directories;
        }

        ConfigValidator::validate(&config)?;
        Ok(config)
    }
}

fn override_with<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn override_optional<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute_command(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Checkout {
            config,
            output_file,
        } => {
            let context = CommandContext {
                config: config.resolve()?,
            };
            CheckoutCommand { output_file }.execute(&context).await?;
        }
        Commands::Plan {
            config,
            json,
            offline,
        } => {
            let context = CommandContext {
                config: config.resolve()?,
            };
            PlanCommand { json, offline }.execute(&context).await?;
        }
    }

    Ok(())
}

fn report_error(err: &anyhow::Error) {
    let logger = Logger;

    let Some(step_error) = err.downcast_ref::<StepError>() else {
        logger.error(&format!("{err:#}"));
        return;
    };

    logger.error(&step_error.to_string());
    if let Some(detailed) = step_error.detailed_error() {
        logger.error(&detailed.title);
        logger.error(&detailed.description);
    }
    if let Some(branches) = step_error.branches() {
        logger.warn(&format!("Available branches: {}", branches.join(", ")));
    }
}
