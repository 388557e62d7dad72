//! Checkout engine
//!
//! Prepares the destination repository, builds the [`CheckoutPlan`] from the
//! configuration, runs the selected strategy and updates submodules.

use super::fallback::reset_repository;
use super::method::CheckoutMethod;
use super::selector::CheckoutPlan;
use crate::build_service::{MergeRefChecker, PatchSource};
use crate::config::Config;
use crate::constants::git::ORIGIN_REMOTE;
use crate::errors::{StepError, UPDATE_SUBMODULE_FAILED_TAG};
use crate::git::{CommandRunner, Git, Logger};
use crate::utils::filesystem::absolute_path;
use crate::utils::ensure_directory_exists;
use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};

/// Outcome of a successful checkout, consumed by the commit-info export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutStateResult {
    pub method: CheckoutMethod,
    pub is_pr: bool,
    pub build_trigger_ref: String,
    /// Revision the build is about, `None` when there is no single such revision
    pub commit_info_ref: Option<String>,
    pub dir: PathBuf,
}

/// Drives one checkout through the injected runner and build-service capabilities
pub struct GitCloner<'a> {
    runner: &'a dyn CommandRunner,
    patch_source: &'a dyn PatchSource,
    merge_ref_checker: &'a dyn MergeRefChecker,
    logger: Logger,
}

impl<'a> GitCloner<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        patch_source: &'a dyn PatchSource,
        merge_ref_checker: &'a dyn MergeRefChecker,
    ) -> Self {
        Self {
            runner,
            patch_source,
            merge_ref_checker,
            logger: Logger,
        }
    }

    /// Bring `cfg.clone_into_dir` to the state described by `cfg`
    pub fn checkout_state(&self, cfg: &Config) -> Result<CheckoutStateResult, StepError> {
        let dir = resolve_clone_dir(&cfg.clone_into_dir)
            .map_err(|e| StepError::new("init_git_failed", e, "Initializing repository has failed"))?;
        ensure_directory_exists(&dir)
            .map_err(|e| StepError::new("init_git_failed", e, "Initializing repository has failed"))?;

        let git = Git::new(&dir);

        let origin_present = is_origin_present(&git, self.runner, &cfg.repository_url).map_err(|e| {
            StepError::new(
                "check_origin_present_failed",
                e,
                "Checking if origin is present has failed",
            )
        })?;

        if origin_present && cfg.reset_repository {
            self.logger.info("Resetting repository");
            reset_repository(&git, self.runner).map_err(|e| {
                StepError::new(
                    "reset_repository_failed",
                    e.context("reset repository"),
                    "Resetting repository has failed",
                )
            })?;
        }

        self.runner
            .run(&git.init())
            .map_err(|e| StepError::new("init_git_failed", e, "Initializing repository has failed"))?;

        if !origin_present {
            self.runner
                .run(&git.remote_add(ORIGIN_REMOTE, &cfg.repository_url))
                .map_err(|e| StepError::new("add_remote_failed", e, "Adding remote repository has failed"))?;
        }

        if !cfg.sparse_directories.is_empty() {
            self.setup_sparse_checkout(&git, &cfg.sparse_directories)?;
        }

        let plan = CheckoutPlan::new(cfg, self.patch_source, self.merge_ref_checker)?;
        self.logger.info(&format!("Checkout method: {}", plan.method()));
        if let Some(commit) = plan.strategy.commit_info_ref() {
            self.logger.info(&format!("Revision to build: {commit}"));
        }

        plan.strategy
            .run(&git, self.runner, &plan.fetch_options, plan.fallback)?;

        if cfg.update_submodules {
            self.update_submodules(&git, cfg.submodule_update_depth)?;
        }

        Ok(CheckoutStateResult {
            method: plan.method(),
            is_pr: cfg.is_pr(),
            build_trigger_ref: plan.strategy.build_trigger_ref(),
            commit_info_ref: plan.strategy.commit_info_ref(),
            dir,
        })
    }

    fn setup_sparse_checkout(&self, git: &Git, dirs: &[String]) -> Result<(), StepError> {
        self.runner.run(&git.sparse_checkout_init(true)).map_err(|e| {
            StepError::new(
                "sparse_checkout_failed",
                e,
                "Initializing sparse-checkout config has failed",
            )
        })?;
        self.runner.run(&git.sparse_checkout_set(dirs)).map_err(|e| {
            StepError::new(
                "sparse_checkout_failed",
                e,
                "Updating sparse-checkout config has failed",
            )
        })?;
        self.runner
            .run(&git.config("extensions.partialClone", ORIGIN_REMOTE, Some("--local")))
            .map_err(|e| {
                StepError::new(
                    "sparse_checkout_failed",
                    e,
                    "Enabling partial clone has failed",
                )
            })
    }

    fn update_submodules(&self, git: &Git, depth: u32) -> Result<(), StepError> {
        let mut opts = Vec::new();
        if depth > 0 {
            opts.push(format!("--depth={depth}"));
        }

        self.runner
            .run_with_retry(&|| git.submodule_update(&opts))
            .map_err(|e| {
                StepError::new(
                    UPDATE_SUBMODULE_FAILED_TAG,
                    e,
                    "Updating submodules has failed",
                )
            })
    }
}

fn resolve_clone_dir(dir: &str) -> Result<PathBuf> {
    absolute_path(dir).ok_or_else(|| anyhow!("can't resolve clone directory {dir}"))
}

/// Whether `dir` is already a clone of `repository_url`
///
/// An existing `.git` with a different origin is an error, the directory
/// belongs to another repository.
fn is_origin_present(git: &Git, runner: &dyn CommandRunner, repository_url: &str) -> Result<bool> {
    if !git_dir_exists(git.dir()) {
        return Ok(false);
    }

    let remotes = runner.run_for_output(&git.remote_list())?;
    if remotes.contains(repository_url) {
        Ok(true)
    } else {
        Err(anyhow!(
            ".git folder exists in {}, but origin remote URL is not {repository_url}",
            git.dir().display()
        ))
    }
}

fn git_dir_exists(dir: &Path) -> bool {
    dir.join(".git").is_dir()
}
