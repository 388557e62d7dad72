//! Checkout strategies
//!
//! One variant per [`CheckoutMethod`], holding only the parameters that
//! method needs. Variants are built through [`CheckoutStrategy::new`], which
//! rejects blank parameters before any git command runs.

use super::fallback::Fallback;
use super::fetch::{FetchOptions, FetchRef, fetch, fetch_initial_branch};
use super::method::CheckoutMethod;
use super::primitives::{checkout_with_fallback, detach_head, merge_with_fallback};
use crate::config::Config;
use crate::constants::git::{FORK_REMOTE, HEAD_REF, ORIGIN_REMOTE, REFS_HEADS_PREFIX, REFS_PREFIX};
use crate::errors::{CHECKOUT_FAILED_TAG, ParameterValidationError, StepError};
use crate::git::{CommandRunner, Git, Logger};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static PULL_MERGE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^pull/(.+)/merge$").expect("valid pull merge ref pattern"));

/// Checkout procedure with its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStrategy {
    None,
    Commit {
        commit: String,
        /// Branch fetched before checking out the commit, instead of the default refspec
        branch: Option<String>,
    },
    Tag {
        tag: String,
        branch: Option<String>,
    },
    Branch {
        branch: String,
    },
    PrMergeBranch {
        base_branch: String,
        merge_branch: String,
    },
    PrDiffFile {
        base_branch: String,
        patch: PathBuf,
    },
    PrManualMerge {
        base_branch: String,
        head_branch: String,
        commit: String,
    },
    ForkPrManualMerge {
        base_branch: String,
        head_branch: String,
        fork_url: String,
    },
    HeadBranchCommit {
        head_branch: String,
        commit: Option<String>,
    },
    ForkCommit {
        fork_url: String,
        branch: String,
        commit: String,
    },
}

fn required<'a>(
    method: CheckoutMethod,
    value: Option<&'a str>,
    what: &str,
) -> Result<&'a str, ParameterValidationError> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
        ParameterValidationError::new(format!(
            "{method} checkout strategy can not be used: no {what} specified"
        ))
    })
}

/// Fetch refspec for a provider merge branch: `pull/N/merge` maps to the PR head
fn merge_branch_refspec(merge_branch: &str) -> String {
    if PULL_MERGE_REF.is_match(merge_branch) {
        return PULL_MERGE_REF
            .replace(merge_branch, "refs/pull/$1/head:pull/$1")
            .into_owned();
    }
    format!("{REFS_HEADS_PREFIX}{merge_branch}:{merge_branch}")
}

/// Local tracking name of a fetched merge branch
fn merge_branch_tracking_name(merge_branch: &str) -> &str {
    merge_branch
        .strip_suffix("/merge")
        .unwrap_or(merge_branch)
}

impl CheckoutStrategy {
    /// Build the strategy for `method` from the configuration
    ///
    /// `patch` is the diff file obtained while selecting [`CheckoutMethod::PrDiffFile`].
    pub fn new(
        method: CheckoutMethod,
        cfg: &Config,
        patch: Option<&Path>,
    ) -> Result<Self, ParameterValidationError> {
        let strategy = match method {
            CheckoutMethod::None => CheckoutStrategy::None,
            CheckoutMethod::Commit => CheckoutStrategy::Commit {
                commit: required(method, cfg.commit(), "commit hash")?.to_string(),
                branch: if cfg.is_pr() {
                    cfg.branch().map(str::to_string)
                } else {
                    None
                },
            },
            CheckoutMethod::Tag => CheckoutStrategy::Tag {
                tag: required(method, cfg.tag(), "tag")?.to_string(),
                branch: cfg.branch().map(str::to_string),
            },
            CheckoutMethod::Branch => CheckoutStrategy::Branch {
                branch: required(method, cfg.branch(), "branch")?.to_string(),
            },
            CheckoutMethod::PrMergeBranch => CheckoutStrategy::PrMergeBranch {
                base_branch: required(method, cfg.pr_dest_branch(), "base branch")?.to_string(),
                merge_branch: required(
                    method,
                    cfg.pr_merge_branch().or(cfg.pr_unverified_merge_branch()),
                    "merge branch",
                )?
                .to_string(),
            },
            CheckoutMethod::PrDiffFile => CheckoutStrategy::PrDiffFile {
                base_branch: required(method, cfg.pr_dest_branch(), "base branch")?.to_string(),
                patch: patch
                    .map(Path::to_path_buf)
                    .ok_or_else(|| {
                        ParameterValidationError::new(format!(
                            "{method} checkout strategy can not be used: no patch file specified"
                        ))
                    })?,
            },
            CheckoutMethod::PrManualMerge => CheckoutStrategy::PrManualMerge {
                base_branch: required(method, cfg.pr_dest_branch(), "base branch")?.to_string(),
                head_branch: required(method, cfg.branch(), "head branch")?.to_string(),
                commit: required(method, cfg.commit(), "head branch commit hash")?.to_string(),
            },
            CheckoutMethod::ForkPrManualMerge => CheckoutStrategy::ForkPrManualMerge {
                base_branch: required(method, cfg.pr_dest_branch(), "base branch")?.to_string(),
                head_branch: required(method, cfg.branch(), "head branch")?.to_string(),
                fork_url: required(method, cfg.pr_source_repository_url(), "head repository URL")?
                    .to_string(),
            },
            CheckoutMethod::HeadBranchCommit => CheckoutStrategy::HeadBranchCommit {
                head_branch: required(method, cfg.pr_head_branch(), "head branch")?.to_string(),
                commit: cfg.commit().map(str::to_string),
            },
            CheckoutMethod::ForkCommit => CheckoutStrategy::ForkCommit {
                fork_url: required(method, cfg.pr_source_repository_url(), "head repository URL")?
                    .to_string(),
                branch: required(method, cfg.branch(), "head branch")?.to_string(),
                commit: required(method, cfg.commit(), "commit hash")?.to_string(),
            },
        };
        Ok(strategy)
    }

    pub fn method(&self) -> CheckoutMethod {
        match self {
            CheckoutStrategy::None => CheckoutMethod::None,
            CheckoutStrategy::Commit { .. } => CheckoutMethod::Commit,
            CheckoutStrategy::Tag { .. } => CheckoutMethod::Tag,
            CheckoutStrategy::Branch { .. } => CheckoutMethod::Branch,
            CheckoutStrategy::PrMergeBranch { .. } => CheckoutMethod::PrMergeBranch,
            CheckoutStrategy::PrDiffFile { .. } => CheckoutMethod::PrDiffFile,
            CheckoutStrategy::PrManualMerge { .. } => CheckoutMethod::PrManualMerge,
            CheckoutStrategy::ForkPrManualMerge { .. } => CheckoutMethod::ForkPrManualMerge,
            CheckoutStrategy::HeadBranchCommit { .. } => CheckoutMethod::HeadBranchCommit,
            CheckoutStrategy::ForkCommit { .. } => CheckoutMethod::ForkCommit,
        }
    }

    /// Ref pointing at the commit the build was triggered for
    pub fn build_trigger_ref(&self) -> String {
        match self {
            CheckoutStrategy::PrMergeBranch { merge_branch, .. } => {
                merge_branch_tracking_name(merge_branch).to_string()
            }
            CheckoutStrategy::PrManualMerge { commit, .. } => commit.clone(),
            CheckoutStrategy::ForkPrManualMerge { head_branch, .. } => {
                format!("{FORK_REMOTE}/{head_branch}")
            }
            CheckoutStrategy::None
            | CheckoutStrategy::Commit { .. }
            | CheckoutStrategy::Tag { .. }
            | CheckoutStrategy::Branch { .. }
            | CheckoutStrategy::PrDiffFile { .. }
            | CheckoutStrategy::HeadBranchCommit { .. }
            | CheckoutStrategy::ForkCommit { .. } => HEAD_REF.to_string(),
        }
    }

    /// Revision the build is about, `None` when there is no single such revision
    pub fn commit_info_ref(&self) -> Option<String> {
        match self {
            CheckoutStrategy::None | CheckoutStrategy::PrDiffFile { .. } => None,
            CheckoutStrategy::Commit { commit, .. } | CheckoutStrategy::ForkCommit { commit, .. } => {
                Some(commit.clone())
            }
            CheckoutStrategy::Tag { tag, .. } => Some(tag.clone()),
            CheckoutStrategy::Branch { branch } => Some(branch.clone()),
            CheckoutStrategy::HeadBranchCommit {
                head_branch,
                commit,
            } => Some(commit.clone().unwrap_or_else(|| head_branch.clone())),
            CheckoutStrategy::PrMergeBranch { .. }
            | CheckoutStrategy::PrManualMerge { .. }
            | CheckoutStrategy::ForkPrManualMerge { .. } => Some(self.build_trigger_ref()),
        }
    }

    /// Execute the strategy against a prepared repository
    pub fn run(
        &self,
        git: &Git,
        runner: &dyn CommandRunner,
        options: &FetchOptions,
        fallback: Option<Fallback>,
    ) -> Result<(), StepError> {
        match self {
            CheckoutStrategy::None => Ok(()),
            CheckoutStrategy::Commit { commit, branch } => {
                let fetch_ref = branch.as_deref().map(FetchRef::origin_branch);
                fetch(git, runner, options, fetch_ref.as_ref())?;
                checkout(git, runner, commit, fallback)
            }
            CheckoutStrategy::Tag { tag, branch } => {
                let fetch_ref = branch.as_deref().map(FetchRef::origin_branch);
                fetch(git, runner, options, fetch_ref.as_ref())?;
                checkout(git, runner, tag, fallback)
            }
            CheckoutStrategy::Branch { branch } => {
                fetch_initial_branch(git, runner, options, &FetchRef::origin_branch(branch))
            }
            CheckoutStrategy::PrMergeBranch {
                base_branch,
                merge_branch,
            } => {
                let base_ref = FetchRef::origin_branch(base_branch);
                fetch(git, runner, options, Some(&base_ref))?;

                // Merge refs are small synthetic refs, always fetched with full depth
                let merge_ref = FetchRef::new(ORIGIN_REMOTE, merge_branch_refspec(merge_branch));
                fetch(git, runner, &options.with_full_depth(), Some(&merge_ref))?;

                update_branch(git, runner, base_branch)?;
                merge(git, runner, merge_branch_tracking_name(merge_branch), fallback)?;
                detach_head(git, runner)
            }
            CheckoutStrategy::PrDiffFile { base_branch, patch } => {
                fetch_initial_branch(git, runner, options, &FetchRef::origin_branch(base_branch))?;
                runner.run(&git.apply(patch)).map_err(|e| {
                    StepError::new(
                        "apply_patch_failed",
                        e.context(format!("can't apply patch ({})", patch.display())),
                        "Applying patch has failed",
                    )
                })?;
                detach_head(git, runner)
            }
            CheckoutStrategy::PrManualMerge {
                base_branch,
                head_branch,
                commit,
            } => {
                fetch_initial_branch(git, runner, options, &FetchRef::origin_branch(base_branch))?;
                log_base_commit(git, runner);

                fetch(git, runner, options, Some(&FetchRef::origin_branch(head_branch)))?;
                merge(git, runner, commit, fallback)?;
                detach_head(git, runner)
            }
            CheckoutStrategy::ForkPrManualMerge {
                base_branch,
                head_branch,
                fork_url,
            } => {
                fetch_initial_branch(git, runner, options, &FetchRef::origin_branch(base_branch))?;
                log_base_commit(git, runner);

                add_fork_remote(git, runner, fork_url)?;
                let fork_ref = FetchRef::new(FORK_REMOTE, format!("{REFS_HEADS_PREFIX}{head_branch}"));
                fetch(git, runner, options, Some(&fork_ref))?;
                merge(git, runner, &format!("{FORK_REMOTE}/{head_branch}"), fallback)?;
                detach_head(git, runner)
            }
            CheckoutStrategy::HeadBranchCommit {
                head_branch,
                commit,
            } => {
                let head_ref = FetchRef::new(
                    ORIGIN_REMOTE,
                    format!("{REFS_PREFIX}{head_branch}:{head_branch}"),
                );
                fetch(git, runner, options, Some(&head_ref))?;
                checkout(git, runner, commit.as_deref().unwrap_or(head_branch), fallback)
            }
            CheckoutStrategy::ForkCommit {
                fork_url,
                branch,
                commit,
            } => {
                add_fork_remote(git, runner, fork_url)?;
                let fork_ref = FetchRef::new(FORK_REMOTE, format!("{REFS_HEADS_PREFIX}{branch}"));
                fetch(git, runner, options, Some(&fork_ref))?;
                checkout(git, runner, commit, fallback)
            }
        }
    }
}

fn checkout(
    git: &Git,
    runner: &dyn CommandRunner,
    arg: &str,
    fallback: Option<Fallback>,
) -> Result<(), StepError> {
    checkout_with_fallback(git, runner, arg, fallback)
        .map_err(|e| StepError::new(CHECKOUT_FAILED_TAG, e, "Checkout has failed"))
}

fn merge(
    git: &Git,
    runner: &dyn CommandRunner,
    arg: &str,
    fallback: Option<Fallback>,
) -> Result<(), StepError> {
    merge_with_fallback(git, runner, arg, fallback)
        .map_err(|e| StepError::new("merge_failed", e, "Merge has failed"))
}

/// Check out an already fetched branch and merge its remote counterpart
fn update_branch(git: &Git, runner: &dyn CommandRunner, branch: &str) -> Result<(), StepError> {
    runner.run(&git.checkout(branch)).map_err(|e| {
        StepError::new(
            CHECKOUT_FAILED_TAG,
            e.context(format!("checkout failed ({branch})")),
            "Checkout has failed",
        )
    })?;
    runner
        .run(&git.merge(&format!("{ORIGIN_REMOTE}/{branch}")))
        .map_err(|e| {
            StepError::new(
                "update_branch_failed",
                e.context(format!("updating branch ({branch}) failed")),
                "Updating branch failed",
            )
        })
}

fn add_fork_remote(git: &Git, runner: &dyn CommandRunner, fork_url: &str) -> Result<(), StepError> {
    runner
        .run(&git.remote_add(FORK_REMOTE, fork_url))
        .map_err(|e| {
            StepError::new(
                "add_remote_failed",
                e.context(format!("adding remote fork repository failed ({fork_url})")),
                "Adding remote fork repository failed",
            )
        })
}

fn log_base_commit(git: &Git, runner: &dyn CommandRunner) {
    let logger = Logger;
    match runner.run_for_output(&git.log("%H", None)) {
        Ok(hash) => logger.info(&format!("Base commit hash: {hash}")),
        Err(e) => logger.error(&format!("Logging base commit hash failed: {e:#}")),
    }
}
