//! Checkout method selection
//!
//! Maps one configuration snapshot to exactly one [`CheckoutMethod`], and
//! derives the fetch options and fallback for that method. Remote lookups go
//! through the injected [`PatchSource`] and [`MergeRefChecker`].

use super::fallback::Fallback;
use super::fetch::FetchOptions;
use super::method::CheckoutMethod;
use super::strategy::CheckoutStrategy;
use crate::build_service::{MergeRefChecker, PatchSource};
use crate::config::Config;
use crate::errors::StepError;
use crate::git::Logger;
use std::path::PathBuf;

const PRIVATE_FORK_AUTH_WARNING: &str = "May fail due to missing authentication as Pull Request opened from a private fork. A git hosting provider head branch or a diff file is unavailable.";

/// Select the checkout method for `cfg`, along with the diff file it uses, if any
pub fn select_checkout_method(
    cfg: &Config,
    patch_source: &dyn PatchSource,
    merge_ref_checker: &dyn MergeRefChecker,
) -> (CheckoutMethod, Option<PathBuf>) {
    let logger = Logger;

    if !cfg.is_pr() {
        let method = if cfg.commit().is_some() {
            CheckoutMethod::Commit
        } else if cfg.tag().is_some() {
            CheckoutMethod::Tag
        } else if cfg.branch().is_some() {
            CheckoutMethod::Branch
        } else {
            CheckoutMethod::None
        };
        return (method, None);
    }

    let pr_url = cfg.pr_source_repository_url().unwrap_or_default();
    let fork = is_fork(&cfg.repository_url, pr_url);
    let private_fork = fork && is_private(pr_url);

    if !cfg.should_merge_pr {
        if cfg.pr_head_branch().is_some() {
            return (CheckoutMethod::HeadBranchCommit, None);
        }
        if !fork {
            return (CheckoutMethod::Commit, None);
        }
        if !private_fork {
            return (CheckoutMethod::ForkCommit, None);
        }
        if let Some(patch) = diff_file(cfg, patch_source) {
            logger.info("Merging Pull Request despite the option to disable merging, as it is opened from a private fork.");
            return (CheckoutMethod::PrDiffFile, Some(patch));
        }
        logger.warn(PRIVATE_FORK_AUTH_WARNING);
        return (CheckoutMethod::ForkCommit, None);
    }

    // Manual merge can not authenticate against a private fork
    if !cfg.manual_merge || private_fork {
        if cfg.pr_merge_branch().is_some() {
            return (CheckoutMethod::PrMergeBranch, None);
        }

        if let Some(merge_ref) = cfg.pr_unverified_merge_branch() {
            match merge_ref_checker.is_merge_ref_up_to_date(merge_ref) {
                Ok(true) => return (CheckoutMethod::PrMergeBranch, None),
                Ok(false) => logger.warn(&format!("Merge ref {merge_ref} is not up to date")),
                Err(e) => logger.warn(&format!("Failed to check merge ref {merge_ref}: {e:#}")),
            }
        }

        if let Some(patch) = diff_file(cfg, patch_source) {
            return (CheckoutMethod::PrDiffFile, Some(patch));
        }

        if private_fork {
            logger.warn(PRIVATE_FORK_AUTH_WARNING);
        }
    }

    if fork {
        (CheckoutMethod::ForkPrManualMerge, None)
    } else {
        (CheckoutMethod::PrManualMerge, None)
    }
}

fn diff_file(cfg: &Config, patch_source: &dyn PatchSource) -> Option<PathBuf> {
    if cfg.build_url().is_empty() {
        return None;
    }

    match patch_source.get_pr_patch() {
        Ok(patch) => Some(patch),
        Err(e) => {
            Logger.warn(&format!("Diff file unavailable: {e:#}"));
            None
        }
    }
}

/// Fetch options for `method`
pub fn select_fetch_options(method: CheckoutMethod, cfg: &Config) -> FetchOptions {
    FetchOptions {
        depth: cfg.clone_depth,
        tags: cfg.fetch_tags || method == CheckoutMethod::Tag,
        filter_tree: !cfg.sparse_directories.is_empty() && method.is_simple(),
    }
}

/// Fallback used when a checkout or merge fails on a shallow history
pub fn select_fallback(method: CheckoutMethod, options: &FetchOptions) -> Option<Fallback> {
    if options.is_full_depth() {
        return None;
    }

    match method {
        // A branch tip or an applied diff never needs older history
        CheckoutMethod::None | CheckoutMethod::Branch | CheckoutMethod::PrDiffFile => None,
        CheckoutMethod::Commit
        | CheckoutMethod::Tag
        | CheckoutMethod::HeadBranchCommit
        | CheckoutMethod::ForkCommit
        | CheckoutMethod::PrManualMerge
        | CheckoutMethod::ForkPrManualMerge => Some(Fallback::SimpleUnshallow),
        CheckoutMethod::PrMergeBranch => Some(Fallback::ResetUnshallow),
    }
}

/// Whether the PR comes from a different repository than the one being built
pub fn is_fork(repo_url: &str, pr_url: &str) -> bool {
    !pr_url.trim().is_empty() && canonical_repo(repo_url) != canonical_repo(pr_url)
}

/// Whether the URL needs credentials the HTTP anonymous access can not provide
pub fn is_private(url: &str) -> bool {
    !url.starts_with("http")
}

/// `host/owner/repo` for HTTPS, SCP-like and `ssh://` URLs
///
/// Scheme, user, port and the `.git` suffix are dropped.
pub fn canonical_repo(url: &str) -> String {
    let url = url.trim();
    let (host, path) = match url.split_once("://") {
        Some((_, rest)) => {
            let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
            let host = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
            let host = host.split_once(':').map_or(host, |(h, _)| h);
            (host, path)
        }
        None => {
            let rest = url.split_once('@').map_or(url, |(_, r)| r);
            rest.split_once(':').unwrap_or(("", rest))
        }
    };

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    format!("{}/{}", host.to_lowercase(), path)
}

/// Everything decided up front for one checkout run
///
/// The strategy, fetch options and fallback all come from the same
/// configuration snapshot and are not recomputed while the checkout runs.
#[derive(Debug, Clone)]
pub struct CheckoutPlan {
    pub strategy: CheckoutStrategy,
    pub fetch_options: FetchOptions,
    pub fallback: Option<Fallback>,
}

impl CheckoutPlan {
    pub fn new(
        cfg: &Config,
        patch_source: &dyn PatchSource,
        merge_ref_checker: &dyn MergeRefChecker,
    ) -> Result<Self, StepError> {
        let (method, patch) = select_checkout_method(cfg, patch_source, merge_ref_checker);
        let strategy = CheckoutStrategy::new(method, cfg, patch.as_deref())?;
        let fetch_options = select_fetch_options(method, cfg);
        let fallback = select_fallback(method, &fetch_options);

        Ok(Self {
            strategy,
            fetch_options,
            fallback,
        })
    }

    pub fn method(&self) -> CheckoutMethod {
        self.strategy.method()
    }
}
