//! Fetch primitive and remote branch listing

use crate::constants::git::{ORIGIN_REMOTE, REFS_HEADS_PREFIX};
use crate::errors::{CHECKOUT_FAILED_TAG, FETCH_FAILED_TAG, StepError};
use crate::git::{CommandRunner, Git, Logger};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// How much history and which refs a fetch retrieves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchOptions {
    /// Number of commits to fetch, 0 fetches the full history
    pub depth: u32,
    /// Fetch all tags
    pub tags: bool,
    /// Treeless partial fetch (`--filter=tree:0`), used with sparse checkouts
    pub filter_tree: bool,
}

impl FetchOptions {
    pub fn is_full_depth(&self) -> bool {
        self.depth == 0
    }

    /// The same options without a depth limit
    pub fn with_full_depth(self) -> Self {
        Self { depth: 0, ..self }
    }

    fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.depth > 0 {
            args.push(format!("--depth={}", self.depth));
        }
        if self.filter_tree {
            args.push("--filter=tree:0".to_string());
        }
        if self.tags {
            args.push("--tags".to_string());
        }
        args
    }
}

/// A ref to fetch from a remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRef {
    pub remote: String,
    pub reference: String,
}

impl FetchRef {
    pub fn new(remote: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            reference: reference.into(),
        }
    }

    /// `refs/heads/<branch>` on origin
    pub fn origin_branch(branch: &str) -> Self {
        Self::new(ORIGIN_REMOTE, format!("{REFS_HEADS_PREFIX}{branch}"))
    }

    /// Branch name when the ref names a branch head, `None` for tags and refspecs of other kinds
    pub fn branch(&self) -> Option<&str> {
        self.reference
            .strip_prefix(REFS_HEADS_PREFIX)
            .filter(|branch| !branch.is_empty())
    }
}

/// Fetch `fetch_ref` (or the default refspec) with retry
///
/// When a branch fetch fails, the remote branches are listed so the error can
/// recommend an existing branch. The listing only runs on that error path.
pub fn fetch(
    git: &Git,
    runner: &dyn CommandRunner,
    options: &FetchOptions,
    fetch_ref: Option<&FetchRef>,
) -> Result<(), StepError> {
    let mut args = options.args();
    if let Some(fetch_ref) = fetch_ref {
        args.push(fetch_ref.remote.clone());
        args.push(fetch_ref.reference.clone());
    }

    if let Err(e) = runner.run_with_retry(&|| git.fetch(&args)) {
        let branch = fetch_ref.and_then(FetchRef::branch).unwrap_or_default();
        let remote = fetch_ref.map_or(ORIGIN_REMOTE, |r| r.remote.as_str());
        return Err(handle_checkout_error(
            || list_branches(git, runner, remote),
            FETCH_FAILED_TAG,
            e,
            "Fetching repository has failed",
            branch,
            remote,
        ));
    }

    Ok(())
}

/// Build a step error, consulting `list_branches` only when `branch` is known
pub fn handle_checkout_error(
    list_branches: impl FnOnce() -> Result<BTreeMap<String, Vec<String>>>,
    tag: &str,
    err: anyhow::Error,
    short_msg: &str,
    branch: &str,
    remote: &str,
) -> StepError {
    if branch.is_empty() {
        return StepError::new(tag, err, short_msg);
    }

    let available = match list_branches() {
        Ok(mut branches_by_remote) => branches_by_remote.remove(remote),
        Err(e) => {
            Logger.warn(&format!("Listing remote branches failed: {e:#}"));
            None
        }
    };
    StepError::with_branch_recommendations(tag, err, short_msg, branch, available)
}

/// Fetch `remote` and list the remote branches, keyed by remote name
pub fn list_branches(
    git: &Git,
    runner: &dyn CommandRunner,
    remote: &str,
) -> Result<BTreeMap<String, Vec<String>>> {
    runner
        .run(&git.fetch(&[remote.to_string()]))
        .with_context(|| format!("fetch of {remote} failed"))?;
    let output = runner
        .run_for_output(&git.branch(&["-r"]))
        .context("listing remote branches failed")?;
    Ok(parse_branch_list(&output))
}

/// Parse `git branch -r` output; symbolic refs like `origin/HEAD -> origin/main` are skipped
pub fn parse_branch_list(output: &str) -> BTreeMap<String, Vec<String>> {
    let mut branches_by_remote: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for line in output.lines() {
        let line = line.trim();
        if line.contains(" -> ") {
            continue;
        }
        if let Some((remote, branch)) = line.split_once('/') {
            if !branch.is_empty() {
                branches_by_remote
                    .entry(remote.to_string())
                    .or_default()
                    .push(branch.to_string());
            }
        }
    }
    branches_by_remote
}

/// Fetch a branch, check it out and bring it up to date with the remote
///
/// `git fetch` followed by `git merge <remote>/<branch>` is the same as a
/// pull, without relying on the user's pull configuration.
pub fn fetch_initial_branch(
    git: &Git,
    runner: &dyn CommandRunner,
    options: &FetchOptions,
    fetch_ref: &FetchRef,
) -> Result<(), StepError> {
    let branch = fetch_ref.branch().unwrap_or(fetch_ref.reference.as_str());
    fetch(git, runner, options, Some(fetch_ref))?;

    if let Err(e) = runner.run(&git.checkout(branch)) {
        return Err(handle_checkout_error(
            || list_branches(git, runner, &fetch_ref.remote),
            CHECKOUT_FAILED_TAG,
            e.context(format!("checkout failed ({branch})")),
            "Checkout has failed",
            branch,
            &fetch_ref.remote,
        ));
    }

    let remote_branch = format!("{}/{}", fetch_ref.remote, branch);
    runner.run(&git.merge(&remote_branch)).map_err(|e| {
        StepError::new(
            "update_branch_failed",
            e.context(format!("updating branch ({branch}) failed")),
            "Updating branch failed",
        )
    })
}
