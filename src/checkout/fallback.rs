//! Shallow-history fallbacks
//!
//! A checkout or merge against a shallow history can fail because the needed
//! commits were never fetched. A fallback deepens the history so the failed
//! operation can be attempted once more.

use crate::git::{CommandRunner, Git, Logger};
use anyhow::{Context, Result};
use serde::Serialize;

/// Recovery run before retrying a failed checkout or merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Fallback {
    /// `fetch --unshallow`
    SimpleUnshallow,
    /// Reset and clean the working tree and submodules, then `fetch --unshallow`
    ResetUnshallow,
}

impl Fallback {
    pub fn run(&self, git: &Git, runner: &dyn CommandRunner) -> Result<()> {
        let logger = Logger;
        match self {
            Fallback::SimpleUnshallow => {
                logger.info("Fetch with unshallow...");
                unshallow_fetch(git, runner)
            }
            Fallback::ResetUnshallow => {
                logger.info("Resetting repository, then fetch with unshallow...");
                reset_repository(git, runner).context("reset repository")?;
                unshallow_fetch(git, runner)
            }
        }
    }
}

fn unshallow_fetch(git: &Git, runner: &dyn CommandRunner) -> Result<()> {
    runner
        .run_with_retry(&|| git.fetch(&["--unshallow".to_string()]))
        .context("fetch (unshallow) failed")
}

/// Discard local changes and untracked files, submodules included
pub fn reset_repository(git: &Git, runner: &dyn CommandRunner) -> Result<()> {
    runner.run(&git.reset("--hard", "HEAD"))?;
    runner.run(&git.clean(&["-x", "-d", "-f"]))?;
    runner.run(&git.submodule_foreach(&git.reset("--hard", "HEAD")))?;
    runner.run(&git.submodule_foreach(&git.clean(&["-x", "-d", "-f"])))?;
    Ok(())
}

/// Progress of an operation guarded by a fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryState {
    Initial,
    Recovering,
    Retried,
}

/// Run `operation`; on failure run `fallback` once and retry exactly once
///
/// Without a fallback the first failure is final. A failing fallback or a
/// failing retry is final as well.
pub fn run_with_fallback(
    git: &Git,
    runner: &dyn CommandRunner,
    fallback: Option<Fallback>,
    description: &str,
    mut operation: impl FnMut() -> Result<()>,
) -> Result<()> {
    let mut state = RetryState::Initial;
    loop {
        match state {
            RetryState::Initial => match operation() {
                Ok(()) => return Ok(()),
                Err(e) => match fallback {
                    Some(_) => {
                        Logger.warn(&format!("{description} failed: {e:#}"));
                        state = RetryState::Recovering;
                    }
                    None => return Err(e.context(format!("{description} failed"))),
                },
            },
            RetryState::Recovering => {
                if let Some(fallback) = fallback {
                    fallback.run(git, runner)?;
                }
                state = RetryState::Retried;
            }
            RetryState::Retried => {
                return operation().with_context(|| format!("{description} failed after unshallow"));
            }
        }
    }
}
