//! Checkout, merge and detach primitives

use super::fallback::{Fallback, run_with_fallback};
use crate::errors::StepError;
use crate::git::{CommandRunner, Git};
use anyhow::Result;

/// Check out `arg`, deepening the history through `fallback` if needed
pub fn checkout_with_fallback(
    git: &Git,
    runner: &dyn CommandRunner,
    arg: &str,
    fallback: Option<Fallback>,
) -> Result<()> {
    run_with_fallback(git, runner, fallback, &format!("checkout ({arg})"), || {
        runner.run(&git.checkout(arg))
    })
}

/// Merge `arg` into the current branch, deepening the history through `fallback` if needed
pub fn merge_with_fallback(
    git: &Git,
    runner: &dyn CommandRunner,
    arg: &str,
    fallback: Option<Fallback>,
) -> Result<()> {
    run_with_fallback(git, runner, fallback, &format!("merge ({arg})"), || {
        runner.run(&git.merge(arg))
    })
    .map_err(|e| e.context("please try to resolve all conflicts between the base and compare branches"))
}

/// Leave HEAD on the checked out commit instead of a branch
pub fn detach_head(git: &Git, runner: &dyn CommandRunner) -> Result<(), StepError> {
    runner.run(&git.checkout("--detach")).map_err(|e| {
        StepError::new(
            "detach_head_failed",
            e.context("detaching head failed"),
            "Detaching head failed",
        )
    })
}
