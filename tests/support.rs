//! Common test support utilities and fixtures
//!
//! A recording [`CommandRunner`] double plus stub build-service capabilities,
//! shared by the checkout integration tests.

#![allow(dead_code)]

use anyhow::{Result, anyhow, bail};
use git_checkout::build_service::{MergeRefChecker, PatchSource};
use git_checkout::config::ConfigBuilder;
use git_checkout::constants::retry::GIT_ATTEMPTS;
use git_checkout::git::{CommandRunner, GitCommand};
use git_checkout::utils::Retry;
use std::cell::{Cell, RefCell};
use std::path::PathBuf;

pub const REPO_URL: &str = "https://github.com/owner/repo.git";
pub const FORK_URL: &str = "https://github.com/contributor/repo.git";
pub const PRIVATE_FORK_URL: &str = "git@github.com:contributor/repo.git";

struct Failure {
    prefix: String,
    /// `None` fails every time
    remaining: Option<u32>,
    message: String,
}

/// Runner recording every command as its space separated arguments
///
/// Commands starting with a registered prefix fail, and `run_for_output`
/// answers with the output registered for the first matching prefix.
#[derive(Default)]
pub struct MockRunner {
    commands: RefCell<Vec<String>>,
    failures: RefCell<Vec<Failure>>,
    outputs: Vec<(String, String)>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command starting with `prefix` fails with `message`
    pub fn fail_on(self, prefix: &str, message: &str) -> Self {
        self.failures.borrow_mut().push(Failure {
            prefix: prefix.to_string(),
            remaining: None,
            message: message.to_string(),
        });
        self
    }

    /// The first `times` commands starting with `prefix` fail with `message`
    pub fn fail_times(self, prefix: &str, times: u32, message: &str) -> Self {
        self.failures.borrow_mut().push(Failure {
            prefix: prefix.to_string(),
            remaining: Some(times),
            message: message.to_string(),
        });
        self
    }

    pub fn with_output(mut self, prefix: &str, output: &str) -> Self {
        self.outputs.push((prefix.to_string(), output.to_string()));
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    pub fn count(&self, command: &str) -> usize {
        self.commands.borrow().iter().filter(|c| *c == command).count()
    }

    fn record(&self, cmd: &GitCommand) -> Result<String> {
        let line = cmd.args().join(" ");
        self.commands.borrow_mut().push(line.clone());

        for failure in self.failures.borrow_mut().iter_mut() {
            if !line.starts_with(&failure.prefix) {
                continue;
            }
            match failure.remaining.as_mut() {
                None => bail!("{}", failure.message),
                Some(0) => continue,
                Some(n) => {
                    *n -= 1;
                    bail!("{}", failure.message);
                }
            }
        }

        Ok(line)
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, cmd: &GitCommand) -> Result<()> {
        self.record(cmd).map(|_| ())
    }

    fn run_for_output(&self, cmd: &GitCommand) -> Result<String> {
        let line = self.record(cmd)?;
        Ok(self
            .outputs
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }

    fn retry_policy(&self) -> Retry {
        Retry::times(GIT_ATTEMPTS)
    }
}

/// Patch source answering with a fixed path, or failing when there is none
#[derive(Default)]
pub struct StubPatchSource {
    patch: Option<PathBuf>,
    calls: Cell<u32>,
}

impl StubPatchSource {
    pub fn available(path: &str) -> Self {
        Self {
            patch: Some(PathBuf::from(path)),
            calls: Cell::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl PatchSource for StubPatchSource {
    fn get_pr_patch(&self) -> Result<PathBuf> {
        self.calls.set(self.calls.get() + 1);
        self.patch
            .clone()
            .ok_or_else(|| anyhow!("diff file is not available"))
    }
}

/// Merge ref checker with a fixed answer
pub enum StubMergeRefChecker {
    UpToDate,
    Stale,
    Failing,
}

impl MergeRefChecker for StubMergeRefChecker {
    fn is_merge_ref_up_to_date(&self, _merge_ref: &str) -> Result<bool> {
        match self {
            StubMergeRefChecker::UpToDate => Ok(true),
            StubMergeRefChecker::Stale => Ok(false),
            StubMergeRefChecker::Failing => bail!("build service unreachable"),
        }
    }
}

/// Pull request from a branch of the same repository
pub fn pr_config() -> ConfigBuilder {
    ConfigBuilder::new(REPO_URL, "./src")
        .with_pr_id(7)
        .with_pr_source_repository_url(REPO_URL)
        .with_pr_dest_branch("master")
        .with_branch("feature")
        .with_commit("76a934ae")
}

/// Pull request from a public fork
pub fn fork_pr_config() -> ConfigBuilder {
    pr_config().with_pr_source_repository_url(FORK_URL)
}

/// Pull request from a fork reachable only over SSH
pub fn private_fork_pr_config() -> ConfigBuilder {
    pr_config().with_pr_source_repository_url(PRIVATE_FORK_URL)
}
