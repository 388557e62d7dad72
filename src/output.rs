//! Commit info export
//!
//! Reads details of the checked out commit and reports them as `KEY: value`
//! lines, optionally also as a JSON object written to a file.

use crate::checkout::{CheckoutMethod, CheckoutStateResult};
use crate::constants::output::{MAX_VALUE_LENGTH, TRIM_ENDING};
use crate::git::{CommandRunner, Git, GitCommand, Logger};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

pub const COMMIT_AUTHOR_NAME: &str = "GIT_CLONE_COMMIT_AUTHOR_NAME";
pub const COMMIT_AUTHOR_EMAIL: &str = "GIT_CLONE_COMMIT_AUTHOR_EMAIL";
pub const COMMIT_HASH: &str = "GIT_CLONE_COMMIT_HASH";
pub const COMMIT_MESSAGE_SUBJECT: &str = "GIT_CLONE_COMMIT_MESSAGE_SUBJECT";
pub const COMMIT_MESSAGE_BODY: &str = "GIT_CLONE_COMMIT_MESSAGE_BODY";
pub const COMMIT_COMMITTER_NAME: &str = "GIT_CLONE_COMMIT_COMMITTER_NAME";
pub const COMMIT_COMMITTER_EMAIL: &str = "GIT_CLONE_COMMIT_COMMITTER_EMAIL";
pub const COMMIT_COUNT: &str = "GIT_CLONE_COMMIT_COUNT";

/// One exported value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitOutput {
    pub key: &'static str,
    pub value: String,
}

/// Exported details of the checked out commit, in export order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommitInfo {
    pub outputs: Vec<CommitOutput>,
}

impl CommitInfo {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.value.as_str())
    }

    /// `KEY: value` lines
    pub fn print(&self, logger: &Logger) {
        for output in &self.outputs {
            logger.info(&format!("{}: {}", output.key, output.value));
        }
    }

    /// Write the values as a flat JSON object
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let object: serde_json::Map<String, serde_json::Value> = self
            .outputs
            .iter()
            .map(|o| (o.key.to_string(), serde_json::Value::String(o.value.clone())))
            .collect();
        let content = serde_json::to_string_pretty(&object)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write commit info to {}", path.display()))
    }
}

/// The commands whose output is exported for `git_ref`
fn commit_info_commands(git: &Git, git_ref: &str, is_pr: bool) -> Vec<(&'static str, GitCommand)> {
    let mut commands = vec![
        (COMMIT_AUTHOR_NAME, git.log("%an", Some(git_ref))),
        (COMMIT_AUTHOR_EMAIL, git.log("%ae", Some(git_ref))),
        (COMMIT_HASH, git.log("%H", Some(git_ref))),
        (COMMIT_MESSAGE_SUBJECT, git.log("%s", Some(git_ref))),
        (COMMIT_MESSAGE_BODY, git.log("%b", Some(git_ref))),
    ];

    if !is_pr {
        commands.push((COMMIT_COMMITTER_NAME, git.log("%cn", Some(git_ref))));
        commands.push((COMMIT_COMMITTER_EMAIL, git.log("%ce", Some(git_ref))));
        commands.push((COMMIT_COUNT, git.rev_list("HEAD", &["--count"])));
    }

    commands
}

/// Read commit details of the build trigger ref of a finished checkout
///
/// Returns `None` when nothing was checked out.
pub fn export_commit_info(
    runner: &dyn CommandRunner,
    result: &CheckoutStateResult,
) -> Result<Option<CommitInfo>> {
    if result.method == CheckoutMethod::None {
        return Ok(None);
    }
    let git_ref = result.build_trigger_ref.as_str();

    let logger = Logger;
    if result.is_pr {
        logger.info(&format!(
            "Not exported for Pull Requests: {COMMIT_COMMITTER_NAME}, {COMMIT_COMMITTER_EMAIL}, {COMMIT_COUNT}"
        ));
    }

    let git = Git::new(&result.dir);
    let mut info = CommitInfo::default();
    for (key, command) in commit_info_commands(&git, git_ref, result.is_pr) {
        let value = runner
            .run_for_output(&command)
            .with_context(|| format!("Failed to read {key}"))?;

        let value = if key == COMMIT_MESSAGE_SUBJECT || key == COMMIT_MESSAGE_BODY {
            trim_value(value, MAX_VALUE_LENGTH)
        } else {
            value
        };
        info.outputs.push(CommitOutput { key, value });
    }

    Ok(Some(info))
}

/// Cut `value` to `max` bytes, ending with `...` when trimmed
pub fn trim_value(value: String, max: usize) -> String {
    if value.len() <= max {
        return value;
    }

    let mut end = max.saturating_sub(TRIM_ENDING.len());
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{TRIM_ENDING}", &value[..end])
}
