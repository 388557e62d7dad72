//! Command runner capability
//!
//! Every component that issues git commands receives a `&dyn CommandRunner`
//! instead of spawning processes itself, so tests can swap in a recording
//! double.

use super::command::GitCommand;
use super::common::Logger;
use crate::constants::retry::{GIT_ATTEMPTS, GIT_WAIT};
use crate::utils::retry::Retry;
use anyhow::{Context, Result, anyhow};
use std::process::Command;
use std::time::Instant;

/// Executes git commands
pub trait CommandRunner {
    /// Run a command, streaming its output; the error carries git's stderr
    fn run(&self, cmd: &GitCommand) -> Result<()>;

    /// Run a command and return its trimmed standard output
    fn run_for_output(&self, cmd: &GitCommand) -> Result<String>;

    /// Retry policy used by [`CommandRunner::run_with_retry`]
    fn retry_policy(&self) -> Retry {
        Retry::times(GIT_ATTEMPTS).wait(GIT_WAIT)
    }

    /// Run a freshly built command until it succeeds or the retry budget is spent
    fn run_with_retry(&self, make_command: &dyn Fn() -> GitCommand) -> Result<()> {
        let logger = Logger;
        self.retry_policy().run(|attempt| {
            if attempt > 0 {
                logger.warn("Retrying...");
            }

            let result = self.run(&make_command());
            if let Err(e) = &result {
                logger.warn(&format!("Attempt {} failed: {}", attempt + 1, e));
            }
            result
        })
    }
}

/// Runner spawning the system `git` binary
#[derive(Default)]
pub struct DefaultRunner {
    logger: Logger,
}

impl DefaultRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn execute(&self, cmd: &GitCommand) -> Result<std::process::Output> {
        let start = Instant::now();
        let output = Command::new("git")
            .args(cmd.args())
            .current_dir(cmd.dir())
            .output()
            .with_context(|| format!("Failed to execute {}", cmd.printable()))?;
        self.logger.timing(start.elapsed());
        Ok(output)
    }
}

fn failure_message(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !stdout.is_empty() {
        return stdout;
    }
    format!("git exited with {}", output.status)
}

impl CommandRunner for DefaultRunner {
    fn run(&self, cmd: &GitCommand) -> Result<()> {
        self.logger.command(&cmd.printable());
        let output = self.execute(cmd)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            println!("{}", stdout.trim_end());
        }

        if !output.status.success() {
            return Err(anyhow!(failure_message(&output)));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            eprintln!("{}", stderr.trim_end());
        }

        Ok(())
    }

    fn run_for_output(&self, cmd: &GitCommand) -> Result<String> {
        self.logger.command(&format!("{} &> out", cmd.printable()));
        let output = self.execute(cmd)?;

        if !output.status.success() {
            return Err(anyhow!(failure_message(&output)));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
