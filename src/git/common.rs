//! Common git utilities and shared helpers
//!
//! This module contains utilities shared by every checkout strategy, such as
//! the console logger used for git invocations and checkout progress.

use crate::constants::config::STEP_ID;
use colored::*;
use std::time::Duration;

/// Logger for checkout operations with consistent formatting
///
/// Every message is prefixed with the step identifier in cyan/bold so the
/// checkout output is easy to spot in a CI log that mixes several steps.
///
/// ## Example
///
/// ```rust,no_run
/// use git_checkout::git::Logger;
///
/// let logger = Logger::default();
/// logger.info("Fetching base branch");
/// logger.success("Checkout finished");
/// ```
#[derive(Default, Clone, Copy, Debug)]
pub struct Logger;

impl Logger {
    pub fn info(&self, msg: &str) {
        println!("{} | {}", STEP_ID.cyan().bold(), msg);
    }

    pub fn success(&self, msg: &str) {
        println!("{} | {}", STEP_ID.cyan().bold(), msg.green());
    }

    pub fn warn(&self, msg: &str) {
        println!("{} | {}", STEP_ID.cyan().bold(), msg.yellow());
    }

    pub fn error(&self, msg: &str) {
        eprintln!("{} | {}", STEP_ID.cyan().bold(), msg.red());
    }

    /// Echo a command line before it runs
    pub fn command(&self, printable: &str) {
        println!("{} | {} {}", STEP_ID.cyan().bold(), "$".dimmed(), printable.bold());
    }

    /// Report slow commands, anything under a second is not worth the noise
    pub fn timing(&self, elapsed: Duration) {
        if elapsed >= Duration::from_secs(1) {
            println!(
                "{} | {}",
                STEP_ID.cyan().bold(),
                format!("Command execution took {}s", elapsed.as_secs()).dimmed()
            );
        }
    }
}
