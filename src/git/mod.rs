//! Git operations using system git commands for maximum compatibility
//!
//! ## Sub-modules
//!
//! - [`command`]: Argument vectors for every git invocation the checkout needs
//!   - `Git` - builder bound to the destination directory
//!   - `GitCommand` - a single invocation, printable for logs and tests
//!
//! - [`runner`]: The command runner capability
//!   - `CommandRunner` - `run`, `run_for_output`, `run_with_retry`
//!   - `DefaultRunner` - spawns the system `git` binary
//!
//! - [`common`]: Shared utilities and helpers
//!   - `Logger` - Consistent logging for git operations

pub mod command;
pub mod common;
pub mod runner;

pub use command::{Git, GitCommand};
pub use common::Logger;
pub use runner::{CommandRunner, DefaultRunner};
