//! git-checkout - checks out the revision a CI build was triggered for
//!
//! Selects one checkout method from the build configuration (commit, tag,
//! branch or one of the pull request methods), runs it against the
//! destination repository through an injected [`git::CommandRunner`] and
//! reports failures as classified [`errors::StepError`]s.

pub mod build_service;
pub mod checkout;
pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod git;
pub mod output;
pub mod utils;

pub type Result<T> = anyhow::Result<T>;

// Re-export commonly used types
pub use checkout::{CheckoutMethod, CheckoutPlan, CheckoutStateResult, GitCloner};
pub use commands::{Command, CommandContext};
pub use config::{Config, ConfigBuilder};
pub use errors::StepError;
