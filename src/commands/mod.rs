//! Command implementations for the CLI

pub mod base;
pub mod checkout;
pub mod plan;

pub use base::{Command, CommandContext};
pub use checkout::CheckoutCommand;
pub use plan::PlanCommand;
