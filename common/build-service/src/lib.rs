//! Build service API client library
//!
//! This library provides the low-level HTTP interface to the build service
//! that triggered the checkout: pull request merge ref status and the
//! pull request diff file.
//!
//! ## Modules
//!
//! - [`client`]: Core build service client implementation
//! - [`merge_ref`]: Merge ref status endpoint and response types
//! - [`diff`]: Pull request diff download

mod client;
mod diff;
mod merge_ref;

// Re-export public API
pub use client::BuildServiceClient;
pub use merge_ref::{MergeRefResponse, MergeRefStatus};
