//! Build service capabilities used while selecting a checkout method
//!
//! The selector never talks HTTP directly: it receives a [`PatchSource`] and a
//! [`MergeRefChecker`], so tests can answer with canned values.

pub mod merge_ref;
pub mod patch;

pub use merge_ref::{ApiMergeRefChecker, MergeRefChecker, poll_merge_ref};
pub use patch::{ApiPatchSource, PatchSource};
