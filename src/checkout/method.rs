//! Checkout method enumeration

use serde::Serialize;
use std::fmt;

/// The checkout scenario selected for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CheckoutMethod {
    /// Nothing to check out, the repository is only initialized
    None,
    Commit,
    Tag,
    Branch,
    /// Merge the provider computed merge branch onto the base branch
    PrMergeBranch,
    /// Apply the build service diff onto the base branch
    PrDiffFile,
    /// Merge the head commit onto the base branch locally
    PrManualMerge,
    /// Like [`CheckoutMethod::PrManualMerge`], fetching the head branch from the fork
    ForkPrManualMerge,
    /// Check out the provider head ref without merging
    HeadBranchCommit,
    /// Check out a fork's commit without merging
    ForkCommit,
}

impl CheckoutMethod {
    pub const ALL: [CheckoutMethod; 10] = [
        CheckoutMethod::None,
        CheckoutMethod::Commit,
        CheckoutMethod::Tag,
        CheckoutMethod::Branch,
        CheckoutMethod::PrMergeBranch,
        CheckoutMethod::PrDiffFile,
        CheckoutMethod::PrManualMerge,
        CheckoutMethod::ForkPrManualMerge,
        CheckoutMethod::HeadBranchCommit,
        CheckoutMethod::ForkCommit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CheckoutMethod::None => "none",
            CheckoutMethod::Commit => "commit",
            CheckoutMethod::Tag => "tag",
            CheckoutMethod::Branch => "branch",
            CheckoutMethod::PrMergeBranch => "pr-merge-branch",
            CheckoutMethod::PrDiffFile => "pr-diff-file",
            CheckoutMethod::PrManualMerge => "pr-manual-merge",
            CheckoutMethod::ForkPrManualMerge => "fork-pr-manual-merge",
            CheckoutMethod::HeadBranchCommit => "head-branch-commit",
            CheckoutMethod::ForkCommit => "fork-commit",
        }
    }

    /// Methods that check out a single ref without merging anything
    pub fn is_simple(&self) -> bool {
        matches!(
            self,
            CheckoutMethod::Commit
                | CheckoutMethod::Tag
                | CheckoutMethod::Branch
                | CheckoutMethod::HeadBranchCommit
                | CheckoutMethod::ForkCommit
        )
    }
}

impl fmt::Display for CheckoutMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
