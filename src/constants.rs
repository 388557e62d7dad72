//! Central constants for the git-checkout application

/// Default values for Git operations
pub mod git {
    /// Remote name of the repository being built
    pub const ORIGIN_REMOTE: &str = "origin";

    /// Remote name added for pull requests opened from a fork
    pub const FORK_REMOTE: &str = "fork";

    pub const REFS_PREFIX: &str = "refs/";

    pub const REFS_HEADS_PREFIX: &str = "refs/heads/";

    /// Ref reported for strategies that leave the checked out commit at HEAD
    pub const HEAD_REF: &str = "HEAD";
}

/// Retry budgets shared by git commands and build service polling
pub mod retry {
    use std::time::Duration;

    /// Attempts for a retried git command (fetch, unshallow)
    pub const GIT_ATTEMPTS: u32 = 2;

    /// Fixed wait between two attempts of a git command
    pub const GIT_WAIT: Duration = Duration::from_secs(5);

    /// Attempts when polling the merge ref status
    pub const MERGE_REF_ATTEMPTS: u32 = 5;

    /// Fixed wait between two merge ref status polls
    pub const MERGE_REF_WAIT: Duration = Duration::from_secs(2);
}

/// Default values for commit info export
pub mod output {
    /// Maximum length of an exported commit message subject or body
    pub const MAX_VALUE_LENGTH: usize = 20 * 1024;

    /// Suffix appended to trimmed values
    pub const TRIM_ENDING: &str = "...";
}

/// Default values for configuration
pub mod config {
    /// Default configuration file name
    pub const DEFAULT_CONFIG_FILE: &str = "git-checkout.yaml";

    /// Step identifier reported in every step error
    pub const STEP_ID: &str = "git-checkout";
}
