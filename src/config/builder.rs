//! Configuration builder utilities

use super::Config;

/// Builder for creating checkout configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder for the repository and destination directory
    pub fn new(repository_url: impl Into<String>, clone_into_dir: impl Into<String>) -> Self {
        Self {
            config: Config::new(repository_url, clone_into_dir),
        }
    }

    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.config.commit = Some(commit.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.tag = Some(tag.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.config.branch = Some(branch.into());
        self
    }

    pub fn with_pr_source_repository_url(mut self, url: impl Into<String>) -> Self {
        self.config.pr_source_repository_url = Some(url.into());
        self
    }

    pub fn with_pr_merge_branch(mut self, branch: impl Into<String>) -> Self {
        self.config.pr_merge_branch = Some(branch.into());
        self
    }

    pub fn with_pr_unverified_merge_branch(mut self, branch: impl Into<String>) -> Self {
        self.config.pr_unverified_merge_branch = Some(branch.into());
        self
    }

    pub fn with_pr_head_branch(mut self, branch: impl Into<String>) -> Self {
        self.config.pr_head_branch = Some(branch.into());
        self
    }

    pub fn with_pr_dest_branch(mut self, branch: impl Into<String>) -> Self {
        self.config.pr_dest_branch = Some(branch.into());
        self
    }

    pub fn with_pr_id(mut self, id: u64) -> Self {
        self.config.pr_id = Some(id);
        self
    }

    pub fn with_manual_merge(mut self, manual_merge: bool) -> Self {
        self.config.manual_merge = manual_merge;
        self
    }

    pub fn with_should_merge_pr(mut self, should_merge_pr: bool) -> Self {
        self.config.should_merge_pr = should_merge_pr;
        self
    }

    pub fn with_clone_depth(mut self, depth: u32) -> Self {
        self.config.clone_depth = depth;
        self
    }

    pub fn with_fetch_tags(mut self, fetch_tags: bool) -> Self {
        self.config.fetch_tags = fetch_tags;
        self
    }

    pub fn with_update_submodules(mut self, update_submodules: bool) -> Self {
        self.config.update_submodules = update_submodules;
        self
    }

    pub fn with_submodule_update_depth(mut self, depth: u32) -> Self {
        self.config.submodule_update_depth = depth;
        self
    }

    pub fn with_sparse_directories(mut self, dirs: Vec<String>) -> Self {
        self.config.sparse_directories = dirs;
        self
    }

    pub fn with_reset_repository(mut self, reset: bool) -> Self {
        self.config.reset_repository = reset;
        self
    }

    /// Set the build service URL and API token
    pub fn with_build_service(
        mut self,
        build_url: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        self.config.build_url = Some(build_url.into());
        self.config.build_api_token = Some(api_token.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}
