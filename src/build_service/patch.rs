//! Pull request diff file source

use anyhow::{Context, Result};
use ::build_service::BuildServiceClient;
use std::path::PathBuf;
use uuid::Uuid;

/// Provides the unified diff of the pull request being built
pub trait PatchSource {
    /// Local path of the PR patch file, downloading it when needed
    fn get_pr_patch(&self) -> Result<PathBuf>;
}

/// Patch source backed by the build service `diff.txt` endpoint
///
/// A `file://` build URL points at a local directory already holding
/// `diff.txt`, which is returned as is.
pub struct ApiPatchSource {
    build_url: String,
    api_token: String,
}

impl ApiPatchSource {
    pub fn new(build_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            build_url: build_url.into(),
            api_token: api_token.into(),
        }
    }
}

impl PatchSource for ApiPatchSource {
    fn get_pr_patch(&self) -> Result<PathBuf> {
        let client = BuildServiceClient::new(self.build_url.as_str(), self.api_token.as_str())?;

        if let Some(dir) = client.build_url().strip_prefix("file://") {
            return Ok(PathBuf::from(dir).join("diff.txt"));
        }

        let diff = client.download_diff()?;
        let path = std::env::temp_dir().join(format!("pr-{}.diff", Uuid::new_v4()));
        std::fs::write(&path, diff)
            .with_context(|| format!("Failed to write diff file to {}", path.display()))?;

        Ok(path)
    }
}
