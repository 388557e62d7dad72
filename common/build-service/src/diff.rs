//! Pull request diff download

use crate::client::BuildServiceClient;
use anyhow::{Context, Result, bail};

impl BuildServiceClient {
    /// Download the unified diff of the pull request that triggered the build
    pub fn download_diff(&self) -> Result<Vec<u8>> {
        let url = format!(
            "{}?api_token={}",
            self.endpoint("diff.txt"),
            self.api_token
        );

        let response = self
            .client
            .get(&url)
            .send()
            .context("Failed to request the pull request diff file")?;

        if !response.status().is_success() {
            bail!(
                "Can't download diff file, HTTP status code: {}",
                response.status().as_u16()
            );
        }

        let body = response.bytes()?;
        Ok(body.to_vec())
    }
}
