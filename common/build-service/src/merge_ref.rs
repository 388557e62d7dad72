//! Pull request merge ref status operations

use crate::client::{API_TOKEN_HEADER, BuildServiceClient};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Status reported for a provider computed merge ref
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeRefStatus {
    UpToDate,
    Pending,
    NotMergeable,
    AuthError,
    Unknown(String),
}

impl MergeRefStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "up-to-date" => MergeRefStatus::UpToDate,
            "pending" => MergeRefStatus::Pending,
            "not-mergeable" => MergeRefStatus::NotMergeable,
            "auth_error" => MergeRefStatus::AuthError,
            other => MergeRefStatus::Unknown(other.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MergeRefResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_msg: String,
    #[serde(default)]
    pub should_retry: bool,
}

impl MergeRefResponse {
    pub fn status(&self) -> MergeRefStatus {
        MergeRefStatus::parse(&self.status)
    }
}

impl BuildServiceClient {
    /// Fetch the current merge ref status of the pull request that
    /// triggered the build
    pub fn merge_ref_status(&self) -> Result<MergeRefResponse> {
        let url = self.endpoint("pull_request_merge_ref_status");

        let response = self
            .client
            .get(&url)
            .header(API_TOKEN_HEADER, &self.api_token)
            .send()
            .with_context(|| format!("Failed to request merge ref status from {url}"))?;

        let status = response.status();
        let body = response.text()?;

        serde_json::from_str(&body).with_context(|| {
            format!("Failed to decode merge ref status response (HTTP {status}): {body}")
        })
    }
}
