//! Build service client implementation

use anyhow::{Result, bail};
use std::time::Duration;

/// Header carrying the per-build API token
pub const API_TOKEN_HEADER: &str = "BUILD_API_TOKEN";

/// Build service API client for making authenticated requests
///
/// Uses a blocking HTTP client: every caller runs on the single checkout
/// thread and waits for the answer before issuing the next git command.
pub struct BuildServiceClient {
    pub(crate) client: reqwest::blocking::Client,
    pub(crate) build_url: String,
    pub(crate) api_token: String,
}

impl BuildServiceClient {
    /// Create a new client for the given build URL and API token
    ///
    /// Both values are required; an empty one is reported up front instead
    /// of producing a request the service would reject.
    pub fn new(build_url: impl Into<String>, api_token: impl Into<String>) -> Result<Self> {
        let build_url = build_url.into();
        let api_token = api_token.into();

        if build_url.trim().is_empty() {
            bail!("Build URL is not defined");
        }
        if api_token.trim().is_empty() {
            bail!("Build API token is not defined");
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            build_url: build_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    /// The build URL without a trailing slash
    pub fn build_url(&self) -> &str {
        &self.build_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.build_url, path.trim_start_matches('/'))
    }
}
