//! Merge ref freshness poller
//!
//! Providers compute PR merge refs asynchronously. Before an unverified merge
//! ref is used, the build service is polled until it reports the ref as up to
//! date, reports a terminal state, or the attempts run out.

use crate::constants::retry::{MERGE_REF_ATTEMPTS, MERGE_REF_WAIT};
use crate::git::Logger;
use crate::utils::retry::{AttemptError, Retry};
use anyhow::{Result, anyhow};
use ::build_service::{BuildServiceClient, MergeRefResponse, MergeRefStatus};

/// Confirms that a provider merge ref reflects the latest state of the PR
pub trait MergeRefChecker {
    fn is_merge_ref_up_to_date(&self, merge_ref: &str) -> Result<bool>;
}

/// Merge ref checker polling the build service
pub struct ApiMergeRefChecker {
    build_url: String,
    api_token: String,
    logger: Logger,
}

impl ApiMergeRefChecker {
    pub fn new(build_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            build_url: build_url.into(),
            api_token: api_token.into(),
            logger: Logger,
        }
    }
}

impl MergeRefChecker for ApiMergeRefChecker {
    fn is_merge_ref_up_to_date(&self, merge_ref: &str) -> Result<bool> {
        let client = BuildServiceClient::new(self.build_url.as_str(), self.api_token.as_str())?;

        self.logger
            .info(&format!("Checking if merge ref {merge_ref} is up to date"));
        poll_merge_ref(
            |_| client.merge_ref_status(),
            Retry::times(MERGE_REF_ATTEMPTS).wait(MERGE_REF_WAIT),
            &self.logger,
        )
    }
}

/// Poll `fetch` until the merge ref is reported up to date
///
/// Transport errors, `pending` and unknown statuses are retried. A
/// `not-mergeable` or `auth_error` status, or an error message the service
/// marks as final, aborts the remaining attempts.
pub fn poll_merge_ref(
    mut fetch: impl FnMut(u32) -> Result<MergeRefResponse>,
    retry: Retry,
    logger: &Logger,
) -> Result<bool> {
    retry.run_with_abort(|attempt| {
        let attempt = attempt + 1;
        let response = match fetch(attempt) {
            Ok(response) => response,
            Err(e) => {
                logger.warn(&format!("Error while checking merge ref: {e:#}"));
                logger.warn("Retrying request...");
                return Err(AttemptError::Retry(e));
            }
        };

        if !response.error_msg.is_empty() {
            let err = anyhow!("merge ref status check failed: {}", response.error_msg);
            logger.warn(&format!("Attempt {attempt}: {}", response.error_msg));
            return Err(if response.should_retry {
                AttemptError::Retry(err)
            } else {
                AttemptError::Abort(err)
            });
        }

        match response.status() {
            MergeRefStatus::UpToDate => {
                logger.success(&format!("Attempt {attempt}: merge ref is up-to-date"));
                Ok(true)
            }
            MergeRefStatus::Pending => {
                logger.warn(&format!("Attempt {attempt}: not up-to-date yet"));
                Err(AttemptError::Retry(anyhow!("merge ref is still pending")))
            }
            MergeRefStatus::NotMergeable => Err(AttemptError::Abort(anyhow!(
                "the pull request is not mergeable, its merge ref can not be used"
            ))),
            MergeRefStatus::AuthError => Err(AttemptError::Abort(anyhow!(
                "authentication error: the build service can't connect to the git server to check the freshness of the merge ref"
            ))),
            MergeRefStatus::Unknown(status) => {
                logger.warn(&format!("Attempt {attempt}: unknown status: {status}"));
                Err(AttemptError::Retry(anyhow!("unknown status: {status}")))
            }
        }
    })
}
