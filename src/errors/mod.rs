//! Step errors and user-facing diagnostics
//!
//! A [`StepError`] is the only error type that leaves the checkout engine.
//! It carries a stable tag (e.g. `fetch_failed`), a short human message, the
//! underlying cause and, when the cause is recognised, a [`DetailedError`]
//! recommendation produced by the [`classifier`].

pub mod classifier;

use crate::constants::config::STEP_ID;
use serde::Serialize;
use std::fmt;

pub use classifier::classify;

pub const CHECKOUT_FAILED_TAG: &str = "checkout_failed";
pub const FETCH_FAILED_TAG: &str = "fetch_failed";
pub const UPDATE_SUBMODULE_FAILED_TAG: &str = "update_submodule_failed";
pub const CHECKOUT_METHOD_SELECT_TAG: &str = "checkout_method_select";

/// User-facing diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedError {
    pub title: String,
    pub description: String,
}

impl DetailedError {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Extra guidance attached to a [`StepError`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Recommendations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_error: Option<DetailedError>,
    /// Remote branches offered instead of a branch that does not exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<String>>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.detailed_error.is_none() && self.branches.is_none()
    }
}

/// Error surfaced by the checkout step
#[derive(Debug, Serialize)]
pub struct StepError {
    pub step_id: String,
    pub tag: String,
    #[serde(serialize_with = "serialize_error")]
    pub err: anyhow::Error,
    pub short_msg: String,
    pub recommendations: Recommendations,
}

fn serialize_error<S: serde::Serializer>(err: &anyhow::Error, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{err:#}"))
}

impl StepError {
    /// Build a step error, attaching the classifier's diagnostic for `tag`
    pub fn new(tag: &str, err: anyhow::Error, short_msg: &str) -> Self {
        let detailed_error = classify(tag, &format!("{err:#}"));
        Self {
            step_id: STEP_ID.to_string(),
            tag: tag.to_string(),
            err,
            short_msg: short_msg.to_string(),
            recommendations: Recommendations {
                detailed_error,
                branches: None,
            },
        }
    }

    /// Like [`StepError::new`], offering `available` branches when `branch` is not among them
    ///
    /// An empty `branch` or a failed branch listing (`None`) leaves the
    /// classifier's diagnostic as the only recommendation.
    pub fn with_branch_recommendations(
        tag: &str,
        err: anyhow::Error,
        short_msg: &str,
        branch: &str,
        available: Option<Vec<String>>,
    ) -> Self {
        let mut step_error = Self::new(tag, err, short_msg);
        if branch.is_empty() {
            return step_error;
        }

        match available {
            Some(available) if !available.iter().any(|b| b == branch) => {
                step_error.recommendations.detailed_error = Some(branch_not_found(branch));
                step_error.recommendations.branches = Some(available);
            }
            _ => {}
        }
        step_error
    }

    pub fn detailed_error(&self) -> Option<&DetailedError> {
        self.recommendations.detailed_error.as_ref()
    }

    pub fn branches(&self) -> Option<&[String]> {
        self.recommendations.branches.as_deref()
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {:#}", self.short_msg, self.err)
    }
}

impl std::error::Error for StepError {}

impl From<ParameterValidationError> for StepError {
    fn from(err: ParameterValidationError) -> Self {
        StepError::new(
            CHECKOUT_METHOD_SELECT_TAG,
            anyhow::Error::new(err),
            "Selecting checkout method failed",
        )
    }
}

pub(crate) fn branch_not_found(branch: &str) -> DetailedError {
    DetailedError::new(
        format!("We couldn't find the branch '{branch}'."),
        "Please choose another branch and try again.",
    )
}

/// A strategy was requested without the inputs it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterValidationError(pub String);

impl ParameterValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl fmt::Display for ParameterValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParameterValidationError {}
