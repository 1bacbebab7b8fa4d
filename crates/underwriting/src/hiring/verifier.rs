//! Client side of the approval check against the proposal service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{error, warn};

use crate::config::ProposalServiceConfig;
use crate::proposals::{ProposalId, ProposalStatus};

/// Answers whether a proposal is currently approved.
///
/// A missing proposal is a negative answer, not an error. Every other abnormal outcome is
/// returned as a [`VerificationError`].
#[async_trait]
pub trait ApprovalVerifier: Send + Sync {
    async fn is_approved(&self, proposal_id: &ProposalId) -> Result<bool, VerificationError>;
}

/// Why a verification call could not produce an answer.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("proposal service base url is not configured")]
    NotConfigured,
    #[error("proposal service did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u128 },
    #[error("proposal service request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("proposal service answered with status {status}")]
    UnexpectedStatus { status: u16 },
    #[error("proposal service returned an unreadable body: {0}")]
    InvalidBody(String),
}

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for `GET {base_url}/{proposal_id}` on the proposal service.
#[derive(Clone)]
pub struct HttpApprovalVerifier {
    base_url: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpApprovalVerifier {
    /// Fails when the HTTP client cannot be built, instead of running without a timeout.
    pub fn new(config: &ProposalServiceConfig) -> Result<Self, reqwest::Error> {
        let timeout = if config.timeout.is_zero() {
            DEFAULT_REQUEST_TIMEOUT
        } else {
            config.timeout
        };
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            timeout,
            client,
        })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn proposal_url(&self, proposal_id: &ProposalId) -> Result<String, VerificationError> {
        let base_url = self
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(VerificationError::NotConfigured)?;
        Ok(format!("{}/{}", base_url.trim_end_matches('/'), proposal_id))
    }

    fn request_error(&self, err: reqwest::Error) -> VerificationError {
        if err.is_timeout() {
            VerificationError::Timeout {
                timeout_ms: self.timeout.as_millis(),
            }
        } else {
            VerificationError::Transport(err)
        }
    }
}

#[async_trait]
impl ApprovalVerifier for HttpApprovalVerifier {
    async fn is_approved(&self, proposal_id: &ProposalId) -> Result<bool, VerificationError> {
        let url = match self.proposal_url(proposal_id) {
            Ok(url) => url,
            Err(err) => {
                error!(%proposal_id, "proposal service base url is not configured");
                return Err(err);
            }
        };

        let response = self.client.get(&url).send().await.map_err(|err| {
            let err = self.request_error(err);
            error!(%proposal_id, error = %err, "proposal verification request failed");
            err
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!(%proposal_id, "proposal not found during verification");
            return Ok(false);
        }
        if !status.is_success() {
            error!(%proposal_id, status = status.as_u16(), "proposal service rejected verification");
            return Err(VerificationError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| self.request_error(err))?;
        let payload: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|err| VerificationError::InvalidBody(err.to_string()))?;
        let Some(fields) = payload.as_object() else {
            return Err(VerificationError::InvalidBody(
                "expected a proposal object".to_string(),
            ));
        };

        let status = fields.get("status").and_then(ProposalStatus::from_json);
        Ok(status == Some(ProposalStatus::Approved))
    }
}
