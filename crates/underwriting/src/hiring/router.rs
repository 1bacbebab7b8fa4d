use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use super::service::{HireOutcome, HiringError, HiringOrchestrator};
use super::sink::HiringRecordSink;
use super::verifier::{ApprovalVerifier, VerificationError};
use crate::error::json_error;
use crate::proposals::ProposalId;

/// Body accepted by the hire endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HireRequest {
    pub proposal_id: ProposalId,
    #[serde(default)]
    pub requested_at: Option<DateTime<Utc>>,
}

/// Router builder exposing the hire endpoint.
pub fn hiring_router<V, K>(orchestrator: Arc<HiringOrchestrator<V, K>>) -> Router
where
    V: ApprovalVerifier + 'static,
    K: HiringRecordSink + 'static,
{
    Router::new()
        .route("/hire", post(hire_handler::<V, K>))
        .with_state(orchestrator)
}

pub(crate) async fn hire_handler<V, K>(
    State(orchestrator): State<Arc<HiringOrchestrator<V, K>>>,
    payload: Result<Json<HireRequest>, JsonRejection>,
) -> Response
where
    V: ApprovalVerifier + 'static,
    K: HiringRecordSink + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    if let Some(requested_at) = request.requested_at {
        debug!(proposal_id = %request.proposal_id, %requested_at, "hire requested");
    }

    match orchestrator.contract(request.proposal_id).await {
        Ok(HireOutcome::Hired(record)) => (
            StatusCode::OK,
            Json(json!({
                "hiringId": record.id,
                "proposalId": record.proposal_id,
                "hiredAt": record.hired_at,
            })),
        )
            .into_response(),
        Ok(HireOutcome::NotApproved) => json_error(
            StatusCode::BAD_REQUEST,
            format!(
                "unable to hire proposal {}: it is not approved",
                request.proposal_id
            ),
        ),
        Ok(HireOutcome::NotSaved) => json_error(
            StatusCode::BAD_REQUEST,
            format!(
                "unable to hire proposal {}: the hiring record was not saved",
                request.proposal_id
            ),
        ),
        Err(err) => hiring_error_response(err),
    }
}

fn hiring_error_response(err: HiringError) -> Response {
    let status = match &err {
        HiringError::Verification(VerificationError::NotConfigured) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        HiringError::Verification(VerificationError::Timeout { .. }) => {
            StatusCode::GATEWAY_TIMEOUT
        }
        HiringError::Verification(_) => StatusCode::BAD_GATEWAY,
        HiringError::Sink(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!(error = %err, status = status.as_u16(), "hire failed");
    json_error(status, err.to_string())
}
