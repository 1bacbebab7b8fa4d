use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::config::ProposalServiceConfig;
use crate::hiring::domain::HiringRecord;
use crate::hiring::sink::{HiringRecordSink, StoreHiringSink};
use crate::hiring::verifier::{ApprovalVerifier, HttpApprovalVerifier, VerificationError};
use crate::hiring::HiringOrchestrator;
use crate::proposals::ProposalId;
use crate::store::{MemoryStore, StoreError};

/// Verifier answering from a fixed set of approved ids, counting calls.
#[derive(Default)]
pub(super) struct StubVerifier {
    approved: Mutex<HashSet<ProposalId>>,
    calls: Mutex<Vec<ProposalId>>,
}

impl StubVerifier {
    pub(super) fn approving(ids: &[ProposalId]) -> Self {
        let verifier = Self::default();
        verifier
            .approved
            .lock()
            .expect("verifier mutex poisoned")
            .extend(ids.iter().copied());
        verifier
    }

    pub(super) fn calls(&self) -> Vec<ProposalId> {
        self.calls.lock().expect("verifier mutex poisoned").clone()
    }
}

#[async_trait]
impl ApprovalVerifier for StubVerifier {
    async fn is_approved(&self, proposal_id: &ProposalId) -> Result<bool, VerificationError> {
        self.calls
            .lock()
            .expect("verifier mutex poisoned")
            .push(*proposal_id);
        Ok(self
            .approved
            .lock()
            .expect("verifier mutex poisoned")
            .contains(proposal_id))
    }
}

/// Verifier that always fails the way a broken proposal service would.
pub(super) struct FailingVerifier {
    pub(super) status: u16,
}

#[async_trait]
impl ApprovalVerifier for FailingVerifier {
    async fn is_approved(&self, _proposal_id: &ProposalId) -> Result<bool, VerificationError> {
        Err(VerificationError::UnexpectedStatus {
            status: self.status,
        })
    }
}

pub(super) struct TimingOutVerifier;

#[async_trait]
impl ApprovalVerifier for TimingOutVerifier {
    async fn is_approved(&self, _proposal_id: &ProposalId) -> Result<bool, VerificationError> {
        Err(VerificationError::Timeout { timeout_ms: 50 })
    }
}

/// Sink that accepts the call but reports nothing written.
#[derive(Default)]
pub(super) struct SilentSink {
    pub(super) attempts: Mutex<usize>,
}

#[async_trait]
impl HiringRecordSink for SilentSink {
    async fn save(&self, _record: HiringRecord) -> Result<bool, StoreError> {
        *self.attempts.lock().expect("sink mutex poisoned") += 1;
        Ok(false)
    }
}

pub(super) struct UnavailableSink;

#[async_trait]
impl HiringRecordSink for UnavailableSink {
    async fn save(&self, _record: HiringRecord) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) type MemorySink = StoreHiringSink<MemoryStore<HiringRecord>>;

pub(super) fn memory_sink() -> Arc<MemorySink> {
    Arc::new(StoreHiringSink::new(Arc::new(MemoryStore::default())))
}

pub(super) fn build_orchestrator(
    approved: &[ProposalId],
) -> (
    HiringOrchestrator<StubVerifier, MemorySink>,
    Arc<StubVerifier>,
    Arc<MemorySink>,
) {
    let verifier = Arc::new(StubVerifier::approving(approved));
    let sink = memory_sink();
    (
        HiringOrchestrator::new(verifier.clone(), sink.clone()),
        verifier,
        sink,
    )
}

async fn remote_proposal(Path((mode, proposal_id)): Path<(String, String)>) -> Response {
    match mode.as_str() {
        "approved" => Json(json!({ "id": proposal_id, "status": "Approved" })).into_response(),
        "legacy-approved" => Json(json!({ "id": proposal_id, "status": 1 })).into_response(),
        "under-review" => {
            Json(json!({ "id": proposal_id, "status": "UnderReview" })).into_response()
        }
        "rejected" => Json(json!({ "id": proposal_id, "status": 2 })).into_response(),
        "unknown-status" => Json(json!({ "id": proposal_id, "status": 42 })).into_response(),
        "no-status" => Json(json!({ "id": proposal_id })).into_response(),
        "empty" => StatusCode::OK.into_response(),
        "list" => Json(json!([proposal_id])).into_response(),
        "broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "unauthorized" => StatusCode::UNAUTHORIZED.into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({ "id": proposal_id, "status": "Approved" })).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Serves a fake proposal read path; the first path segment picks the behavior.
pub(super) async fn start_proposal_server() -> (String, tokio::task::JoinHandle<()>) {
    let app = Router::new().route("/:mode/:proposal_id", get(remote_proposal));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr: SocketAddr = listener.local_addr().expect("listener addr");
    let base_url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve test server");
    });

    (base_url, handle)
}

pub(super) fn http_verifier(base_url: String, timeout: Duration) -> HttpApprovalVerifier {
    HttpApprovalVerifier::new(&ProposalServiceConfig {
        base_url: Some(base_url),
        timeout,
    })
    .expect("http client builds")
}
