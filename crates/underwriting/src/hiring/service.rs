use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::HiringRecord;
use super::sink::HiringRecordSink;
use super::verifier::{ApprovalVerifier, VerificationError};
use crate::proposals::ProposalId;
use crate::store::StoreError;

/// Terminal state of a single hire invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HireOutcome {
    Hired(HiringRecord),
    /// The sink accepted the call but reported that nothing was written.
    NotSaved,
    NotApproved,
}

impl HireOutcome {
    pub fn is_hired(&self) -> bool {
        matches!(self, HireOutcome::Hired(_))
    }
}

/// Verifies approval remotely, then records the hiring locally.
///
/// Each call is independent: there is no retry, no rollback, and no guard against two
/// concurrent hires of the same proposal both writing a record.
pub struct HiringOrchestrator<V, K> {
    verifier: Arc<V>,
    sink: Arc<K>,
}

impl<V, K> HiringOrchestrator<V, K>
where
    V: ApprovalVerifier + 'static,
    K: HiringRecordSink + 'static,
{
    pub fn new(verifier: Arc<V>, sink: Arc<K>) -> Self {
        Self { verifier, sink }
    }

    /// `Ok(false)` when the proposal is not approved or the sink wrote nothing.
    pub async fn hire(&self, proposal_id: ProposalId) -> Result<bool, HiringError> {
        self.contract(proposal_id)
            .await
            .map(|outcome| outcome.is_hired())
    }

    pub async fn contract(&self, proposal_id: ProposalId) -> Result<HireOutcome, HiringError> {
        if !self.verifier.is_approved(&proposal_id).await? {
            info!(%proposal_id, "hire declined: proposal not approved");
            return Ok(HireOutcome::NotApproved);
        }

        let record = HiringRecord::new(proposal_id, Utc::now());
        if !self.sink.save(record.clone()).await? {
            return Ok(HireOutcome::NotSaved);
        }

        info!(%proposal_id, hiring_id = %record.id, "proposal hired");
        Ok(HireOutcome::Hired(record))
    }
}

/// Error raised by the hiring orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum HiringError {
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error(transparent)]
    Sink(#[from] StoreError),
}
