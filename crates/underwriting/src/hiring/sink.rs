use std::sync::Arc;

use async_trait::async_trait;

use super::domain::HiringRecord;
use crate::proposals::ProposalId;
use crate::store::{RecordStore, StoreError};

/// Append-only persistence for hiring records.
#[async_trait]
pub trait HiringRecordSink: Send + Sync {
    /// `Ok(true)` once the record is written. Key collisions surface as
    /// [`StoreError::Conflict`], never as `Ok(false)`.
    async fn save(&self, record: HiringRecord) -> Result<bool, StoreError>;
}

/// Sink writing into the hiring service's own record store.
pub struct StoreHiringSink<S> {
    store: Arc<S>,
}

impl<S> StoreHiringSink<S>
where
    S: RecordStore<HiringRecord>,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Every record written for `proposal_id`, oldest first.
    pub async fn records_for(
        &self,
        proposal_id: &ProposalId,
    ) -> Result<Vec<HiringRecord>, StoreError> {
        let total = self.store.count().await?;
        Ok(self
            .store
            .scan(0, total)
            .await?
            .into_iter()
            .filter(|record| &record.proposal_id == proposal_id)
            .collect())
    }
}

#[async_trait]
impl<S> HiringRecordSink for StoreHiringSink<S>
where
    S: RecordStore<HiringRecord>,
{
    async fn save(&self, record: HiringRecord) -> Result<bool, StoreError> {
        self.store.insert(record).await?;
        Ok(true)
    }
}
