use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::proposals::domain::{Proposal, ProposalDraft, ProposalId, ProposalStatus};
use crate::proposals::ProposalDirectory;
use crate::store::{MemoryStore, RecordStore, StoreError};

pub(super) fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 30, 15, 49, 43)
        .single()
        .expect("valid timestamp")
}

pub(super) fn draft(insured_party: &str) -> ProposalDraft {
    ProposalDraft {
        id: None,
        created_at: created_at(),
        insured_party: insured_party.to_string(),
        product: "Seguro Auto".to_string(),
        amount: Decimal::new(2_450_90, 2),
        status: ProposalStatus::UnderReview,
    }
}

pub(super) fn draft_with_id(id: ProposalId, status: ProposalStatus) -> ProposalDraft {
    ProposalDraft {
        id: Some(id),
        status,
        ..draft("Joao Lima")
    }
}

pub(super) fn build_directory() -> (
    ProposalDirectory<MemoryStore<Proposal>>,
    Arc<MemoryStore<Proposal>>,
) {
    let store = Arc::new(MemoryStore::default());
    (ProposalDirectory::new(store.clone()), store)
}

pub(super) async fn seeded_directory(
    count: usize,
) -> (ProposalDirectory<MemoryStore<Proposal>>, Vec<Proposal>) {
    let (directory, _) = build_directory();
    let mut created = Vec::with_capacity(count);
    for n in 0..count {
        let proposal = directory
            .create(draft(&format!("Segurado {n}")))
            .await
            .expect("create succeeds");
        created.push(proposal);
    }
    (directory, created)
}

pub(super) struct UnavailableStore;

#[async_trait]
impl RecordStore<Proposal> for UnavailableStore {
    async fn insert(&self, _record: Proposal) -> Result<Proposal, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn update(&self, _record: Proposal) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn fetch(&self, _key: &ProposalId) -> Result<Option<Proposal>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn scan(&self, _offset: usize, _limit: usize) -> Result<Vec<Proposal>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
