use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::domain::{Proposal, ProposalDraft, ProposalId, ProposalStatus};
use crate::store::{RecordStore, StoreError};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Validated page coordinates, both starting at one.
///
/// Any positive value is accepted; pages beyond the collection come back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Result<Self, DirectoryError> {
        if page < 1 {
            return Err(DirectoryError::InvalidPage { page });
        }
        if page_size < 1 {
            return Err(DirectoryError::InvalidPageSize { page_size });
        }
        Ok(Self {
            page: page.unsigned_abs(),
            page_size: page_size.unsigned_abs(),
        })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Scan limit; saturates where `usize` is narrower than the requested size.
    pub fn limit(&self) -> usize {
        usize::try_from(self.page_size).unwrap_or(usize::MAX)
    }

    /// Rows to skip; saturates instead of overflowing for very distant pages.
    pub fn offset(&self) -> usize {
        let offset = (self.page - 1).saturating_mul(self.page_size);
        usize::try_from(offset).unwrap_or(usize::MAX)
    }

    pub fn total_pages(&self, total_count: usize) -> usize {
        total_count.div_ceil(self.limit())
    }
}

/// One page of the proposal collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalPage {
    pub items: Vec<Proposal>,
    pub page: u64,
    pub total_pages: usize,
    pub total_count: usize,
}

/// Proposal CRUD and pagination over a record store.
pub struct ProposalDirectory<S> {
    store: Arc<S>,
}

impl<S> ProposalDirectory<S>
where
    S: RecordStore<Proposal> + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Persist a new proposal. A taken id surfaces as [`StoreError::Conflict`].
    pub async fn create(&self, draft: ProposalDraft) -> Result<Proposal, DirectoryError> {
        let proposal = draft.into_proposal();
        let stored = self.store.insert(proposal).await?;
        info!(proposal_id = %stored.id, status = stored.status.label(), "proposal created");
        Ok(stored)
    }

    pub async fn get_by_id(&self, id: &ProposalId) -> Result<Option<Proposal>, DirectoryError> {
        Ok(self.store.fetch(id).await?)
    }

    pub async fn list_paged(&self, request: PageRequest) -> Result<ProposalPage, DirectoryError> {
        let total_count = self.store.count().await?;
        let items = self.store.scan(request.offset(), request.limit()).await?;

        Ok(ProposalPage {
            items,
            page: request.page(),
            total_pages: request.total_pages(total_count),
            total_count,
        })
    }

    /// Returns `false` when no proposal carries `id`.
    pub async fn update_status(
        &self,
        id: &ProposalId,
        status: ProposalStatus,
    ) -> Result<bool, DirectoryError> {
        let Some(proposal) = self.store.fetch(id).await? else {
            return Ok(false);
        };

        let previous = proposal.status;
        self.store.update(proposal.with_status(status)).await?;
        info!(
            proposal_id = %id,
            from = previous.label(),
            to = status.label(),
            "proposal status updated"
        );
        Ok(true)
    }
}

/// Error raised by the proposal directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("page must be at least 1 (got {page})")]
    InvalidPage { page: i64 },
    #[error("pageSize must be at least 1 (got {page_size})")]
    InvalidPageSize { page_size: i64 },
    #[error(transparent)]
    Store(#[from] StoreError),
}
