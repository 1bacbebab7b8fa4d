use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::proposals::ProposalId;
use crate::store::Record;

/// Identifier wrapper for hiring records, always generated server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HiringId(pub Uuid);

impl HiringId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for HiringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Contract record created when an approved proposal is hired.
///
/// `proposal_id` points into the proposal service's data; nothing here enforces that the
/// proposal still exists or is still approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiringRecord {
    pub id: HiringId,
    pub proposal_id: ProposalId,
    pub hired_at: DateTime<Utc>,
}

impl HiringRecord {
    pub fn new(proposal_id: ProposalId, hired_at: DateTime<Utc>) -> Self {
        Self {
            id: HiringId::generate(),
            proposal_id,
            hired_at,
        }
    }
}

impl Record for HiringRecord {
    type Key = HiringId;

    fn key(&self) -> HiringId {
        self.id
    }
}
