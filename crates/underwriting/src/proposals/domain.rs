use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::store::Record;

/// Identifier wrapper for insurance proposals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub Uuid);

impl ProposalId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProposalId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

/// Review status of a proposal. Any status may replace any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ProposalStatus {
    #[default]
    UnderReview,
    Approved,
    Rejected,
}

impl ProposalStatus {
    /// Integer codes used by older clients of the proposal API.
    pub const fn code(self) -> u8 {
        match self {
            ProposalStatus::UnderReview => 0,
            ProposalStatus::Approved => 1,
            ProposalStatus::Rejected => 2,
        }
    }

    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ProposalStatus::UnderReview),
            1 => Some(ProposalStatus::Approved),
            2 => Some(ProposalStatus::Rejected),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "UnderReview" => Some(ProposalStatus::UnderReview),
            "Approved" => Some(ProposalStatus::Approved),
            "Rejected" => Some(ProposalStatus::Rejected),
            _ => None,
        }
    }

    /// Decodes either wire form, returning `None` for anything outside the closed set.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(name) => Self::from_name(name),
            serde_json::Value::Number(number) => number.as_i64().and_then(Self::from_code),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ProposalStatus::UnderReview => "under_review",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
        }
    }
}

impl<'de> Deserialize<'de> for ProposalStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        ProposalStatus::from_json(&value).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown proposal status {value}; expected UnderReview, Approved, Rejected or 0-2"
            ))
        })
    }
}

/// Insurance application with a mutable review status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub created_at: DateTime<Utc>,
    pub insured_party: String,
    pub product: String,
    pub amount: Decimal,
    pub status: ProposalStatus,
}

impl Proposal {
    /// Replaces the status, leaving every other field as it was.
    pub fn with_status(mut self, status: ProposalStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_approved(&self) -> bool {
        self.status == ProposalStatus::Approved
    }
}

impl Record for Proposal {
    type Key = ProposalId;

    fn key(&self) -> ProposalId {
        self.id
    }
}

/// Client supplied fields for a new proposal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDraft {
    #[serde(default)]
    pub id: Option<ProposalId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub insured_party: String,
    #[serde(default)]
    pub product: String,
    pub amount: Decimal,
    #[serde(default)]
    pub status: ProposalStatus,
}

impl ProposalDraft {
    /// Keeps a caller supplied id unless it is absent or nil.
    pub fn into_proposal(self) -> Proposal {
        let id = self
            .id
            .filter(|id| !id.is_nil())
            .unwrap_or_else(ProposalId::generate);

        Proposal {
            id,
            created_at: self.created_at,
            insured_party: self.insured_party,
            product: self.product,
            amount: self.amount,
            status: self.status,
        }
    }
}
