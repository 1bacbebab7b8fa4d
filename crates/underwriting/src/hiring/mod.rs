//! Hiring service: approval verification, orchestration, and persistence of hiring records.

pub mod domain;
pub mod router;
pub mod service;
pub mod sink;
pub mod verifier;

#[cfg(test)]
mod tests;

pub use domain::{HiringId, HiringRecord};
pub use router::{hiring_router, HireRequest};
pub use service::{HireOutcome, HiringError, HiringOrchestrator};
pub use sink::{HiringRecordSink, StoreHiringSink};
pub use verifier::{ApprovalVerifier, HttpApprovalVerifier, VerificationError};
