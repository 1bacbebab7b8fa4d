//! Insurance proposal lifecycle and the hiring workflow that turns an approved proposal into a
//! contract record.
//!
//! The proposal and hiring halves never share storage: the hiring side learns about proposals
//! only through an [`hiring::ApprovalVerifier`], normally backed by an HTTP call to the proposal
//! service's read path.

pub mod config;
pub mod error;
pub mod hiring;
pub mod proposals;
pub mod store;
pub mod telemetry;
