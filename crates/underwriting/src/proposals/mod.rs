//! Proposal service: status model, directory, and HTTP routes.

pub mod directory;
pub mod domain;
pub mod router;

#[cfg(test)]
mod tests;

pub use directory::{DirectoryError, PageRequest, ProposalDirectory, ProposalPage};
pub use domain::{Proposal, ProposalDraft, ProposalId, ProposalStatus};
pub use router::proposal_router;
