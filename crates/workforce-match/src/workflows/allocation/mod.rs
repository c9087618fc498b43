//! Allocation ledger and the service that applies it to stored requirements.
//!
//! The ledger only enforces headcount invariants; whether a candidate is a sensible fit is
//! decided upstream by the matching engine when candidates are presented to a recruiter.

pub mod ledger;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use ledger::{
    assign, gap, phase_readiness, project_readiness, readiness_score, unassign, AllocationError,
    PhaseReadiness, ReadinessStatus, RequirementView,
};
pub use repository::{InMemoryWorkforceRepository, RepositoryError, WorkforceRepository};
pub use router::{allocation_router, AssignmentRequest, PassQuery};
pub use service::{AllocationService, AllocationServiceError};
