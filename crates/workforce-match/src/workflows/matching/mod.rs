//! Demand–supply matching over a snapshot of candidates and projects.
//!
//! A pass pins one [`PassClock`], filters the pool to eligible supply, derives demand units
//! from each project and pairs them through the role and geography matcher. Every view
//! (portfolio, single requirement, single candidate, tender, dashboard summary) is built
//! from those same steps on [`MatchingEngine`].

pub mod config;
pub mod demand;
pub mod domain;
mod engine;
pub mod lookups;
pub mod matcher;
pub mod portfolio;
pub mod snapshot;
pub mod summary;
pub mod supply;
pub mod taxonomy;
pub mod temporal;
pub mod tender;

#[cfg(test)]
mod tests;

pub use config::{MatchingConfig, PhaseQuantityPolicy};
pub use demand::{extract_demands, DemandSource, DemandUnit, RequiredCount};
pub use domain::{
    Candidate, CandidateId, CandidateStatus, ClientDemand, ClientId, DemandId, LaborRequirement,
    PhaseId, PhaseSetting, Project, ProjectId, RequirementId, Residency, WorkPackage,
};
pub use engine::MatchingEngine;
pub use lookups::{CandidateDemandMatch, CandidateDemandMatches, RequirementMatches, SupplySignal};
pub use matcher::{geographically_eligible, match_candidates, role_compatible, RoleMatcher};
pub use portfolio::MatchRecord;
pub use snapshot::{SnapshotError, WorkforceSnapshot};
pub use summary::{DemandSummary, DemandUrgency, RoleDemand};
pub use supply::{eligible_supply, is_supply};
pub use taxonomy::{normalize_role, CrewRange, ProjectSize, RoleTaxonomy, TaxonomyError};
pub use temporal::{days_between, parse_flexible_date, DayWindow, FlexibleDate, PassClock};
pub use tender::{Tender, TenderCoverage, TenderRole, TenderRoleCoverage};
