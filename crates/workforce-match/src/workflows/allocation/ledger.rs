use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use crate::workflows::matching::{CandidateId, LaborRequirement, PhaseId, Project, RequirementId};

/// Count invariant violations raised by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("requirement already full")]
    RequirementFull {
        requirement_id: RequirementId,
        required_count: u32,
    },
    #[error("candidate already assigned")]
    AlreadyAssigned {
        requirement_id: RequirementId,
        candidate_id: CandidateId,
    },
}

/// Commit `candidate_id` to the requirement. On rejection the input is left untouched.
pub fn assign(
    requirement: &LaborRequirement,
    candidate_id: &CandidateId,
) -> Result<LaborRequirement, AllocationError> {
    if requirement.assigned_ids.contains(candidate_id) {
        info!(
            requirement = %requirement.id,
            candidate = %candidate_id,
            "rejected duplicate assignment"
        );
        return Err(AllocationError::AlreadyAssigned {
            requirement_id: requirement.id.clone(),
            candidate_id: candidate_id.clone(),
        });
    }

    if assigned_count(requirement) >= requirement.required_count {
        info!(
            requirement = %requirement.id,
            candidate = %candidate_id,
            required = requirement.required_count,
            "rejected assignment to full requirement"
        );
        return Err(AllocationError::RequirementFull {
            requirement_id: requirement.id.clone(),
            required_count: requirement.required_count,
        });
    }

    let mut updated = requirement.clone();
    updated.assigned_ids.push(candidate_id.clone());
    Ok(updated)
}

/// Release `candidate_id`; a no-op when it was never assigned.
pub fn unassign(requirement: &LaborRequirement, candidate_id: &CandidateId) -> LaborRequirement {
    let mut updated = requirement.clone();
    updated.assigned_ids.retain(|assigned| assigned != candidate_id);
    updated
}

pub fn gap(requirement: &LaborRequirement) -> u32 {
    requirement
        .required_count
        .saturating_sub(assigned_count(requirement))
}

pub fn readiness_score(requirement: &LaborRequirement) -> u32 {
    percent(assigned_count(requirement), requirement.required_count)
}

fn assigned_count(requirement: &LaborRequirement) -> u32 {
    u32::try_from(requirement.assigned_ids.len()).unwrap_or(u32::MAX)
}

/// Rounded percentage; vacuously 100 when nothing is required.
fn percent(assigned: u32, required: u32) -> u32 {
    if required == 0 {
        return 100;
    }
    (f64::from(assigned) * 100.0 / f64::from(required)).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Secure,
    Warning,
    Critical,
}

impl ReadinessStatus {
    pub fn from_score(score: u32) -> Self {
        if score >= 100 {
            Self::Secure
        } else if score > 50 {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Secure => "secure",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseReadiness {
    pub phase_id: PhaseId,
    pub required: u32,
    pub assigned: u32,
    pub score: u32,
    pub status: ReadinessStatus,
}

/// Staffing readiness summed across every package belonging to `phase_id`.
pub fn phase_readiness(project: &Project, phase_id: &PhaseId) -> PhaseReadiness {
    let (required, assigned) = project
        .requirements_for_phase(phase_id)
        .fold((0u32, 0u32), |(required, assigned), requirement| {
            (
                required.saturating_add(requirement.required_count),
                assigned.saturating_add(assigned_count(requirement)),
            )
        });

    let score = percent(assigned, required);
    PhaseReadiness {
        phase_id: phase_id.clone(),
        required,
        assigned,
        score,
        status: ReadinessStatus::from_score(score),
    }
}

/// Readiness for every phase the project has packages in, in phase order.
pub fn project_readiness(project: &Project) -> Vec<PhaseReadiness> {
    let phases: BTreeSet<&PhaseId> = project
        .packages
        .values()
        .map(|package| &package.phase)
        .collect();

    phases
        .into_iter()
        .map(|phase_id| phase_readiness(project, phase_id))
        .collect()
}

/// Requirement as returned to recruiters, with the derived ledger figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementView {
    pub id: RequirementId,
    pub trade: String,
    pub required_count: u32,
    pub assigned_ids: Vec<CandidateId>,
    pub gap: u32,
    pub readiness_score: u32,
}

impl From<&LaborRequirement> for RequirementView {
    fn from(requirement: &LaborRequirement) -> Self {
        Self {
            id: requirement.id.clone(),
            trade: requirement.trade.clone(),
            required_count: requirement.required_count,
            assigned_ids: requirement.assigned_ids.clone(),
            gap: gap(requirement),
            readiness_score: readiness_score(requirement),
        }
    }
}
