use std::sync::Arc;

use tracing::{debug, info, warn};

use super::ledger::{self, AllocationError, PhaseReadiness};
use super::repository::{RepositoryError, WorkforceRepository};
use crate::workflows::matching::{
    CandidateDemandMatches, CandidateId, CandidateStatus, DemandSummary, LaborRequirement,
    MatchRecord, MatchingEngine, PassClock, Project, ProjectId, RequirementId, RequirementMatches,
    Tender, TenderCoverage,
};

/// Compare-and-swap attempts before giving up on a contended requirement.
const MAX_SWAP_ATTEMPTS: usize = 5;

/// Service composing the workforce repository, the ledger and the matching engine.
pub struct AllocationService<R> {
    repository: Arc<R>,
    engine: Arc<MatchingEngine>,
}

impl<R> AllocationService<R>
where
    R: WorkforceRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: Arc<MatchingEngine>) -> Self {
        Self { repository, engine }
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    /// Commit a candidate to a labour requirement and mark them on the job.
    pub fn assign(
        &self,
        project_id: &ProjectId,
        requirement_id: &RequirementId,
        candidate_id: &CandidateId,
    ) -> Result<LaborRequirement, AllocationServiceError> {
        if self.repository.fetch_candidate(candidate_id)?.is_none() {
            return Err(AllocationServiceError::CandidateNotFound(
                candidate_id.clone(),
            ));
        }

        let (project, updated) = self.apply(project_id, requirement_id, |requirement| {
            ledger::assign(requirement, candidate_id)
        })?;

        if let Err(error) = self.place_candidate(candidate_id, &project) {
            warn!(
                project = %project_id,
                requirement = %requirement_id,
                candidate = %candidate_id,
                %error,
                "candidate record not updated; releasing assignment"
            );
            let released = self.apply(project_id, requirement_id, |requirement| {
                Ok(ledger::unassign(requirement, candidate_id))
            });
            if let Err(release_error) = released {
                warn!(
                    project = %project_id,
                    requirement = %requirement_id,
                    candidate = %candidate_id,
                    error = %release_error,
                    "failed to release assignment"
                );
            }
            return Err(error);
        }

        info!(
            project = %project_id,
            requirement = %requirement_id,
            candidate = %candidate_id,
            "candidate assigned"
        );
        Ok(updated)
    }

    /// Release a candidate. Unknown or unassigned ids leave the requirement unchanged.
    pub fn unassign(
        &self,
        project_id: &ProjectId,
        requirement_id: &RequirementId,
        candidate_id: &CandidateId,
    ) -> Result<LaborRequirement, AllocationServiceError> {
        let (_, updated) = self.apply(project_id, requirement_id, |requirement| {
            Ok(ledger::unassign(requirement, candidate_id))
        })?;

        if let Some(mut candidate) = self.repository.fetch_candidate(candidate_id)? {
            if candidate.status == CandidateStatus::OnJob {
                candidate.status = CandidateStatus::Available;
                self.repository.update_candidate(candidate)?;
            }
        }

        info!(
            project = %project_id,
            requirement = %requirement_id,
            candidate = %candidate_id,
            "candidate unassigned"
        );
        Ok(updated)
    }

    pub fn requirement(
        &self,
        project_id: &ProjectId,
        requirement_id: &RequirementId,
    ) -> Result<LaborRequirement, AllocationServiceError> {
        let project = self.project(project_id)?;
        find_requirement(&project, requirement_id).cloned()
    }

    pub fn phase_readiness(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<PhaseReadiness>, AllocationServiceError> {
        let project = self.project(project_id)?;
        Ok(ledger::project_readiness(&project))
    }

    pub fn portfolio(&self, clock: &PassClock) -> Result<Vec<MatchRecord>, AllocationServiceError> {
        let snapshot = self.repository.snapshot()?;
        Ok(self
            .engine
            .build_portfolio_matches(&snapshot.projects, &snapshot.candidates, clock))
    }

    pub fn requirement_matches(
        &self,
        project_id: &ProjectId,
        requirement_id: &RequirementId,
        clock: &PassClock,
    ) -> Result<RequirementMatches, AllocationServiceError> {
        let snapshot = self.repository.snapshot()?;
        let project = snapshot
            .projects
            .iter()
            .find(|project| &project.id == project_id)
            .ok_or_else(|| AllocationServiceError::ProjectNotFound(project_id.clone()))?;
        let requirement = find_requirement(project, requirement_id)?;

        Ok(self
            .engine
            .requirement_matches(project, requirement, &snapshot.candidates, clock))
    }

    pub fn candidate_matches(
        &self,
        candidate_id: &CandidateId,
        clock: &PassClock,
    ) -> Result<CandidateDemandMatches, AllocationServiceError> {
        let snapshot = self.repository.snapshot()?;
        let candidate = snapshot
            .candidates
            .iter()
            .find(|candidate| &candidate.id == candidate_id)
            .ok_or_else(|| AllocationServiceError::CandidateNotFound(candidate_id.clone()))?;

        Ok(self
            .engine
            .candidate_demand_matches(candidate, &snapshot.projects, clock))
    }

    pub fn demand_summary(&self, clock: &PassClock) -> Result<DemandSummary, AllocationServiceError> {
        let snapshot = self.repository.snapshot()?;
        Ok(self.engine.demand_summary(&snapshot.projects, clock))
    }

    pub fn tender_coverage(
        &self,
        tender: &Tender,
        clock: &PassClock,
    ) -> Result<TenderCoverage, AllocationServiceError> {
        let snapshot = self.repository.snapshot()?;
        Ok(self
            .engine
            .tender_coverage(tender, &snapshot.candidates, clock))
    }

    fn project(&self, project_id: &ProjectId) -> Result<Project, AllocationServiceError> {
        self.repository
            .fetch_project(project_id)?
            .ok_or_else(|| AllocationServiceError::ProjectNotFound(project_id.clone()))
    }

    /// Mark the candidate on the job in the project's region, touching no other field.
    ///
    /// Reads the record fresh so concurrent edits to the candidate are not overwritten.
    fn place_candidate(
        &self,
        candidate_id: &CandidateId,
        project: &Project,
    ) -> Result<(), AllocationServiceError> {
        let mut candidate = self
            .repository
            .fetch_candidate(candidate_id)?
            .ok_or_else(|| AllocationServiceError::CandidateNotFound(candidate_id.clone()))?;

        candidate.status = CandidateStatus::OnJob;
        if !project.region.trim().is_empty() {
            candidate.state = project.region.clone();
        }
        self.repository.update_candidate(candidate)?;
        Ok(())
    }

    /// Read, apply the ledger operation, then compare-and-swap, retrying on conflict.
    fn apply<F>(
        &self,
        project_id: &ProjectId,
        requirement_id: &RequirementId,
        operation: F,
    ) -> Result<(Project, LaborRequirement), AllocationServiceError>
    where
        F: Fn(&LaborRequirement) -> Result<LaborRequirement, AllocationError>,
    {
        for attempt in 1..=MAX_SWAP_ATTEMPTS {
            let project = self.project(project_id)?;
            let current = find_requirement(&project, requirement_id)?;
            let updated = operation(current)?;

            if &updated == current {
                return Ok((project, updated));
            }

            match self
                .repository
                .swap_requirement(project_id, current, updated.clone())
            {
                Ok(()) => return Ok((project, updated)),
                Err(RepositoryError::Conflict) => {
                    debug!(
                        project = %project_id,
                        requirement = %requirement_id,
                        attempt,
                        "requirement changed underneath allocation; retrying"
                    );
                }
                Err(other) => return Err(other.into()),
            }
        }

        warn!(
            project = %project_id,
            requirement = %requirement_id,
            "gave up allocating after repeated conflicts"
        );
        Err(AllocationServiceError::Contended(requirement_id.clone()))
    }
}

fn find_requirement<'a>(
    project: &'a Project,
    requirement_id: &RequirementId,
) -> Result<&'a LaborRequirement, AllocationServiceError> {
    project
        .requirement(requirement_id)
        .ok_or_else(|| AllocationServiceError::RequirementNotFound(requirement_id.clone()))
}

/// Error raised by the allocation service.
#[derive(Debug, thiserror::Error)]
pub enum AllocationServiceError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),
    #[error("requirement {0} not found")]
    RequirementNotFound(RequirementId),
    #[error("candidate {0} not found")]
    CandidateNotFound(CandidateId),
    #[error("requirement {0} is being updated concurrently; try again")]
    Contended(RequirementId),
}
