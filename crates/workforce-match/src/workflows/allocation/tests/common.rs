use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::{Duration, NaiveDate};
use serde_json::Value;

use crate::workflows::allocation::repository::{
    InMemoryWorkforceRepository, RepositoryError, WorkforceRepository,
};
use crate::workflows::allocation::{allocation_router, AllocationService};
use crate::workflows::matching::{
    Candidate, CandidateId, CandidateStatus, ClientDemand, DemandId, FlexibleDate,
    LaborRequirement, MatchingEngine, PhaseId, Project, ProjectId, RequirementId, WorkPackage,
    WorkforceSnapshot,
};

pub(super) const TODAY: &str = "2025-03-01";

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")
}

pub(super) fn requirement(required: u32, assigned: &[&str]) -> LaborRequirement {
    LaborRequirement {
        id: RequirementId::new("lr-1"),
        trade: "Formworker".to_string(),
        required_count: required,
        assigned_ids: assigned.iter().map(|id| CandidateId::new(*id)).collect(),
    }
}

pub(super) fn candidate(id: &str, role: &str, state: &str) -> Candidate {
    Candidate {
        id: CandidateId::new(id),
        first_name: "Sam".to_string(),
        last_name: format!("Worker {id}"),
        role: role.to_string(),
        status: CandidateStatus::Available,
        state: state.to_string(),
        ..Candidate::default()
    }
}

pub(super) fn snapshot() -> WorkforceSnapshot {
    let mut project = Project {
        id: ProjectId::new("p-1"),
        name: "Harbour Tower".to_string(),
        region: "Auckland".to_string(),
        ..Project::default()
    };
    project.packages.insert(
        "structure".to_string(),
        WorkPackage {
            phase: PhaseId::new("02a_concrete"),
            labor_requirements: vec![requirement(2, &[])],
        },
    );
    project.client_demands.push(ClientDemand {
        id: DemandId::new("d-1"),
        role: "Carpenter".to_string(),
        quantity: 2,
        start_date: Some(FlexibleDate::Valid(today() + Duration::days(10))),
    });

    WorkforceSnapshot::new(
        vec![
            candidate("c-1", "Formworker", "Waikato"),
            candidate("c-2", "Formworker", "Auckland"),
            candidate("c-3", "Carpenter", "Auckland"),
        ],
        vec![project],
    )
}

pub(super) fn memory_repository() -> Arc<InMemoryWorkforceRepository> {
    Arc::new(InMemoryWorkforceRepository::new(snapshot()))
}

pub(super) fn service_with<R: WorkforceRepository + 'static>(
    repository: Arc<R>,
) -> AllocationService<R> {
    AllocationService::new(repository, Arc::new(MatchingEngine::default()))
}

pub(super) fn router_with<R: WorkforceRepository + 'static>(repository: Arc<R>) -> axum::Router {
    allocation_router(Arc::new(service_with(repository)))
}

/// Reports a conflicting write for the first `conflicts` swaps, then delegates.
pub(super) struct FlakyRepository {
    inner: InMemoryWorkforceRepository,
    conflicts: AtomicUsize,
}

impl FlakyRepository {
    pub(super) fn new(conflicts: usize) -> Self {
        Self {
            inner: InMemoryWorkforceRepository::new(snapshot()),
            conflicts: AtomicUsize::new(conflicts),
        }
    }
}

impl WorkforceRepository for FlakyRepository {
    fn snapshot(&self) -> Result<WorkforceSnapshot, RepositoryError> {
        self.inner.snapshot()
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        self.inner.fetch_project(id)
    }

    fn fetch_candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        self.inner.fetch_candidate(id)
    }

    fn swap_requirement(
        &self,
        project_id: &ProjectId,
        expected: &LaborRequirement,
        updated: LaborRequirement,
    ) -> Result<(), RepositoryError> {
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts.store(remaining - 1, Ordering::SeqCst);
            return Err(RepositoryError::Conflict);
        }
        self.inner.swap_requirement(project_id, expected, updated)
    }

    fn update_candidate(&self, candidate: Candidate) -> Result<(), RepositoryError> {
        self.inner.update_candidate(candidate)
    }
}

/// Serves reads and requirement swaps, but every candidate write fails.
pub(super) struct ReadOnlyCandidatesRepository {
    inner: InMemoryWorkforceRepository,
}

impl ReadOnlyCandidatesRepository {
    pub(super) fn new() -> Self {
        Self {
            inner: InMemoryWorkforceRepository::new(snapshot()),
        }
    }
}

impl WorkforceRepository for ReadOnlyCandidatesRepository {
    fn snapshot(&self) -> Result<WorkforceSnapshot, RepositoryError> {
        self.inner.snapshot()
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        self.inner.fetch_project(id)
    }

    fn fetch_candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        self.inner.fetch_candidate(id)
    }

    fn swap_requirement(
        &self,
        project_id: &ProjectId,
        expected: &LaborRequirement,
        updated: LaborRequirement,
    ) -> Result<(), RepositoryError> {
        self.inner.swap_requirement(project_id, expected, updated)
    }

    fn update_candidate(&self, _candidate: Candidate) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("candidate store offline".to_string()))
    }
}

/// Retrades `c-1` as a steel fixer just before each requirement swap lands,
/// standing in for a recruiter editing the record mid-assignment.
pub(super) struct InterleavedEditRepository {
    inner: InMemoryWorkforceRepository,
}

impl InterleavedEditRepository {
    pub(super) fn new() -> Self {
        Self {
            inner: InMemoryWorkforceRepository::new(snapshot()),
        }
    }
}

impl WorkforceRepository for InterleavedEditRepository {
    fn snapshot(&self) -> Result<WorkforceSnapshot, RepositoryError> {
        self.inner.snapshot()
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        self.inner.fetch_project(id)
    }

    fn fetch_candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        self.inner.fetch_candidate(id)
    }

    fn swap_requirement(
        &self,
        project_id: &ProjectId,
        expected: &LaborRequirement,
        updated: LaborRequirement,
    ) -> Result<(), RepositoryError> {
        if let Some(mut candidate) = self.inner.fetch_candidate(&CandidateId::new("c-1"))? {
            candidate.role = "Steel Fixer".to_string();
            self.inner.update_candidate(candidate)?;
        }
        self.inner.swap_requirement(project_id, expected, updated)
    }

    fn update_candidate(&self, candidate: Candidate) -> Result<(), RepositoryError> {
        self.inner.update_candidate(candidate)
    }
}

pub(super) struct UnavailableRepository;

impl WorkforceRepository for UnavailableRepository {
    fn snapshot(&self) -> Result<WorkforceSnapshot, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_project(&self, _id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_candidate(&self, _id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn swap_requirement(
        &self,
        _project_id: &ProjectId,
        _expected: &LaborRequirement,
        _updated: LaborRequirement,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_candidate(&self, _candidate: Candidate) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
