use std::sync::{Mutex, MutexGuard};

use crate::workflows::matching::{
    Candidate, CandidateId, LaborRequirement, Project, ProjectId, WorkforceSnapshot,
};

/// Storage abstraction so the service can be exercised against fakes.
pub trait WorkforceRepository: Send + Sync {
    /// Candidates and projects read under one consistent view.
    fn snapshot(&self) -> Result<WorkforceSnapshot, RepositoryError>;
    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError>;
    fn fetch_candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError>;
    /// Replace one requirement only if it still equals `expected`.
    fn swap_requirement(
        &self,
        project_id: &ProjectId,
        expected: &LaborRequirement,
        updated: LaborRequirement,
    ) -> Result<(), RepositoryError>;
    fn update_candidate(&self, candidate: Candidate) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record changed concurrently")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store backing the HTTP service.
#[derive(Debug, Default)]
pub struct InMemoryWorkforceRepository {
    state: Mutex<WorkforceSnapshot>,
}

impl InMemoryWorkforceRepository {
    pub fn new(snapshot: WorkforceSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, WorkforceSnapshot>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("workforce store lock poisoned".to_string()))
    }
}

impl WorkforceRepository for InMemoryWorkforceRepository {
    fn snapshot(&self) -> Result<WorkforceSnapshot, RepositoryError> {
        Ok(self.lock()?.clone())
    }

    fn fetch_project(&self, id: &ProjectId) -> Result<Option<Project>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.projects.iter().find(|project| &project.id == id).cloned())
    }

    fn fetch_candidate(&self, id: &CandidateId) -> Result<Option<Candidate>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .candidates
            .iter()
            .find(|candidate| &candidate.id == id)
            .cloned())
    }

    fn swap_requirement(
        &self,
        project_id: &ProjectId,
        expected: &LaborRequirement,
        updated: LaborRequirement,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let project = guard
            .projects
            .iter_mut()
            .find(|project| &project.id == project_id)
            .ok_or(RepositoryError::NotFound)?;
        let stored = project
            .requirement_mut(&expected.id)
            .ok_or(RepositoryError::NotFound)?;

        if stored != expected {
            return Err(RepositoryError::Conflict);
        }
        *stored = updated;
        Ok(())
    }

    fn update_candidate(&self, candidate: Candidate) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let stored = guard
            .candidates
            .iter_mut()
            .find(|stored| stored.id == candidate.id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = candidate;
        Ok(())
    }
}
