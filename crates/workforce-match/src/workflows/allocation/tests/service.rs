use super::common::*;
use crate::workflows::allocation::repository::{RepositoryError, WorkforceRepository};
use crate::workflows::allocation::{AllocationError, AllocationServiceError};
use crate::workflows::matching::{
    CandidateId, CandidateStatus, PassClock, ProjectId, RequirementId,
};
use std::sync::Arc;

fn ids() -> (ProjectId, RequirementId) {
    (ProjectId::new("p-1"), RequirementId::new("lr-1"))
}

#[test]
fn assign_marks_candidate_on_job_in_project_region() {
    let repository = memory_repository();
    let service = service_with(repository.clone());
    let (project, requirement) = ids();

    let updated = service
        .assign(&project, &requirement, &CandidateId::new("c-1"))
        .expect("assignment succeeds");

    assert_eq!(updated.assigned_ids, vec![CandidateId::new("c-1")]);
    let stored = repository
        .fetch_candidate(&CandidateId::new("c-1"))
        .expect("fetch succeeds")
        .expect("candidate present");
    assert_eq!(stored.status, CandidateStatus::OnJob);
    assert_eq!(stored.state, "Auckland");
    assert_eq!(
        service
            .requirement(&project, &requirement)
            .expect("requirement present"),
        updated
    );
}

#[test]
fn assign_releases_the_slot_when_the_candidate_write_fails() {
    let repository = Arc::new(ReadOnlyCandidatesRepository::new());
    let service = service_with(repository.clone());
    let (project, requirement) = ids();
    let candidate = CandidateId::new("c-1");

    let first = service.assign(&project, &requirement, &candidate);
    assert!(matches!(
        first,
        Err(AllocationServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
    assert!(service
        .requirement(&project, &requirement)
        .expect("requirement present")
        .assigned_ids
        .is_empty());

    // A retry hits the same outage instead of a phantom "already assigned".
    let retry = service.assign(&project, &requirement, &candidate);
    assert!(matches!(
        retry,
        Err(AllocationServiceError::Repository(RepositoryError::Unavailable(_)))
    ));

    let stored = repository
        .fetch_candidate(&candidate)
        .expect("fetch succeeds")
        .expect("candidate present");
    assert_eq!(stored.status, CandidateStatus::Available);
}

#[test]
fn assign_keeps_candidate_edits_made_while_it_was_in_flight() {
    let repository = Arc::new(InterleavedEditRepository::new());
    let service = service_with(repository.clone());
    let (project, requirement) = ids();
    let id = CandidateId::new("c-1");

    service
        .assign(&project, &requirement, &id)
        .expect("assignment succeeds");

    let stored = repository
        .fetch_candidate(&id)
        .expect("fetch succeeds")
        .expect("candidate present");
    assert_eq!(stored.role, "Steel Fixer");
    assert_eq!(stored.status, CandidateStatus::OnJob);
    assert_eq!(stored.state, "Auckland");
}

#[test]
fn assign_propagates_ledger_rejections() {
    let service = service_with(memory_repository());
    let (project, requirement) = ids();

    service
        .assign(&project, &requirement, &CandidateId::new("c-1"))
        .expect("first assignment");
    service
        .assign(&project, &requirement, &CandidateId::new("c-2"))
        .expect("second assignment");

    match service.assign(&project, &requirement, &CandidateId::new("c-3")) {
        Err(AllocationServiceError::Allocation(AllocationError::RequirementFull { .. })) => {}
        other => panic!("expected full requirement, got {other:?}"),
    }
    match service.assign(&project, &requirement, &CandidateId::new("c-1")) {
        Err(AllocationServiceError::Allocation(AllocationError::AlreadyAssigned { .. })) => {}
        other => panic!("expected duplicate rejection, got {other:?}"),
    }
}

#[test]
fn assign_rejects_unknown_ids() {
    let service = service_with(memory_repository());
    let (project, requirement) = ids();

    assert!(matches!(
        service.assign(&project, &requirement, &CandidateId::new("ghost")),
        Err(AllocationServiceError::CandidateNotFound(_))
    ));
    assert!(matches!(
        service.assign(&ProjectId::new("nope"), &requirement, &CandidateId::new("c-1")),
        Err(AllocationServiceError::ProjectNotFound(_))
    ));
    assert!(matches!(
        service.assign(&project, &RequirementId::new("nope"), &CandidateId::new("c-1")),
        Err(AllocationServiceError::RequirementNotFound(_))
    ));
}

#[test]
fn unassign_returns_candidate_to_pool_and_tolerates_stale_ids() {
    let repository = memory_repository();
    let service = service_with(repository.clone());
    let (project, requirement) = ids();

    service
        .assign(&project, &requirement, &CandidateId::new("c-2"))
        .expect("assignment succeeds");
    let released = service
        .unassign(&project, &requirement, &CandidateId::new("c-2"))
        .expect("unassignment succeeds");

    assert!(released.assigned_ids.is_empty());
    let stored = repository
        .fetch_candidate(&CandidateId::new("c-2"))
        .expect("fetch succeeds")
        .expect("candidate present");
    assert_eq!(stored.status, CandidateStatus::Available);

    let unchanged = service
        .unassign(&project, &requirement, &CandidateId::new("ghost"))
        .expect("stale ids are a no-op");
    assert_eq!(unchanged, released);
}

#[test]
fn assign_retries_after_concurrent_writes() {
    let repository = Arc::new(FlakyRepository::new(2));
    let service = service_with(repository);
    let (project, requirement) = ids();

    let updated = service
        .assign(&project, &requirement, &CandidateId::new("c-2"))
        .expect("assignment succeeds after retries");

    assert_eq!(updated.assigned_ids, vec![CandidateId::new("c-2")]);
}

#[test]
fn assign_gives_up_when_requirement_stays_contended() {
    let repository = Arc::new(FlakyRepository::new(usize::MAX));
    let service = service_with(repository.clone());
    let (project, requirement) = ids();

    assert!(matches!(
        service.assign(&project, &requirement, &CandidateId::new("c-2")),
        Err(AllocationServiceError::Contended(_))
    ));
    let stored = repository
        .fetch_candidate(&CandidateId::new("c-2"))
        .expect("fetch succeeds")
        .expect("candidate present");
    assert_eq!(stored.status, CandidateStatus::Available);
}

#[test]
fn concurrent_assignments_never_overfill_a_requirement() {
    let repository = memory_repository();
    let service = Arc::new(service_with(repository.clone()));

    let handles: Vec<_> = ["c-1", "c-2", "c-3"]
        .into_iter()
        .map(|candidate| {
            let service = service.clone();
            std::thread::spawn(move || {
                let (project, requirement) = ids();
                service.assign(&project, &requirement, &CandidateId::new(candidate))
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread completes"))
        .filter(Result::is_ok)
        .count();

    assert_eq!(successes, 2);
    let (project, requirement) = ids();
    let stored = service
        .requirement(&project, &requirement)
        .expect("requirement present");
    assert_eq!(stored.assigned_ids.len(), 2);
}

#[test]
fn views_surface_repository_outages() {
    let service = service_with(Arc::new(UnavailableRepository));
    let clock = PassClock::on(today());

    assert!(matches!(
        service.portfolio(&clock),
        Err(AllocationServiceError::Repository(_))
    ));
}

#[test]
fn phase_readiness_lists_each_packaged_phase() {
    let service = service_with(memory_repository());

    let phases = service
        .phase_readiness(&ProjectId::new("p-1"))
        .expect("project present");

    assert_eq!(phases.len(), 1);
    assert_eq!(phases[0].score, 0);
}
