use chrono::{Duration, NaiveDate};

use crate::workflows::matching::{
    Candidate, CandidateId, CandidateStatus, ClientDemand, DemandId, FlexibleDate,
    LaborRequirement, MatchingEngine, PassClock, PhaseId, PhaseSetting, Project, ProjectId,
    RequirementId, Residency, WorkPackage,
};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2025, 3, 1)
}

pub(super) fn clock() -> PassClock {
    PassClock::on(today())
}

pub(super) fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

pub(super) fn engine() -> MatchingEngine {
    MatchingEngine::default()
}

pub(super) fn candidate(id: &str, role: &str, status: CandidateStatus, state: &str) -> Candidate {
    Candidate {
        id: CandidateId::new(id),
        first_name: format!("Worker {id}"),
        role: role.to_string(),
        status,
        state: state.to_string(),
        ..Candidate::default()
    }
}

pub(super) fn available(id: &str, role: &str, state: &str) -> Candidate {
    candidate(id, role, CandidateStatus::Available, state)
}

pub(super) fn mobile(mut candidate: Candidate) -> Candidate {
    candidate.is_mobile = true;
    candidate
}

pub(super) fn on_work_visa(mut candidate: Candidate) -> Candidate {
    candidate.residency = Some(Residency::WorkVisa);
    candidate
}

/// On a job that ends `days` from today.
pub(super) fn finishing_in(id: &str, role: &str, state: &str, days: i64) -> Candidate {
    let mut worker = candidate(id, role, CandidateStatus::OnJob, state);
    worker.finish_date = Some(FlexibleDate::Valid(days_from_today(days)));
    worker
}

pub(super) fn project(id: &str, name: &str, region: &str) -> Project {
    Project {
        id: ProjectId::new(id),
        name: name.to_string(),
        region: region.to_string(),
        ..Project::default()
    }
}

pub(super) fn client_demand(id: &str, role: &str, quantity: u32, days: i64) -> ClientDemand {
    ClientDemand {
        id: DemandId::new(id),
        role: role.to_string(),
        quantity,
        start_date: Some(FlexibleDate::Valid(days_from_today(days))),
    }
}

pub(super) fn phase_starting_in(days: i64) -> PhaseSetting {
    PhaseSetting {
        start_date: Some(FlexibleDate::Valid(days_from_today(days))),
        ..PhaseSetting::default()
    }
}

pub(super) fn with_phase(mut project: Project, phase_id: &str, setting: PhaseSetting) -> Project {
    project.phase_settings.insert(PhaseId::new(phase_id), setting);
    project
}

pub(super) fn requirement(id: &str, trade: &str, required: u32, assigned: &[&str]) -> LaborRequirement {
    LaborRequirement {
        id: RequirementId::new(id),
        trade: trade.to_string(),
        required_count: required,
        assigned_ids: assigned.iter().map(|id| CandidateId::new(*id)).collect(),
    }
}

pub(super) fn with_package(
    mut project: Project,
    key: &str,
    phase_id: &str,
    requirements: Vec<LaborRequirement>,
) -> Project {
    project.packages.insert(
        key.to_string(),
        WorkPackage {
            phase: PhaseId::new(phase_id),
            labor_requirements: requirements,
        },
    );
    project
}

pub(super) fn ids(candidates: &[&Candidate]) -> Vec<String> {
    candidates
        .iter()
        .map(|candidate| candidate.id.to_string())
        .collect()
}
