use crate::infra::{build_engine, load_snapshot, pass_clock};
use crate::report::MatchReport;
use chrono::{Duration, NaiveDate};
use clap::Args;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use workforce_match::config::AppConfig;
use workforce_match::error::AppError;
use workforce_match::workflows::allocation::{
    AllocationService, InMemoryWorkforceRepository, RequirementView,
};
use workforce_match::workflows::matching::{
    CandidateId, MatchingEngine, PassClock, ProjectId, RequirementId, SnapshotError,
    WorkforceSnapshot,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluate the demo as of this date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) now: Option<NaiveDate>,
    /// List the matched candidates under each demand.
    #[arg(long)]
    pub(crate) list_candidates: bool,
    /// Skip the allocation portion of the demo.
    #[arg(long)]
    pub(crate) skip_allocation: bool,
}

#[derive(Args, Debug)]
pub(crate) struct MatchReportArgs {
    /// Workforce snapshot JSON (`candidates` and `projects`)
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
    /// Optional CSV roster export layered over the snapshot candidates
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Evaluation date for the pass (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) now: Option<NaiveDate>,
    /// List the matched candidates under each demand
    #[arg(long)]
    pub(crate) list_candidates: bool,
}

pub(crate) fn run_match_report(args: MatchReportArgs) -> Result<(), AppError> {
    let MatchReportArgs {
        snapshot,
        roster,
        now,
        list_candidates,
    } = args;

    let config = AppConfig::load()?;
    let engine = build_engine(&config)?;
    let snapshot_path = snapshot.or_else(|| config.data.snapshot_path.clone());
    let snapshot = load_snapshot(snapshot_path.as_deref(), roster.as_deref())?;

    let clock = pass_clock(now);
    MatchReport::build(&engine, &snapshot, &clock).render(list_candidates);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        now,
        list_candidates,
        skip_allocation,
    } = args;

    let clock = pass_clock(now);
    let engine = Arc::new(MatchingEngine::default());
    let snapshot = demo_snapshot(clock.today())?;

    println!("Workforce matching demo");
    MatchReport::build(&engine, &snapshot, &clock).render(list_candidates);

    if skip_allocation {
        return Ok(());
    }

    println!("\nAllocation demo");
    let repository = Arc::new(InMemoryWorkforceRepository::new(snapshot));
    let service = AllocationService::new(repository, engine);
    let project = ProjectId::new("p-harbour");
    let requirement = RequirementId::new("lr-formwork");

    for candidate in ["c-tane", "c-tane", "c-mere", "c-sam"] {
        match service.assign(&project, &requirement, &CandidateId::new(candidate)) {
            Ok(updated) => print_requirement(candidate, &RequirementView::from(&updated)),
            Err(err) => println!("- {candidate}: rejected ({err})"),
        }
    }

    match service.phase_readiness(&project) {
        Ok(phases) => {
            for phase in phases {
                println!(
                    "  Phase {}: {}/{} assigned | {}% ({})",
                    phase.phase_id,
                    phase.assigned,
                    phase.required,
                    phase.score,
                    phase.status.label()
                );
            }
        }
        Err(err) => println!("  Readiness unavailable: {}", err),
    }

    print_candidate_lookup(&service, &clock);
    Ok(())
}

fn print_requirement(candidate: &str, view: &RequirementView) {
    println!(
        "- {candidate}: assigned to {} | {}/{} filled | gap {} | {}% ready",
        view.trade,
        view.assigned_ids.len(),
        view.required_count,
        view.gap,
        view.readiness_score
    );
}

fn print_candidate_lookup(
    service: &AllocationService<InMemoryWorkforceRepository>,
    clock: &PassClock,
) {
    let candidate = CandidateId::new("c-hemi");
    match service.candidate_matches(&candidate, clock) {
        Ok(lookup) => {
            println!(
                "\nDemand open to {} (counted as supply: {})",
                candidate, lookup.is_supply
            );
            for entry in lookup.matches {
                println!(
                    "- {} | {} starts in {} days",
                    entry.project_name, entry.role, entry.starts_in
                );
            }
        }
        Err(err) => println!("\nCandidate lookup unavailable: {}", err),
    }
}

/// Small Auckland portfolio with dates anchored on `today`.
pub(crate) fn demo_snapshot(today: NaiveDate) -> Result<WorkforceSnapshot, SnapshotError> {
    let in_days = |days: i64| (today + Duration::days(days)).format("%Y-%m-%d").to_string();

    let snapshot = json!({
        "candidates": [
            { "id": "c-tane", "firstName": "Tane", "lastName": "Walker", "role": "Formworker",
              "status": "available", "state": "Auckland" },
            { "id": "c-mere", "firstName": "Mere", "lastName": "Tipene", "role": "Formworker",
              "status": "on_job", "finishDate": in_days(12), "state": "Auckland" },
            { "id": "c-sam", "firstName": "Sam", "lastName": "Lee", "role": "Formworker",
              "status": "available", "state": "Auckland" },
            { "id": "c-hemi", "firstName": "Hemi", "lastName": "Rangi", "role": "Carpenter",
              "status": "available", "state": "Auckland" },
            { "id": "c-jo", "firstName": "Jo", "lastName": "Fa'amausili",
              "role": "General Labourer / Hammerhand", "status": "available",
              "isMobile": true, "state": "Canterbury" },
            { "id": "c-ana", "firstName": "Ana", "lastName": "Smith", "role": "Carpenter",
              "status": "available", "state": "Waikato" }
        ],
        "projects": [{
            "id": "p-harbour",
            "name": "Harbour Tower",
            "clientName": "Waitemata Build",
            "region": "Auckland",
            "location": "Wynyard Quarter, Auckland",
            "value": "$12m",
            "clientDemands": [
                { "id": "d-carpenters", "role": "Carpenter", "quantity": 3, "startDate": in_days(10) }
            ],
            "phaseSettings": {
                "02a_concrete": { "startDate": in_days(28) }
            },
            "packages": {
                "structure": {
                    "phase": "02a_concrete",
                    "laborRequirements": [
                        { "id": "lr-formwork", "trade": "Formworker", "requiredCount": 2 }
                    ]
                }
            }
        }]
    });

    Ok(serde_json::from_value(snapshot)?)
}
