use chrono::NaiveDate;
use serde::Serialize;
use workforce_match::workflows::allocation::{project_readiness, PhaseReadiness};
use workforce_match::workflows::matching::{
    DemandSummary, DemandUrgency, MatchRecord, MatchingEngine, PassClock, WorkforceSnapshot,
};

/// One matching pass over a snapshot, as rendered by the CLI and the report endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatchReport {
    pub(crate) today: NaiveDate,
    pub(crate) candidate_count: usize,
    pub(crate) supply_count: usize,
    pub(crate) project_count: usize,
    pub(crate) matches: Vec<MatchRecord>,
    pub(crate) demand_summary: DemandSummary,
    pub(crate) readiness: Vec<ProjectReadiness>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectReadiness {
    pub(crate) project_name: String,
    pub(crate) phases: Vec<PhaseReadiness>,
}

impl MatchReport {
    pub(crate) fn build(
        engine: &MatchingEngine,
        snapshot: &WorkforceSnapshot,
        clock: &PassClock,
    ) -> Self {
        Self {
            today: clock.today(),
            candidate_count: snapshot.candidates.len(),
            supply_count: engine.eligible_supply(&snapshot.candidates, clock).len(),
            project_count: snapshot.projects.len(),
            matches: engine.build_portfolio_matches(
                &snapshot.projects,
                &snapshot.candidates,
                clock,
            ),
            demand_summary: engine.demand_summary(&snapshot.projects, clock),
            readiness: snapshot
                .projects
                .iter()
                .filter(|project| !project.packages.is_empty())
                .map(|project| ProjectReadiness {
                    project_name: project.name.clone(),
                    phases: project_readiness(project),
                })
                .collect(),
        }
    }

    pub(crate) fn render(&self, list_candidates: bool) {
        println!("Workforce match report ({})", self.today);
        println!(
            "- {} candidates on file | {} counted as supply | {} projects",
            self.candidate_count, self.supply_count, self.project_count
        );

        if self.matches.is_empty() {
            println!("\nNo live demand has matching supply.");
        } else {
            println!("\nMatches (soonest first)");
        }
        for record in &self.matches {
            let source = record.source.source_type();
            let mobile = if record.is_mobile_supply {
                " | mobile supply"
            } else {
                ""
            };
            println!(
                "- {} | {} x{} ({source}) starts {} (in {} days) | {} candidates{mobile}",
                record.project_name,
                record.role,
                record.requested_count,
                record.start_date,
                record.starts_in,
                record.matching_candidates.len(),
            );
            if list_candidates {
                for candidate in &record.matching_candidates {
                    println!(
                        "    - {} [{}] {} ({})",
                        candidate.display_name(),
                        candidate.id,
                        candidate.role,
                        candidate.status.label()
                    );
                }
            }
        }

        println!("\nRecruitment demand: {} heads", self.demand_summary.total);
        for row in &self.demand_summary.breakdown {
            let urgency = match row.urgency {
                DemandUrgency::Critical => "critical",
                DemandUrgency::Upcoming => "upcoming",
            };
            println!(
                "- {}: {} ({urgency}) for {}",
                row.role,
                row.count,
                row.projects.join(", ")
            );
        }

        if !self.readiness.is_empty() {
            println!("\nPhase readiness");
        }
        for project in &self.readiness {
            for phase in &project.phases {
                println!(
                    "- {} {}: {}/{} assigned | {}% ({})",
                    project.project_name,
                    phase.phase_id,
                    phase.assigned,
                    phase.required,
                    phase.score,
                    phase.status.label()
                );
            }
        }
    }
}
