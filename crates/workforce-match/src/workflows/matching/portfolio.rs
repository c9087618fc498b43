use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::demand::{DemandSource, DemandUnit};
use super::domain::{Candidate, ClientId, Project, ProjectId};
use super::engine::MatchingEngine;
use super::temporal::PassClock;

/// A demand unit paired with the candidates who can fill it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub project_id: ProjectId,
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    pub client_ids: Vec<ClientId>,
    #[serde(flatten)]
    pub source: DemandSource,
    pub role: String,
    pub requested_count: u32,
    pub start_date: NaiveDate,
    pub starts_in: i64,
    pub matching_candidates: Vec<Candidate>,
    pub is_mobile_supply: bool,
}

impl MatchRecord {
    fn new(project: &Project, unit: DemandUnit, matched: &[&Candidate], clock: &PassClock) -> Self {
        Self {
            project_id: project.id.clone(),
            project_name: project.name.clone(),
            client_name: project.client_name.clone(),
            client_ids: project.assigned_company_ids.clone(),
            requested_count: unit.required.resolve(matched.len()),
            starts_in: clock.starts_in(unit.start_date),
            is_mobile_supply: matched
                .iter()
                .any(|candidate| candidate.is_geographically_flexible()),
            matching_candidates: matched.iter().map(|candidate| (*candidate).clone()).collect(),
            source: unit.source,
            role: unit.role,
            start_date: unit.start_date,
        }
    }
}

impl MatchingEngine {
    /// Portfolio-wide matches, soonest start first. Units nobody can fill are dropped.
    pub fn build_portfolio_matches(
        &self,
        projects: &[Project],
        candidates: &[Candidate],
        clock: &PassClock,
    ) -> Vec<MatchRecord> {
        let supply = self.eligible_supply(candidates, clock);
        let mut records = Vec::new();

        for project in projects {
            for unit in self.extract_demands(project, clock) {
                let matched = self.match_candidates(&unit, &supply, project);
                if matched.is_empty() {
                    debug!(project = %project.id, role = %unit.role, "no eligible supply for demand unit");
                    continue;
                }
                records.push(MatchRecord::new(project, unit, &matched, clock));
            }
        }

        // stable: ties keep project/unit order
        records.sort_by_key(|record| record.starts_in);

        debug!(
            projects = projects.len(),
            supply = supply.len(),
            records = records.len(),
            "built portfolio matches"
        );
        records
    }
}
