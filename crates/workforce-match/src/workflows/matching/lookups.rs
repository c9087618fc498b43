use chrono::NaiveDate;
use serde::Serialize;

use super::demand::{DemandSource, DemandUnit, RequiredCount};
use super::domain::{
    Candidate, CandidateId, DemandId, LaborRequirement, Project, ProjectId, RequirementId,
};
use super::engine::MatchingEngine;
use super::matcher::{geographically_eligible, RoleMatcher};
use super::temporal::PassClock;
use crate::workflows::allocation::ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplySignal {
    /// Eligible supply can close the remaining gap.
    Covered,
    Short,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementMatches {
    pub project_id: ProjectId,
    pub requirement_id: RequirementId,
    pub trade: String,
    pub required_count: u32,
    pub assigned_ids: Vec<CandidateId>,
    pub gap: u32,
    pub readiness_score: u32,
    pub signal: SupplySignal,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDemandMatch {
    pub project_id: ProjectId,
    pub project_name: String,
    #[serde(flatten)]
    pub source: DemandSource,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_count: Option<u32>,
    pub start_date: NaiveDate,
    pub starts_in: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDemandMatches {
    pub candidate_id: CandidateId,
    pub is_supply: bool,
    pub matches: Vec<CandidateDemandMatch>,
}

impl MatchingEngine {
    /// Candidates worth offering for one labour requirement, excluding those already on it.
    pub fn requirement_matches(
        &self,
        project: &Project,
        requirement: &LaborRequirement,
        candidates: &[Candidate],
        clock: &PassClock,
    ) -> RequirementMatches {
        let unit = DemandUnit {
            project_id: project.id.clone(),
            source: DemandSource::Direct {
                demand_id: DemandId::new(requirement.id.as_str()),
            },
            role: requirement.trade.clone(),
            required: RequiredCount::Exact(requirement.required_count),
            start_date: clock.today(),
        };

        let supply: Vec<&Candidate> = self
            .eligible_supply(candidates, clock)
            .into_iter()
            .filter(|candidate| !requirement.assigned_ids.contains(&candidate.id))
            .collect();
        let matched = self.match_candidates(&unit, &supply, project);

        let gap = ledger::gap(requirement);
        let signal = if matched.len() >= gap as usize {
            SupplySignal::Covered
        } else {
            SupplySignal::Short
        };

        RequirementMatches {
            project_id: project.id.clone(),
            requirement_id: requirement.id.clone(),
            trade: requirement.trade.clone(),
            required_count: requirement.required_count,
            assigned_ids: requirement.assigned_ids.clone(),
            gap,
            readiness_score: ledger::readiness_score(requirement),
            signal,
            candidates: matched.into_iter().cloned().collect(),
        }
    }

    /// Live demand across the portfolio that would accept this candidate, soonest first.
    pub fn candidate_demand_matches(
        &self,
        candidate: &Candidate,
        projects: &[Project],
        clock: &PassClock,
    ) -> CandidateDemandMatches {
        let mut matches = Vec::new();

        for project in projects {
            let areas = [project.region.as_str(), project.location.as_str()];
            if !geographically_eligible(candidate, &areas) {
                continue;
            }

            for unit in self.extract_demands(project, clock) {
                if !RoleMatcher::new(&unit.role, self.taxonomy()).accepts(&candidate.role) {
                    continue;
                }

                matches.push(CandidateDemandMatch {
                    project_id: project.id.clone(),
                    project_name: project.name.clone(),
                    requested_count: match unit.required {
                        RequiredCount::Exact(count) => Some(count),
                        RequiredCount::MatchedSupply => None,
                    },
                    starts_in: clock.starts_in(unit.start_date),
                    start_date: unit.start_date,
                    source: unit.source,
                    role: unit.role,
                });
            }
        }

        matches.sort_by_key(|found| found.starts_in);

        CandidateDemandMatches {
            candidate_id: candidate.id.clone(),
            is_supply: self.is_supply(candidate, clock),
            matches,
        }
    }
}
