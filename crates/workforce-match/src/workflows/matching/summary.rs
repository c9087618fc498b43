use std::collections::BTreeMap;

use serde::Serialize;

use super::demand::RequiredCount;
use super::domain::Project;
use super::engine::MatchingEngine;
use super::temporal::PassClock;

/// Units starting sooner than this are flagged critical.
const CRITICAL_WITHIN_DAYS: i64 = 14;
const FALLBACK_ROLE: &str = "General Labour";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandUrgency {
    Critical,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDemand {
    pub role: String,
    pub count: u32,
    pub urgency: DemandUrgency,
    pub projects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandSummary {
    pub total: u32,
    pub breakdown: Vec<RoleDemand>,
}

impl MatchingEngine {
    /// Headcount wanted per role across the portfolio, most pressing first.
    ///
    /// Phase units without a crew estimate have no target of their own and count as one.
    pub fn demand_summary(&self, projects: &[Project], clock: &PassClock) -> DemandSummary {
        let mut by_role: BTreeMap<String, RoleDemand> = BTreeMap::new();

        for project in projects {
            for unit in self.extract_demands(project, clock) {
                let count = match unit.required {
                    RequiredCount::Exact(count) => count,
                    RequiredCount::MatchedSupply => 1,
                };

                let role = if unit.role.trim().is_empty() {
                    FALLBACK_ROLE.to_string()
                } else {
                    unit.role.clone()
                };
                let urgency = if clock.days_until(unit.start_date) < CRITICAL_WITHIN_DAYS {
                    DemandUrgency::Critical
                } else {
                    DemandUrgency::Upcoming
                };

                let entry = by_role.entry(role.clone()).or_insert_with(|| RoleDemand {
                    role,
                    count: 0,
                    urgency: DemandUrgency::Upcoming,
                    projects: Vec::new(),
                });
                entry.count = entry.count.saturating_add(count);
                entry.urgency = entry.urgency.min(urgency);
                if !entry.projects.contains(&project.name) {
                    entry.projects.push(project.name.clone());
                }
            }
        }

        let mut breakdown: Vec<RoleDemand> = by_role.into_values().collect();
        breakdown.sort_by(|a, b| {
            a.urgency
                .cmp(&b.urgency)
                .then_with(|| b.count.cmp(&a.count))
                .then_with(|| a.role.cmp(&b.role))
        });

        DemandSummary {
            total: breakdown.iter().map(|demand| demand.count).sum(),
            breakdown,
        }
    }
}
