use serde::{Deserialize, Serialize};

use super::domain::Candidate;
use super::engine::MatchingEngine;
use super::matcher::{geographically_eligible, RoleMatcher};
use super::temporal::PassClock;

const LIKELY_WIN_THRESHOLD: u32 = 70;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderRole {
    pub role: String,
    pub count: u32,
}

/// An opportunity being bid on, with the crew it would need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, alias = "rolesRequired")]
    pub roles: Vec<TenderRole>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderRoleCoverage {
    pub role: String,
    pub required: u32,
    pub supply: u32,
    pub matched: u32,
    /// Negative when the bench holds more than the tender asks for.
    pub gap: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderCoverage {
    pub title: String,
    pub coverage_percent: u32,
    pub likely_win: bool,
    pub roles: Vec<TenderRoleCoverage>,
}

impl MatchingEngine {
    /// How much of a tender's crew the current bench could staff.
    pub fn tender_coverage(
        &self,
        tender: &Tender,
        candidates: &[Candidate],
        clock: &PassClock,
    ) -> TenderCoverage {
        let supply = self.eligible_supply(candidates, clock);
        let areas: Vec<&str> = [tender.region.as_deref(), tender.location.as_deref()]
            .into_iter()
            .flatten()
            .filter(|area| !area.trim().is_empty())
            .collect();

        let roles: Vec<TenderRoleCoverage> = tender
            .roles
            .iter()
            .map(|wanted| {
                let matcher = RoleMatcher::new(&wanted.role, self.taxonomy());
                let available = supply
                    .iter()
                    .filter(|candidate| matcher.accepts(&candidate.role))
                    .filter(|candidate| {
                        areas.is_empty() || geographically_eligible(candidate, &areas)
                    })
                    .count();
                let available = u32::try_from(available).unwrap_or(u32::MAX);

                TenderRoleCoverage {
                    role: wanted.role.clone(),
                    required: wanted.count,
                    supply: available,
                    matched: available.min(wanted.count),
                    gap: i64::from(wanted.count) - i64::from(available),
                }
            })
            .collect();

        let required: u64 = roles.iter().map(|role| u64::from(role.required)).sum();
        let matched: u64 = roles.iter().map(|role| u64::from(role.matched)).sum();
        let coverage_percent = if required == 0 {
            0
        } else {
            (matched as f64 * 100.0 / required as f64).round() as u32
        };

        TenderCoverage {
            title: tender.title.clone(),
            coverage_percent,
            likely_win: coverage_percent > LIKELY_WIN_THRESHOLD,
            roles,
        }
    }
}
