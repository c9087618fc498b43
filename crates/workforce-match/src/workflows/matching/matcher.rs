use super::demand::DemandUnit;
use super::domain::{Candidate, Project};
use super::taxonomy::{normalize_role, RoleTaxonomy};

/// Role predicate for one demand role, with the related roles pre-normalised.
#[derive(Debug, Clone)]
pub struct RoleMatcher {
    demand: String,
    related: Vec<String>,
}

impl RoleMatcher {
    pub fn new(demand_role: &str, taxonomy: &RoleTaxonomy) -> Self {
        Self {
            demand: normalize_role(demand_role),
            related: taxonomy
                .related_roles(demand_role)
                .iter()
                .flat_map(|role| related_forms(role))
                .filter(|role| !role.is_empty())
                .collect(),
        }
    }

    /// Exact match, compound titles ("Senior Carpenter") or a listed substitute.
    pub fn accepts(&self, candidate_role: &str) -> bool {
        let candidate = normalize_role(candidate_role);
        if candidate.is_empty() || self.demand.is_empty() {
            return false;
        }

        candidate == self.demand
            || candidate.contains(&self.demand)
            || self.related.iter().any(|related| *related == candidate)
    }
}

/// A slashed title such as "General Labourer / Hammerhand" also answers to each half.
fn related_forms(role: &str) -> Vec<String> {
    let mut forms = vec![normalize_role(role)];
    if role.contains('/') {
        forms.extend(role.split('/').map(normalize_role));
    }
    forms
}

pub fn role_compatible(candidate_role: &str, demand_role: &str, taxonomy: &RoleTaxonomy) -> bool {
    RoleMatcher::new(demand_role, taxonomy).accepts(candidate_role)
}

/// Mobile candidates go anywhere; others must have their locality named in one of `areas`.
pub fn geographically_eligible(candidate: &Candidate, areas: &[&str]) -> bool {
    if candidate.is_geographically_flexible() {
        return true;
    }

    let locality = candidate.locality().to_lowercase();
    if locality.is_empty() {
        return false;
    }

    areas
        .iter()
        .any(|area| area.to_lowercase().contains(&locality))
}

/// Eligible supply for one demand unit, in supply order.
pub fn match_candidates<'a>(
    unit: &DemandUnit,
    supply: &[&'a Candidate],
    project: &Project,
    taxonomy: &RoleTaxonomy,
) -> Vec<&'a Candidate> {
    let roles = RoleMatcher::new(&unit.role, taxonomy);
    let areas = [project.region.as_str(), project.location.as_str()];

    supply
        .iter()
        .copied()
        .filter(|candidate| roles.accepts(&candidate.role))
        .filter(|candidate| geographically_eligible(candidate, &areas))
        .collect()
}
