use std::sync::Arc;

use super::config::MatchingConfig;
use super::demand::{self, DemandUnit};
use super::domain::{Candidate, Project};
use super::matcher;
use super::supply;
use super::taxonomy::RoleTaxonomy;
use super::temporal::PassClock;

/// Pure matching over a caller-held snapshot and a pinned clock.
///
/// The portfolio, requirement, candidate and tender views are all thin adapters over the
/// same three steps: supply filter, demand extraction and the role/geography matcher.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    taxonomy: Arc<RoleTaxonomy>,
    config: MatchingConfig,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(Arc::new(RoleTaxonomy::standard()), MatchingConfig::default())
    }
}

impl MatchingEngine {
    pub fn new(taxonomy: Arc<RoleTaxonomy>, config: MatchingConfig) -> Self {
        Self { taxonomy, config }
    }

    pub fn taxonomy(&self) -> &RoleTaxonomy {
        &self.taxonomy
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn eligible_supply<'a>(
        &self,
        candidates: &'a [Candidate],
        clock: &PassClock,
    ) -> Vec<&'a Candidate> {
        supply::eligible_supply(candidates, clock, self.config.supply_window())
    }

    pub fn is_supply(&self, candidate: &Candidate, clock: &PassClock) -> bool {
        supply::is_supply(candidate, clock, self.config.supply_window())
    }

    pub fn extract_demands(&self, project: &Project, clock: &PassClock) -> Vec<DemandUnit> {
        demand::extract_demands(project, &self.taxonomy, &self.config, clock)
    }

    pub fn match_candidates<'a>(
        &self,
        unit: &DemandUnit,
        supply: &[&'a Candidate],
        project: &Project,
    ) -> Vec<&'a Candidate> {
        matcher::match_candidates(unit, supply, project, &self.taxonomy)
    }
}
