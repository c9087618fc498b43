use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::config::{MatchingConfig, PhaseQuantityPolicy};
use super::domain::{DemandId, PhaseId, Project, ProjectId};
use super::taxonomy::{ProjectSize, RoleTaxonomy};
use super::temporal::{FlexibleDate, PassClock};

/// Where a demand unit came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "sourceType", rename_all = "snake_case")]
pub enum DemandSource {
    /// An explicit request from a client contact.
    #[serde(rename_all = "camelCase")]
    Direct { demand_id: DemandId },
    /// Inferred from the project's phase schedule.
    #[serde(rename_all = "camelCase")]
    Phase {
        phase_id: PhaseId,
        phase_label: String,
        alert_date: Option<NaiveDate>,
    },
}

impl DemandSource {
    pub const fn source_type(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "direct",
            Self::Phase { .. } => "phase",
        }
    }

    pub fn phase_id(&self) -> Option<&PhaseId> {
        match self {
            Self::Direct { .. } => None,
            Self::Phase { phase_id, .. } => Some(phase_id),
        }
    }
}

/// Headcount a unit asks for. Phase units without a crew estimate resolve against
/// whatever the matcher finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredCount {
    Exact(u32),
    MatchedSupply,
}

impl RequiredCount {
    pub fn resolve(self, matched: usize) -> u32 {
        match self {
            Self::Exact(count) => count,
            Self::MatchedSupply => u32::try_from(matched).unwrap_or(u32::MAX),
        }
    }
}

/// Atomic matching target derived from a project. Recomputed every pass, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandUnit {
    pub project_id: ProjectId,
    pub source: DemandSource,
    pub role: String,
    pub required: RequiredCount,
    pub start_date: NaiveDate,
}

/// Derive the live demand units for one project.
///
/// Direct requests are kept when they start inside `config.direct_window`; each phase
/// inside `config.phase_window` contributes one unit per taxonomy role. Records with
/// missing or unparseable dates are skipped.
pub fn extract_demands(
    project: &Project,
    taxonomy: &RoleTaxonomy,
    config: &MatchingConfig,
    clock: &PassClock,
) -> Vec<DemandUnit> {
    let mut units = Vec::new();

    for demand in &project.client_demands {
        let Some(start) = resolve_start(demand.start_date.as_ref()) else {
            debug!(
                project = %project.id,
                demand = %demand.id,
                "skipping client demand without a usable start date"
            );
            continue;
        };

        if !config.direct_window.contains(clock.days_until(start)) {
            continue;
        }

        units.push(DemandUnit {
            project_id: project.id.clone(),
            source: DemandSource::Direct {
                demand_id: demand.id.clone(),
            },
            role: demand.role.clone(),
            required: RequiredCount::Exact(demand.quantity),
            start_date: start,
        });
    }

    let size = ProjectSize::from_value(project.value.as_deref());

    for (phase_id, settings) in &project.phase_settings {
        if settings.skipped {
            continue;
        }

        let Some(start) = resolve_start(settings.start_date.as_ref()) else {
            debug!(
                project = %project.id,
                phase = %phase_id,
                "skipping phase without a usable start date"
            );
            continue;
        };

        if !config.phase_window.contains(clock.days_until(start)) {
            continue;
        }

        let phase_label = taxonomy.phase_label(phase_id);
        let alert_date = settings.alert_date();

        for role in taxonomy.roles_for_phase(phase_id) {
            let required = match config.phase_quantity {
                PhaseQuantityPolicy::MatchedSupply => RequiredCount::MatchedSupply,
                PhaseQuantityPolicy::TypicalCrew => taxonomy
                    .typical_crew(phase_id, role, size)
                    .map_or(RequiredCount::MatchedSupply, RequiredCount::Exact),
            };

            units.push(DemandUnit {
                project_id: project.id.clone(),
                source: DemandSource::Phase {
                    phase_id: phase_id.clone(),
                    phase_label: phase_label.clone(),
                    alert_date,
                },
                role: role.to_string(),
                required,
                start_date: start,
            });
        }
    }

    debug!(project = %project.id, units = units.len(), "extracted demand units");
    units
}

fn resolve_start(date: Option<&FlexibleDate>) -> Option<NaiveDate> {
    date.and_then(FlexibleDate::date)
}
