use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use workforce_match::config::AppConfig;
use workforce_match::error::AppError;
use workforce_match::workflows::matching::{
    parse_flexible_date, MatchingEngine, PassClock, RoleTaxonomy, WorkforceSnapshot,
};
use workforce_match::workflows::roster::RosterImporter;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Engine using the configured taxonomy file, or the built-in one when none is set.
pub(crate) fn build_engine(config: &AppConfig) -> Result<MatchingEngine, AppError> {
    let taxonomy = match &config.data.taxonomy_path {
        Some(path) => {
            info!(path = %path.display(), "loading role taxonomy");
            RoleTaxonomy::from_path(path)?
        }
        None => RoleTaxonomy::standard(),
    };
    Ok(MatchingEngine::new(Arc::new(taxonomy), config.matching))
}

/// Snapshot from `snapshot`, with an optional CSV roster layered over its candidates.
pub(crate) fn load_snapshot(
    snapshot: Option<&Path>,
    roster: Option<&Path>,
) -> Result<WorkforceSnapshot, AppError> {
    let mut loaded = match snapshot {
        Some(path) => WorkforceSnapshot::from_path(path)?,
        None => WorkforceSnapshot::default(),
    };

    if let Some(path) = roster {
        let candidates = RosterImporter::from_path(path)?;
        info!(
            path = %path.display(),
            candidates = candidates.len(),
            "merging roster export"
        );
        loaded.merge_roster(candidates);
    }

    Ok(loaded)
}

pub(crate) fn pass_clock(now: Option<NaiveDate>) -> PassClock {
    now.map(PassClock::on).unwrap_or_else(PassClock::current)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_flexible_date(raw).ok_or_else(|| format!("failed to parse '{raw}' as a date"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
