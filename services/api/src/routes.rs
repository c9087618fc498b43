use crate::infra::{deserialize_optional_date, pass_clock, AppState};
use crate::report::MatchReport;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use workforce_match::error::AppError;
use workforce_match::workflows::allocation::{
    allocation_router, AllocationService, WorkforceRepository,
};
use workforce_match::workflows::matching::{MatchingEngine, WorkforceSnapshot};
use workforce_match::workflows::roster::RosterImporter;

/// Ad-hoc matching pass over a posted snapshot, independent of the served store.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatchReportRequest {
    #[serde(default)]
    pub(crate) snapshot: WorkforceSnapshot,
    #[serde(default)]
    pub(crate) roster_csv: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) now: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatchReportResponse {
    pub(crate) data_source: SnapshotSource,
    #[serde(flatten)]
    pub(crate) report: MatchReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SnapshotSource {
    Snapshot,
    Roster,
}

pub(crate) fn with_matching_routes<R>(service: Arc<AllocationService<R>>) -> axum::Router
where
    R: WorkforceRepository + 'static,
{
    allocation_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/matches/report",
            axum::routing::post(match_report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn match_report_endpoint(
    Extension(engine): Extension<Arc<MatchingEngine>>,
    Json(payload): Json<MatchReportRequest>,
) -> Result<Json<MatchReportResponse>, AppError> {
    let MatchReportRequest {
        mut snapshot,
        roster_csv,
        now,
    } = payload;

    let data_source = if let Some(csv) = roster_csv {
        let roster = RosterImporter::from_reader(Cursor::new(csv.into_bytes()))?;
        snapshot.merge_roster(roster);
        SnapshotSource::Roster
    } else {
        SnapshotSource::Snapshot
    };

    let clock = pass_clock(now);
    Ok(Json(MatchReportResponse {
        data_source,
        report: MatchReport::build(&engine, &snapshot, &clock),
    }))
}
