use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ledger::{AllocationError, RequirementView};
use super::repository::{RepositoryError, WorkforceRepository};
use super::service::{AllocationService, AllocationServiceError};
use crate::workflows::matching::{
    parse_flexible_date, CandidateId, PassClock, ProjectId, RequirementId, Tender,
};

/// Router exposing allocation and matching endpoints.
pub fn allocation_router<R>(service: Arc<AllocationService<R>>) -> Router
where
    R: WorkforceRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/projects/:project_id/requirements/:requirement_id/assignments",
            post(assign_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/requirements/:requirement_id/assignments/:candidate_id",
            delete(unassign_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/requirements/:requirement_id/matches",
            get(requirement_matches_handler::<R>),
        )
        .route(
            "/api/v1/projects/:project_id/readiness",
            get(readiness_handler::<R>),
        )
        .route("/api/v1/matches/portfolio", get(portfolio_handler::<R>))
        .route(
            "/api/v1/candidates/:candidate_id/matches",
            get(candidate_matches_handler::<R>),
        )
        .route("/api/v1/demand/summary", get(demand_summary_handler::<R>))
        .route("/api/v1/tenders/coverage", post(tender_coverage_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub candidate_id: CandidateId,
}

/// `?now=` pins the pass clock; absent means the current local time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassQuery {
    pub now: Option<String>,
}

impl PassQuery {
    fn clock(&self) -> Result<PassClock, Response> {
        match self.now.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) {
            None => Ok(PassClock::current()),
            Some(raw) => parse_flexible_date(raw).map(PassClock::on).ok_or_else(|| {
                let payload = json!({
                    "error": format!("invalid `now` date '{raw}'"),
                });
                (StatusCode::BAD_REQUEST, Json(payload)).into_response()
            }),
        }
    }
}

pub(crate) async fn assign_handler<R>(
    State(service): State<Arc<AllocationService<R>>>,
    Path((project_id, requirement_id)): Path<(String, String)>,
    Json(request): Json<AssignmentRequest>,
) -> Response
where
    R: WorkforceRepository + 'static,
{
    let result = service.assign(
        &ProjectId::new(project_id),
        &RequirementId::new(requirement_id),
        &request.candidate_id,
    );
    match result {
        Ok(requirement) => ok(RequirementView::from(&requirement)),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn unassign_handler<R>(
    State(service): State<Arc<AllocationService<R>>>,
    Path((project_id, requirement_id, candidate_id)): Path<(String, String, String)>,
) -> Response
where
    R: WorkforceRepository + 'static,
{
    let result = service.unassign(
        &ProjectId::new(project_id),
        &RequirementId::new(requirement_id),
        &CandidateId::new(candidate_id),
    );
    match result {
        Ok(requirement) => ok(RequirementView::from(&requirement)),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn requirement_matches_handler<R>(
    State(service): State<Arc<AllocationService<R>>>,
    Path((project_id, requirement_id)): Path<(String, String)>,
    Query(query): Query<PassQuery>,
) -> Response
where
    R: WorkforceRepository + 'static,
{
    let clock = match query.clock() {
        Ok(clock) => clock,
        Err(response) => return response,
    };
    respond(service.requirement_matches(
        &ProjectId::new(project_id),
        &RequirementId::new(requirement_id),
        &clock,
    ))
}

pub(crate) async fn readiness_handler<R>(
    State(service): State<Arc<AllocationService<R>>>,
    Path(project_id): Path<String>,
) -> Response
where
    R: WorkforceRepository + 'static,
{
    respond(service.phase_readiness(&ProjectId::new(project_id)))
}

pub(crate) async fn portfolio_handler<R>(
    State(service): State<Arc<AllocationService<R>>>,
    Query(query): Query<PassQuery>,
) -> Response
where
    R: WorkforceRepository + 'static,
{
    match query.clock() {
        Ok(clock) => respond(service.portfolio(&clock)),
        Err(response) => response,
    }
}

pub(crate) async fn candidate_matches_handler<R>(
    State(service): State<Arc<AllocationService<R>>>,
    Path(candidate_id): Path<String>,
    Query(query): Query<PassQuery>,
) -> Response
where
    R: WorkforceRepository + 'static,
{
    match query.clock() {
        Ok(clock) => respond(service.candidate_matches(&CandidateId::new(candidate_id), &clock)),
        Err(response) => response,
    }
}

pub(crate) async fn demand_summary_handler<R>(
    State(service): State<Arc<AllocationService<R>>>,
    Query(query): Query<PassQuery>,
) -> Response
where
    R: WorkforceRepository + 'static,
{
    match query.clock() {
        Ok(clock) => respond(service.demand_summary(&clock)),
        Err(response) => response,
    }
}

pub(crate) async fn tender_coverage_handler<R>(
    State(service): State<Arc<AllocationService<R>>>,
    Query(query): Query<PassQuery>,
    Json(tender): Json<Tender>,
) -> Response
where
    R: WorkforceRepository + 'static,
{
    match query.clock() {
        Ok(clock) => respond(service.tender_coverage(&tender, &clock)),
        Err(response) => response,
    }
}

fn ok<T: Serialize>(body: T) -> Response {
    (StatusCode::OK, Json(body)).into_response()
}

fn respond<T: Serialize>(result: Result<T, AllocationServiceError>) -> Response {
    match result {
        Ok(body) => ok(body),
        Err(error) => error_response(error),
    }
}

fn error_response(error: AllocationServiceError) -> Response {
    let status = match &error {
        AllocationServiceError::Allocation(
            AllocationError::RequirementFull { .. } | AllocationError::AlreadyAssigned { .. },
        ) => StatusCode::CONFLICT,
        AllocationServiceError::Contended(_)
        | AllocationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        AllocationServiceError::ProjectNotFound(_)
        | AllocationServiceError::RequirementNotFound(_)
        | AllocationServiceError::CandidateNotFound(_)
        | AllocationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AllocationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
