use crate::cli::ServeArgs;
use crate::infra::{build_engine, load_snapshot, AppState};
use crate::routes::with_matching_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use workforce_match::config::AppConfig;
use workforce_match::error::AppError;
use workforce_match::telemetry;
use workforce_match::workflows::allocation::{AllocationService, InMemoryWorkforceRepository};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = Arc::new(build_engine(&config)?);
    let snapshot = load_snapshot(config.data.snapshot_path.as_deref(), None)?;
    info!(
        candidates = snapshot.candidates.len(),
        projects = snapshot.projects.len(),
        "workforce snapshot loaded"
    );

    let repository = Arc::new(InMemoryWorkforceRepository::new(snapshot));
    let allocation_service = Arc::new(AllocationService::new(repository, engine.clone()));

    let app = with_matching_routes(allocation_service)
        .layer(Extension(engine))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "workforce matching service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
