use crate::cli::ServeArgs;
use crate::infra::{load_snapshot, AppState, InMemorySnapshotGateway};
use crate::routes::with_recruiting_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hiring_desk::config::AppConfig;
use hiring_desk::error::AppError;
use hiring_desk::telemetry;
use hiring_desk::workflows::recruiting::RecruitingService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.snapshot.take() {
        config.data.snapshot_path = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let seed = load_snapshot(config.data.snapshot_path.as_deref())?;
    let gateway = Arc::new(InMemorySnapshotGateway::seeded(seed));
    let service = Arc::new(RecruitingService::connect(gateway)?);

    let app = with_recruiting_routes(service, &config.data.default_actor)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hiring desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
