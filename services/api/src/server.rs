use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_roster_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use placement::config::AppConfig;
use placement::error::AppError;
use placement::roster::{CsvWorkbook, RosterService, RosterStore};
use placement::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(workbook) = args.workbook.take() {
        config.store.workbook_dir = workbook;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let workbook = Arc::new(CsvWorkbook::open(&config.store.workbook_dir));
    match workbook.load() {
        Ok(snapshot) => info!(
            departments = snapshot.departments.len(),
            applicants = snapshot.applicants.len(),
            workbook = %config.store.workbook_dir.display(),
            "workbook reachable"
        ),
        Err(err) => warn!(
            error = %err,
            workbook = %config.store.workbook_dir.display(),
            "workbook not readable yet; requests will fail until it is"
        ),
    }
    let roster_service = Arc::new(RosterService::new(workbook));

    let app = with_roster_routes(roster_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "department placement service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
