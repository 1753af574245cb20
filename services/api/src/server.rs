use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCommentCatalog, InMemoryCommentCopier, InMemoryFinalCommentStore};
use crate::routes::with_comment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use comment_composer::config::AppConfig;
use comment_composer::error::AppError;
use comment_composer::telemetry;
use comment_composer::workflows::final_comment::FinalCommentService;
use std::sync::atomic::Ordering;
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

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = InMemoryCommentCatalog::default();
    let copier = InMemoryCommentCopier::new(catalog.clone());
    let service = Arc::new(FinalCommentService::new(
        Arc::new(catalog),
        Arc::new(InMemoryFinalCommentStore::default()),
        Arc::new(copier),
        config.composition,
    ));

    let app = with_comment_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_length = config.composition.max_length,
        extended_max_length = config.composition.extended_max_length,
        "comment composer ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
