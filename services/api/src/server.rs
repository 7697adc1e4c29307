use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryPredictionLog, InMemoryStudentDirectory};
use crate::routes::with_engine_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use retention_ai::config::AppConfig;
use retention_ai::engine::{HttpGenerativeScorer, RiskEngine};
use retention_ai::error::AppError;
use retention_ai::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = Arc::new(InMemoryStudentDirectory::default());
    let prediction_log = Arc::new(InMemoryPredictionLog::default());
    let scorer = Arc::new(HttpGenerativeScorer::from_config(&config.engine));
    let engine = Arc::new(RiskEngine::new(
        directory,
        scorer,
        prediction_log,
        config.engine.clone(),
    ));

    let app = with_engine_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        generative_configured = config.engine.endpoint_url.is_some(),
        "dropout risk assessment service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
