use crate::cli::ServeArgs;
use crate::infra::{in_memory_marketplace, AppState};
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use housekeep::config::AppConfig;
use housekeep::error::AppError;
use housekeep::marketplace::SystemClock;
use housekeep::telemetry;
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

    let market = in_memory_marketplace(&config.marketplace, Arc::new(SystemClock));

    let app = with_marketplace_routes(market)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        hire_policy = config.marketplace.hire_policy.label(),
        write_attempts = config.marketplace.write_attempts,
        "marketplace service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
