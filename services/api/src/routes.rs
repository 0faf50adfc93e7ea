use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use housekeep::marketplace::{
    marketplace_router, JobPostRepository, Marketplace, ProviderDirectory, ServiceRepository,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_marketplace_routes<J, S, D>(market: Arc<Marketplace<J, S, D>>) -> axum::Router
where
    J: JobPostRepository + 'static,
    S: ServiceRepository + 'static,
    D: ProviderDirectory + 'static,
{
    marketplace_router(market)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::in_memory_marketplace;
    use axum::body::Body;
    use axum::http::Request;
    use housekeep::config::MarketplaceConfig;
    use housekeep::marketplace::SystemClock;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        }
    }

    #[tokio::test]
    async fn readiness_reflects_the_startup_flag() {
        let response = readiness_endpoint(Extension(state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = readiness_endpoint(Extension(state(true)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_and_marketplace_routes_share_one_router() {
        let market = in_memory_marketplace(&MarketplaceConfig::default(), Arc::new(SystemClock));
        let router = with_marketplace_routes(market).layer(Extension(state(true)));

        let health = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("health responds");
        assert_eq!(health.status(), StatusCode::OK);

        let services = router
            .oneshot(
                Request::get("/api/v1/services")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("services respond");
        assert_eq!(services.status(), StatusCode::OK);
    }
}
