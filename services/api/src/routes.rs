use crate::infra::{ApiState, AppState};
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use insightplug::advisor::{AdvisorContext, AdvisorSummary, ChatOutcome};
use insightplug::catalog::{ProfileSelection, ReferenceCatalog};
use insightplug::economics::{DerivedMetrics, VehicleProfile};
use insightplug::error::AppError;
use insightplug::limiter::LimitDecision;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct SignalsResponse {
    pub(crate) profile: VehicleProfile,
    pub(crate) metrics: DerivedMetrics,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    pub(crate) session_id: String,
    pub(crate) query: String,
    pub(crate) profile: ProfileSelection,
}

pub(crate) fn api_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/v1/catalog", get(catalog_endpoint))
        .route("/api/v1/signals", post(signals_endpoint))
        .route("/api/v1/summary", post(summary_endpoint))
        .route("/api/v1/chat", post(chat_endpoint))
        .route("/api/v1/chat/:session_id/limit", get(chat_limit_endpoint))
        .with_state(state)
}

pub(crate) fn with_api_routes(state: Arc<ApiState>) -> Router {
    api_router(state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
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

pub(crate) async fn catalog_endpoint(State(state): State<Arc<ApiState>>) -> Json<ReferenceCatalog> {
    Json(state.catalog.clone())
}

pub(crate) async fn signals_endpoint(
    State(state): State<Arc<ApiState>>,
    Json(selection): Json<ProfileSelection>,
) -> Result<Json<SignalsResponse>, AppError> {
    let (profile, metrics) = state.analyze(&selection)?;
    Ok(Json(SignalsResponse { profile, metrics }))
}

pub(crate) async fn summary_endpoint(
    State(state): State<Arc<ApiState>>,
    Json(selection): Json<ProfileSelection>,
) -> Result<Json<AdvisorSummary>, AppError> {
    Ok(Json(state.summary(&selection)?))
}

pub(crate) async fn chat_endpoint(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, AppError> {
    let (profile, metrics) = state.analyze(&request.profile)?;
    let context = AdvisorContext::new(&profile, &metrics);

    match state
        .chat
        .ask(&request.session_id, &request.query, &context)
        .await?
    {
        ChatOutcome::Answered(reply) => Ok((StatusCode::OK, Json(reply)).into_response()),
        ChatOutcome::Throttled(decision) => Ok(throttled(decision)),
    }
}

pub(crate) async fn chat_limit_endpoint(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<String>,
) -> Json<LimitDecision> {
    Json(state.chat.session_limit(&session_id))
}

fn throttled(decision: LimitDecision) -> Response {
    let payload = json!({
        "error": decision.summary(),
        "limit": &decision,
    });
    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(payload)).into_response();
    if let Some(ms) = decision.retry_after_ms {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(ms.div_ceil(1000)));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::test_state;
    use axum::body::Body;
    use axum::http::Request;
    use insightplug::advisor::ReplySource;
    use insightplug::limiter::LimitReason;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn brooklyn() -> ProfileSelection {
        ProfileSelection::new("36047", "Model 3 RWD")
    }

    fn chat_request(session_id: &str, query: &str) -> ChatRequest {
        ChatRequest {
            session_id: session_id.to_string(),
            query: query.to_string(),
            profile: brooklyn(),
        }
    }

    fn app(ready: bool) -> Router {
        let app_state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_api_routes(Arc::new(test_state())).layer(Extension(app_state))
    }

    #[tokio::test]
    async fn signals_endpoint_returns_profile_and_metrics() {
        let state = Arc::new(test_state());
        let Json(body) = signals_endpoint(State(state), Json(brooklyn()))
            .await
            .expect("signals derive");

        assert_eq!(body.profile.region.state, "NY");
        assert_eq!(body.metrics.legacy_monthly_cost, 49.0);
        assert_eq!(body.metrics.efficient_monthly_cost, 38.0);
        assert_eq!(body.metrics.monthly_surplus, 11.0);
    }

    #[tokio::test]
    async fn signals_endpoint_applies_overrides() {
        let state = Arc::new(test_state());
        let mut selection = brooklyn();
        selection.electricity_rate_per_kwh = Some(0.60);

        let Json(body) = signals_endpoint(State(state), Json(selection))
            .await
            .expect("signals derive");
        assert_eq!(body.metrics.efficient_monthly_cost, 102.0);
        assert!(!body.metrics.break_even.is_reachable());
    }

    #[tokio::test]
    async fn summary_endpoint_reports_projection_break_even() {
        let state = Arc::new(test_state());
        let Json(summary) = summary_endpoint(State(state), Json(brooklyn()))
            .await
            .expect("summary builds");

        assert_eq!(summary.break_even_year, Some(9));
        assert!(summary.recommendation.contains("$1,863"));
    }

    #[tokio::test]
    async fn chat_endpoint_answers_then_throttles() {
        let state = Arc::new(test_state());

        for _ in 0..2 {
            let request = chat_request("s1", "how much do I save?");
            let response = chat_endpoint(State(state.clone()), Json(request))
                .await
                .expect("chat handled");
            assert_eq!(response.status(), StatusCode::OK);
        }

        let request = chat_request("s1", "and now?");
        let response = chat_endpoint(State(state.clone()), Json(request))
            .await
            .expect("chat handled");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER),
            Some(&HeaderValue::from_static("60"))
        );

        let Json(limit) = chat_limit_endpoint(State(state), Path("s1".to_string())).await;
        assert!(!limit.allowed);
        assert_eq!(limit.reason, Some(LimitReason::Rate));
    }

    #[tokio::test]
    async fn chat_sessions_are_limited_independently() {
        let state = Arc::new(test_state());
        for _ in 0..2 {
            chat_endpoint(State(state.clone()), Json(chat_request("busy", "range?")))
                .await
                .expect("chat handled");
        }

        let request = chat_request("quiet", "range?");
        let response = chat_endpoint(State(state.clone()), Json(request))
            .await
            .expect("chat handled");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.chat.session_limit("quiet").remaining, 19);
    }

    #[tokio::test]
    async fn chat_endpoint_rejects_blank_query() {
        let state = Arc::new(test_state());
        let err = chat_endpoint(State(state.clone()), Json(chat_request("s2", "   ")))
            .await
            .expect_err("blank query");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.chat.session_limit("s2").remaining, 20);
    }

    #[tokio::test]
    async fn chat_endpoint_rejects_blank_session() {
        let state = Arc::new(test_state());
        let err = chat_endpoint(State(state), Json(chat_request(" ", "range?")))
            .await
            .expect_err("blank session");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn local_chat_replies_come_from_rules() {
        let state = test_state();
        let (profile, metrics) = state.analyze(&brooklyn()).expect("analyze");
        let context = AdvisorContext::new(&profile, &metrics);

        match state.chat.ask("s3", "where do I charge?", &context).await {
            Ok(ChatOutcome::Answered(reply)) => {
                assert_eq!(reply.source, ReplySource::RuleBased);
                assert!(reply.text.contains("every 17 days"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn router_serves_catalog_and_maps_lookup_misses() {
        let response = app(true)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/catalog")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("routed");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(true)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/signals")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"region":"99999","vehicle":"Model 3 RWD"}"#))
                    .expect("request"),
            )
            .await
            .expect("routed");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let response = app(false)
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("routed");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
