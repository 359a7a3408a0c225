//! Axum route handlers for the motivator HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`   - Returns status, version, model and cumulative token usage
//! - `POST /motivate` - Accepts `{"message": "..."}`, returns a `MotivatorResponse`

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::chat::{Motivator, MotivatorResponse, PipelineState};

/// Shared application state for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppState {
    pub motivator: Motivator,
}

impl AppState {
    pub fn new(motivator: Motivator) -> Self {
        Self { motivator }
    }
}

/// Incoming request body for `POST /motivate`.
#[derive(Debug, Clone, Deserialize)]
pub struct MotivateRequest {
    /// How the user is feeling, in their own words.
    pub message: String,
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/motivate", post(motivate_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health - liveness probe.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let service = state.motivator.service();
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "motivator",
        "provider": service.provider(),
        "model": service.model(),
        "knowledge_entries": state.motivator.knowledge().len(),
        "usage": service.usage_summary(),
    }))
}

/// POST /motivate - run the pipeline for one submission.
///
/// - `200` with an `ok` response, including synthesized answers
/// - `400` for empty input (no completion request is made)
/// - `502` when the completion service fails
async fn motivate_handler(
    State(state): State<AppState>,
    Json(request): Json<MotivateRequest>,
) -> (StatusCode, Json<MotivatorResponse>) {
    let outcome = state.motivator.run(&request.message).await;

    let status = if outcome.response.is_ok() {
        StatusCode::OK
    } else if outcome.states.last() == Some(&PipelineState::Failed) {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::BAD_REQUEST
    };

    (status, Json(outcome.response))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::errors::{ServiceError, ServiceErrorKind};
    use crate::knowledge::KnowledgeBase;
    use crate::llms::base_llm::testing::ScriptedCompletion;

    fn app(service: ScriptedCompletion) -> Router {
        let motivator = Motivator::new(Arc::new(service), Arc::new(KnowledgeBase::curated()));
        app_router(AppState::new(motivator))
    }

    fn motivate_request(message: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/motivate")
            .header("Content-Type", "application/json")
            .body(Body::from(
                serde_json::json!({ "message": message }).to_string(),
            ))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app(ScriptedCompletion::replying("unused"));

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["model"], "scripted");
        assert_eq!(json["knowledge_entries"], 7);
        assert_eq!(json["usage"]["successful_requests"], 0);
    }

    #[tokio::test]
    async fn test_motivate_curated() {
        let app = app(ScriptedCompletion::replying(
            r#"{"joyful": {"Bible": ["x"], "Message": "y"}}"#,
        ));

        let response = app.oneshot(motivate_request("Best day ever")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["emotion"], "joyful");
        assert_eq!(json["source"], "curated");
        assert!(json["verse"].as_str().unwrap().starts_with("Philippians 4:4"));
    }

    #[tokio::test]
    async fn test_motivate_rejects_empty_input() {
        let app = app(ScriptedCompletion::replying("unused"));

        let response = app.oneshot(motivate_request("  ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["verse"], "Please provide some input");
        assert!(json.get("emotion").is_none());
    }

    #[tokio::test]
    async fn test_motivate_service_failure() {
        let app = app(ScriptedCompletion::failing(ServiceError::new(
            ServiceErrorKind::Timeout,
            "elapsed",
        )));

        let response = app.oneshot(motivate_request("hello")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
        assert!(json["verse"].as_str().unwrap().contains("too long"));
    }
}
