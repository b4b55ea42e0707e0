//! HTTP Endpoints
//!
//! REST API for the shop chat agent.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use shopchat_agent::AgentError;
use shopchat_core::{ChatMessage, Product, TranscriptStats};

use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );
    // Bounds every request, including the gateway wait inside /api/chat
    let timeout_layer = TimeoutLayer::new(Duration::from_secs(
        state.settings.server.timeout_seconds.max(1),
    ));

    Router::new()
        // Session endpoints
        .route("/api/sessions", post(create_session))
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id", delete(delete_session))
        .route("/api/sessions/:id/transcript", get(get_transcript))
        .route("/api/sessions/:id/clear", post(clear_session))
        // Chat endpoint
        .route("/api/chat/:session_id", post(chat))
        // Catalog endpoints
        .route("/api/products", get(list_products))
        .route("/api/products/:id", get(get_product))
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http())
        .layer(timeout_layer)
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer (dev only)
/// - If cors_origins is empty, defaults to the local Vite dev server
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let default_layer = || {
        CorsLayer::new()
            .allow_origin("http://localhost:5173".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    };

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:5173");
        return default_layer();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        return default_layer();
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(true)
}

fn agent_error_status(err: &AgentError) -> StatusCode {
    match err {
        AgentError::Busy => StatusCode::CONFLICT,
        AgentError::EmptyMessage => StatusCode::BAD_REQUEST,
        AgentError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        AgentError::TooManySessions(_) => StatusCode::SERVICE_UNAVAILABLE,
        AgentError::Gateway(_) | AgentError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_body(err: &AgentError) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "error": err.to_string() }))
}

/// Create a session
async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.sessions.create() {
        Ok(session) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "session_id": session.id() })),
        ),
        Err(e) => (agent_error_status(&e), error_body(&e)),
    }
}

/// Get session info
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let session = state
        .sessions
        .get(&id)
        .map_err(|_| StatusCode::NOT_FOUND)?;

    let stats: TranscriptStats = session.stats();
    Ok(Json(serde_json::json!({
        "session_id": session.id(),
        "busy": session.is_busy(),
        "turn_count": session.turn_count(),
        "stats": stats,
    })))
}

/// Delete a session
async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    match state.sessions.remove(&id) {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::NOT_FOUND,
    }
}

/// List session ids
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.sessions.list_ids();
    Json(serde_json::json!({
        "sessions": sessions,
        "count": sessions.len(),
    }))
}

/// Full transcript of a session
async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, StatusCode> {
    let session = state
        .sessions
        .get(&id)
        .map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(Json(session.transcript()))
}

/// Clear a session's transcript, keeping the session alive
async fn clear_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    match state.sessions.get(&id) {
        Ok(session) => {
            session.clear();
            StatusCode::NO_CONTENT
        }
        Err(_) => StatusCode::NOT_FOUND,
    }
}

/// Chat request
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// Chat response
#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    products: Vec<Product>,
    turn_count: usize,
}

/// Chat endpoint: one user message in, one bot reply out
async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<serde_json::Value>)> {
    let session = state
        .sessions
        .get(&session_id)
        .map_err(|e| (agent_error_status(&e), error_body(&e)))?;

    match session.send_message(&request.message).await {
        Ok(reply) => Ok(Json(ChatResponse {
            response: reply.text,
            products: reply.products,
            turn_count: session.turn_count(),
        })),
        Err(e) => {
            tracing::warn!(session_id = %session_id, error = %e, "Chat request rejected");
            Err((agent_error_status(&e), error_body(&e)))
        }
    }
}

/// All catalog products
async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.catalog.products().to_vec())
}

/// Product detail
///
/// An unknown id is a displayable state for the client, so the 404 body
/// carries a structured message instead of being empty.
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, (StatusCode, Json<serde_json::Value>)> {
    match state.catalog.product_by_id(&id) {
        Some(product) => Ok(Json(product.clone())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "Product not found",
                "product_id": id,
            })),
        )),
    }
}

/// Health check: process is up and the catalog is loaded
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let product_count = state.catalog.products().len();
    let healthy = product_count > 0;

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if healthy { "healthy" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "checks": {
                "catalog": {
                    "status": if healthy { "ok" } else { "empty" },
                    "products": product_count,
                    "faqs": state.catalog.faqs().len(),
                    "shipping": state.catalog.shipping().len(),
                },
            },
        })),
    )
}

/// Readiness check with completion-endpoint connectivity
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let session_count = state.sessions.count();
    let llm_endpoint = state.settings.llm.endpoint.clone();

    let mut ready = true;

    let llm_status = match tokio::time::timeout(
        std::time::Duration::from_secs(2),
        reqwest::get(&llm_endpoint),
    )
    .await
    {
        Ok(Ok(_)) => "ok",
        Ok(Err(_)) => {
            ready = false;
            "unreachable"
        }
        Err(_) => {
            ready = false;
            "timeout"
        }
    };

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "checks": {
                "sessions": { "status": "ok", "count": session_count },
                "llm_backend": { "status": llm_status, "url": llm_endpoint },
            },
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use shopchat_agent::{ResponseStrategy, SessionManager};
    use shopchat_catalog::CatalogStore;
    use shopchat_config::Settings;
    use shopchat_core::{Category, Variant};

    struct EchoStrategy;

    #[async_trait]
    impl ResponseStrategy for EchoStrategy {
        async fn respond(&self, utterance: &str) -> ChatMessage {
            ChatMessage::bot(format!("echo: {}", utterance))
        }
    }

    fn test_state() -> AppState {
        let catalog = Arc::new(
            CatalogStore::new(
                vec![Product {
                    id: "t1".to_string(),
                    name: "black tee".to_string(),
                    description: "test".to_string(),
                    price: 1800,
                    category: Category::Tees,
                    color: "black".to_string(),
                    design: "plain".to_string(),
                    material: "cotton".to_string(),
                    style: "casual".to_string(),
                    rating: 4.0,
                    reviews: 10,
                    in_stock: true,
                    sizes: "M".to_string(),
                    variants: vec![Variant {
                        id: "t1-m".to_string(),
                        size: "M".to_string(),
                        price: 1800,
                        in_stock: true,
                    }],
                }],
                vec![],
                vec![],
            )
            .unwrap(),
        );
        let sessions = Arc::new(SessionManager::new(Arc::new(EchoStrategy), 4));
        AppState::new(Settings::default(), catalog, sessions)
    }

    #[test]
    fn test_router_creation() {
        let _ = create_router(test_state());
    }

    #[test]
    fn test_router_creation_with_configured_timeout() {
        let mut settings = Settings::default();
        settings.server.timeout_seconds = 1;
        let base = test_state();
        let state = AppState::new(settings, base.catalog.clone(), base.sessions.clone());
        let _ = create_router(state);

        // A zero timeout is clamped rather than panicking in the layer
        let mut settings = Settings::default();
        settings.server.timeout_seconds = 0;
        let state = AppState::new(settings, base.catalog, base.sessions);
        let _ = create_router(state);
    }

    #[tokio::test]
    async fn test_chat_through_handlers() {
        let state = test_state();
        let session = state.sessions.create().unwrap();

        let response = chat(
            State(state.clone()),
            Path(session.id().to_string()),
            Json(ChatRequest {
                message: "black tees".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.0.response, "echo: black tees");
        assert_eq!(response.0.turn_count, 1);
    }

    #[tokio::test]
    async fn test_chat_unknown_session_is_404() {
        let state = test_state();
        let result = chat(
            State(state),
            Path("missing".to_string()),
            Json(ChatRequest {
                message: "hi".to_string(),
            }),
        )
        .await;

        assert_eq!(result.unwrap_err().0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_product_is_displayable_404() {
        let state = test_state();
        let result = get_product(State(state), Path("missing".to_string())).await;

        let (status, body) = result.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0["product_id"], "missing");
    }

    #[test]
    fn test_agent_error_status_mapping() {
        assert_eq!(agent_error_status(&AgentError::Busy), StatusCode::CONFLICT);
        assert_eq!(
            agent_error_status(&AgentError::EmptyMessage),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            agent_error_status(&AgentError::TooManySessions(4)),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
