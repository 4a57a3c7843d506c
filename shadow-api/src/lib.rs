//! HTTP API for shadow terms.
//!
//! Routes:
//! - `POST /api/v1/associate` relates two posts (capability required)
//! - `POST /api/v1/events/mutation` and `POST /api/v1/events/delete` apply
//!   host lifecycle events (capability required)
//! - `GET /api/v1/posts/{id}/shadow` returns a post's derived shadow fields

use axum::{
    extract::{Path, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use shadow_storage::ShadowStore;
use shadow_sync::{AssociationRequest, AssociationResponse, ShadowEngine, ShadowFields, SyncError, Transition};
use shadow_types::{DeleteEvent, MutationEvent, PostId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Engine shared by every request handler.
pub type Engine = ShadowEngine<dyn ShadowStore>;

/// Decides whether a request may change associations or apply events.
pub trait Authorizer: Send + Sync {
    fn can_associate(&self, headers: &HeaderMap) -> bool;
}

/// Accepts requests carrying `Authorization: Bearer <token>`.
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl Authorizer for BearerToken {
    fn can_associate(&self, headers: &HeaderMap) -> bool {
        let Some(header) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
            return false;
        };
        let presented = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .unwrap_or("");
        !presented.is_empty() && presented == self.token
    }
}

/// Accepts every request. Used when no token is configured.
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn can_associate(&self, _headers: &HeaderMap) -> bool {
        true
    }
}

/// Listener and access settings for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind: String,
    /// Bearer token for guarded routes; `None` leaves them open.
    pub token: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            token: None,
        }
    }
}

impl ServiceConfig {
    pub fn authorizer(&self) -> Arc<dyn Authorizer> {
        match &self.token {
            Some(token) => Arc::new(BearerToken::new(token.clone())),
            None => Arc::new(AllowAll),
        }
    }
}

/// State behind the router.
pub struct AppState {
    engine: Engine,
    authorizer: Arc<dyn Authorizer>,
}

impl AppState {
    pub fn new(engine: Engine, authorizer: Arc<dyn Authorizer>) -> Self {
        Self { engine, authorizer }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

/// JSON body of every non-2xx response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

enum ApiError {
    Forbidden,
    NotFound(String),
    Internal(String),
}

impl From<SyncError> for ApiError {
    fn from(e: SyncError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "insufficient capability".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                warn!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Runs a storage-bound engine call off the async workers.
async fn run_blocking<T, F>(state: &Arc<AppState>, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Engine) -> Result<T, SyncError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state.engine))
        .await
        .map_err(|e| ApiError::Internal(format!("engine task failed: {e}")))?
        .map_err(ApiError::from)
}

async fn require_capability(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    if !state.authorizer.can_associate(request.headers()) {
        debug!("Rejected {} {}", request.method(), request.uri().path());
        return ApiError::Forbidden.into_response();
    }
    next.run(request).await
}

async fn associate_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AssociationRequest>,
) -> Result<Json<AssociationResponse>, ApiError> {
    let response = run_blocking(&state, move |engine| engine.associator().handle(&request)).await?;
    Ok(Json(response))
}

async fn shadow_fields_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ShadowFields>, ApiError> {
    let post_id = PostId::new(id);
    run_blocking(&state, move |engine| engine.shadow_fields(post_id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("post {post_id} not found")))
}

async fn mutation_handler(
    State(state): State<Arc<AppState>>,
    Json(event): Json<MutationEvent>,
) -> Result<Json<Transition>, ApiError> {
    let outcome = run_blocking(&state, move |engine| engine.lifecycle().apply_mutation(&event)).await?;
    Ok(Json(outcome))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Json(event): Json<DeleteEvent>,
) -> Result<Json<Transition>, ApiError> {
    let outcome = run_blocking(&state, move |engine| engine.lifecycle().apply_delete(&event)).await?;
    Ok(Json(outcome))
}

/// Build the HTTP API router with the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let guarded = Router::new()
        .route("/api/v1/associate", post(associate_handler))
        .route("/api/v1/events/mutation", post(mutation_handler))
        .route("/api/v1/events/delete", post(delete_handler))
        .route_layer(middleware::from_fn_with_state(Arc::clone(&state), require_capability));

    Router::new()
        .route("/api/v1/posts/{id}/shadow", get(shadow_fields_handler))
        .merge(guarded)
        .with_state(state)
}
