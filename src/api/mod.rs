//! HTTP API server.
//!
//! Bearer-token JSON REST with a single response envelope:
//! `{"status": "success", "data": ...}` on success,
//! `{"status": "error", "message": "..."}` on failure.

mod auth;
mod campaigns;
mod groups;
mod messages;
mod subscribers;
mod whatsapp;

#[cfg(test)]
pub(crate) mod testutil;

use crate::auth::{verify_token, Claims};
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, patch, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use wagon_core::config::{AuthConfig, Config};
use wagon_core::error::WagonError;
use wagon_core::traits::WhatsAppTransport;
use wagon_store::Store;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: Store,
    pub transport: Arc<dyn WhatsAppTransport>,
    pub auth: AuthConfig,
    pub country_code: String,
    pub uptime: Instant,
}

/// Error wrapper that renders the envelope with the right status code.
pub struct ApiError(pub WagonError);

impl From<WagonError> for ApiError {
    fn from(e: WagonError) -> Self {
        Self(e)
    }
}

/// HTTP status for a domain error.
fn status_for(e: &WagonError) -> StatusCode {
    match e {
        WagonError::Validation(_) => StatusCode::BAD_REQUEST,
        WagonError::Auth(_) => StatusCode::UNAUTHORIZED,
        WagonError::Permission(_) => StatusCode::FORBIDDEN,
        WagonError::NotFound(_) => StatusCode::NOT_FOUND,
        WagonError::Conflict(_) => StatusCode::CONFLICT,
        WagonError::EmptyTarget(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WagonError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
        WagonError::Channel(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("internal error: {}", self.0);
        }
        (
            status,
            Json(json!({"status": "error", "message": self.0.to_string()})),
        )
            .into_response()
    }
}

/// Wrap a payload in the success envelope.
pub fn success(data: Value) -> Json<Value> {
    Json(json!({"status": "success", "data": data}))
}

/// Check the bearer token and return its claims.
pub fn authenticate(headers: &HeaderMap, auth: &AuthConfig) -> Result<Claims, ApiError> {
    let header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| WagonError::Auth("missing Authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| WagonError::Auth("expected a bearer token".into()))?;

    Ok(verify_token(auth, token)?)
}

/// `GET /api/health` — unauthenticated liveness probe.
async fn health(
    axum::extract::State(state): axum::extract::State<ApiState>,
) -> Json<Value> {
    let uptime_secs = state.uptime.elapsed().as_secs();
    let wa = state.transport.status().await;
    Json(json!({
        "status": "success",
        "data": {
            "uptimeSecs": uptime_secs,
            "whatsapp": wa.state.display_name(),
        }
    }))
}

/// Build the axum router with shared state.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/profile", get(auth::profile))
        // Groups and members
        .route("/api/groups", get(groups::list).post(groups::create))
        .route("/api/groups/import-template", get(groups::import_template))
        .route(
            "/api/groups/{id}",
            get(groups::get_one)
                .put(groups::update)
                .delete(groups::remove),
        )
        .route(
            "/api/groups/{id}/members",
            get(groups::list_members).post(groups::add_members),
        )
        .route(
            "/api/groups/{id}/members/{member_id}",
            delete(groups::remove_member),
        )
        .route(
            "/api/groups/{id}/members/{member_id}/status",
            patch(groups::update_member_status),
        )
        .route("/api/groups/{id}/import", post(groups::import))
        .route("/api/groups/{id}/refresh", post(groups::refresh))
        // Subscribers
        .route(
            "/api/subscribers",
            get(subscribers::list).post(subscribers::create),
        )
        .route(
            "/api/subscribers/{id}",
            get(subscribers::get_one)
                .put(subscribers::update)
                .delete(subscribers::remove),
        )
        // Messages
        .route("/api/messages", get(messages::list))
        .route("/api/messages/send", post(messages::send))
        .route("/api/messages/{id}", get(messages::get_one))
        .route("/api/messages/{id}/status", patch(messages::update_status))
        // Campaigns
        .route(
            "/api/campaigns",
            get(campaigns::list).post(campaigns::create),
        )
        .route(
            "/api/campaigns/{id}",
            get(campaigns::get_one)
                .put(campaigns::update)
                .delete(campaigns::remove),
        )
        .route("/api/campaigns/{id}/send", post(campaigns::send))
        // WhatsApp session and live groups
        .route("/api/whatsapp/status", get(whatsapp::status))
        .route("/api/whatsapp/qr", get(whatsapp::qr))
        .route("/api/whatsapp/restart", post(whatsapp::restart))
        .route("/api/whatsapp/groups/create", post(whatsapp::create_group))
        .route("/api/whatsapp-groups", get(whatsapp::list_live_groups))
        .route(
            "/api/whatsapp-groups/{jid}/members",
            post(whatsapp::add_live_members),
        )
        .route(
            "/api/whatsapp-groups/{jid}/members/{participant}",
            delete(whatsapp::remove_live_member),
        )
        // Media uploads dominate request size; cap at the media limit plus headroom.
        .layer(axum::extract::DefaultBodyLimit::max(
            wagon_core::types::MAX_MEDIA_BYTES + 1024 * 1024,
        ))
        .with_state(state)
}

/// Start the API server.
pub async fn serve(
    config: &Config,
    store: Store,
    transport: Arc<dyn WhatsAppTransport>,
) -> Result<(), WagonError> {
    let state = ApiState {
        store,
        transport,
        auth: config.auth.clone(),
        country_code: config.whatsapp.default_country_code.clone(),
        uptime: Instant::now(),
    };

    let app = build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WagonError::Config(format!("failed to bind to {addr}: {e}")))?;

    info!("API server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| WagonError::Channel(format!("API server error: {e}")))?;
    Ok(())
}
