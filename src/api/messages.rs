//! Message history and the outbound dispatch endpoint.

use super::groups::ListQuery;
use super::{authenticate, success, ApiError, ApiState};
use crate::dispatch::{dispatch, DispatchTarget};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use wagon_core::error::WagonError;
use wagon_core::types::OutboundContent;

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    /// `individual`, `group` (database group fan-out), or `whatsapp-group`.
    #[serde(rename = "targetType")]
    pub target_type: String,
    /// Phone number, group id, or group JID depending on `targetType`.
    pub target: String,
    /// `text`, `link`, or `media`. Defaults to `text`.
    #[serde(rename = "type", default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub text: String,
    pub url: Option<String>,
    /// Base64-encoded attachment body.
    pub media: Option<String>,
    #[serde(rename = "mimeType")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub caption: String,
}

fn default_content_type() -> String {
    "text".into()
}

fn parse_target(req: &SendRequest) -> Result<DispatchTarget, WagonError> {
    match req.target_type.as_str() {
        "individual" => Ok(DispatchTarget::Individual(req.target.clone())),
        "group" => Ok(DispatchTarget::DbGroup(req.target.clone())),
        "whatsapp-group" => Ok(DispatchTarget::LiveGroup(req.target.clone())),
        other => Err(WagonError::Validation(format!(
            "unknown target type '{other}', expected individual, group, or whatsapp-group"
        ))),
    }
}

fn parse_content(req: &SendRequest) -> Result<OutboundContent, WagonError> {
    match req.content_type.as_str() {
        "text" => {
            if req.text.trim().is_empty() {
                return Err(WagonError::Validation("message text must not be empty".into()));
            }
            Ok(OutboundContent::Text(req.text.clone()))
        }
        "link" => {
            let url = req
                .url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| WagonError::Validation("link messages need a url".into()))?;
            Ok(OutboundContent::Link {
                text: req.text.clone(),
                url: url.to_string(),
            })
        }
        "media" => {
            let encoded = req
                .media
                .as_deref()
                .ok_or_else(|| WagonError::Validation("media messages need a body".into()))?;
            let mime = req
                .mime_type
                .as_deref()
                .ok_or_else(|| WagonError::Validation("media messages need a mimeType".into()))?;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| WagonError::Validation(format!("invalid base64 media: {e}")))?;
            Ok(OutboundContent::Media {
                bytes,
                mime: mime.to_string(),
                caption: req.caption.clone(),
            })
        }
        other => Err(WagonError::Validation(format!(
            "unknown message type '{other}', expected text, link, or media"
        ))),
    }
}

/// `POST /api/messages/send`
pub async fn send(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Json(req): Json<SendRequest>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let target = parse_target(&req)?;
    let content = parse_content(&req)?;
    let report = dispatch(
        &state.store,
        &state.transport,
        &state.country_code,
        target,
        content,
    )
    .await?;
    Ok(success(serde_json::to_value(report).map_err(WagonError::from)?))
}

/// `GET /api/messages`
pub async fn list(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let page = state
        .store
        .list_messages(query.page, query.limit, query.status.as_deref())
        .await?;
    Ok(success(json!({
        "items": page.items,
        "pagination": page.pagination,
    })))
}

/// `GET /api/messages/{id}`
pub async fn get_one(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let message = state.store.get_message(&id).await?;
    Ok(success(json!({"message": message})))
}

#[derive(Debug, Deserialize)]
pub struct MessageStatusRequest {
    pub status: String,
    pub error: Option<String>,
}

/// `PATCH /api/messages/{id}/status` — delivery receipt hook.
pub async fn update_status(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<MessageStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let message = state
        .store
        .update_message_status(&id, &req.status, None, req.error.as_deref())
        .await?;
    Ok(success(json!({"message": message})))
}
