//! Session lifecycle and live-group handlers.

use super::{authenticate, success, ApiError, ApiState};
use crate::roster;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Json;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use wagon_core::error::WagonError;
use wagon_core::phone::{is_group_jid, normalize_phone, user_jid};

/// `GET /api/whatsapp/status`
pub async fn status(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let status = state.transport.status().await;
    Ok(success(serde_json::to_value(status).map_err(WagonError::from)?))
}

/// `GET /api/whatsapp/qr` — base64 PNG of the current pairing QR.
///
/// 404 while no QR is pending (not yet generated, or already paired).
pub async fn qr(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let png = state
        .transport
        .qr_png()
        .await?
        .ok_or_else(|| WagonError::NotFound("no pairing QR available".into()))?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    Ok(success(json!({"qr": encoded, "mimeType": "image/png"})))
}

/// `POST /api/whatsapp/restart` — drop the session and start pairing fresh.
pub async fn restart(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    state.transport.restart().await?;
    info!("whatsapp session restart requested");
    Ok(success(json!({"restarted": true})))
}

#[derive(Debug, Deserialize)]
pub struct CreateLiveGroupRequest {
    pub name: String,
    /// Phone numbers of the initial participants.
    #[serde(default)]
    pub participants: Vec<String>,
}

/// `POST /api/whatsapp/groups/create`
pub async fn create_group(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Json(req): Json<CreateLiveGroupRequest>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    if req.name.trim().is_empty() {
        return Err(WagonError::Validation("group name must not be empty".into()).into());
    }
    let mut jids = Vec::with_capacity(req.participants.len());
    for raw in &req.participants {
        let number = normalize_phone(raw, &state.country_code)?;
        jids.push(user_jid(&number));
    }
    let group = state.transport.create_group(req.name.trim(), jids).await?;
    info!("created whatsapp group '{}' ({})", group.name, group.jid);
    Ok(success(json!({"group": group})))
}

/// `GET /api/whatsapp-groups` — live groups the account is in.
pub async fn list_live_groups(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let groups = roster::list_real_groups(&state.transport).await?;
    Ok(success(json!({"groups": groups})))
}

#[derive(Debug, Deserialize)]
pub struct AddLiveMembersRequest {
    pub numbers: Vec<String>,
}

/// `POST /api/whatsapp-groups/{jid}/members`
pub async fn add_live_members(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(jid): Path<String>,
    Json(req): Json<AddLiveMembersRequest>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    if !is_group_jid(&jid) {
        return Err(WagonError::Validation(format!("'{jid}' is not a group JID")).into());
    }
    if req.numbers.is_empty() {
        return Err(WagonError::Validation("numbers list must not be empty".into()).into());
    }
    let report =
        roster::add_live_members(&state.transport, &state.country_code, &jid, &req.numbers)
            .await?;
    Ok(success(serde_json::to_value(report).map_err(WagonError::from)?))
}

/// `DELETE /api/whatsapp-groups/{jid}/members/{participant}`
///
/// `participant` may be a phone number or a full user JID.
pub async fn remove_live_member(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path((jid, participant)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    if !is_group_jid(&jid) {
        return Err(WagonError::Validation(format!("'{jid}' is not a group JID")).into());
    }
    let participant_jid = if participant.contains('@') {
        participant.clone()
    } else {
        user_jid(&normalize_phone(&participant, &state.country_code)?)
    };
    roster::remove_live_member(&state.transport, &jid, &participant_jid).await?;
    Ok(success(json!({"removed": participant_jid})))
}
