//! Campaign CRUD and the send trigger.

use super::groups::ListQuery;
use super::{authenticate, success, ApiError, ApiState};
use crate::campaign::run_campaign;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use wagon_core::error::WagonError;
use wagon_store::CampaignUpdate;

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    #[serde(rename = "messageTemplate")]
    pub message_template: String,
    /// Only `subscribers` fan-out exists today.
    #[serde(rename = "targetType", default = "default_target_type")]
    pub target_type: String,
    #[serde(rename = "scheduledAt")]
    pub scheduled_at: Option<String>,
}

fn default_target_type() -> String {
    "subscribers".into()
}

#[derive(Debug, Deserialize)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    #[serde(rename = "messageTemplate")]
    pub message_template: Option<String>,
    pub status: Option<String>,
    /// Absent leaves the schedule alone; explicit `null` unschedules.
    #[serde(
        rename = "scheduledAt",
        default,
        deserialize_with = "super::groups::double_option"
    )]
    pub scheduled_at: Option<Option<String>>,
}

fn validate_schedule(value: &str) -> Result<(), WagonError> {
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|_| ())
        .map_err(|_| {
            WagonError::Validation(format!(
                "'{value}' is not a valid schedule, expected YYYY-MM-DD HH:MM:SS"
            ))
        })
}

/// `GET /api/campaigns`
pub async fn list(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let page = state
        .store
        .list_campaigns(query.page, query.limit, query.status.as_deref())
        .await?;
    Ok(success(json!({
        "items": page.items,
        "pagination": page.pagination,
    })))
}

/// `POST /api/campaigns`
pub async fn create(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    if req.name.trim().is_empty() {
        return Err(WagonError::Validation("campaign name must not be empty".into()).into());
    }
    if req.message_template.trim().is_empty() {
        return Err(WagonError::Validation("message template must not be empty".into()).into());
    }
    if req.target_type != "subscribers" {
        return Err(WagonError::Validation(format!(
            "unknown target type '{}', only 'subscribers' is supported",
            req.target_type
        ))
        .into());
    }
    if let Some(at) = &req.scheduled_at {
        validate_schedule(at)?;
    }
    let campaign = state
        .store
        .create_campaign(
            req.name.trim(),
            &req.message_template,
            &req.target_type,
            req.scheduled_at.as_deref(),
        )
        .await?;
    Ok(success(json!({"campaign": campaign})))
}

/// `GET /api/campaigns/{id}`
pub async fn get_one(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let campaign = state.store.get_campaign(&id).await?;
    Ok(success(json!({"campaign": campaign})))
}

/// `PUT /api/campaigns/{id}` — partial update.
pub async fn update(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCampaignRequest>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    if let Some(Some(at)) = &req.scheduled_at {
        validate_schedule(at)?;
    }
    // Scheduling a draft moves it to the scheduler's queue.
    let status = match (&req.status, &req.scheduled_at) {
        (None, Some(Some(_))) => Some("scheduled".to_string()),
        _ => req.status,
    };
    let campaign = state
        .store
        .update_campaign(
            &id,
            CampaignUpdate {
                name: req.name,
                message_template: req.message_template,
                target_type: None,
                status,
                scheduled_at: req.scheduled_at,
            },
        )
        .await?;
    Ok(success(json!({"campaign": campaign})))
}

/// `DELETE /api/campaigns/{id}`
pub async fn remove(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    state.store.delete_campaign(&id).await?;
    Ok(success(json!({"deleted": id})))
}

/// `POST /api/campaigns/{id}/send` — run the campaign now.
pub async fn send(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let campaign = run_campaign(&state.store, &state.transport, &state.country_code, &id).await?;
    Ok(success(json!({"campaign": campaign})))
}
