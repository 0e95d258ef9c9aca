//! Subscriber CRUD handlers.

use super::groups::ListQuery;
use super::{authenticate, success, ApiError, ApiState};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use wagon_core::error::WagonError;
use wagon_core::phone::normalize_phone;
use wagon_store::SubscriberUpdate;

#[derive(Debug, Deserialize)]
pub struct CreateSubscriberRequest {
    pub name: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    pub email: Option<String>,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubscriberRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::groups::double_option")]
    pub email: Option<Option<String>>,
    pub status: Option<String>,
    pub tags: Option<String>,
    pub notes: Option<String>,
}

/// `GET /api/subscribers`
pub async fn list(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let page = state
        .store
        .list_subscribers(
            query.page,
            query.limit,
            query.search.as_deref(),
            query.status.as_deref(),
        )
        .await?;
    Ok(success(json!({
        "items": page.items,
        "pagination": page.pagination,
    })))
}

/// `POST /api/subscribers`
pub async fn create(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Json(req): Json<CreateSubscriberRequest>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    if req.name.trim().is_empty() {
        return Err(WagonError::Validation("subscriber name must not be empty".into()).into());
    }
    let number = normalize_phone(&req.phone_number, &state.country_code)?;
    let subscriber = state
        .store
        .create_subscriber(
            req.name.trim(),
            &number,
            req.email.as_deref(),
            None,
            &req.tags,
            &req.notes,
        )
        .await?;
    Ok(success(json!({"subscriber": subscriber})))
}

/// `GET /api/subscribers/{id}`
pub async fn get_one(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let subscriber = state.store.get_subscriber(&id).await?;
    Ok(success(json!({"subscriber": subscriber})))
}

/// `PUT /api/subscribers/{id}` — partial update.
pub async fn update(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSubscriberRequest>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let subscriber = state
        .store
        .update_subscriber(
            &id,
            SubscriberUpdate {
                name: req.name,
                email: req.email,
                status: req.status,
                tags: req.tags,
                notes: req.notes,
            },
        )
        .await?;
    Ok(success(json!({"subscriber": subscriber})))
}

/// `DELETE /api/subscribers/{id}`
pub async fn remove(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    state.store.delete_subscriber(&id).await?;
    Ok(success(json!({"deleted": id})))
}
