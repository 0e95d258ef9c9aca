//! Group and member handlers, including spreadsheet import.

use super::{authenticate, success, ApiError, ApiState};
use crate::roster;
use crate::spreadsheet::{parse_member_rows, IMPORT_TEMPLATE_CSV};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use wagon_core::error::WagonError;
use wagon_core::phone::user_jid;
use wagon_store::GroupUpdate;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub search: Option<String>,
    pub status: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "waGroupJid")]
    pub wa_group_jid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Absent leaves the link alone; explicit `null` unlinks.
    #[serde(rename = "waGroupJid", default, deserialize_with = "double_option")]
    pub wa_group_jid: Option<Option<String>>,
    pub status: Option<String>,
}

/// Distinguish an absent field from an explicit `null`.
pub(super) fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// `GET /api/groups`
pub async fn list(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let page = state
        .store
        .list_groups(query.page, query.limit, query.search.as_deref())
        .await?;
    Ok(success(json!({
        "items": page.items,
        "pagination": page.pagination,
    })))
}

/// `POST /api/groups`
pub async fn create(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    if req.name.trim().is_empty() {
        return Err(WagonError::Validation("group name must not be empty".into()).into());
    }
    let group = state
        .store
        .create_group(req.name.trim(), &req.description, req.wa_group_jid.as_deref())
        .await?;
    Ok(success(json!({"group": group})))
}

/// `GET /api/groups/{id}`
pub async fn get_one(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let group = state.store.get_group(&id).await?;
    Ok(success(json!({"group": group})))
}

/// `PUT /api/groups/{id}` — partial update.
pub async fn update(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let group = state
        .store
        .update_group(
            &id,
            GroupUpdate {
                name: req.name,
                description: req.description,
                wa_group_jid: req.wa_group_jid,
                status: req.status,
            },
        )
        .await?;
    Ok(success(json!({"group": group})))
}

/// `DELETE /api/groups/{id}`
pub async fn remove(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    state.store.delete_group(&id).await?;
    Ok(success(json!({"deleted": id})))
}

/// `GET /api/groups/{id}/members`
pub async fn list_members(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let page = state
        .store
        .list_members(&id, query.page, query.limit, query.status.as_deref())
        .await?;
    Ok(success(json!({
        "items": page.items,
        "pagination": page.pagination,
    })))
}

#[derive(Debug, Deserialize)]
pub struct MemberEntry {
    #[serde(default)]
    pub name: String,
    pub number: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMembersRequest {
    pub members: Vec<MemberEntry>,
}

/// `POST /api/groups/{id}/members` — bulk add to the linked live group.
pub async fn add_members(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<AddMembersRequest>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    if req.members.is_empty() {
        return Err(WagonError::Validation("members list must not be empty".into()).into());
    }
    let entries: Vec<(String, String)> = req
        .members
        .into_iter()
        .map(|m| {
            let name = if m.name.trim().is_empty() {
                m.number.clone()
            } else {
                m.name.trim().to_string()
            };
            (name, m.number)
        })
        .collect();
    let report = roster::add_members(
        &state.store,
        &state.transport,
        &state.country_code,
        &id,
        &entries,
    )
    .await?;
    Ok(success(serde_json::to_value(report).map_err(WagonError::from)?))
}

/// `DELETE /api/groups/{id}/members/{member_id}`
///
/// Removes the database row; when the group is linked, the member is active,
/// and the session is up, the participant is removed from the live group
/// first. Admin failures propagate; a participant already gone is fine.
pub async fn remove_member(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path((id, member_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let group = state.store.get_group(&id).await?;
    let member = state.store.get_member(&member_id).await?;
    if member.group_id != group.id {
        return Err(
            WagonError::NotFound(format!("member {member_id} is not in group {id}")).into(),
        );
    }

    if let Some(jid) = group.wa_group_jid.as_deref() {
        if member.status == "active" && state.transport.status().await.is_ready {
            match roster::remove_live_member(
                &state.transport,
                jid,
                &user_jid(&member.member_number),
            )
            .await
            {
                Ok(()) | Err(WagonError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    state.store.delete_member(&member_id).await?;
    Ok(success(json!({"deleted": member_id})))
}

#[derive(Debug, Deserialize)]
pub struct MemberStatusRequest {
    pub status: String,
}

/// `PATCH /api/groups/{id}/members/{member_id}/status`
pub async fn update_member_status(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path((id, member_id)): Path<(String, String)>,
    Json(req): Json<MemberStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let member = state.store.get_member(&member_id).await?;
    if member.group_id != id {
        return Err(
            WagonError::NotFound(format!("member {member_id} is not in group {id}")).into(),
        );
    }
    let member = state.store.update_member_status(&member_id, &req.status).await?;
    Ok(success(json!({"member": member})))
}

/// `POST /api/groups/{id}/import` — multipart xlsx/xls upload.
pub async fn import(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;

    let mut file_bytes: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WagonError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| WagonError::Validation(format!("failed to read upload: {e}")))?;
            file_bytes = Some(bytes.to_vec());
        }
    }
    let bytes =
        file_bytes.ok_or_else(|| WagonError::Validation("missing 'file' field".into()))?;

    let rows = parse_member_rows(&bytes)?;
    let report = roster::import_members(
        &state.store,
        &state.transport,
        &state.country_code,
        &id,
        rows,
    )
    .await?;
    Ok(success(serde_json::to_value(report).map_err(WagonError::from)?))
}

/// `POST /api/groups/{id}/refresh` — reconcile member_count with reality.
pub async fn refresh(
    headers: HeaderMap,
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authenticate(&headers, &state.auth)?;
    let count = roster::refresh_group(&state.store, &state.transport, &id).await?;
    Ok(success(json!({"memberCount": count})))
}

/// `GET /api/groups/import-template` — CSV sample for the import format.
pub async fn import_template(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Response, ApiError> {
    authenticate(&headers, &state.auth)?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"members-template.csv\"",
            ),
        ],
        IMPORT_TEMPLATE_CSV,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::super::testutil::{body_json, register_and_token, test_app, MockTransport};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const SELF_JID: &str = "923330000000@s.whatsapp.net";
    const GROUP_JID: &str = "120363012345678901@g.us";

    fn authed(method: &str, uri: &str, token: &str, body: Option<&str>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"));
        match body {
            Some(b) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    /// Connected transport where the account is an admin of GROUP_JID.
    fn admin_transport() -> MockTransport {
        MockTransport::connected()
            .with_self_jid(SELF_JID)
            .with_group(
                GROUP_JID,
                "Launch Wave",
                vec![MockTransport::participant(SELF_JID, true)],
            )
    }

    #[tokio::test]
    async fn test_group_crud_roundtrip() {
        let (app, _state) = test_app(MockTransport::connected()).await;
        let token = register_and_token(&app).await;

        let resp = app
            .clone()
            .oneshot(authed(
                "POST",
                "/api/groups",
                &token,
                Some(r#"{"name":"Retailers","description":"North region"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let created = body_json(resp).await;
        let id = created["data"]["group"]["id"].as_str().unwrap().to_string();

        let resp = app
            .clone()
            .oneshot(authed(
                "PUT",
                &format!("/api/groups/{id}"),
                &token,
                Some(r#"{"name":"Retailers North"}"#),
            ))
            .await
            .unwrap();
        let updated = body_json(resp).await;
        assert_eq!(updated["data"]["group"]["name"], "Retailers North");
        // Untouched fields survive a partial update.
        assert_eq!(updated["data"]["group"]["description"], "North region");

        let resp = app
            .clone()
            .oneshot(authed("GET", "/api/groups?search=north", &token, None))
            .await
            .unwrap();
        let listed = body_json(resp).await;
        assert_eq!(listed["data"]["pagination"]["totalItems"], 1);

        let resp = app
            .clone()
            .oneshot(authed("DELETE", &format!("/api/groups/{id}"), &token, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(authed("GET", &format!("/api/groups/{id}"), &token, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_with_null_jid_unlinks() {
        let (app, state) = test_app(MockTransport::connected()).await;
        let token = register_and_token(&app).await;
        let group = state
            .store
            .create_group("Linked", "", Some(GROUP_JID))
            .await
            .unwrap();

        let resp = app
            .clone()
            .oneshot(authed(
                "PUT",
                &format!("/api/groups/{}", group.id),
                &token,
                Some(r#"{"waGroupJid":null}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert!(json["data"]["group"]["wa_group_jid"].is_null());

        // A body without the field leaves the link alone.
        let relinked = state
            .store
            .update_group(
                &group.id,
                wagon_store::GroupUpdate {
                    wa_group_jid: Some(Some(GROUP_JID.into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(relinked.wa_group_jid.as_deref(), Some(GROUP_JID));
        let resp = app
            .oneshot(authed(
                "PUT",
                &format!("/api/groups/{}", group.id),
                &token,
                Some(r#"{"name":"Still linked"}"#),
            ))
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["data"]["group"]["wa_group_jid"], GROUP_JID);
    }

    #[tokio::test]
    async fn test_bulk_add_counts_malformed_without_aborting() {
        let (app, state) = test_app(admin_transport()).await;
        let token = register_and_token(&app).await;
        let group = state
            .store
            .create_group("Wave", "", Some(GROUP_JID))
            .await
            .unwrap();

        // 5 entries, 2 malformed.
        let body = r#"{"members":[
            {"name":"A","number":"03001234567"},
            {"name":"B","number":"not-a-number"},
            {"name":"C","number":"+92 300 765 4321"},
            {"name":"D","number":""},
            {"name":"E","number":"3009998877"}
        ]}"#;
        let resp = app
            .clone()
            .oneshot(authed(
                "POST",
                &format!("/api/groups/{}/members", group.id),
                &token,
                Some(body),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let data = &json["data"];
        assert_eq!(data["results"].as_array().unwrap().len(), 5);
        assert_eq!(data["failed"], 2);
        assert_eq!(data["successful"], 3);

        // Only the valid numbers landed as member rows, normalized and active.
        let page = state.store.list_members(&group.id, 1, 50, None).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(page
            .items
            .iter()
            .any(|m| m.member_number == "923001234567" && m.status == "active"));
    }

    #[tokio::test]
    async fn test_bulk_add_classifies_protocol_outcomes() {
        let transport = admin_transport()
            .with_add_error("923007654321@s.whatsapp.net", 403)
            .with_add_error("923009998877@s.whatsapp.net", 409)
            .with_add_error("923001112233@s.whatsapp.net", 429);
        let (app, state) = test_app(transport).await;
        let token = register_and_token(&app).await;
        let group = state
            .store
            .create_group("Wave", "", Some(GROUP_JID))
            .await
            .unwrap();

        let body = r#"{"members":[
            {"name":"Direct","number":"03001234567"},
            {"name":"Private","number":"03007654321"},
            {"name":"Already","number":"03009998877"},
            {"name":"Limited","number":"03001112233"}
        ]}"#;
        let resp = app
            .clone()
            .oneshot(authed(
                "POST",
                &format!("/api/groups/{}/members", group.id),
                &token,
                Some(body),
            ))
            .await
            .unwrap();
        let json = body_json(resp).await;
        let data = &json["data"];
        assert_eq!(data["successful"], 1);
        assert_eq!(data["invited"], 1);
        assert_eq!(data["alreadyMember"], 1);
        assert_eq!(data["failed"], 1);

        // Outcome maps onto row status.
        let invited = state
            .store
            .find_member_by_number(&group.id, "923007654321")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(invited.status, "pending");
        let limited = state
            .store
            .find_member_by_number(&group.id, "923001112233")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(limited.status, "rejected");
    }

    #[tokio::test]
    async fn test_bulk_add_requires_linked_group() {
        let (app, state) = test_app(admin_transport()).await;
        let token = register_and_token(&app).await;
        let group = state.store.create_group("Unlinked", "", None).await.unwrap();

        let resp = app
            .oneshot(authed(
                "POST",
                &format!("/api/groups/{}/members", group.id),
                &token,
                Some(r#"{"members":[{"name":"A","number":"03001234567"}]}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bulk_add_without_admin_rights_is_403() {
        let transport = MockTransport::connected()
            .with_self_jid(SELF_JID)
            .with_group(
                GROUP_JID,
                "Not ours",
                vec![MockTransport::participant(SELF_JID, false)],
            );
        let (app, state) = test_app(transport).await;
        let token = register_and_token(&app).await;
        let group = state
            .store
            .create_group("Wave", "", Some(GROUP_JID))
            .await
            .unwrap();

        let resp = app
            .oneshot(authed(
                "POST",
                &format!("/api/groups/{}/members", group.id),
                &token,
                Some(r#"{"members":[{"name":"A","number":"03001234567"}]}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_member_status_patch_validates() {
        let (app, state) = test_app(MockTransport::connected()).await;
        let token = register_and_token(&app).await;
        let group = state.store.create_group("G", "", None).await.unwrap();
        let member = state
            .store
            .add_member(&group.id, "A", "923001234567")
            .await
            .unwrap();

        let uri = format!("/api/groups/{}/members/{}/status", group.id, member.id);
        let resp = app
            .clone()
            .oneshot(authed("PATCH", &uri, &token, Some(r#"{"status":"banned"}"#)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = app
            .clone()
            .oneshot(authed("PATCH", &uri, &token, Some(r#"{"status":"active"}"#)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["member"]["status"], "active");

        // Activation is reflected in the group counter.
        let group = state.store.get_group(&group.id).await.unwrap();
        assert_eq!(group.member_count, 1);
    }

    #[tokio::test]
    async fn test_member_status_patch_checks_group_ownership() {
        let (app, state) = test_app(MockTransport::connected()).await;
        let token = register_and_token(&app).await;
        let group_a = state.store.create_group("A", "", None).await.unwrap();
        let group_b = state.store.create_group("B", "", None).await.unwrap();
        let member = state
            .store
            .add_member(&group_a.id, "X", "923001234567")
            .await
            .unwrap();

        let uri = format!("/api/groups/{}/members/{}/status", group_b.id, member.id);
        let resp = app
            .oneshot(authed("PATCH", &uri, &token, Some(r#"{"status":"active"}"#)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_remove_member_without_admin_keeps_row() {
        // Linked group, active member, but the account is not an admin.
        let member_jid = "923001234567@s.whatsapp.net";
        let transport = MockTransport::connected()
            .with_self_jid(SELF_JID)
            .with_group(
                GROUP_JID,
                "Not ours",
                vec![
                    MockTransport::participant(SELF_JID, false),
                    MockTransport::participant(member_jid, false),
                ],
            );
        let (app, state) = test_app(transport).await;
        let token = register_and_token(&app).await;
        let group = state
            .store
            .create_group("Wave", "", Some(GROUP_JID))
            .await
            .unwrap();
        let member = state
            .store
            .add_member(&group.id, "A", "923001234567")
            .await
            .unwrap();
        state
            .store
            .update_member_status(&member.id, "active")
            .await
            .unwrap();

        let resp = app
            .oneshot(authed(
                "DELETE",
                &format!("/api/groups/{}/members/{}", group.id, member.id),
                &token,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(state.store.get_member(&member.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_remove_member_tolerates_participant_already_gone() {
        // Admin of the live group, but the member left it on their own.
        let (app, state) = test_app(admin_transport()).await;
        let token = register_and_token(&app).await;
        let group = state
            .store
            .create_group("Wave", "", Some(GROUP_JID))
            .await
            .unwrap();
        let member = state
            .store
            .add_member(&group.id, "A", "923001234567")
            .await
            .unwrap();
        state
            .store
            .update_member_status(&member.id, "active")
            .await
            .unwrap();

        let resp = app
            .oneshot(authed(
                "DELETE",
                &format!("/api/groups/{}/members/{}", group.id, member.id),
                &token,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(state.store.get_member(&member.id).await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_uses_live_count_for_linked_group() {
        let transport = MockTransport::connected()
            .with_self_jid(SELF_JID)
            .with_group(
                GROUP_JID,
                "Wave",
                vec![
                    MockTransport::participant(SELF_JID, true),
                    MockTransport::participant("923001111111@s.whatsapp.net", false),
                    MockTransport::participant("923002222222@s.whatsapp.net", false),
                ],
            );
        let (app, state) = test_app(transport).await;
        let token = register_and_token(&app).await;
        let group = state
            .store
            .create_group("Wave", "", Some(GROUP_JID))
            .await
            .unwrap();

        let resp = app
            .oneshot(authed(
                "POST",
                &format!("/api/groups/{}/refresh", group.id),
                &token,
                None,
            ))
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["data"]["memberCount"], 3);
        assert_eq!(state.store.get_group(&group.id).await.unwrap().member_count, 3);
    }

    #[tokio::test]
    async fn test_import_rejects_missing_file_field() {
        let (app, state) = test_app(MockTransport::connected()).await;
        let token = register_and_token(&app).await;
        let group = state.store.create_group("G", "", None).await.unwrap();

        let boundary = "wagon-test-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nnope\r\n--{boundary}--\r\n"
        );
        let req = Request::post(format!("/api/groups/{}/import", group.id))
            .header("Authorization", format!("Bearer {token}"))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_import_template_is_csv() {
        let (app, _state) = test_app(MockTransport::connected()).await;
        let token = register_and_token(&app).await;
        let resp = app
            .oneshot(authed("GET", "/api/groups/import-template", &token, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/csv"
        );
        let body = resp.into_body();
        use http_body_util::BodyExt;
        let bytes = body.collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("name,phone"));
    }

    #[tokio::test]
    async fn test_group_routes_require_token() {
        let (app, _state) = test_app(MockTransport::connected()).await;
        let resp = app
            .oneshot(Request::get("/api/groups").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
