use super::*;
use crate::models::Campaign;
use crate::store::{CampaignUpdate, GroupUpdate, SubscriberUpdate};
use wagon_core::error::WagonError;

async fn test_store() -> Store {
    Store::in_memory().await.unwrap()
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let store = test_store().await;
    Store::run_migrations(store.pool()).await.unwrap();
    Store::run_migrations(store.pool()).await.unwrap();
}

#[tokio::test]
async fn create_and_find_user() {
    let store = test_store().await;
    let user = store
        .create_user("ops@example.com", "$argon2id$fake", "Ops")
        .await
        .unwrap();
    assert_eq!(user.email, "ops@example.com");
    assert_eq!(user.role, "user");

    let found = store.find_user_by_email("ops@example.com").await.unwrap();
    assert_eq!(found.unwrap().id, user.id);

    let missing = store.find_user_by_email("nobody@example.com").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let store = test_store().await;
    store
        .create_user("dup@example.com", "h1", "First")
        .await
        .unwrap();
    let err = store
        .create_user("dup@example.com", "h2", "Second")
        .await
        .unwrap_err();
    assert!(matches!(err, WagonError::Conflict(_)));
}

#[tokio::test]
async fn group_crud_and_partial_update() {
    let store = test_store().await;
    let group = store
        .create_group("Launch", "launch group", None)
        .await
        .unwrap();
    assert_eq!(group.status, "active");
    assert_eq!(group.member_count, 0);

    // Only the named field changes.
    let updated = store
        .update_group(
            &group.id,
            GroupUpdate {
                description: Some("updated".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Launch");
    assert_eq!(updated.description, "updated");

    let linked = store
        .update_group(
            &group.id,
            GroupUpdate {
                wa_group_jid: Some(Some("123456789@g.us".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(linked.wa_group_jid.as_deref(), Some("123456789@g.us"));

    let by_jid = store.find_group_by_jid("123456789@g.us").await.unwrap();
    assert_eq!(by_jid.unwrap().id, group.id);

    store.delete_group(&group.id).await.unwrap();
    let err = store.get_group(&group.id).await.unwrap_err();
    assert!(matches!(err, WagonError::NotFound(_)));
}

#[tokio::test]
async fn invalid_group_status_rejected() {
    let store = test_store().await;
    let group = store.create_group("G", "", None).await.unwrap();
    let err = store
        .update_group(
            &group.id,
            GroupUpdate {
                status: Some("bogus".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WagonError::Validation(_)));
}

#[tokio::test]
async fn update_missing_group_is_not_found() {
    let store = test_store().await;
    let err = store
        .update_group(
            "no-such-id",
            GroupUpdate {
                name: Some("x".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WagonError::NotFound(_)));
}

#[tokio::test]
async fn member_lifecycle_and_count_refresh() {
    let store = test_store().await;
    let group = store.create_group("G", "", None).await.unwrap();

    let m1 = store
        .add_member(&group.id, "Alice", "923001234567")
        .await
        .unwrap();
    let m2 = store
        .add_member(&group.id, "Bob", "923007654321")
        .await
        .unwrap();
    assert_eq!(m1.status, "pending");

    store.update_member_status(&m1.id, "active").await.unwrap();
    store.update_member_status(&m2.id, "rejected").await.unwrap();

    let group = store.get_group(&group.id).await.unwrap();
    assert_eq!(group.member_count, 1);

    let numbers = store.active_member_numbers(&group.id).await.unwrap();
    assert_eq!(numbers, vec!["923001234567".to_string()]);

    store.delete_member(&m1.id).await.unwrap();
    let group = store.get_group(&group.id).await.unwrap();
    assert_eq!(group.member_count, 0);
}

#[tokio::test]
async fn invalid_member_status_rejected() {
    let store = test_store().await;
    let group = store.create_group("G", "", None).await.unwrap();
    let member = store
        .add_member(&group.id, "Alice", "923001234567")
        .await
        .unwrap();
    let err = store
        .update_member_status(&member.id, "banned")
        .await
        .unwrap_err();
    assert!(matches!(err, WagonError::Validation(_)));
    // Row untouched.
    let member = store.get_member(&member.id).await.unwrap();
    assert_eq!(member.status, "pending");
}

#[tokio::test]
async fn add_member_to_missing_group_is_not_found() {
    let store = test_store().await;
    let err = store
        .add_member("no-such-group", "Alice", "923001234567")
        .await
        .unwrap_err();
    assert!(matches!(err, WagonError::NotFound(_)));
}

#[tokio::test]
async fn member_list_filters_by_status() {
    let store = test_store().await;
    let group = store.create_group("G", "", None).await.unwrap();
    for i in 0..3 {
        let m = store
            .add_member(&group.id, &format!("M{i}"), &format!("92300000000{i}"))
            .await
            .unwrap();
        if i == 0 {
            store.update_member_status(&m.id, "active").await.unwrap();
        }
    }

    let all = store.list_members(&group.id, 1, 50, None).await.unwrap();
    assert_eq!(all.pagination.total_items, 3);

    let active = store
        .list_members(&group.id, 1, 50, Some("active"))
        .await
        .unwrap();
    assert_eq!(active.pagination.total_items, 1);
    assert_eq!(active.items[0].member_name, "M0");
}

#[tokio::test]
async fn deleting_group_cascades_members() {
    let store = test_store().await;
    let group = store.create_group("G", "", None).await.unwrap();
    let member = store
        .add_member(&group.id, "Alice", "923001234567")
        .await
        .unwrap();
    store.delete_group(&group.id).await.unwrap();
    let err = store.get_member(&member.id).await.unwrap_err();
    assert!(matches!(err, WagonError::NotFound(_)));
}

#[tokio::test]
async fn subscriber_unique_phone_and_search() {
    let store = test_store().await;
    store
        .create_subscriber("Alice", "923001234567", Some("a@example.com"), None, "", "")
        .await
        .unwrap();
    store
        .create_subscriber("Bob", "923007654321", None, None, "vip", "")
        .await
        .unwrap();

    let err = store
        .create_subscriber("Alice Again", "923001234567", None, None, "", "")
        .await
        .unwrap_err();
    assert!(matches!(err, WagonError::Conflict(_)));

    let page = store
        .list_subscribers(1, 50, Some("alice"), None)
        .await
        .unwrap();
    // LIKE is case-insensitive for ASCII in sqlite.
    assert_eq!(page.pagination.total_items, 1);
    assert_eq!(page.items[0].name, "Alice");

    let by_number = store
        .list_subscribers(1, 50, Some("7654321"), None)
        .await
        .unwrap();
    assert_eq!(by_number.items[0].name, "Bob");
}

#[tokio::test]
async fn subscriber_update_and_active_scan() {
    let store = test_store().await;
    let sub = store
        .create_subscriber("Alice", "923001234567", None, None, "", "")
        .await
        .unwrap();
    store
        .create_subscriber("Bob", "923007654321", None, None, "", "")
        .await
        .unwrap();

    store
        .update_subscriber(
            &sub.id,
            SubscriberUpdate {
                status: Some("unsubscribed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let active = store.active_subscribers().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "Bob");
}

#[tokio::test]
async fn pagination_math() {
    let store = test_store().await;
    for i in 0..5 {
        store
            .create_subscriber(&format!("S{i}"), &format!("9230000000{i}"), None, None, "", "")
            .await
            .unwrap();
    }

    let page = store.list_subscribers(2, 2, None, None).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.pagination.current_page, 2);
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.pagination.total_items, 5);

    // Out-of-range params clamp rather than error.
    let clamped = store.list_subscribers(0, 500, None, None).await.unwrap();
    assert_eq!(clamped.pagination.current_page, 1);
    assert_eq!(clamped.items.len(), 5);
}

#[tokio::test]
async fn message_status_transitions() {
    let store = test_store().await;
    let msg = store
        .record_message("923001234567@s.whatsapp.net", "hello", "text")
        .await
        .unwrap();
    assert_eq!(msg.status, "pending");
    assert_eq!(msg.direction, "outbound");

    let sent = store
        .update_message_status(&msg.id, "sent", Some("3EB0ABCDEF"), None)
        .await
        .unwrap();
    assert_eq!(sent.status, "sent");
    assert_eq!(sent.message_id.as_deref(), Some("3EB0ABCDEF"));

    let err = store
        .update_message_status(&msg.id, "teleported", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WagonError::Validation(_)));
}

#[tokio::test]
async fn message_list_filters_by_status() {
    let store = test_store().await;
    let m1 = store
        .record_message("1@s.whatsapp.net", "a", "text")
        .await
        .unwrap();
    store
        .record_message("2@s.whatsapp.net", "b", "text")
        .await
        .unwrap();
    store
        .update_message_status(&m1.id, "failed", None, Some("not on whatsapp"))
        .await
        .unwrap();

    let failed = store.list_messages(1, 50, Some("failed")).await.unwrap();
    assert_eq!(failed.pagination.total_items, 1);
    assert_eq!(failed.items[0].error.as_deref(), Some("not on whatsapp"));
}

#[tokio::test]
async fn campaign_scheduling_and_due_scan() {
    let store = test_store().await;
    let draft = store
        .create_campaign("Teaser", "Hi {{name}}", "subscribers", None)
        .await
        .unwrap();
    assert_eq!(draft.status, "draft");

    let scheduled = store
        .create_campaign(
            "Launch",
            "We are live, {{name}}!",
            "subscribers",
            Some("2026-01-01 09:00:00"),
        )
        .await
        .unwrap();
    assert_eq!(scheduled.status, "scheduled");

    // Draft campaigns never show up in the due scan.
    let due = store.due_campaigns("2026-01-01 09:00:01").await.unwrap();
    let ids: Vec<&str> = due.iter().map(|c: &Campaign| c.id.as_str()).collect();
    assert_eq!(ids, vec![scheduled.id.as_str()]);

    let not_yet = store.due_campaigns("2025-12-31 23:59:59").await.unwrap();
    assert!(not_yet.is_empty());

    let finished = store.finish_campaign(&scheduled.id, 10, 2).await.unwrap();
    assert_eq!(finished.status, "sent");
    assert_eq!(finished.sent_count, 10);
    assert_eq!(finished.failed_count, 2);

    // A finished campaign drops out of the scan.
    let due = store.due_campaigns("2026-01-01 09:00:01").await.unwrap();
    assert!(due.is_empty());
}

#[tokio::test]
async fn campaign_all_failures_marks_failed() {
    let store = test_store().await;
    let campaign = store
        .create_campaign("Doomed", "x", "subscribers", Some("2026-01-01 00:00:00"))
        .await
        .unwrap();
    let finished = store.finish_campaign(&campaign.id, 0, 5).await.unwrap();
    assert_eq!(finished.status, "failed");
}

#[tokio::test]
async fn campaign_partial_update() {
    let store = test_store().await;
    let campaign = store
        .create_campaign("Teaser", "Hi", "subscribers", None)
        .await
        .unwrap();
    let updated = store
        .update_campaign(
            &campaign.id,
            CampaignUpdate {
                status: Some("scheduled".into()),
                scheduled_at: Some(Some("2026-06-01 08:00:00".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, "scheduled");
    assert_eq!(updated.scheduled_at.as_deref(), Some("2026-06-01 08:00:00"));

    let err = store
        .update_campaign(
            &campaign.id,
            CampaignUpdate {
                status: Some("vanished".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WagonError::Validation(_)));
}

#[test]
fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("50%"), "%50\\%%");
    assert_eq!(like_pattern("a_b"), "%a\\_b%");
}
