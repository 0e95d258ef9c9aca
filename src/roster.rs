//! Reconciliation between database groups and live WhatsApp groups.
//!
//! The live participant list is the source of truth. Admin rights are
//! re-checked against it immediately before every add/remove; the
//! check-then-act race (rights revoked in between) is accepted.

use std::sync::Arc;
use tracing::{info, warn};
use wagon_core::error::WagonError;
use wagon_core::phone::{normalize_phone, user_jid};
use wagon_core::traits::WhatsAppTransport;
use wagon_core::types::{classify_attempt, AddOutcome, AddReport, LiveGroup};
use wagon_store::Store;

/// Counts returned by a spreadsheet import.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ImportReport {
    pub successful: usize,
    pub failed: usize,
}

/// Live group chats the account participates in.
pub async fn list_real_groups(
    transport: &Arc<dyn WhatsAppTransport>,
) -> Result<Vec<LiveGroup>, WagonError> {
    transport.list_groups().await
}

/// Verify the acting account is an admin of the group, against the live
/// participant list. When the account's own JID is unknown the check is
/// skipped; the protocol's own 403 surfaces instead.
pub async fn ensure_admin(
    transport: &Arc<dyn WhatsAppTransport>,
    group_jid: &str,
) -> Result<(), WagonError> {
    let Some(me) = transport.self_jid().await else {
        warn!("own JID unknown, skipping admin pre-check for {group_jid}");
        return Ok(());
    };
    let participants = transport.group_participants(group_jid).await?;
    let is_admin = participants
        .iter()
        .any(|p| p.jid == me && (p.is_admin || p.is_super_admin));
    if !is_admin {
        return Err(WagonError::Permission(format!(
            "not an admin of group {group_jid}"
        )));
    }
    Ok(())
}

/// Record a member row for an add outcome, creating or updating as needed.
async fn record_member(
    store: &Store,
    group_id: &str,
    name: &str,
    number: &str,
    outcome: AddOutcome,
) -> Result<(), WagonError> {
    let status = match outcome {
        AddOutcome::Successful | AddOutcome::AlreadyMember => "active",
        AddOutcome::Invited => "pending",
        AddOutcome::Failed => "rejected",
    };
    let member = match store.find_member_by_number(group_id, number).await? {
        Some(m) => m,
        None => store.add_member(group_id, name, number).await?,
    };
    store.update_member_status(&member.id, status).await?;
    Ok(())
}

fn failure_detail(error_code: Option<u16>) -> Option<String> {
    match error_code {
        Some(400) => Some("invalid phone number".into()),
        Some(404) => Some("number is not on WhatsApp".into()),
        Some(429) => Some("rate limited".into()),
        Some(code) => Some(format!("protocol error {code}")),
        None => None,
    }
}

/// Add members to a linked group, one number at a time.
///
/// One failure never aborts the batch; the report carries a per-number
/// outcome plus aggregate counts, and total classified equals input count.
pub async fn add_members(
    store: &Store,
    transport: &Arc<dyn WhatsAppTransport>,
    country_code: &str,
    group_id: &str,
    entries: &[(String, String)],
) -> Result<AddReport, WagonError> {
    let group = store.get_group(group_id).await?;
    let group_jid = group.wa_group_jid.as_deref().ok_or_else(|| {
        WagonError::Validation(format!(
            "group {group_id} is not linked to a WhatsApp group"
        ))
    })?;

    ensure_admin(transport, group_jid).await?;

    let mut report = AddReport::default();
    for (name, raw_number) in entries {
        // Malformed numbers fail without any network call.
        let number = match normalize_phone(raw_number, country_code) {
            Ok(n) => n,
            Err(e) => {
                report.push(raw_number.clone(), AddOutcome::Failed, Some(e.to_string()));
                continue;
            }
        };

        let attempts = transport
            .add_participants(group_jid, vec![user_jid(&number)])
            .await?;

        // Single-participant add yields one attempt.
        let (outcome, detail) = match attempts.first() {
            Some(attempt) => (
                classify_attempt(attempt),
                if attempt.added {
                    None
                } else {
                    failure_detail(attempt.error_code)
                },
            ),
            None => (AddOutcome::Failed, Some("no result from platform".into())),
        };

        record_member(store, group_id, name, &number, outcome).await?;
        report.push(number, outcome, detail);
    }

    store.refresh_member_count(group_id).await?;
    info!(
        "added members to group {group_id}: {} ok, {} invited, {} already, {} failed",
        report.successful, report.invited, report.already_member, report.failed
    );
    Ok(report)
}

/// Add numbers straight to a live group, without any database rows.
///
/// Same per-number semantics as `add_members`; used for groups that are not
/// tracked in the database.
pub async fn add_live_members(
    transport: &Arc<dyn WhatsAppTransport>,
    country_code: &str,
    group_jid: &str,
    numbers: &[String],
) -> Result<AddReport, WagonError> {
    ensure_admin(transport, group_jid).await?;

    let mut report = AddReport::default();
    for raw_number in numbers {
        let number = match normalize_phone(raw_number, country_code) {
            Ok(n) => n,
            Err(e) => {
                report.push(raw_number.clone(), AddOutcome::Failed, Some(e.to_string()));
                continue;
            }
        };
        let attempts = transport
            .add_participants(group_jid, vec![user_jid(&number)])
            .await?;
        let (outcome, detail) = match attempts.first() {
            Some(attempt) => (
                classify_attempt(attempt),
                if attempt.added {
                    None
                } else {
                    failure_detail(attempt.error_code)
                },
            ),
            None => (AddOutcome::Failed, Some("no result from platform".into())),
        };
        report.push(number, outcome, detail);
    }
    Ok(report)
}

/// Remove a participant from a live group.
///
/// `Permission` when the acting account is not a live admin, `NotFound`
/// when the participant is not in the group.
pub async fn remove_live_member(
    transport: &Arc<dyn WhatsAppTransport>,
    group_jid: &str,
    participant_jid: &str,
) -> Result<(), WagonError> {
    ensure_admin(transport, group_jid).await?;

    let participants = transport.group_participants(group_jid).await?;
    if !participants.iter().any(|p| p.jid == participant_jid) {
        return Err(WagonError::NotFound(format!(
            "participant {participant_jid} is not in group {group_jid}"
        )));
    }

    transport
        .remove_participant(group_jid, participant_jid)
        .await
}

/// Import `(name, phone)` rows into a group.
///
/// Every valid row lands as a member; when the group is linked and the
/// session is ready, the rows go through the same per-row add semantics as
/// `add_members`. Unlinked groups just collect pending rows.
pub async fn import_members(
    store: &Store,
    transport: &Arc<dyn WhatsAppTransport>,
    country_code: &str,
    group_id: &str,
    rows: Vec<(String, String)>,
) -> Result<ImportReport, WagonError> {
    let group = store.get_group(group_id).await?;
    let session_ready = transport.status().await.is_ready;

    if group.wa_group_jid.is_some() && session_ready {
        let add_report = add_members(store, transport, country_code, group_id, &rows).await?;
        return Ok(ImportReport {
            successful: add_report.successful + add_report.invited + add_report.already_member,
            failed: add_report.failed,
        });
    }

    // No live group to reconcile against; store rows as pending.
    let mut report = ImportReport::default();
    for (name, raw_number) in rows {
        let number = match normalize_phone(&raw_number, country_code) {
            Ok(n) => n,
            Err(e) => {
                warn!("import row '{raw_number}' rejected: {e}");
                report.failed += 1;
                continue;
            }
        };
        if store
            .find_member_by_number(group_id, &number)
            .await?
            .is_none()
        {
            store.add_member(group_id, &name, &number).await?;
        }
        report.successful += 1;
    }
    Ok(report)
}

/// Recompute a linked group's `member_count` from the live participant list.
///
/// Drift between the counter and reality is reconciled only by this
/// explicit call.
pub async fn refresh_group(
    store: &Store,
    transport: &Arc<dyn WhatsAppTransport>,
    group_id: &str,
) -> Result<i64, WagonError> {
    let group = store.get_group(group_id).await?;
    match group.wa_group_jid.as_deref() {
        Some(jid) => {
            let participants = transport.group_participants(jid).await?;
            let count = participants.len() as i64;
            store.set_member_count(group_id, count).await?;
            Ok(count)
        }
        // Unlinked groups count their active member rows.
        None => store.refresh_member_count(group_id).await,
    }
}
