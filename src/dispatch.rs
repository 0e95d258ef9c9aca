//! Outbound message dispatch — one entry point routing by target.

use std::sync::Arc;
use tracing::{info, warn};
use wagon_core::error::WagonError;
use wagon_core::phone::{is_group_jid, normalize_phone, user_jid};
use wagon_core::traits::WhatsAppTransport;
use wagon_core::types::{validate_media, OutboundContent};
use wagon_store::Store;

/// Where a dispatch goes.
#[derive(Debug, Clone)]
pub enum DispatchTarget {
    /// One phone number, in any accepted raw form.
    Individual(String),
    /// Fan-out to a database group's active members.
    DbGroup(String),
    /// Single send to a live `@g.us` group chat, no fan-out.
    LiveGroup(String),
}

/// Outcome of one dispatch call.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
    /// Message history row ids, one per recipient.
    #[serde(rename = "messageIds")]
    pub message_ids: Vec<String>,
}

fn content_kind(content: &OutboundContent) -> &'static str {
    match content {
        OutboundContent::Text(_) => "text",
        OutboundContent::Link { .. } => "link",
        OutboundContent::Media { .. } => "media",
    }
}

fn content_summary(content: &OutboundContent) -> String {
    match content {
        OutboundContent::Text(text) => text.clone(),
        OutboundContent::Link { text, url } => format!("{text} {url}"),
        OutboundContent::Media { mime, caption, .. } => {
            if caption.is_empty() {
                format!("[{mime}]")
            } else {
                format!("[{mime}] {caption}")
            }
        }
    }
}

/// Send one message, recording a history row either way. Returns whether
/// the send succeeded.
async fn send_one(
    store: &Store,
    transport: &Arc<dyn WhatsAppTransport>,
    jid: &str,
    content: &OutboundContent,
    report: &mut DispatchReport,
) -> Result<(), WagonError> {
    let row = store
        .record_message(jid, &content_summary(content), content_kind(content))
        .await?;

    let result = match content {
        OutboundContent::Text(text) => transport.send_text(jid, text).await,
        OutboundContent::Link { text, url } => transport.send_link(jid, text, url).await,
        OutboundContent::Media {
            bytes,
            mime,
            caption,
        } => {
            transport
                .send_media(jid, bytes.clone(), mime, caption)
                .await
        }
    };

    match result {
        Ok(platform_id) => {
            store
                .update_message_status(&row.id, "sent", Some(&platform_id), None)
                .await?;
            report.sent += 1;
        }
        Err(e) => {
            warn!("send to {jid} failed: {e}");
            store
                .update_message_status(&row.id, "failed", None, Some(&e.to_string()))
                .await?;
            report.failed += 1;
        }
    }
    report.message_ids.push(row.id);
    Ok(())
}

/// Dispatch a message to its target.
///
/// Content is validated before any send or history row. Database-group
/// fan-out is sequential; per-recipient failures are recorded without
/// aborting the loop. An empty resolved recipient list is `EmptyTarget`
/// before anything is sent.
pub async fn dispatch(
    store: &Store,
    transport: &Arc<dyn WhatsAppTransport>,
    country_code: &str,
    target: DispatchTarget,
    content: OutboundContent,
) -> Result<DispatchReport, WagonError> {
    if let OutboundContent::Media { bytes, mime, .. } = &content {
        validate_media(bytes, mime)?;
    }

    let mut report = DispatchReport::default();
    match target {
        DispatchTarget::Individual(raw) => {
            let number = normalize_phone(&raw, country_code)?;
            send_one(store, transport, &user_jid(&number), &content, &mut report).await?;
        }
        DispatchTarget::LiveGroup(jid) => {
            if !is_group_jid(&jid) {
                return Err(WagonError::Validation(format!(
                    "'{jid}' is not a group JID"
                )));
            }
            send_one(store, transport, &jid, &content, &mut report).await?;
        }
        DispatchTarget::DbGroup(group_id) => {
            store.get_group(&group_id).await?;
            let numbers: Vec<String> = store
                .active_member_numbers(&group_id)
                .await?
                .into_iter()
                .filter(|n| !n.trim().is_empty())
                .collect();
            if numbers.is_empty() {
                return Err(WagonError::EmptyTarget(format!(
                    "group {group_id} has no active members with phone numbers"
                )));
            }
            for number in numbers {
                send_one(store, transport, &user_jid(&number), &content, &mut report).await?;
            }
            info!(
                "group {group_id} fan-out: {} sent, {} failed",
                report.sent, report.failed
            );
        }
    }
    Ok(report)
}
