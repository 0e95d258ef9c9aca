//! Row types for the relational layer.
//!
//! The password hash never leaves the store layer in serialized form.

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
}

/// Database-tracked marketing group, optionally linked to a live WhatsApp
/// group. `member_count` is a derived counter, not authoritative; the live
/// group is the source of truth once linked.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: String,
    pub wa_group_jid: Option<String>,
    pub member_count: i64,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Member {
    pub id: String,
    pub group_id: String,
    pub member_name: String,
    pub member_number: String,
    pub status: String,
    pub joined_at: String,
}

/// A marketing contact, independent of any group.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscriber {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub whatsapp_id: Option<String>,
    pub status: String,
    pub tags: String,
    pub notes: String,
    pub created_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageRecord {
    pub id: String,
    pub message_id: Option<String>,
    pub recipient: String,
    pub content: String,
    pub message_type: String,
    pub direction: String,
    pub status: String,
    pub error: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub message_template: String,
    pub target_type: String,
    pub status: String,
    pub scheduled_at: Option<String>,
    pub sent_count: i64,
    pub failed_count: i64,
    pub created_at: String,
}

/// Valid member lifecycle states.
pub const MEMBER_STATUSES: &[&str] = &["pending", "active", "rejected"];
/// Valid subscriber states.
pub const SUBSCRIBER_STATUSES: &[&str] = &["active", "unsubscribed"];
/// Valid message delivery states.
pub const MESSAGE_STATUSES: &[&str] = &["pending", "sent", "failed"];
/// Valid campaign states.
pub const CAMPAIGN_STATUSES: &[&str] = &["draft", "scheduled", "sent", "failed"];
/// Valid group states.
pub const GROUP_STATUSES: &[&str] = &["active", "archived"];
