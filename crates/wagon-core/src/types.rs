use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the single WhatsApp session.
///
/// `Connected` is the terminal success state; `Timeout` and `Conflict` are
/// terminal failures that require a `restart()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Disconnected,
    Opening,
    Pairing,
    Connected,
    Timeout,
    Conflict,
}

impl SessionState {
    /// Human-readable name for status responses.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Opening => "opening",
            Self::Pairing => "pairing",
            Self::Connected => "connected",
            Self::Timeout => "timeout",
            Self::Conflict => "conflict",
        }
    }
}

/// Snapshot of the session as reported by `/api/whatsapp/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub is_ready: bool,
    pub is_authenticated: bool,
    pub state: SessionState,
    pub has_qr: bool,
}

/// A live WhatsApp group chat, as fetched from the platform.
///
/// The application holds no authoritative copy of this; it is a per-request
/// snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveGroup {
    /// Group JID of the form `<digits>@g.us`.
    pub jid: String,
    pub name: String,
    pub participant_count: usize,
    /// Whether the acting account is an admin of this group.
    pub is_admin: bool,
}

/// A participant of a live WhatsApp group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveParticipant {
    pub jid: String,
    pub is_admin: bool,
    pub is_super_admin: bool,
}

/// Raw per-participant result of a group add, as reported by the protocol.
#[derive(Debug, Clone)]
pub struct AddAttempt {
    pub jid: String,
    pub added: bool,
    /// Protocol error code when `added` is false (400 invalid number,
    /// 403 privacy-restricted, 404 not on WhatsApp, 409 already a member,
    /// 429 rate limited).
    pub error_code: Option<u16>,
}

/// Classified outcome of adding one number to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddOutcome {
    /// Added directly.
    Successful,
    /// Privacy settings forced a private invite instead of a direct add.
    Invited,
    AlreadyMember,
    /// Invalid number, not on WhatsApp, rate limited, or other failure.
    Failed,
}

/// Map a protocol add attempt to its classified outcome.
pub fn classify_attempt(attempt: &AddAttempt) -> AddOutcome {
    if attempt.added {
        return AddOutcome::Successful;
    }
    match attempt.error_code {
        Some(403) => AddOutcome::Invited,
        Some(409) => AddOutcome::AlreadyMember,
        _ => AddOutcome::Failed,
    }
}

/// Per-number result entry in a bulk add response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddResultItem {
    /// The number as supplied by the caller.
    pub number: String,
    pub outcome: AddOutcome,
    /// Failure detail, when there is one worth relaying.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Aggregate report of a bulk add. One failed item never fails the batch;
/// the caller gets a per-item outcome list plus counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReport {
    pub results: Vec<AddResultItem>,
    pub successful: usize,
    pub invited: usize,
    pub already_member: usize,
    pub failed: usize,
}

impl AddReport {
    /// Append one classified result, keeping the counts in sync.
    pub fn push(&mut self, number: String, outcome: AddOutcome, detail: Option<String>) {
        match outcome {
            AddOutcome::Successful => self.successful += 1,
            AddOutcome::Invited => self.invited += 1,
            AddOutcome::AlreadyMember => self.already_member += 1,
            AddOutcome::Failed => self.failed += 1,
        }
        self.results.push(AddResultItem {
            number,
            outcome,
            detail,
        });
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }
}

/// Outbound message payload. Variants change payload shape only; routing is
/// identical across them.
#[derive(Debug, Clone)]
pub enum OutboundContent {
    Text(String),
    /// Text with a URL rendered as a link preview.
    Link { text: String, url: String },
    Media {
        bytes: Vec<u8>,
        mime: String,
        caption: String,
    },
}

/// Maximum accepted media attachment size (50 MB).
pub const MAX_MEDIA_BYTES: usize = 50 * 1024 * 1024;

/// Validate a media attachment before upload. Size cap and MIME whitelist.
pub fn validate_media(bytes: &[u8], mime: &str) -> Result<(), crate::error::WagonError> {
    use crate::error::WagonError;

    if bytes.is_empty() {
        return Err(WagonError::Validation("media attachment is empty".into()));
    }
    if bytes.len() > MAX_MEDIA_BYTES {
        return Err(WagonError::Validation(format!(
            "media attachment exceeds 50MB limit ({} bytes)",
            bytes.len()
        )));
    }
    let allowed = mime.starts_with("image/")
        || mime.starts_with("video/")
        || mime.starts_with("audio/")
        || mime == "application/pdf";
    if !allowed {
        return Err(WagonError::Validation(format!(
            "unsupported media type '{mime}'"
        )));
    }
    Ok(())
}

/// An inbound text message observed by the session, recorded for history.
#[derive(Debug, Clone)]
pub struct InboundText {
    pub message_id: String,
    pub sender_jid: String,
    pub chat_jid: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub is_group: bool,
}
