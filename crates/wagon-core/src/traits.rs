use crate::error::WagonError;
use crate::types::{AddAttempt, LiveGroup, LiveParticipant, SessionStatus};
use async_trait::async_trait;

/// WhatsApp transport trait — the seam between business logic and the live
/// automation session.
///
/// The real implementation wraps the `whatsapp-rust` client; tests substitute
/// a mock. Every operation against a session that is not connected fails with
/// `WagonError::NotReady`. Callers poll `status()` rather than receiving push
/// notifications.
#[async_trait]
pub trait WhatsAppTransport: Send + Sync {
    /// Current session snapshot.
    async fn status(&self) -> SessionStatus;

    /// Latest pairing QR code as PNG bytes, `None` once authenticated.
    async fn qr_png(&self) -> Result<Option<Vec<u8>>, WagonError>;

    /// Tear down and reinitialize the session. Invalidates any in-flight
    /// operations.
    async fn restart(&self) -> Result<(), WagonError>;

    /// JID of the acting account, when known.
    async fn self_jid(&self) -> Option<String>;

    /// Send a text message to a user or group JID. Returns the platform
    /// message id.
    async fn send_text(&self, jid: &str, text: &str) -> Result<String, WagonError>;

    /// Send text carrying a URL rendered with a link preview.
    async fn send_link(&self, jid: &str, text: &str, url: &str) -> Result<String, WagonError>;

    /// Upload and send a media message.
    async fn send_media(
        &self,
        jid: &str,
        bytes: Vec<u8>,
        mime: &str,
        caption: &str,
    ) -> Result<String, WagonError>;

    /// All group chats the account participates in.
    async fn list_groups(&self) -> Result<Vec<LiveGroup>, WagonError>;

    /// Live participant list of one group. `NotFound` when the group does
    /// not exist or the account is not in it.
    async fn group_participants(&self, group_jid: &str)
        -> Result<Vec<LiveParticipant>, WagonError>;

    /// Create a new group with the given initial participants.
    async fn create_group(
        &self,
        name: &str,
        participant_jids: Vec<String>,
    ) -> Result<LiveGroup, WagonError>;

    /// Add participants; returns one raw attempt per requested JID.
    async fn add_participants(
        &self,
        group_jid: &str,
        participant_jids: Vec<String>,
    ) -> Result<Vec<AddAttempt>, WagonError>;

    /// Remove one participant from a group.
    async fn remove_participant(
        &self,
        group_jid: &str,
        participant_jid: &str,
    ) -> Result<(), WagonError>;
}
