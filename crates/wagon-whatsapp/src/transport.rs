//! `WhatsAppTransport` implementation over the live session.

use crate::qr::generate_qr_png;
use crate::send::{link_message, media_message, parse_jid, retry_send, text_message};
use crate::session::WhatsAppSession;
use async_trait::async_trait;
use wagon_core::error::WagonError;
use wagon_core::traits::WhatsAppTransport;
use wagon_core::types::{AddAttempt, LiveGroup, LiveParticipant, SessionStatus};

#[async_trait]
impl WhatsAppTransport for WhatsAppSession {
    async fn status(&self) -> SessionStatus {
        WhatsAppSession::status(self).await
    }

    async fn qr_png(&self) -> Result<Option<Vec<u8>>, WagonError> {
        let qr = self.last_qr.lock().await.clone();
        match qr {
            Some(data) => Ok(Some(generate_qr_png(&data)?)),
            None => Ok(None),
        }
    }

    async fn restart(&self) -> Result<(), WagonError> {
        WhatsAppSession::restart(self).await
    }

    async fn self_jid(&self) -> Option<String> {
        self.self_jid.lock().await.clone()
    }

    async fn send_text(&self, jid: &str, text: &str) -> Result<String, WagonError> {
        let client = self.connected_client().await?;
        let jid = parse_jid(jid)?;
        retry_send(&client, &jid, text_message(text)).await
    }

    async fn send_link(&self, jid: &str, text: &str, url: &str) -> Result<String, WagonError> {
        let client = self.connected_client().await?;
        let jid = parse_jid(jid)?;
        retry_send(&client, &jid, link_message(text, url)).await
    }

    async fn send_media(
        &self,
        jid: &str,
        bytes: Vec<u8>,
        mime: &str,
        caption: &str,
    ) -> Result<String, WagonError> {
        let client = self.connected_client().await?;
        let jid = parse_jid(jid)?;
        let caption = if caption.is_empty() { None } else { Some(caption) };
        let msg = media_message(&client, bytes, mime, caption).await?;
        retry_send(&client, &jid, msg).await
    }

    async fn list_groups(&self) -> Result<Vec<LiveGroup>, WagonError> {
        self.joined_groups().await
    }

    async fn group_participants(
        &self,
        group_jid: &str,
    ) -> Result<Vec<LiveParticipant>, WagonError> {
        let (_, participants) = self.group_metadata(group_jid).await?;
        Ok(participants)
    }

    async fn create_group(
        &self,
        name: &str,
        participant_jids: Vec<String>,
    ) -> Result<LiveGroup, WagonError> {
        self.create_live_group(name, &participant_jids).await
    }

    async fn add_participants(
        &self,
        group_jid: &str,
        participant_jids: Vec<String>,
    ) -> Result<Vec<AddAttempt>, WagonError> {
        self.add_group_participants(group_jid, &participant_jids)
            .await
    }

    async fn remove_participant(
        &self,
        group_jid: &str,
        participant_jid: &str,
    ) -> Result<(), WagonError> {
        self.remove_group_participant(group_jid, participant_jid)
            .await
    }
}
