//! Message sending — retry logic and media upload.

use tracing::{error, warn};
use wacore_binary::jid::Jid;
use wagon_core::error::WagonError;
use whatsapp_rust::client::Client;
use whatsapp_rust::download::MediaType;

/// Retry delays for exponential backoff: 500ms, 1s, 2s.
pub(crate) const RETRY_DELAYS_MS: [u64; 3] = [500, 1000, 2000];

/// Send a WhatsApp message with retry and exponential backoff.
///
/// Attempts up to 3 times with delays of 500ms, 1s, 2s between retries.
/// Clones the message for each retry attempt.
pub(crate) async fn retry_send(
    client: &Client,
    jid: &Jid,
    msg: waproto::whatsapp::Message,
) -> Result<String, WagonError> {
    let mut last_err = None;

    for (attempt, delay_ms) in RETRY_DELAYS_MS.iter().enumerate() {
        match client.send_message(jid.clone(), msg.clone()).await {
            Ok(msg_id) => return Ok(msg_id),
            Err(e) => {
                let attempt_num = attempt + 1;
                if attempt_num < RETRY_DELAYS_MS.len() {
                    warn!(
                        "whatsapp send attempt {attempt_num}/{} failed: {e}, retrying in {delay_ms}ms",
                        RETRY_DELAYS_MS.len()
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(*delay_ms)).await;
                } else {
                    error!(
                        "whatsapp send attempt {attempt_num}/{} failed: {e}, giving up",
                        RETRY_DELAYS_MS.len()
                    );
                }
                last_err = Some(e);
            }
        }
    }

    Err(WagonError::Channel(format!(
        "whatsapp send failed after {} attempts: {}",
        RETRY_DELAYS_MS.len(),
        last_err.map(|e| e.to_string()).unwrap_or_default()
    )))
}

/// Parse a JID string, mapping parse failures to a channel error.
pub(crate) fn parse_jid(jid_str: &str) -> Result<Jid, WagonError> {
    jid_str
        .parse()
        .map_err(|e| WagonError::Channel(format!("invalid whatsapp JID '{jid_str}': {e}")))
}

/// Build a plain text message.
pub(crate) fn text_message(text: &str) -> waproto::whatsapp::Message {
    waproto::whatsapp::Message {
        conversation: Some(text.to_string()),
        ..Default::default()
    }
}

/// Build an extended text message so clients render a link preview.
pub(crate) fn link_message(text: &str, url: &str) -> waproto::whatsapp::Message {
    let body = if text.contains(url) {
        text.to_string()
    } else {
        format!("{text}\n{url}")
    };
    waproto::whatsapp::Message {
        extended_text_message: Some(Box::new(
            waproto::whatsapp::message::ExtendedTextMessage {
                text: Some(body),
                matched_text: Some(url.to_string()),
                canonical_url: Some(url.to_string()),
                ..Default::default()
            },
        )),
        ..Default::default()
    }
}

/// Pick the WhatsApp media slot for a MIME type.
fn media_type_for(mime: &str) -> MediaType {
    if mime.starts_with("image/") {
        MediaType::Image
    } else if mime.starts_with("video/") {
        MediaType::Video
    } else if mime.starts_with("audio/") {
        MediaType::Audio
    } else {
        MediaType::Document
    }
}

/// Upload media bytes and build the matching message.
pub(crate) async fn media_message(
    client: &Client,
    bytes: Vec<u8>,
    mime: &str,
    caption: Option<&str>,
) -> Result<waproto::whatsapp::Message, WagonError> {
    let media_type = media_type_for(mime);
    let upload = client
        .upload(bytes, media_type)
        .await
        .map_err(|e| WagonError::Channel(format!("whatsapp media upload failed: {e}")))?;

    let msg = match media_type {
        MediaType::Image => waproto::whatsapp::Message {
            image_message: Some(Box::new(waproto::whatsapp::message::ImageMessage {
                mimetype: Some(mime.to_string()),
                caption: caption.map(str::to_string),
                url: Some(upload.url),
                direct_path: Some(upload.direct_path),
                media_key: Some(upload.media_key),
                file_enc_sha256: Some(upload.file_enc_sha256),
                file_sha256: Some(upload.file_sha256),
                file_length: Some(upload.file_length),
                ..Default::default()
            })),
            ..Default::default()
        },
        MediaType::Video => waproto::whatsapp::Message {
            video_message: Some(Box::new(waproto::whatsapp::message::VideoMessage {
                mimetype: Some(mime.to_string()),
                caption: caption.map(str::to_string),
                url: Some(upload.url),
                direct_path: Some(upload.direct_path),
                media_key: Some(upload.media_key),
                file_enc_sha256: Some(upload.file_enc_sha256),
                file_sha256: Some(upload.file_sha256),
                file_length: Some(upload.file_length),
                ..Default::default()
            })),
            ..Default::default()
        },
        MediaType::Audio => waproto::whatsapp::Message {
            audio_message: Some(Box::new(waproto::whatsapp::message::AudioMessage {
                mimetype: Some(mime.to_string()),
                url: Some(upload.url),
                direct_path: Some(upload.direct_path),
                media_key: Some(upload.media_key),
                file_enc_sha256: Some(upload.file_enc_sha256),
                file_sha256: Some(upload.file_sha256),
                file_length: Some(upload.file_length),
                ..Default::default()
            })),
            ..Default::default()
        },
        MediaType::Document => waproto::whatsapp::Message {
            document_message: Some(Box::new(waproto::whatsapp::message::DocumentMessage {
                mimetype: Some(mime.to_string()),
                caption: caption.map(str::to_string),
                url: Some(upload.url),
                direct_path: Some(upload.direct_path),
                media_key: Some(upload.media_key),
                file_enc_sha256: Some(upload.file_enc_sha256),
                file_sha256: Some(upload.file_sha256),
                file_length: Some(upload.file_length),
                ..Default::default()
            })),
            ..Default::default()
        },
    };

    Ok(msg)
}
