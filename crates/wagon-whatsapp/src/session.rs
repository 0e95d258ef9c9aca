//! Session lifecycle — building, running, and restarting the WhatsApp client.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};
use wacore::types::events::Event;
use wagon_core::config::WhatsAppConfig;
use wagon_core::error::WagonError;
use wagon_core::shellexpand;
use wagon_core::types::{InboundText, SessionState, SessionStatus};
use whatsapp_rust::bot::Bot;
use whatsapp_rust::store::SqliteStore;
use whatsapp_rust_tokio_transport::TokioWebSocketTransportFactory;
use whatsapp_rust_ureq_http_client::UreqHttpClient;

/// Long-lived WhatsApp session.
///
/// The event handler updates the same `Arc`-wrapped fields regardless of
/// which underlying bot is running, so `restart()` can orphan an old bot
/// and spin up a fresh one without invalidating handles held elsewhere.
pub struct WhatsAppSession {
    pub(crate) config: WhatsAppConfig,
    data_dir: String,
    /// Client handle for sending — set once connected.
    pub(crate) client: Arc<Mutex<Option<Arc<whatsapp_rust::client::Client>>>>,
    pub(crate) state: Arc<Mutex<SessionState>>,
    /// Last QR code data — buffered so status polls can render it even if
    /// the QR event fired before anyone was watching.
    pub(crate) last_qr: Arc<Mutex<Option<String>>>,
    /// Our own JID, captured on pairing. Used for admin checks.
    pub(crate) self_jid: Arc<Mutex<Option<String>>>,
    /// Inbound text sink — stored so `restart()` can reuse it.
    inbound_tx: Arc<Mutex<Option<mpsc::Sender<InboundText>>>>,
}

impl WhatsAppSession {
    pub fn new(config: WhatsAppConfig, data_dir: &str) -> Self {
        Self {
            config,
            data_dir: data_dir.to_string(),
            client: Arc::new(Mutex::new(None)),
            state: Arc::new(Mutex::new(SessionState::Disconnected)),
            last_qr: Arc::new(Mutex::new(None)),
            self_jid: Arc::new(Mutex::new(None)),
            inbound_tx: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the session. Returns a receiver of inbound text messages.
    pub async fn start(&self) -> Result<mpsc::Receiver<InboundText>, WagonError> {
        let (tx, rx) = mpsc::channel(64);
        *self.inbound_tx.lock().await = Some(tx.clone());
        self.build_and_run_bot(tx).await?;
        info!("WhatsApp session started");
        Ok(rx)
    }

    /// Current session status snapshot.
    pub async fn status(&self) -> SessionStatus {
        let state = *self.state.lock().await;
        let has_qr = self.last_qr.lock().await.is_some();
        SessionStatus {
            is_ready: state == SessionState::Connected,
            is_authenticated: state == SessionState::Connected,
            state,
            has_qr,
        }
    }

    /// Latest QR payload for terminal rendering, `None` once authenticated.
    pub async fn qr_data(&self) -> Option<String> {
        self.last_qr.lock().await.clone()
    }

    /// Delete the stale session, build a fresh bot, and run it.
    ///
    /// Used when WhatsApp was unlinked from the phone and the session is
    /// invalidated — the library won't generate new QR codes with stale keys.
    pub async fn restart(&self) -> Result<(), WagonError> {
        let session_dir = self.session_dir();
        if std::path::Path::new(&session_dir).exists() {
            info!("deleting stale WhatsApp session at {session_dir}");
            let _ = std::fs::remove_dir_all(&session_dir);
        }

        // Old bot is now orphaned; its handles are cleared below.
        *self.client.lock().await = None;
        *self.last_qr.lock().await = None;
        *self.self_jid.lock().await = None;
        *self.state.lock().await = SessionState::Disconnected;

        let tx = self
            .inbound_tx
            .lock()
            .await
            .clone()
            .ok_or_else(|| WagonError::Channel("WhatsApp session not started yet".into()))?;

        self.build_and_run_bot(tx).await
    }

    fn session_dir(&self) -> String {
        let dir = shellexpand(&self.data_dir);
        format!("{dir}/whatsapp_session")
    }

    fn session_db_path(&self) -> String {
        let session_dir = self.session_dir();
        let _ = std::fs::create_dir_all(&session_dir);
        format!("{session_dir}/whatsapp.db")
    }

    /// Build a WhatsApp bot with the event handler and run it in the background.
    ///
    /// Shared by `start()` and `restart()`.
    async fn build_and_run_bot(
        &self,
        tx: mpsc::Sender<InboundText>,
    ) -> Result<(), WagonError> {
        let db_path = self.session_db_path();
        let client_handle = self.client.clone();

        info!("WhatsApp bot building (session: {db_path})...");
        *self.state.lock().await = SessionState::Opening;

        let backend = Arc::new(
            SqliteStore::new(&db_path)
                .await
                .map_err(|e| WagonError::Channel(format!("whatsapp store init failed: {e}")))?,
        );

        let tx_events = tx;
        let client_for_event = client_handle.clone();
        let state_handle = self.state.clone();
        let last_qr_handle = self.last_qr.clone();
        let self_jid_handle = self.self_jid.clone();
        let pairing_timeout = Duration::from_secs(self.config.pairing_timeout_secs);

        let mut bot = Bot::builder()
            .with_backend(backend)
            .with_transport_factory(TokioWebSocketTransportFactory::new())
            .with_http_client(UreqHttpClient::new())
            .with_device_props(
                Some(self.config.device_name.clone()),
                None,
                Some(waproto::whatsapp::device_props::PlatformType::Desktop),
            )
            .on_event(move |event, client| {
                let tx = tx_events.clone();
                let client_store = client_for_event.clone();
                let state = state_handle.clone();
                let last_qr_buf = last_qr_handle.clone();
                let self_jid_buf = self_jid_handle.clone();
                async move {
                    match event {
                        Event::PairingQrCode { code, .. } => {
                            info!("WhatsApp QR code generated (scan to pair)");
                            let mut st = state.lock().await;
                            let entering = *st != SessionState::Pairing;
                            *st = SessionState::Pairing;
                            drop(st);
                            *last_qr_buf.lock().await = Some(code);

                            // Arm the pairing timeout once per pairing attempt.
                            if entering {
                                let state = state.clone();
                                let last_qr_buf = last_qr_buf.clone();
                                tokio::spawn(async move {
                                    tokio::time::sleep(pairing_timeout).await;
                                    let mut st = state.lock().await;
                                    if *st == SessionState::Pairing {
                                        warn!("WhatsApp pairing timed out");
                                        *st = SessionState::Timeout;
                                        *last_qr_buf.lock().await = None;
                                    }
                                });
                            }
                        }
                        Event::PairSuccess(pair) => {
                            info!("WhatsApp pairing successful");
                            *self_jid_buf.lock().await = Some(pair.id.to_string());
                        }
                        Event::Connected(_) => {
                            info!("WhatsApp connected");
                            *client_store.lock().await = Some(client);
                            *state.lock().await = SessionState::Connected;
                            // Session is valid, no more QR needed.
                            *last_qr_buf.lock().await = None;
                        }
                        Event::StreamReplaced(_) => {
                            // Another client took over this session.
                            warn!("WhatsApp stream replaced by another client");
                            *client_store.lock().await = None;
                            *state.lock().await = SessionState::Conflict;
                        }
                        Event::Disconnected(_) => {
                            warn!("WhatsApp disconnected");
                            *client_store.lock().await = None;
                            let mut st = state.lock().await;
                            if *st == SessionState::Connected {
                                *st = SessionState::Disconnected;
                            }
                        }
                        Event::LoggedOut(_) => {
                            // Unlinked from the phone; a restart is needed
                            // before new QR codes can be generated.
                            warn!("WhatsApp logged out, session invalidated");
                            *client_store.lock().await = None;
                            *state.lock().await = SessionState::Conflict;
                        }
                        Event::Message(msg, msg_info) => {
                            let text = msg
                                .conversation
                                .clone()
                                .or_else(|| {
                                    msg.extended_text_message
                                        .as_ref()
                                        .and_then(|m| m.text.clone())
                                })
                                .unwrap_or_default();
                            if text.is_empty() {
                                return;
                            }
                            let chat_jid = msg_info.source.chat.to_string();
                            let inbound = InboundText {
                                message_id: msg_info.id.clone(),
                                sender_jid: msg_info.source.sender.to_string(),
                                is_group: chat_jid.ends_with("@g.us"),
                                chat_jid,
                                text,
                                timestamp: msg_info.timestamp,
                            };
                            let _ = tx.send(inbound).await;
                        }
                        _ => {}
                    }
                }
            })
            .build()
            .await
            .map_err(|e| WagonError::Channel(format!("whatsapp bot build failed: {e}")))?;

        // Store client reference immediately if already connected.
        *client_handle.lock().await = Some(bot.client());

        let _handle = bot
            .run()
            .await
            .map_err(|e| WagonError::Channel(format!("whatsapp bot run failed: {e}")))?;

        info!("WhatsApp bot started");
        Ok(())
    }

    /// Grab the connected client, or `NotReady` if the session isn't up.
    pub(crate) async fn connected_client(
        &self,
    ) -> Result<Arc<whatsapp_rust::client::Client>, WagonError> {
        self.client
            .lock()
            .await
            .clone()
            .ok_or_else(|| WagonError::NotReady("whatsapp client not connected".into()))
    }
}
