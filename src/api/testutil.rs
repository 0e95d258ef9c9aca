//! Shared mock transport and router helpers for handler tests.

use super::ApiState;
use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wagon_core::error::WagonError;
use wagon_core::traits::WhatsAppTransport;
use wagon_core::types::{
    AddAttempt, LiveGroup, LiveParticipant, SessionState, SessionStatus,
};

/// Build a router over an in-memory store and the given mock transport.
pub async fn test_app(transport: MockTransport) -> (Router, ApiState) {
    let state = ApiState {
        store: wagon_store::Store::in_memory().await.unwrap(),
        transport: Arc::new(transport),
        auth: wagon_core::config::AuthConfig {
            jwt_secret: "test-secret".into(),
            token_ttl_hours: 24,
        },
        country_code: "92".into(),
        uptime: std::time::Instant::now(),
    };
    (super::build_router(state.clone()), state)
}

/// Parse a response body as JSON.
pub async fn body_json(resp: axum::http::Response<Body>) -> Value {
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Register a user through the API and return a bearer token.
pub async fn register_and_token(app: &Router) -> String {
    use tower::ServiceExt;
    let req = axum::http::Request::post("/api/auth/register")
        .header("Content-Type", "application/json")
        .body(Body::from(
            r#"{"email":"ops@example.com","password":"hunter22","name":"Ops"}"#,
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let json = body_json(resp).await;
    json["data"]["token"].as_str().unwrap().to_string()
}

/// A sent message captured by the mock: (jid, kind, body).
pub type SentRecord = (String, String, String);

/// Mock transport that records sends and serves canned group data.
pub struct MockTransport {
    state: SessionState,
    self_jid: Option<String>,
    qr: Option<String>,
    groups: Mutex<Vec<LiveGroup>>,
    participants: Mutex<HashMap<String, Vec<LiveParticipant>>>,
    /// Per-JID add error codes; absent means the add succeeds.
    add_errors: HashMap<String, u16>,
    pub sent: Arc<Mutex<Vec<SentRecord>>>,
    pub restarts: Arc<AtomicUsize>,
    fail_send: bool,
    msg_counter: AtomicUsize,
}

impl MockTransport {
    pub fn connected() -> Self {
        Self {
            state: SessionState::Connected,
            self_jid: Some("92300000_0000@s.whatsapp.net".into()),
            qr: None,
            groups: Mutex::new(Vec::new()),
            participants: Mutex::new(HashMap::new()),
            add_errors: HashMap::new(),
            sent: Arc::new(Mutex::new(Vec::new())),
            restarts: Arc::new(AtomicUsize::new(0)),
            fail_send: false,
            msg_counter: AtomicUsize::new(0),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            state: SessionState::Disconnected,
            self_jid: None,
            ..Self::connected()
        }
    }

    pub fn pairing_with_qr(qr: &str) -> Self {
        Self {
            state: SessionState::Pairing,
            self_jid: None,
            qr: Some(qr.to_string()),
            ..Self::connected()
        }
    }

    pub fn failing_sends() -> Self {
        Self {
            fail_send: true,
            ..Self::connected()
        }
    }

    pub fn with_self_jid(mut self, jid: &str) -> Self {
        self.self_jid = Some(jid.to_string());
        self
    }

    /// Register a group with its participant list. The mock recomputes
    /// `is_admin` from `self_jid` like the real adapter does.
    pub fn with_group(self, jid: &str, name: &str, participants: Vec<LiveParticipant>) -> Self {
        let is_admin = match &self.self_jid {
            Some(me) => participants
                .iter()
                .any(|p| p.jid == *me && (p.is_admin || p.is_super_admin)),
            None => false,
        };
        self.groups.lock().unwrap().push(LiveGroup {
            jid: jid.to_string(),
            name: name.to_string(),
            participant_count: participants.len(),
            is_admin,
        });
        self.participants
            .lock()
            .unwrap()
            .insert(jid.to_string(), participants);
        self
    }

    /// Make adds for a given participant JID fail with a protocol code.
    pub fn with_add_error(mut self, jid: &str, code: u16) -> Self {
        self.add_errors.insert(jid.to_string(), code);
        self
    }

    fn ensure_ready(&self) -> Result<(), WagonError> {
        if self.state != SessionState::Connected {
            return Err(WagonError::NotReady("whatsapp client not connected".into()));
        }
        Ok(())
    }

    fn next_msg_id(&self) -> String {
        let n = self.msg_counter.fetch_add(1, Ordering::SeqCst);
        format!("3EB0MOCK{n:04}")
    }

    fn record_send(&self, jid: &str, kind: &str, body: &str) -> Result<String, WagonError> {
        self.ensure_ready()?;
        if self.fail_send {
            return Err(WagonError::Channel("connection reset".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((jid.to_string(), kind.to_string(), body.to_string()));
        Ok(self.next_msg_id())
    }

    /// Participant entry helper.
    pub fn participant(jid: &str, is_admin: bool) -> LiveParticipant {
        LiveParticipant {
            jid: jid.to_string(),
            is_admin,
            is_super_admin: false,
        }
    }
}

#[async_trait]
impl WhatsAppTransport for MockTransport {
    async fn status(&self) -> SessionStatus {
        SessionStatus {
            is_ready: self.state == SessionState::Connected,
            is_authenticated: self.state == SessionState::Connected,
            state: self.state,
            has_qr: self.qr.is_some(),
        }
    }

    async fn qr_png(&self) -> Result<Option<Vec<u8>>, WagonError> {
        // Real adapter renders a PNG; magic bytes are enough for tests.
        Ok(self
            .qr
            .as_ref()
            .map(|_| vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]))
    }

    async fn restart(&self) -> Result<(), WagonError> {
        self.restarts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn self_jid(&self) -> Option<String> {
        self.self_jid.clone()
    }

    async fn send_text(&self, jid: &str, text: &str) -> Result<String, WagonError> {
        self.record_send(jid, "text", text)
    }

    async fn send_link(&self, jid: &str, text: &str, url: &str) -> Result<String, WagonError> {
        self.record_send(jid, "link", &format!("{text} {url}"))
    }

    async fn send_media(
        &self,
        jid: &str,
        bytes: Vec<u8>,
        mime: &str,
        _caption: &str,
    ) -> Result<String, WagonError> {
        self.record_send(jid, "media", &format!("{mime}:{}", bytes.len()))
    }

    async fn list_groups(&self) -> Result<Vec<LiveGroup>, WagonError> {
        self.ensure_ready()?;
        Ok(self.groups.lock().unwrap().clone())
    }

    async fn group_participants(
        &self,
        group_jid: &str,
    ) -> Result<Vec<LiveParticipant>, WagonError> {
        self.ensure_ready()?;
        self.participants
            .lock()
            .unwrap()
            .get(group_jid)
            .cloned()
            .ok_or_else(|| WagonError::NotFound(format!("whatsapp group {group_jid} not found")))
    }

    async fn create_group(
        &self,
        name: &str,
        participant_jids: Vec<String>,
    ) -> Result<LiveGroup, WagonError> {
        self.ensure_ready()?;
        let jid = format!("1203630000{}@g.us", self.groups.lock().unwrap().len());
        let mut participants: Vec<LiveParticipant> = participant_jids
            .iter()
            .map(|j| Self::participant(j, false))
            .collect();
        if let Some(me) = &self.self_jid {
            participants.push(Self::participant(me, true));
        }
        let group = LiveGroup {
            jid: jid.clone(),
            name: name.to_string(),
            participant_count: participants.len(),
            is_admin: true,
        };
        self.groups.lock().unwrap().push(group.clone());
        self.participants.lock().unwrap().insert(jid, participants);
        Ok(group)
    }

    async fn add_participants(
        &self,
        group_jid: &str,
        participant_jids: Vec<String>,
    ) -> Result<Vec<AddAttempt>, WagonError> {
        self.ensure_ready()?;
        let mut out = Vec::new();
        for jid in participant_jids {
            match self.add_errors.get(&jid) {
                Some(code) => out.push(AddAttempt {
                    jid,
                    added: false,
                    error_code: Some(*code),
                }),
                None => {
                    if let Some(list) = self.participants.lock().unwrap().get_mut(group_jid) {
                        list.push(Self::participant(&jid, false));
                    }
                    out.push(AddAttempt {
                        jid,
                        added: true,
                        error_code: None,
                    });
                }
            }
        }
        Ok(out)
    }

    async fn remove_participant(
        &self,
        group_jid: &str,
        participant_jid: &str,
    ) -> Result<(), WagonError> {
        self.ensure_ready()?;
        let mut participants = self.participants.lock().unwrap();
        let list = participants
            .get_mut(group_jid)
            .ok_or_else(|| WagonError::NotFound(format!("whatsapp group {group_jid} not found")))?;
        let before = list.len();
        list.retain(|p| p.jid != participant_jid);
        if list.len() == before {
            return Err(WagonError::NotFound(format!(
                "participant {participant_jid} is not in group {group_jid}"
            )));
        }
        Ok(())
    }
}
