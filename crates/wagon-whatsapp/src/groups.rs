//! Live group operations — listing, creation, membership changes.

use crate::send::parse_jid;
use crate::session::WhatsAppSession;
use tracing::warn;
use wacore_binary::jid::Jid;
use wagon_core::error::WagonError;
use wagon_core::types::{AddAttempt, LiveGroup, LiveParticipant};

impl WhatsAppSession {
    /// List the groups this account is currently in.
    pub(crate) async fn joined_groups(&self) -> Result<Vec<LiveGroup>, WagonError> {
        let client = self.connected_client().await?;
        let self_jid = self.self_jid.lock().await.clone();

        let groups = client
            .get_joined_groups()
            .await
            .map_err(|e| WagonError::Channel(format!("failed to list whatsapp groups: {e}")))?;

        let mut out = Vec::with_capacity(groups.len());
        for info in groups {
            let is_admin = match &self_jid {
                Some(me) => info
                    .participants
                    .iter()
                    .any(|p| p.jid.to_string() == *me && (p.is_admin || p.is_super_admin)),
                None => false,
            };
            out.push(LiveGroup {
                jid: info.jid.to_string(),
                name: info.subject.clone(),
                participant_count: info.participant_count as usize,
                is_admin,
            });
        }
        Ok(out)
    }

    /// Fetch a single group's metadata and participant list.
    pub(crate) async fn group_metadata(
        &self,
        group_jid: &str,
    ) -> Result<(LiveGroup, Vec<LiveParticipant>), WagonError> {
        let client = self.connected_client().await?;
        let jid = parse_jid(group_jid)?;
        let self_jid = self.self_jid.lock().await.clone();

        let info = client
            .query_group_metadata(&jid)
            .await
            .map_err(|e| map_group_err(group_jid, e))?;

        let participants: Vec<LiveParticipant> = info
            .participants
            .iter()
            .map(|p| LiveParticipant {
                jid: p.jid.to_string(),
                is_admin: p.is_admin,
                is_super_admin: p.is_super_admin,
            })
            .collect();

        let is_admin = match &self_jid {
            Some(me) => participants
                .iter()
                .any(|p| p.jid == *me && (p.is_admin || p.is_super_admin)),
            None => false,
        };

        let group = LiveGroup {
            jid: info.jid.to_string(),
            name: info.subject.clone(),
            participant_count: participants.len(),
            is_admin,
        };
        Ok((group, participants))
    }

    /// Create a new group with the given participants.
    pub(crate) async fn create_live_group(
        &self,
        name: &str,
        participant_jids: &[String],
    ) -> Result<LiveGroup, WagonError> {
        let client = self.connected_client().await?;
        let jids = parse_all(participant_jids)?;

        let info = client
            .create_group(name.to_string(), jids)
            .await
            .map_err(|e| WagonError::Channel(format!("failed to create whatsapp group: {e}")))?;

        Ok(LiveGroup {
            jid: info.jid.to_string(),
            name: info.subject.clone(),
            participant_count: info.participant_count as usize,
            // We created it, so we are the owner.
            is_admin: true,
        })
    }

    /// Add participants one at a time, collecting per-number outcomes.
    ///
    /// The protocol reports per-participant error codes: 400 invalid number,
    /// 403 not authorized or blocked by privacy settings, 404 not on
    /// WhatsApp, 409 already a member, 429 rate limited.
    pub(crate) async fn add_group_participants(
        &self,
        group_jid: &str,
        participant_jids: &[String],
    ) -> Result<Vec<AddAttempt>, WagonError> {
        let client = self.connected_client().await?;
        let gjid = parse_jid(group_jid)?;

        let mut attempts = Vec::with_capacity(participant_jids.len());
        for jid_str in participant_jids {
            let jid: Jid = match jid_str.parse() {
                Ok(j) => j,
                Err(_) => {
                    attempts.push(AddAttempt {
                        jid: jid_str.clone(),
                        added: false,
                        error_code: Some(400),
                    });
                    continue;
                }
            };

            match client.add_group_participants(&gjid, &[jid.clone()]).await {
                Ok(results) => {
                    for (rjid, added, error_code) in results {
                        attempts.push(AddAttempt {
                            jid: rjid.to_string(),
                            added,
                            error_code,
                        });
                    }
                }
                Err(e) => {
                    warn!("failed to add {jid} to {group_jid}: {e}");
                    let msg = e.to_string();
                    let error_code = if msg.contains("429") || msg.contains("rate-overlimit") {
                        Some(429)
                    } else if msg.contains("400") || msg.contains("bad-request") {
                        Some(400)
                    } else if msg.contains("403") {
                        Some(403)
                    } else {
                        None
                    };
                    attempts.push(AddAttempt {
                        jid: jid.to_string(),
                        added: false,
                        error_code,
                    });
                }
            }
        }
        Ok(attempts)
    }

    /// Remove a single participant from a group.
    pub(crate) async fn remove_group_participant(
        &self,
        group_jid: &str,
        participant_jid: &str,
    ) -> Result<(), WagonError> {
        let client = self.connected_client().await?;
        let gjid = parse_jid(group_jid)?;
        let pjid = parse_jid(participant_jid)?;

        client
            .remove_group_participants(&gjid, &[pjid])
            .await
            .map_err(|e| map_group_err(group_jid, e))?;
        Ok(())
    }
}

fn parse_all(jid_strs: &[String]) -> Result<Vec<Jid>, WagonError> {
    jid_strs.iter().map(|s| parse_jid(s)).collect()
}

/// Map a protocol error on a group operation to a domain error.
fn map_group_err(group_jid: &str, e: impl std::fmt::Display) -> WagonError {
    let msg = e.to_string();
    if msg.contains("403") || msg.contains("not-authorized") || msg.contains("forbidden") {
        WagonError::Permission(format!("not an admin of group {group_jid}"))
    } else if msg.contains("404") || msg.contains("item-not-found") {
        WagonError::NotFound(format!("whatsapp group {group_jid} not found"))
    } else {
        WagonError::Channel(format!("group operation on {group_jid} failed: {msg}"))
    }
}
