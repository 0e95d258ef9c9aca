//! Campaign execution — template rendering and subscriber fan-out.

use crate::dispatch::{dispatch, DispatchTarget};
use std::sync::Arc;
use tracing::info;
use wagon_core::error::WagonError;
use wagon_core::template;
use wagon_core::traits::WhatsAppTransport;
use wagon_core::types::OutboundContent;
use wagon_store::models::Campaign;
use wagon_store::Store;

/// Run one campaign: render its template per active subscriber and fan out
/// as individual sends.
///
/// Only `draft` and `scheduled` campaigns run; anything else is a
/// `Validation` error (re-sending a sent campaign included). Zero active
/// subscribers is `EmptyTarget` and leaves the campaign untouched.
pub async fn run_campaign(
    store: &Store,
    transport: &Arc<dyn WhatsAppTransport>,
    country_code: &str,
    campaign_id: &str,
) -> Result<Campaign, WagonError> {
    let campaign = store.get_campaign(campaign_id).await?;
    if campaign.status != "draft" && campaign.status != "scheduled" {
        return Err(WagonError::Validation(format!(
            "campaign {campaign_id} has already run (status '{}')",
            campaign.status
        )));
    }

    let subscribers = store.active_subscribers().await?;
    if subscribers.is_empty() {
        return Err(WagonError::EmptyTarget(
            "no active subscribers to send to".into(),
        ));
    }

    let mut sent: i64 = 0;
    let mut failed: i64 = 0;
    for sub in subscribers {
        let text = template::render(
            &campaign.message_template,
            &[("name", sub.name.as_str()), ("phone", sub.phone_number.as_str())],
        );
        let report = dispatch(
            store,
            transport,
            country_code,
            DispatchTarget::Individual(sub.phone_number.clone()),
            OutboundContent::Text(text),
        )
        .await;
        match report {
            Ok(r) if r.failed == 0 => sent += 1,
            // Delivery failure or a bad stored number; the campaign goes on.
            _ => failed += 1,
        }
    }

    let finished = store.finish_campaign(campaign_id, sent, failed).await?;
    info!(
        "campaign {campaign_id} finished: {sent} sent, {failed} failed, status '{}'",
        finished.status
    );
    Ok(finished)
}

/// Background task: run scheduled campaigns when their time comes.
///
/// Scans every `poll_secs` for campaigns with `status='scheduled'` and
/// `scheduled_at <= now`.
pub async fn scheduler_loop(
    store: Store,
    transport: Arc<dyn WhatsAppTransport>,
    country_code: String,
    poll_secs: u64,
) {
    loop {
        tokio::time::sleep(std::time::Duration::from_secs(poll_secs)).await;

        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        match store.due_campaigns(&now).await {
            Ok(due) => {
                for campaign in due {
                    info!("scheduler: running campaign {} ({})", campaign.id, campaign.name);
                    if let Err(e) =
                        run_campaign(&store, &transport, &country_code, &campaign.id).await
                    {
                        tracing::error!("scheduler: campaign {} failed: {e}", campaign.id);
                    }
                }
            }
            Err(e) => {
                tracing::error!("scheduler: due-campaign scan failed: {e}");
            }
        }
    }
}
