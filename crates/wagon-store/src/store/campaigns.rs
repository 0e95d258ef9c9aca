//! Bulk-send campaigns and the due-campaign scan.

use super::{clamp_page, Page, Store};
use crate::models::{Campaign, CAMPAIGN_STATUSES};
use uuid::Uuid;
use wagon_core::error::WagonError;

/// Optional fields for a partial campaign update.
#[derive(Debug, Default)]
pub struct CampaignUpdate {
    pub name: Option<String>,
    pub message_template: Option<String>,
    pub target_type: Option<String>,
    pub status: Option<String>,
    pub scheduled_at: Option<Option<String>>,
}

impl Store {
    pub async fn create_campaign(
        &self,
        name: &str,
        message_template: &str,
        target_type: &str,
        scheduled_at: Option<&str>,
    ) -> Result<Campaign, WagonError> {
        let id = Uuid::new_v4().to_string();
        let status = if scheduled_at.is_some() { "scheduled" } else { "draft" };
        sqlx::query(
            "INSERT INTO campaigns (id, name, message_template, target_type, status, scheduled_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(message_template)
        .bind(target_type)
        .bind(status)
        .bind(scheduled_at)
        .execute(&self.pool)
        .await
        .map_err(|e| WagonError::Store(format!("failed to create campaign: {e}")))?;

        self.get_campaign(&id).await
    }

    pub async fn get_campaign(&self, id: &str) -> Result<Campaign, WagonError> {
        sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to fetch campaign: {e}")))?
            .ok_or_else(|| WagonError::NotFound(format!("campaign {id} not found")))
    }

    pub async fn list_campaigns(
        &self,
        page: i64,
        limit: i64,
        status: Option<&str>,
    ) -> Result<Page<Campaign>, WagonError> {
        let (page, limit) = clamp_page(page, limit);
        let offset = (page - 1) * limit;

        let (items, total) = match status {
            Some(s) => {
                let items = sqlx::query_as::<_, Campaign>(
                    "SELECT * FROM campaigns WHERE status = ? \
                     ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(s)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| WagonError::Store(format!("failed to list campaigns: {e}")))?;
                let (total,): (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM campaigns WHERE status = ?")
                        .bind(s)
                        .fetch_one(&self.pool)
                        .await
                        .map_err(|e| {
                            WagonError::Store(format!("failed to count campaigns: {e}"))
                        })?;
                (items, total)
            }
            None => {
                let items = sqlx::query_as::<_, Campaign>(
                    "SELECT * FROM campaigns ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| WagonError::Store(format!("failed to list campaigns: {e}")))?;
                let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM campaigns")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| WagonError::Store(format!("failed to count campaigns: {e}")))?;
                (items, total)
            }
        };

        Ok(Page::new(items, page, limit, total))
    }

    pub async fn update_campaign(
        &self,
        id: &str,
        update: CampaignUpdate,
    ) -> Result<Campaign, WagonError> {
        if let Some(status) = &update.status {
            if !CAMPAIGN_STATUSES.contains(&status.as_str()) {
                return Err(WagonError::Validation(format!(
                    "invalid campaign status '{status}', expected one of: {}",
                    CAMPAIGN_STATUSES.join(", ")
                )));
            }
        }

        let mut sets: Vec<&str> = Vec::new();
        if update.name.is_some() {
            sets.push("name = ?");
        }
        if update.message_template.is_some() {
            sets.push("message_template = ?");
        }
        if update.target_type.is_some() {
            sets.push("target_type = ?");
        }
        if update.status.is_some() {
            sets.push("status = ?");
        }
        if update.scheduled_at.is_some() {
            sets.push("scheduled_at = ?");
        }
        if sets.is_empty() {
            return self.get_campaign(id).await;
        }

        let sql = format!("UPDATE campaigns SET {} WHERE id = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        if let Some(v) = update.name {
            query = query.bind(v);
        }
        if let Some(v) = update.message_template {
            query = query.bind(v);
        }
        if let Some(v) = update.target_type {
            query = query.bind(v);
        }
        if let Some(v) = update.status {
            query = query.bind(v);
        }
        if let Some(v) = update.scheduled_at {
            query = query.bind(v);
        }
        let result = query
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to update campaign: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(WagonError::NotFound(format!("campaign {id} not found")));
        }
        self.get_campaign(id).await
    }

    pub async fn delete_campaign(&self, id: &str) -> Result<(), WagonError> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to delete campaign: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(WagonError::NotFound(format!("campaign {id} not found")));
        }
        Ok(())
    }

    /// Scheduled campaigns whose time has come.
    pub async fn due_campaigns(&self, now: &str) -> Result<Vec<Campaign>, WagonError> {
        sqlx::query_as::<_, Campaign>(
            "SELECT * FROM campaigns \
             WHERE status = 'scheduled' AND scheduled_at IS NOT NULL AND scheduled_at <= ? \
             ORDER BY scheduled_at",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WagonError::Store(format!("failed to scan due campaigns: {e}")))
    }

    /// Record the outcome of a campaign run.
    pub async fn finish_campaign(
        &self,
        id: &str,
        sent_count: i64,
        failed_count: i64,
    ) -> Result<Campaign, WagonError> {
        let status = if sent_count == 0 && failed_count > 0 { "failed" } else { "sent" };
        sqlx::query(
            "UPDATE campaigns SET status = ?, sent_count = ?, failed_count = ? WHERE id = ?",
        )
        .bind(status)
        .bind(sent_count)
        .bind(failed_count)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| WagonError::Store(format!("failed to finish campaign: {e}")))?;
        self.get_campaign(id).await
    }
}
