//! Per-send message history.

use super::{clamp_page, Page, Store};
use crate::models::{MessageRecord, MESSAGE_STATUSES};
use uuid::Uuid;
use wagon_core::error::WagonError;

impl Store {
    /// Record an outbound message attempt in `pending` state.
    pub async fn record_message(
        &self,
        recipient: &str,
        content: &str,
        message_type: &str,
    ) -> Result<MessageRecord, WagonError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO messages (id, recipient, content, message_type) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(recipient)
        .bind(content)
        .bind(message_type)
        .execute(&self.pool)
        .await
        .map_err(|e| WagonError::Store(format!("failed to record message: {e}")))?;

        self.get_message(&id).await
    }

    /// Record an inbound message, already in `sent` state.
    pub async fn record_inbound(
        &self,
        message_id: &str,
        sender: &str,
        content: &str,
    ) -> Result<MessageRecord, WagonError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO messages (id, message_id, recipient, content, direction, status) \
             VALUES (?, ?, ?, ?, 'inbound', 'sent')",
        )
        .bind(&id)
        .bind(message_id)
        .bind(sender)
        .bind(content)
        .execute(&self.pool)
        .await
        .map_err(|e| WagonError::Store(format!("failed to record inbound message: {e}")))?;

        self.get_message(&id).await
    }

    pub async fn get_message(&self, id: &str) -> Result<MessageRecord, WagonError> {
        sqlx::query_as::<_, MessageRecord>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to fetch message: {e}")))?
            .ok_or_else(|| WagonError::NotFound(format!("message {id} not found")))
    }

    pub async fn list_messages(
        &self,
        page: i64,
        limit: i64,
        status: Option<&str>,
    ) -> Result<Page<MessageRecord>, WagonError> {
        let (page, limit) = clamp_page(page, limit);
        let offset = (page - 1) * limit;

        let (items, total) = match status {
            Some(s) => {
                let items = sqlx::query_as::<_, MessageRecord>(
                    "SELECT * FROM messages WHERE status = ? \
                     ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(s)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| WagonError::Store(format!("failed to list messages: {e}")))?;
                let (total,): (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM messages WHERE status = ?")
                        .bind(s)
                        .fetch_one(&self.pool)
                        .await
                        .map_err(|e| WagonError::Store(format!("failed to count messages: {e}")))?;
                (items, total)
            }
            None => {
                let items = sqlx::query_as::<_, MessageRecord>(
                    "SELECT * FROM messages ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| WagonError::Store(format!("failed to list messages: {e}")))?;
                let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| WagonError::Store(format!("failed to count messages: {e}")))?;
                (items, total)
            }
        };

        Ok(Page::new(items, page, limit, total))
    }

    /// Move a message to `sent` or `failed`, attaching the platform id or error.
    pub async fn update_message_status(
        &self,
        id: &str,
        status: &str,
        message_id: Option<&str>,
        error: Option<&str>,
    ) -> Result<MessageRecord, WagonError> {
        if !MESSAGE_STATUSES.contains(&status) {
            return Err(WagonError::Validation(format!(
                "invalid message status '{status}', expected one of: {}",
                MESSAGE_STATUSES.join(", ")
            )));
        }

        let result = sqlx::query(
            "UPDATE messages SET status = ?, \
             message_id = COALESCE(?, message_id), \
             error = ? \
             WHERE id = ?",
        )
        .bind(status)
        .bind(message_id)
        .bind(error)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| WagonError::Store(format!("failed to update message: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(WagonError::NotFound(format!("message {id} not found")));
        }
        self.get_message(id).await
    }
}
