//! Database-tracked marketing groups.

use super::{clamp_page, db_err, like_pattern, Page, Store};
use crate::models::{Group, GROUP_STATUSES};
use uuid::Uuid;
use wagon_core::error::WagonError;

/// Optional fields for a partial group update. `None` leaves a column alone.
#[derive(Debug, Default)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub wa_group_jid: Option<Option<String>>,
    pub status: Option<String>,
}

impl Store {
    pub async fn create_group(
        &self,
        name: &str,
        description: &str,
        wa_group_jid: Option<&str>,
    ) -> Result<Group, WagonError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO groups (id, name, description, wa_group_jid) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(description)
        .bind(wa_group_jid)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("failed to create group", e))?;

        self.get_group(&id).await
    }

    pub async fn get_group(&self, id: &str) -> Result<Group, WagonError> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to fetch group: {e}")))?
            .ok_or_else(|| WagonError::NotFound(format!("group {id} not found")))
    }

    /// Find the group linked to a live WhatsApp group, if any.
    pub async fn find_group_by_jid(&self, jid: &str) -> Result<Option<Group>, WagonError> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE wa_group_jid = ?")
            .bind(jid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to look up group: {e}")))
    }

    pub async fn list_groups(
        &self,
        page: i64,
        limit: i64,
        search: Option<&str>,
    ) -> Result<Page<Group>, WagonError> {
        let (page, limit) = clamp_page(page, limit);
        let offset = (page - 1) * limit;

        let (items, total) = match search {
            Some(s) if !s.trim().is_empty() => {
                let pattern = like_pattern(s.trim());
                let items = sqlx::query_as::<_, Group>(
                    "SELECT * FROM groups WHERE name LIKE ? ESCAPE '\\' \
                     ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(&pattern)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| WagonError::Store(format!("failed to list groups: {e}")))?;
                let (total,): (i64,) = sqlx::query_as(
                    "SELECT COUNT(*) FROM groups WHERE name LIKE ? ESCAPE '\\'",
                )
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| WagonError::Store(format!("failed to count groups: {e}")))?;
                (items, total)
            }
            _ => {
                let items = sqlx::query_as::<_, Group>(
                    "SELECT * FROM groups ORDER BY created_at DESC LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| WagonError::Store(format!("failed to list groups: {e}")))?;
                let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM groups")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| WagonError::Store(format!("failed to count groups: {e}")))?;
                (items, total)
            }
        };

        Ok(Page::new(items, page, limit, total))
    }

    /// Partial update: only the provided fields change.
    pub async fn update_group(&self, id: &str, update: GroupUpdate) -> Result<Group, WagonError> {
        if let Some(status) = &update.status {
            if !GROUP_STATUSES.contains(&status.as_str()) {
                return Err(WagonError::Validation(format!(
                    "invalid group status '{status}', expected one of: {}",
                    GROUP_STATUSES.join(", ")
                )));
            }
        }

        let mut sets: Vec<&str> = Vec::new();
        if update.name.is_some() {
            sets.push("name = ?");
        }
        if update.description.is_some() {
            sets.push("description = ?");
        }
        if update.wa_group_jid.is_some() {
            sets.push("wa_group_jid = ?");
        }
        if update.status.is_some() {
            sets.push("status = ?");
        }
        if sets.is_empty() {
            return self.get_group(id).await;
        }

        let sql = format!("UPDATE groups SET {} WHERE id = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        if let Some(v) = update.name {
            query = query.bind(v);
        }
        if let Some(v) = update.description {
            query = query.bind(v);
        }
        if let Some(v) = update.wa_group_jid {
            query = query.bind(v);
        }
        if let Some(v) = update.status {
            query = query.bind(v);
        }
        let result = query
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("failed to update group", e))?;

        if result.rows_affected() == 0 {
            return Err(WagonError::NotFound(format!("group {id} not found")));
        }
        self.get_group(id).await
    }

    /// Delete a group. Member rows go with it via the FK cascade.
    pub async fn delete_group(&self, id: &str) -> Result<(), WagonError> {
        let result = sqlx::query("DELETE FROM groups WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to delete group: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(WagonError::NotFound(format!("group {id} not found")));
        }
        Ok(())
    }

    /// Overwrite the derived member counter, e.g. from a live participant list.
    pub async fn set_member_count(&self, id: &str, count: i64) -> Result<(), WagonError> {
        let result = sqlx::query("UPDATE groups SET member_count = ? WHERE id = ?")
            .bind(count)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to update member count: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(WagonError::NotFound(format!("group {id} not found")));
        }
        Ok(())
    }

    /// Recompute the derived member counter from active member rows.
    pub async fn refresh_member_count(&self, id: &str) -> Result<i64, WagonError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM members WHERE group_id = ? AND status = 'active'",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| WagonError::Store(format!("failed to count members: {e}")))?;

        sqlx::query("UPDATE groups SET member_count = ? WHERE id = ?")
            .bind(count)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to update member count: {e}")))?;

        Ok(count)
    }
}
