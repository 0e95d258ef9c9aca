//! Per-group member rows with the pending/active/rejected lifecycle.

use super::{clamp_page, db_err, Page, Store};
use crate::models::{Member, MEMBER_STATUSES};
use uuid::Uuid;
use wagon_core::error::WagonError;

impl Store {
    /// Insert a member row in `pending` state.
    pub async fn add_member(
        &self,
        group_id: &str,
        member_name: &str,
        member_number: &str,
    ) -> Result<Member, WagonError> {
        // FK is deferred until execution; check up front for a clean 404.
        self.get_group(group_id).await?;

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO members (id, group_id, member_name, member_number) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(group_id)
        .bind(member_name)
        .bind(member_number)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("failed to add member", e))?;

        self.get_member(&id).await
    }

    pub async fn get_member(&self, id: &str) -> Result<Member, WagonError> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to fetch member: {e}")))?
            .ok_or_else(|| WagonError::NotFound(format!("member {id} not found")))
    }

    /// Find a member of a group by phone number.
    pub async fn find_member_by_number(
        &self,
        group_id: &str,
        member_number: &str,
    ) -> Result<Option<Member>, WagonError> {
        sqlx::query_as::<_, Member>(
            "SELECT * FROM members WHERE group_id = ? AND member_number = ?",
        )
        .bind(group_id)
        .bind(member_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WagonError::Store(format!("failed to look up member: {e}")))
    }

    pub async fn list_members(
        &self,
        group_id: &str,
        page: i64,
        limit: i64,
        status: Option<&str>,
    ) -> Result<Page<Member>, WagonError> {
        self.get_group(group_id).await?;

        let (page, limit) = clamp_page(page, limit);
        let offset = (page - 1) * limit;

        let (items, total) = match status {
            Some(s) => {
                let items = sqlx::query_as::<_, Member>(
                    "SELECT * FROM members WHERE group_id = ? AND status = ? \
                     ORDER BY joined_at DESC LIMIT ? OFFSET ?",
                )
                .bind(group_id)
                .bind(s)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| WagonError::Store(format!("failed to list members: {e}")))?;
                let (total,): (i64,) = sqlx::query_as(
                    "SELECT COUNT(*) FROM members WHERE group_id = ? AND status = ?",
                )
                .bind(group_id)
                .bind(s)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| WagonError::Store(format!("failed to count members: {e}")))?;
                (items, total)
            }
            None => {
                let items = sqlx::query_as::<_, Member>(
                    "SELECT * FROM members WHERE group_id = ? \
                     ORDER BY joined_at DESC LIMIT ? OFFSET ?",
                )
                .bind(group_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| WagonError::Store(format!("failed to list members: {e}")))?;
                let (total,): (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM members WHERE group_id = ?")
                        .bind(group_id)
                        .fetch_one(&self.pool)
                        .await
                        .map_err(|e| WagonError::Store(format!("failed to count members: {e}")))?;
                (items, total)
            }
        };

        Ok(Page::new(items, page, limit, total))
    }

    /// Phone numbers of active members, for fan-out sends.
    pub async fn active_member_numbers(&self, group_id: &str) -> Result<Vec<String>, WagonError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT member_number FROM members WHERE group_id = ? AND status = 'active'",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WagonError::Store(format!("failed to fetch member numbers: {e}")))?;
        Ok(rows.into_iter().map(|(n,)| n).collect())
    }

    pub async fn update_member_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<Member, WagonError> {
        if !MEMBER_STATUSES.contains(&status) {
            return Err(WagonError::Validation(format!(
                "invalid member status '{status}', expected one of: {}",
                MEMBER_STATUSES.join(", ")
            )));
        }

        let result = sqlx::query("UPDATE members SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to update member: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(WagonError::NotFound(format!("member {id} not found")));
        }

        let member = self.get_member(id).await?;
        self.refresh_member_count(&member.group_id).await?;
        Ok(member)
    }

    pub async fn delete_member(&self, id: &str) -> Result<(), WagonError> {
        let member = self.get_member(id).await?;
        sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to delete member: {e}")))?;
        self.refresh_member_count(&member.group_id).await?;
        Ok(())
    }
}
