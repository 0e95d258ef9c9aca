//! Standalone marketing contacts.

use super::{clamp_page, db_err, like_pattern, Page, Store};
use crate::models::{Subscriber, SUBSCRIBER_STATUSES};
use uuid::Uuid;
use wagon_core::error::WagonError;

/// Optional fields for a partial subscriber update.
#[derive(Debug, Default)]
pub struct SubscriberUpdate {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub status: Option<String>,
    pub tags: Option<String>,
    pub notes: Option<String>,
}

impl Store {
    /// Insert a subscriber. Phone numbers are unique; duplicates yield `Conflict`.
    pub async fn create_subscriber(
        &self,
        name: &str,
        phone_number: &str,
        email: Option<&str>,
        whatsapp_id: Option<&str>,
        tags: &str,
        notes: &str,
    ) -> Result<Subscriber, WagonError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO subscribers (id, name, phone_number, email, whatsapp_id, tags, notes) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(phone_number)
        .bind(email)
        .bind(whatsapp_id)
        .bind(tags)
        .bind(notes)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("failed to create subscriber", e))?;

        self.get_subscriber(&id).await
    }

    pub async fn get_subscriber(&self, id: &str) -> Result<Subscriber, WagonError> {
        sqlx::query_as::<_, Subscriber>("SELECT * FROM subscribers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to fetch subscriber: {e}")))?
            .ok_or_else(|| WagonError::NotFound(format!("subscriber {id} not found")))
    }

    pub async fn list_subscribers(
        &self,
        page: i64,
        limit: i64,
        search: Option<&str>,
        status: Option<&str>,
    ) -> Result<Page<Subscriber>, WagonError> {
        let (page, limit) = clamp_page(page, limit);
        let offset = (page - 1) * limit;

        let mut wheres: Vec<&str> = Vec::new();
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);
        if pattern.is_some() {
            wheres.push("(name LIKE ? ESCAPE '\\' OR phone_number LIKE ? ESCAPE '\\')");
        }
        if status.is_some() {
            wheres.push("status = ?");
        }
        let where_clause = if wheres.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", wheres.join(" AND "))
        };

        let list_sql = format!(
            "SELECT * FROM subscribers{where_clause} ORDER BY created_at DESC LIMIT ? OFFSET ?"
        );
        let count_sql = format!("SELECT COUNT(*) FROM subscribers{where_clause}");

        let mut list_query = sqlx::query_as::<_, Subscriber>(&list_sql);
        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
        if let Some(p) = &pattern {
            list_query = list_query.bind(p).bind(p);
            count_query = count_query.bind(p).bind(p);
        }
        if let Some(s) = status {
            list_query = list_query.bind(s);
            count_query = count_query.bind(s);
        }

        let items = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to list subscribers: {e}")))?;
        let (total,) = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to count subscribers: {e}")))?;

        Ok(Page::new(items, page, limit, total))
    }

    /// Everyone in `active` status, for campaign fan-out.
    pub async fn active_subscribers(&self) -> Result<Vec<Subscriber>, WagonError> {
        sqlx::query_as::<_, Subscriber>(
            "SELECT * FROM subscribers WHERE status = 'active' ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WagonError::Store(format!("failed to fetch active subscribers: {e}")))
    }

    pub async fn update_subscriber(
        &self,
        id: &str,
        update: SubscriberUpdate,
    ) -> Result<Subscriber, WagonError> {
        if let Some(status) = &update.status {
            if !SUBSCRIBER_STATUSES.contains(&status.as_str()) {
                return Err(WagonError::Validation(format!(
                    "invalid subscriber status '{status}', expected one of: {}",
                    SUBSCRIBER_STATUSES.join(", ")
                )));
            }
        }

        let mut sets: Vec<&str> = Vec::new();
        if update.name.is_some() {
            sets.push("name = ?");
        }
        if update.email.is_some() {
            sets.push("email = ?");
        }
        if update.status.is_some() {
            sets.push("status = ?");
        }
        if update.tags.is_some() {
            sets.push("tags = ?");
        }
        if update.notes.is_some() {
            sets.push("notes = ?");
        }
        if sets.is_empty() {
            return self.get_subscriber(id).await;
        }

        let sql = format!("UPDATE subscribers SET {} WHERE id = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        if let Some(v) = update.name {
            query = query.bind(v);
        }
        if let Some(v) = update.email {
            query = query.bind(v);
        }
        if let Some(v) = update.status {
            query = query.bind(v);
        }
        if let Some(v) = update.tags {
            query = query.bind(v);
        }
        if let Some(v) = update.notes {
            query = query.bind(v);
        }
        let result = query
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("failed to update subscriber", e))?;

        if result.rows_affected() == 0 {
            return Err(WagonError::NotFound(format!("subscriber {id} not found")));
        }
        self.get_subscriber(id).await
    }

    pub async fn delete_subscriber(&self, id: &str) -> Result<(), WagonError> {
        let result = sqlx::query("DELETE FROM subscribers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to delete subscriber: {e}")))?;
        if result.rows_affected() == 0 {
            return Err(WagonError::NotFound(format!("subscriber {id} not found")));
        }
        Ok(())
    }
}
