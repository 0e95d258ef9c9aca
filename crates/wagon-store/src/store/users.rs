//! User accounts for API authentication.

use super::{db_err, Store};
use crate::models::User;
use uuid::Uuid;
use wagon_core::error::WagonError;

impl Store {
    /// Insert a user row. Emails are unique; a duplicate yields `Conflict`.
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User, WagonError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, name) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("failed to create user", e))?;

        self.get_user(&id).await
    }

    pub async fn get_user(&self, id: &str) -> Result<User, WagonError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to fetch user: {e}")))?
            .ok_or_else(|| WagonError::NotFound(format!("user {id} not found")))
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, WagonError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WagonError::Store(format!("failed to look up user: {e}")))
    }
}
