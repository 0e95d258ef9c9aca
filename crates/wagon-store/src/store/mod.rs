//! SQLite-backed relational store.
//!
//! Split into focused submodules:
//! - `users` — account rows for auth
//! - `groups` — database-tracked marketing groups
//! - `members` — per-group member rows with the pending/active/rejected lifecycle
//! - `subscribers` — standalone marketing contacts
//! - `messages` — per-send message history
//! - `campaigns` — bulk-send campaigns and the due-campaign scan

mod campaigns;
mod groups;
mod members;
mod messages;
mod subscribers;
mod users;

pub use campaigns::CampaignUpdate;
pub use groups::GroupUpdate;
pub use subscribers::SubscriberUpdate;

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;
use wagon_core::{config::StoreConfig, error::WagonError, shellexpand};

/// Hard cap on page size; anything larger is clamped.
const MAX_PAGE_LIMIT: i64 = 100;

/// Persistent store backed by SQLite.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

/// Pagination block returned by every list operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

/// One page of list results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, page: i64, limit: i64, total_items: i64) -> Self {
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items + limit - 1) / limit
        };
        Self {
            items,
            pagination: Pagination {
                current_page: page,
                total_pages,
                total_items,
            },
        }
    }
}

/// Clamp raw pagination params to sane bounds: page >= 1, 1 <= limit <= 100.
pub(crate) fn clamp_page(page: i64, limit: i64) -> (i64, i64) {
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_LIMIT);
    (page, limit)
}

/// Build a LIKE pattern for substring search, escaping the wildcards.
pub(crate) fn like_pattern(search: &str) -> String {
    let escaped = search.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

/// Translate a sqlx error, mapping UNIQUE violations to `Conflict`.
pub(crate) fn db_err(context: &str, e: sqlx::Error) -> WagonError {
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint failed") {
        WagonError::Conflict(format!("{context}: duplicate value"))
    } else {
        WagonError::Store(format!("{context}: {msg}"))
    }
}

impl Store {
    /// Create a new store, running migrations on first use.
    pub async fn new(config: &StoreConfig) -> Result<Self, WagonError> {
        let db_path = shellexpand(&config.db_path);

        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| WagonError::Store(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| WagonError::Store(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| WagonError::Store(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("store initialized at {db_path}");

        Ok(Self { pool })
    }

    /// Open an in-memory store, for tests.
    pub async fn in_memory() -> Result<Self, WagonError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| WagonError::Store(format!("invalid db options: {e}")))?
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|e| WagonError::Store(format!("failed to open in-memory db: {e}")))?;
        Self::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run SQL migrations, tracking which have already been applied.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), WagonError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| WagonError::Store(format!("failed to create migrations table: {e}")))?;

        let migrations: &[(&str, &str)] = &[
            ("001_init", include_str!("../../migrations/001_init.sql")),
            ("002_indexes", include_str!("../../migrations/002_indexes.sql")),
        ];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        WagonError::Store(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| WagonError::Store(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await
                .map_err(|e| {
                    WagonError::Store(format!("failed to record migration {name}: {e}"))
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
