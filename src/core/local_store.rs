// src/core/local_store.rs
//! SQLite-backed key/value store standing in for browser local storage

use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{AutomationError, AutomationResult};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const SELECTED_PLAN_KEY: &str = "selectedPlan";
pub const SESSION_KEY: &str = "session";
pub const VERIFICATION_KEY: &str = "naukriVerification";

/// Every key written on behalf of a login; removed together on logout
pub const SESSION_KEYS: [&str; 5] = [
    TOKEN_KEY,
    USER_KEY,
    SELECTED_PLAN_KEY,
    SESSION_KEY,
    VERIFICATION_KEY,
];

#[derive(Debug, Clone)]
pub struct LocalStore {
    pool: SqlitePool,
    database_path: PathBuf,
}

impl LocalStore {
    /// Open (creating if needed) the store at `database_path`
    pub async fn open(database_path: &Path) -> AutomationResult<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AutomationError::Storage(format!(
                    "Failed to create storage directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await?;

        let store = Self {
            pool,
            database_path: database_path.to_path_buf(),
        };
        store.migrate().await?;

        info!("Local storage opened: {}", database_path.display());
        Ok(store)
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    async fn migrate(&self) -> AutomationResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, key: &str) -> AutomationResult<Option<String>> {
        let value: Option<(String,)> =
            sqlx::query_as("SELECT value FROM local_storage WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value.map(|(v,)| v))
    }

    pub async fn set(&self, key: &str, value: &str) -> AutomationResult<()> {
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove(&self, key: &str) -> AutomationResult<()> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Read a JSON value; a corrupt entry is logged and treated as absent
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> AutomationResult<Option<T>> {
        let Some(raw) = self.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Discarding unreadable local storage entry '{}': {}", key, e);
                Ok(None)
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> AutomationResult<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| AutomationError::Storage(format!("Failed to serialize '{}': {}", key, e)))?;
        self.set(key, &raw).await
    }

    /// Remove all session keys in one transaction
    pub async fn clear_session(&self) -> AutomationResult<()> {
        let mut tx = self.pool.begin().await?;
        for key in SESSION_KEYS {
            sqlx::query("DELETE FROM local_storage WHERE key = ?")
                .bind(key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!("Cleared local session storage");
        Ok(())
    }
}
