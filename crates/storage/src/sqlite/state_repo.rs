use chrono::Utc;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{PersistedState, StateRepository, StorageError};

#[async_trait::async_trait]
impl StateRepository for SqliteRepository {
    async fn load_state(&self, key: &str) -> Result<Option<PersistedState>, StorageError> {
        let row = sqlx::query("SELECT value FROM app_state WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row.try_get("value").map_err(ser)?;
        PersistedState::from_json(&raw).map(Some)
    }

    async fn save_state(&self, key: &str, state: &PersistedState) -> Result<(), StorageError> {
        let raw = state.to_json()?;
        sqlx::query(
            r"
            INSERT INTO app_state (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(raw)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn clear_state(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM app_state WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
