use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{SettingsRepository, StorageError};
use quiz_core::model::DisplaySettings;

use super::SqliteRepository;

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<DisplaySettings>, StorageError> {
        let row = sqlx::query("SELECT theme FROM display_settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let theme: String = row
            .try_get("theme")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        DisplaySettings::from_persisted(&theme)
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save_settings(&self, settings: &DisplaySettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO display_settings (id, theme, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                theme = excluded.theme,
                updated_at = excluded.updated_at
            ",
        )
        .bind(1_i64)
        .bind(settings.theme().as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
