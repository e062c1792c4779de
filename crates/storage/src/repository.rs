use async_trait::async_trait;
use quiz_core::model::DisplaySettings;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for persisted display preferences.
///
/// Quiz results are never stored; this is the only state kept across runs.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Fetch the saved display settings, if any were ever saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or holds an invalid value.
    async fn get_settings(&self) -> Result<Option<DisplaySettings>, StorageError>;

    /// Persist display settings, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &DisplaySettings) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    settings: Arc<Mutex<Option<DisplaySettings>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<DisplaySettings>, StorageError> {
        let guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(*guard)
    }

    async fn save_settings(&self, settings: &DisplaySettings) -> Result<(), StorageError> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(*settings);
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub settings: Arc<dyn SettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let settings: Arc<dyn SettingsRepository> = Arc::new(InMemoryRepository::new());
        Self { settings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Theme;

    #[tokio::test]
    async fn empty_repository_has_no_settings() {
        let repo = InMemoryRepository::new();
        assert!(repo.get_settings().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn round_trips_theme() {
        let storage = Storage::in_memory();
        storage
            .settings
            .save_settings(&DisplaySettings::new(Theme::Dark))
            .await
            .unwrap();

        let fetched = storage.settings.get_settings().await.unwrap().unwrap();
        assert_eq!(fetched.theme(), Theme::Dark);
    }
}
