use std::sync::Arc;

use quiz_core::model::DisplaySettings;
use storage::repository::SettingsRepository;
use tracing::debug;

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<DisplaySettings, SettingsServiceError> {
        let settings = self.repo.get_settings().await?;
        Ok(settings.unwrap_or_default())
    }

    /// Switch between light and dark themes and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if loading or saving fails.
    pub async fn toggle_theme(&self) -> Result<DisplaySettings, SettingsServiceError> {
        let settings = self.load().await?.with_theme_toggled();
        self.repo.save_settings(&settings).await?;
        debug!(theme = %settings.theme(), "display theme saved");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Theme;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn load_defaults_to_light() {
        let service = SettingsService::new(Arc::new(InMemoryRepository::new()));
        assert_eq!(service.load().await.unwrap().theme(), Theme::Light);
    }

    #[tokio::test]
    async fn toggle_persists_theme() {
        let repo = InMemoryRepository::new();
        let service = SettingsService::new(Arc::new(repo.clone()));

        assert_eq!(service.toggle_theme().await.unwrap().theme(), Theme::Dark);
        let stored = repo.get_settings().await.unwrap().unwrap();
        assert_eq!(stored.theme(), Theme::Dark);

        assert_eq!(service.toggle_theme().await.unwrap().theme(), Theme::Light);
    }
}
