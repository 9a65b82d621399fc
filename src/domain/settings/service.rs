use super::error::SettingsError;
use super::model::{Language, Settings, SettingsPatch, Theme};
use crate::infrastructure::repositories::app_state_repository::{LANGUAGE_KEY, THEME_KEY};
use crate::infrastructure::repositories::AppStateRepository;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct SettingsService {
    state_repo: Arc<AppStateRepository>,
    current: RwLock<Settings>,
}

impl SettingsService {
    /// Load each setting on its own; anything missing or unreadable falls back
    /// to its default.
    pub async fn load(state_repo: Arc<AppStateRepository>) -> Self {
        let language = load_or_default::<Language>(&state_repo, LANGUAGE_KEY).await;
        let theme = load_or_default::<Theme>(&state_repo, THEME_KEY).await;

        tracing::info!(
            language = language.as_str(),
            theme = theme.as_str(),
            "Settings loaded"
        );

        Self {
            state_repo,
            current: RwLock::new(Settings { language, theme }),
        }
    }
}

async fn load_or_default<T>(repo: &AppStateRepository, key: &str) -> T
where
    T: FromStr<Err = String> + Default,
{
    match repo.load(key).await {
        Ok(Some(raw)) => T::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key = key, error = %e, "Stored setting is invalid, using default");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key = key, error = %e, "Failed to load setting, using default");
            T::default()
        }
    }
}

#[async_trait]
pub trait SettingsServiceApi: Send + Sync {
    async fn get_settings(&self) -> Settings;

    /// Apply and persist the given fields together; omitted fields are kept.
    /// A failed save leaves every field as it was.
    async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, SettingsError>;
}

#[async_trait]
impl SettingsServiceApi for SettingsService {
    async fn get_settings(&self) -> Settings {
        *self.current.read().await
    }

    async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, SettingsError> {
        let mut current = self.current.write().await;

        let mut changes = Vec::new();
        if let Some(language) = patch.language {
            changes.push((LANGUAGE_KEY, language.as_str()));
        }
        if let Some(theme) = patch.theme {
            changes.push((THEME_KEY, theme.as_str()));
        }

        self.state_repo
            .save_all(&changes)
            .await
            .map_err(|e| SettingsError::Persistence(e.to_string()))?;

        if let Some(language) = patch.language {
            current.language = language;
        }
        if let Some(theme) = patch.theme {
            current.theme = theme;
        }

        tracing::info!(
            language = current.language.as_str(),
            theme = current.theme.as_str(),
            "Settings updated"
        );

        Ok(*current)
    }
}
