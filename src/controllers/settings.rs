use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use crate::{
    domain::settings::{Settings, SettingsPatch, SettingsServiceApi},
    error::{AppError, AppResult},
};

pub struct SettingsController {
    settings_service: Arc<dyn SettingsServiceApi>,
}

impl SettingsController {
    pub fn new(settings_service: Arc<dyn SettingsServiceApi>) -> Self {
        Self { settings_service }
    }

    /// GET /api/settings
    pub async fn get_settings(
        State(controller): State<Arc<SettingsController>>,
    ) -> AppResult<Json<Settings>> {
        Ok(Json(controller.settings_service.get_settings().await))
    }

    /// PATCH /api/settings - Update language and/or theme
    pub async fn update_settings(
        State(controller): State<Arc<SettingsController>>,
        payload: Result<Json<SettingsPatch>, JsonRejection>,
    ) -> AppResult<Json<Settings>> {
        let Json(patch) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
        let settings = controller.settings_service.update_settings(patch).await?;
        Ok(Json(settings))
    }
}
