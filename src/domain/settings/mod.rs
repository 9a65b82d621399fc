pub mod error;
pub mod model;
pub mod service;

pub use error::SettingsError;
pub use model::{Language, Settings, SettingsPatch, Theme};
pub use service::{SettingsService, SettingsServiceApi};
