use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;
use tracing::info;

use crate::persistence::{
    load_json_or_default,
    save_json,
};

pub const SETTINGS_FILE: &str = "settings.json";
pub const API_URL_ENV: &str = "GURUKUL_API_BASE_URL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("'{0}' is not a valid http(s) URL")]
    InvalidUrl(String),

    #[error("request timeout must be at least one second")]
    ZeroTimeout,

    #[error("reference cache lifetime must be at least one second")]
    ZeroCacheTtl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsData {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub dark_mode: bool,
    /// Base URL from `settings.json` while an environment override is in effect.
    #[serde(skip)]
    file_base_url: Option<String>,
}

impl Default for SettingsData {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsData {
    pub fn new() -> Self {
        Self {
            api_base_url: "http://localhost:5002".to_string(),
            request_timeout_secs: 30,
            cache_ttl_secs: 60,
            dark_mode: true,
            file_base_url: None,
        }
    }

    /// Saved settings, with the base URL taken from the environment when set.
    pub fn load() -> Self {
        let mut settings = load_json_or_default::<SettingsData>(SETTINGS_FILE);
        settings.apply_url_override(std::env::var(API_URL_ENV).ok());
        settings
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        save_json(&self.persisted(), SETTINGS_FILE)
    }

    /// What goes to disk: an environment override is not written back.
    fn persisted(&self) -> SettingsData {
        let mut saved = self.clone();
        if let Some(file_url) = saved.file_base_url.take() {
            saved.api_base_url = file_url;
        }
        saved
    }

    /// Marks the base URL as chosen by the user, so it is saved even if an override was active.
    pub fn set_base_url(&mut self, url: String) {
        if url != self.api_base_url {
            self.file_base_url = None;
        }
        self.api_base_url = url;
    }

    fn apply_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            info!(%url, "api base url taken from {}", API_URL_ENV);
            let file_url = std::mem::replace(&mut self.api_base_url, url);
            self.file_base_url.get_or_insert(file_url);
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        match reqwest::Url::parse(self.api_base_url.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => return Err(SettingsError::InvalidUrl(self.api_base_url.clone())),
        }
        if self.request_timeout_secs == 0 {
            return Err(SettingsError::ZeroTimeout);
        }
        if self.cache_ttl_secs == 0 {
            return Err(SettingsError::ZeroCacheTtl);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: SettingsData =
            serde_json::from_str(r#"{ "api_base_url": "http://api.internal:8080" }"#).unwrap();

        assert_eq!(settings.api_base_url, "http://api.internal:8080");
        assert_eq!(settings.cache_ttl(), Duration::from_secs(60));
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn environment_override_replaces_url() {
        let mut settings = SettingsData::new();
        settings.apply_url_override(Some("  ".to_string()));
        assert_eq!(settings.api_base_url, "http://localhost:5002");

        settings.apply_url_override(Some("https://gurukul.example.org".to_string()));
        assert_eq!(settings.api_base_url, "https://gurukul.example.org");
    }

    #[test]
    fn environment_override_is_not_saved() {
        let mut settings = SettingsData::new();
        settings.apply_url_override(Some("https://gurukul.example.org".to_string()));
        settings.dark_mode = false;

        let saved = settings.persisted();
        assert_eq!(saved.api_base_url, "http://localhost:5002");
        assert!(!saved.dark_mode);
        assert_eq!(
            serde_json::to_value(&saved).unwrap()["api_base_url"],
            serde_json::json!("http://localhost:5002")
        );
    }

    #[test]
    fn explicit_url_replaces_override_on_disk() {
        let mut settings = SettingsData::new();
        settings.apply_url_override(Some("https://gurukul.example.org".to_string()));
        settings.set_base_url("http://10.0.0.5:5002".to_string());

        assert_eq!(settings.persisted().api_base_url, "http://10.0.0.5:5002");
    }

    #[test]
    fn zero_cache_ttl_is_rejected_and_clamped() {
        let mut settings = SettingsData::new();
        settings.cache_ttl_secs = 0;

        assert_eq!(settings.validate(), Err(SettingsError::ZeroCacheTtl));
        assert_eq!(settings.cache_ttl(), Duration::from_secs(1));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut settings = SettingsData::new();
        assert_eq!(settings.validate(), Ok(()));

        settings.api_base_url = "localhost:5002".to_string();
        assert!(matches!(settings.validate(), Err(SettingsError::InvalidUrl(_))));

        settings.api_base_url = "http://localhost:5002".to_string();
        settings.request_timeout_secs = 0;
        assert_eq!(settings.validate(), Err(SettingsError::ZeroTimeout));
    }
}
