//! Profile, app settings, message counter and logout.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::ValidationError;
use crate::models::profile::{Profile, ProfileUpdate};
use crate::onboarding::draft::DraftSession;
use crate::state::{AppState, UserData};
use crate::store::{keys, save_json, save_string};

pub mod handlers;

pub const SUPPORTED_LANGUAGES: &[&str] = &["tr", "en", "es", "pt", "de", "fr"];

pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub language: String,
    pub privacy_lock_enabled: bool,
    pub notifications_enabled: bool,
}

impl Settings {
    pub fn with_language(language: &str) -> Self {
        Self {
            language: language.to_string(),
            privacy_lock_enabled: false,
            notifications_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub language: Option<String>,
    pub privacy_lock_enabled: Option<bool>,
    pub notifications_enabled: Option<bool>,
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

impl AppState {
    pub async fn profile(&self) -> Profile {
        self.data.read().await.profile.clone()
    }

    /// Profile-edit flow. The registration date is never touched.
    pub async fn save_profile(&self, update: &ProfileUpdate) -> Result<Profile, ValidationError> {
        if matches!(&update.user_name, Some(name) if name.trim().is_empty()) {
            return Err(ValidationError::EmptyUserName);
        }

        let profile = {
            let mut data = self.data.write().await;
            update.apply_to(&mut data.profile);
            data.profile.clone()
        };

        save_json(self.store.as_ref(), keys::USER_DATA, &profile).await;
        Ok(profile)
    }

    pub async fn settings(&self) -> Settings {
        self.data.read().await.settings.clone()
    }

    pub async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings, ValidationError> {
        if let Some(lang) = &update.language {
            if !is_supported_language(lang) {
                return Err(ValidationError::UnsupportedLanguage(lang.clone()));
            }
        }

        let settings = {
            let mut data = self.data.write().await;
            if let Some(lang) = &update.language {
                data.settings.language = lang.clone();
            }
            if let Some(enabled) = update.privacy_lock_enabled {
                data.settings.privacy_lock_enabled = enabled;
            }
            if let Some(enabled) = update.notifications_enabled {
                data.settings.notifications_enabled = enabled;
            }
            data.settings.clone()
        };

        let store = self.store.as_ref();
        if update.language.is_some() {
            save_string(store, keys::USER_LANGUAGE, &settings.language).await;
        }
        if update.privacy_lock_enabled.is_some() {
            save_string(
                store,
                keys::PRIVACY_LOCK_ENABLED,
                bool_str(settings.privacy_lock_enabled),
            )
            .await;
        }
        if update.notifications_enabled.is_some() {
            save_string(
                store,
                keys::NOTIFICATIONS_ENABLED,
                bool_str(settings.notifications_enabled),
            )
            .await;
        }
        Ok(settings)
    }

    pub async fn increment_message_count(&self, amount: u64) -> u64 {
        let count = {
            let mut data = self.data.write().await;
            data.total_message_count += amount;
            data.total_message_count
        };
        save_string(self.store.as_ref(), keys::TOTAL_MESSAGE_COUNT, &count.to_string()).await;
        count
    }

    /// Wipes the store and every in-memory value. Today's token counter is
    /// written back afterwards so a logout does not reset the daily quota.
    pub async fn logout(&self) {
        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear store on logout: {e}");
        }

        *self.data.write().await = UserData::fresh(self.now_utc(), &self.default_language);
        *self.draft_session() = DraftSession::default();

        self.usage.persist().await;
        info!("Logged out, local data cleared");
    }
}
