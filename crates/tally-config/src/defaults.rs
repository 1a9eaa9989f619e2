//! Default values for every configuration section.

use crate::schema::*;
use std::path::PathBuf;
use tally_i18n::Language;

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            command_prefix: "!".to_string(),
            banner_image_url: None,
            support_url: None,
            updates_url: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("data/ledger.sqlite"),
            preferences_path: PathBuf::from("data/preferences"),
            max_connections: 5,
        }
    }
}

impl Default for SpamGuardConfig {
    fn default() -> Self {
        Self {
            preset: RatePreset::Burst,
            max_events: 10,
            window_seconds: 2,
            block_minutes: 20,
            notice_interval_seconds: 60,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            default_language: Language::English,
        }
    }
}
