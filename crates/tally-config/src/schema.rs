//! Configuration schema definitions using serde.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tally_common::logging::LoggingConfig;
use tally_i18n::Language;

/// Main configuration structure for Tally Bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discord configuration.
    pub discord: DiscordConfig,
    /// Storage locations.
    pub database: DatabaseConfig,
    /// Flood detection policy.
    pub spam_guard: SpamGuardConfig,
    /// Outbound notice delivery.
    pub notifications: NotificationConfig,
    /// Data presentation configuration.
    pub data: DataConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord bot token.
    pub token: String,
    /// Prefix for text commands.
    pub command_prefix: String,
    /// Image attached to rich notices and the welcome message.
    pub banner_image_url: Option<String>,
    /// Support server or page linked from the welcome message.
    pub support_url: Option<String>,
    /// Announcement channel or page linked from the welcome message.
    pub updates_url: Option<String>,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file holding the activity ledger.
    pub ledger_path: PathBuf,
    /// Sled directory holding user preferences.
    pub preferences_path: PathBuf,
    /// Maximum pooled ledger connections.
    pub max_connections: u32,
}

/// Named flood detection policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatePreset {
    /// 10 messages within 2 seconds.
    Burst,
    /// 2 messages within 7 seconds, i.e. any message sent less than
    /// 7 seconds after the previous one.
    Spacing,
    /// Use `max_events` and `window_seconds` verbatim.
    Custom,
}

/// Flood detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpamGuardConfig {
    /// Which policy to apply.
    pub preset: RatePreset,
    /// Events within the window that trip a block (custom preset only).
    pub max_events: u32,
    /// Trailing window length in seconds (custom preset only).
    pub window_seconds: u64,
    /// How long a block lasts.
    pub block_minutes: u64,
    /// Minimum seconds between "still blocked" replies to one user.
    pub notice_interval_seconds: u64,
}

/// Outbound notice delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Attempts per delivery format before giving up on it.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub retry_delay_ms: u64,
}

/// Data presentation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Language for users without a stored preference.
    pub default_language: Language,
}

impl SpamGuardConfig {
    /// Resolves the preset into `(max_events, window)`.
    pub fn limits(&self) -> (u32, Duration) {
        match self.preset {
            RatePreset::Burst => (10, Duration::from_secs(2)),
            RatePreset::Spacing => (2, Duration::from_secs(7)),
            RatePreset::Custom => (self.max_events, Duration::from_secs(self.window_seconds)),
        }
    }

    /// Block duration.
    pub fn block_duration(&self) -> Duration {
        Duration::from_secs(self.block_minutes * 60)
    }

    /// Minimum interval between repeated block notices.
    pub fn notice_interval(&self) -> Duration {
        Duration::from_secs(self.notice_interval_seconds)
    }
}

impl NotificationConfig {
    /// Delay between attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
