//! Range and presence checks applied after loading.

use crate::schema::Config;
use std::time::Duration;
use tally_common::TallyError;

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TallyError> {
        if self.discord.token.trim().is_empty() {
            return Err(TallyError::validation_field(
                "Discord token cannot be empty",
                "discord.token",
            ));
        }

        if self.discord.command_prefix.is_empty() {
            return Err(TallyError::validation_field(
                "Command prefix cannot be empty",
                "discord.command_prefix",
            ));
        }

        for (url, field) in [
            (&self.discord.support_url, "discord.support_url"),
            (&self.discord.updates_url, "discord.updates_url"),
        ] {
            if let Some(url) = url {
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(TallyError::validation_field(
                        "Links must be http or https URLs",
                        field,
                    ));
                }
            }
        }

        self.validate_storage()?;
        self.validate_spam_guard()?;

        if !(1..=10).contains(&self.notifications.max_attempts) {
            return Err(TallyError::validation_field(
                "Notification attempts must be between 1 and 10",
                "notifications.max_attempts",
            ));
        }

        Ok(())
    }

    fn validate_storage(&self) -> Result<(), TallyError> {
        if self.database.ledger_path.as_os_str().is_empty() {
            return Err(TallyError::validation_field(
                "Ledger path cannot be empty",
                "database.ledger_path",
            ));
        }

        if self.database.preferences_path.as_os_str().is_empty() {
            return Err(TallyError::validation_field(
                "Preferences path cannot be empty",
                "database.preferences_path",
            ));
        }

        if self.database.max_connections == 0 {
            return Err(TallyError::validation_field(
                "At least one ledger connection is required",
                "database.max_connections",
            ));
        }

        Ok(())
    }

    fn validate_spam_guard(&self) -> Result<(), TallyError> {
        let (max_events, window) = self.spam_guard.limits();

        if max_events < 2 {
            return Err(TallyError::validation_field(
                "Flood threshold must allow at least one message (max_events >= 2)",
                "spam_guard.max_events",
            ));
        }

        if window.is_zero() || window > Duration::from_secs(3600) {
            return Err(TallyError::validation_field(
                "Flood window must be between 1 second and 1 hour",
                "spam_guard.window_seconds",
            ));
        }

        if !(1..=24 * 60).contains(&self.spam_guard.block_minutes) {
            return Err(TallyError::validation_field(
                "Block duration must be between 1 minute and 24 hours",
                "spam_guard.block_minutes",
            ));
        }

        Ok(())
    }
}
