//! Test utilities and shared test helpers for Tally Bot.
//!
//! Common fixtures and helper functions used across the workspace for unit
//! and integration testing. Enabled through the `testing` feature.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        // Another test binary harness may already own the global subscriber.
        let _ = fmt()
            .with_test_writer()
            .with_env_filter(filter)
            .try_init();
    });
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Chat-related test identifiers.
pub mod chat_fixtures {
    use crate::{GroupId, UserId};

    /// Create a test group ID.
    pub fn test_group_id() -> GroupId {
        GroupId(123456789012345678)
    }

    /// Create a test user ID.
    pub fn test_user_id() -> UserId {
        UserId(987654321098765432)
    }

    /// Create multiple test user IDs.
    pub fn test_user_ids(count: usize) -> Vec<UserId> {
        (0..count)
            .map(|i| UserId(100000000000000000 + i as u64))
            .collect()
    }
}

/// Configuration-related test utilities.
pub mod config_fixtures {
    /// Create a minimal valid test configuration as YAML string.
    pub fn minimal_config_yaml() -> &'static str {
        r#"
discord:
  token: "test_token"
"#
    }

    /// Create a full test configuration as YAML string.
    pub fn full_config_yaml() -> &'static str {
        concat!(
            "discord:\n",
            "  token: \"test_token_full\"\n",
            "  command_prefix: \"?\"\n",
            "  banner_image_url: \"https://example.com/banner.png\"\n",
            "  support_url: \"https://example.com/support\"\n",
            "\n",
            "database:\n",
            "  ledger_path: \"data/ledger.sqlite\"\n",
            "  preferences_path: \"data/preferences\"\n",
            "  max_connections: 4\n",
            "\n",
            "spam_guard:\n",
            "  preset: custom\n",
            "  max_events: 5\n",
            "  window_seconds: 3\n",
            "  block_minutes: 10\n",
            "  notice_interval_seconds: 30\n",
            "\n",
            "notifications:\n",
            "  max_attempts: 2\n",
            "  retry_delay_ms: 100\n",
            "\n",
            "data:\n",
            "  default_language: \"fr\"\n",
            "\n",
            "logging:\n",
            "  level: \"debug\"\n",
            "  format: \"compact\"\n"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_multiple_calls() {
        // Should not panic when called multiple times
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_user_ids_are_distinct() {
        let ids = chat_fixtures::test_user_ids(5);
        assert_eq!(ids.len(), 5);
        assert_ne!(ids[0], ids[4]);
    }
}
