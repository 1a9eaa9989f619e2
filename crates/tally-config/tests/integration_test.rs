//! Integration tests for tally-config crate.

use std::time::Duration;
use tally_common::test_utils::config_fixtures;
use tally_config::{Config, ConfigLoader, RatePreset};
use tally_i18n::Language;

#[test]
fn test_default_config_validation() {
    let mut config = Config::default();

    // Default config should fail validation due to the empty token
    assert!(config.validate().is_err());

    config.discord.token = "test_token".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_full_fixture_round_trip() {
    let config = ConfigLoader::parse(config_fixtures::full_config_yaml()).unwrap();
    assert!(config.validate().is_ok());

    assert_eq!(config.discord.command_prefix, "?");
    assert_eq!(
        config.discord.banner_image_url.as_deref(),
        Some("https://example.com/banner.png")
    );
    assert_eq!(
        config.discord.support_url.as_deref(),
        Some("https://example.com/support")
    );
    assert!(config.discord.updates_url.is_none());
    assert_eq!(config.database.max_connections, 4);
    assert_eq!(config.spam_guard.preset, RatePreset::Custom);
    assert_eq!(config.spam_guard.limits(), (5, Duration::from_secs(3)));
    assert_eq!(config.spam_guard.block_duration(), Duration::from_secs(600));
    assert_eq!(config.spam_guard.notice_interval(), Duration::from_secs(30));
    assert_eq!(config.notifications.retry_delay(), Duration::from_millis(100));
    assert_eq!(config.data.default_language, Language::French);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_rate_env_overrides_reach_the_policy() {
    let mut config = ConfigLoader::parse(config_fixtures::minimal_config_yaml()).unwrap();
    assert_eq!(config.spam_guard.limits(), (10, Duration::from_secs(2)));

    ConfigLoader::apply_overrides_from(&mut config, |var| match var {
        "TALLY_RATE_MAX_EVENTS" => Some("4".to_string()),
        "TALLY_RATE_WINDOW_SECONDS" => Some("30".to_string()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.spam_guard.limits(), (4, Duration::from_secs(30)));
    assert!(config.validate().is_ok());
}
