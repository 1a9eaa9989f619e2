//! Integration tests for tally-bot crate.
//!
//! These tests wire the services the way the bot does at startup and drive
//! messages through them without a Discord connection.

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tally_bot::{spawn_maintenance, BotError, Services};
use tally_common::test_utils::config_fixtures::full_config_yaml;
use tally_common::test_utils::{create_temp_dir, init_test_logging};
use tally_common::{GroupId, Result, UserId};
use tally_config::{Config, ConfigLoader, RatePreset};
use tally_i18n::Language;
use tally_stats::{
    ActivityLedger, AdmissionOutcome, EventKind, InboundEvent, Notice, NoticeTarget, Notifier,
    Window,
};

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<Notice> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_rich(&self, notice: &Notice) -> Result<()> {
        self.sent.lock().unwrap().push(notice.clone());
        Ok(())
    }

    async fn send_plain(&self, notice: &Notice) -> Result<()> {
        self.send_rich(notice).await
    }
}

fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.discord.token = "test_token".to_string();
    config.discord.banner_image_url = Some("https://example.com/flood.png".to_string());
    config.database.ledger_path = dir.join("ledger.sqlite");
    config.database.preferences_path = dir.join("preferences");
    config.spam_guard.preset = RatePreset::Spacing;
    config.notifications.retry_delay_ms = 1;
    config
}

fn message(user: u64, group: u64) -> InboundEvent {
    InboundEvent {
        user_id: UserId(user),
        display_name: format!("user{user}"),
        group_id: Some(GroupId(group)),
        group_display_name: "general".to_string(),
        kind: EventKind::TextMessage,
    }
}

#[tokio::test]
async fn test_flood_notice_uses_configured_banner() {
    init_test_logging();
    let dir = create_temp_dir();
    let config = config_in(dir.path());
    let services = Services::open(&config).await.unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let tracker = services.tracker(&config, notifier.clone());

    let first = tracker.handle(&message(1, 10)).await.unwrap();
    let second = tracker.handle(&message(1, 10)).await.unwrap();

    assert_eq!(first, AdmissionOutcome::Recorded);
    assert_eq!(second, AdmissionOutcome::FloodDetected);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].target, NoticeTarget::Group(GroupId(10)));
    assert_eq!(sent[0].image_url.as_deref(), Some("https://example.com/flood.png"));

    let board = services
        .aggregator()
        .group_leaderboard(GroupId(10), Window::Today)
        .await
        .unwrap();
    assert_eq!(board.total, 1);
    assert_eq!(board.entries[0].label, "user1");
    services.close().await;
}

#[tokio::test]
async fn test_ledger_and_preferences_survive_restart() {
    let dir = create_temp_dir();
    let config = config_in(dir.path());

    {
        let services = Services::open(&config).await.unwrap();
        let tracker = services.tracker(&config, Arc::new(RecordingNotifier::default()));
        tracker.handle(&message(1, 10)).await.unwrap();
        tracker.handle(&message(2, 10)).await.unwrap();
        services
            .preferences
            .set_language(UserId(1), Language::German)
            .await
            .unwrap();
        services.close().await;
    }

    let services = Services::open(&config).await.unwrap();
    assert_eq!(services.ledger.total(GroupId(10), None).await.unwrap(), 2);
    let stats = services.aggregator().user_stats(UserId(1)).await.unwrap();
    assert_eq!(stats.overall, 1);
    assert_eq!(stats.language, Language::German);
    services.close().await;
}

#[tokio::test]
async fn test_full_fixture_wires_custom_policy() {
    let dir = create_temp_dir();
    let mut config = ConfigLoader::parse(full_config_yaml()).unwrap();
    config.database.ledger_path = dir.path().join("ledger.sqlite");
    config.database.preferences_path = dir.path().join("preferences");
    config.validate().unwrap();

    let services = Services::open(&config).await.unwrap();
    let policy = services.guard.policy();
    assert_eq!(policy.max_events, 5);
    assert_eq!(policy.window, Duration::from_secs(3));
    assert_eq!(policy.block_duration, Duration::from_secs(600));
    assert_eq!(services.preferences.default_language(), Language::French);
    services.close().await;
}

#[tokio::test]
async fn test_maintenance_task_keeps_running() {
    let dir = create_temp_dir();
    let config = config_in(dir.path());
    let services = Services::open(&config).await.unwrap();
    let tracker = Arc::new(services.tracker(&config, Arc::new(RecordingNotifier::default())));

    let handle = spawn_maintenance(tracker, Duration::from_millis(5));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!handle.is_finished());
    handle.abort();
    services.close().await;
}

#[tokio::test]
async fn test_unwritable_ledger_path_is_a_storage_error() {
    let dir = create_temp_dir();
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let mut config = config_in(dir.path());
    config.database.ledger_path = blocker.join("ledger.sqlite");

    let error = Services::open(&config).await.err().unwrap();
    assert!(matches!(error, BotError::Tally(_)));
}
