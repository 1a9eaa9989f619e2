//! Outbound notices with bounded retries and a plain-text fallback

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tally_common::{GroupId, Result, UserId};
use tally_config::NotificationConfig;
use tokio::sync::RwLock;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tracing::{debug, warn};

/// Where a notice goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeTarget {
    /// Posted in a group
    Group(GroupId),
    /// Sent privately to a user
    User(UserId),
}

/// A message to deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Recipient
    pub target: NoticeTarget,
    /// Text body
    pub text: String,
    /// Image shown with the rich form
    pub image_url: Option<String>,
}

impl Notice {
    /// Notice for a group
    pub fn group(group_id: GroupId, text: impl Into<String>) -> Self {
        Self {
            target: NoticeTarget::Group(group_id),
            text: text.into(),
            image_url: None,
        }
    }

    /// Notice for a single user
    pub fn user(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            target: NoticeTarget::User(user_id),
            text: text.into(),
            image_url: None,
        }
    }

    /// Attach an image to the rich form
    #[must_use]
    pub fn with_image(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }
}

/// Transport for notices
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send with formatting and image
    async fn send_rich(&self, notice: &Notice) -> Result<()>;

    /// Send the text alone
    async fn send_plain(&self, notice: &Notice) -> Result<()>;
}

/// Retry bounds for one delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// Attempts per format
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
}

impl DeliveryPolicy {
    /// Policy described by the configuration
    pub fn from_config(config: &NotificationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            retry_delay: config.retry_delay(),
        }
    }

    fn strategy(self) -> impl Iterator<Item = Duration> {
        let delay = u64::try_from(self.retry_delay.as_millis()).unwrap_or(u64::MAX);
        FixedInterval::from_millis(delay).take(self.max_attempts.saturating_sub(1) as usize)
    }
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// How a notice ended up being delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Rich form went through
    Rich,
    /// Only the plain fallback went through
    Plain,
    /// Nothing went through
    Dropped,
}

/// Deliver `notice`, rich first and plain as fallback
///
/// Never fails; a notice that cannot be sent is logged and dropped.
pub async fn deliver(notifier: &dyn Notifier, notice: &Notice, policy: DeliveryPolicy) -> Delivery {
    match Retry::spawn(policy.strategy(), || notifier.send_rich(notice)).await {
        Ok(()) => return Delivery::Rich,
        Err(e) => debug!(error = %e, target = ?notice.target, "Rich notice failed, falling back to plain"),
    }

    match Retry::spawn(policy.strategy(), || notifier.send_plain(notice)).await {
        Ok(()) => Delivery::Plain,
        Err(e) => {
            warn!(error = %e, target = ?notice.target, "Dropping undeliverable notice");
            Delivery::Dropped
        }
    }
}

/// Limits repeated notices to one per user per interval
#[derive(Debug)]
pub struct NoticeThrottle {
    /// Last notice time for each user
    last_sent: Arc<RwLock<HashMap<UserId, DateTime<Utc>>>>,
    /// Minimum time between notices for the same user
    interval: chrono::Duration,
}

impl NoticeThrottle {
    /// Throttle with the given interval
    pub fn new(interval: Duration) -> Self {
        Self {
            last_sent: Arc::new(RwLock::new(HashMap::new())),
            interval: chrono::Duration::from_std(interval)
                .unwrap_or_else(|_| chrono::Duration::days(1)),
        }
    }

    /// Claim the right to notify `user_id` at `now`
    ///
    /// Returns `true` and records the send when the interval has elapsed.
    pub async fn try_acquire_at(&self, user_id: UserId, now: DateTime<Utc>) -> bool {
        let mut last_sent = self.last_sent.write().await;

        match last_sent.get(&user_id) {
            Some(last) if now - *last < self.interval => false,
            _ => {
                last_sent.insert(user_id, now);
                true
            }
        }
    }

    /// Clean up entries older than the interval
    pub async fn cleanup_old_entries(&self, now: DateTime<Utc>) -> usize {
        let mut last_sent = self.last_sent.write().await;

        let initial_count = last_sent.len();
        last_sent.retain(|_, at| now - *at < self.interval);
        let cleaned_count = initial_count - last_sent.len();

        if cleaned_count > 0 {
            debug!("Cleaned up {} old notice throttle entries", cleaned_count);
        }
        cleaned_count
    }

    /// Forget a user
    pub async fn clear_user(&self, user_id: UserId) {
        self.last_sent.write().await.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tally_common::TallyError;

    fn fast_policy(max_attempts: u32) -> DeliveryPolicy {
        DeliveryPolicy {
            max_attempts,
            retry_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_rich_success_skips_plain() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send_rich().times(1).returning(|_| Ok(()));
        notifier.expect_send_plain().times(0);

        let notice = Notice::group(GroupId(1), "hello");
        assert_eq!(deliver(&notifier, &notice, fast_policy(3)).await, Delivery::Rich);
    }

    #[tokio::test]
    async fn test_rich_is_retried_before_success() {
        let mut notifier = MockNotifier::new();
        let mut calls = 0;
        notifier.expect_send_rich().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(TallyError::delivery("timeout"))
            } else {
                Ok(())
            }
        });

        let notice = Notice::group(GroupId(1), "hello");
        assert_eq!(deliver(&notifier, &notice, fast_policy(3)).await, Delivery::Rich);
    }

    #[tokio::test]
    async fn test_falls_back_to_plain_after_max_attempts() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_rich()
            .times(3)
            .returning(|_| Err(TallyError::delivery("no embeds")));
        notifier.expect_send_plain().times(1).returning(|_| Ok(()));

        let notice = Notice::user(UserId(1), "hello");
        assert_eq!(deliver(&notifier, &notice, fast_policy(3)).await, Delivery::Plain);
    }

    #[tokio::test]
    async fn test_drops_when_everything_fails() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_rich()
            .times(2)
            .returning(|_| Err(TallyError::delivery("down")));
        notifier
            .expect_send_plain()
            .times(2)
            .returning(|_| Err(TallyError::delivery("down")));

        let notice = Notice::group(GroupId(1), "hello");
        assert_eq!(deliver(&notifier, &notice, fast_policy(2)).await, Delivery::Dropped);
    }

    #[tokio::test]
    async fn test_throttle_allows_one_notice_per_interval() {
        let throttle = NoticeThrottle::new(Duration::from_secs(60));
        let t0 = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();

        assert!(throttle.try_acquire_at(UserId(1), t0).await);
        assert!(!throttle.try_acquire_at(UserId(1), t0 + chrono::Duration::seconds(59)).await);
        assert!(throttle.try_acquire_at(UserId(2), t0).await);
        assert!(throttle.try_acquire_at(UserId(1), t0 + chrono::Duration::seconds(60)).await);
    }

    #[tokio::test]
    async fn test_throttle_cleanup() {
        let throttle = NoticeThrottle::new(Duration::from_secs(10));
        let t0 = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();

        throttle.try_acquire_at(UserId(1), t0).await;
        throttle.try_acquire_at(UserId(2), t0 + chrono::Duration::seconds(8)).await;

        let cleaned = throttle
            .cleanup_old_entries(t0 + chrono::Duration::seconds(12))
            .await;
        assert_eq!(cleaned, 1);

        throttle.clear_user(UserId(2)).await;
        assert!(throttle.try_acquire_at(UserId(2), t0 + chrono::Duration::seconds(12)).await);
    }
}
