//! Flood detection and temporary blocks
//!
//! The guard keeps a trailing window of admitted message timestamps per
//! `(user, group)` and blocks a user everywhere once a message would reach
//! the configured threshold. Blocks expire by comparison with the clock;
//! nothing runs when they lapse.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tally_common::{GroupId, Result, TallyError, UserId};
use tally_config::SpamGuardConfig;
use tracing::{debug, info};

/// Flood threshold and block length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    /// A message that would make this many within `window` trips the block
    pub max_events: u32,
    /// Trailing window length
    pub window: Duration,
    /// How long a block lasts
    pub block_duration: Duration,
}

impl RatePolicy {
    /// Default block length
    pub const DEFAULT_BLOCK: Duration = Duration::from_secs(20 * 60);

    /// 10 messages within 2 seconds
    pub const fn burst() -> Self {
        Self {
            max_events: 10,
            window: Duration::from_secs(2),
            block_duration: Self::DEFAULT_BLOCK,
        }
    }

    /// Any message sent less than 7 seconds after the previous one
    pub const fn spacing() -> Self {
        Self {
            max_events: 2,
            window: Duration::from_secs(7),
            block_duration: Self::DEFAULT_BLOCK,
        }
    }

    /// Policy described by the configuration
    pub fn from_config(config: &SpamGuardConfig) -> Self {
        let (max_events, window) = config.limits();
        Self {
            max_events,
            window,
            block_duration: config.block_duration(),
        }
    }

    /// Same policy with a different block length
    #[must_use]
    pub const fn with_block_duration(mut self, block_duration: Duration) -> Self {
        self.block_duration = block_duration;
        self
    }
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self::burst()
    }
}

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Count the message
    Admitted,
    /// The user is serving a block; the message is discarded
    Blocked {
        /// When the block lapses
        until: DateTime<Utc>,
    },
    /// This message started a block; it is discarded
    NewlyBlocked {
        /// When the block lapses
        until: DateTime<Utc>,
    },
}

/// Storage for active blocks
///
/// Implementations must make [`BlockStore::try_block`] atomic per user so
/// that one flood episode is reported exactly once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Expiry of the user's block, if any is stored (it may already have lapsed)
    async fn expiry(&self, user_id: UserId) -> Result<Option<DateTime<Utc>>>;

    /// Block `user_id` until `until` unless a block is already active at `now`
    ///
    /// Returns `true` only when this call created the block.
    async fn try_block(
        &self,
        user_id: UserId,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// Drop blocks that lapsed before `now`, returning how many were removed
    async fn prune(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Number of stored blocks
    async fn len(&self) -> Result<usize>;
}

/// Process-local block store
#[derive(Debug, Default)]
pub struct InMemoryBlockStore {
    blocks: DashMap<UserId, DateTime<Utc>>,
}

impl InMemoryBlockStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlockStore for InMemoryBlockStore {
    async fn expiry(&self, user_id: UserId) -> Result<Option<DateTime<Utc>>> {
        Ok(self.blocks.get(&user_id).map(|entry| *entry))
    }

    async fn try_block(
        &self,
        user_id: UserId,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        match self.blocks.entry(user_id) {
            Entry::Occupied(mut entry) => {
                if now < *entry.get() {
                    return Ok(false);
                }
                entry.insert(until);
                Ok(true)
            }
            Entry::Vacant(entry) => {
                entry.insert(until);
                Ok(true)
            }
        }
    }

    async fn prune(&self, now: DateTime<Utc>) -> Result<usize> {
        let before = self.blocks.len();
        self.blocks.retain(|_, until| now < *until);
        Ok(before - self.blocks.len())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.blocks.len())
    }
}

/// Per-user flood detector
pub struct SpamGuard {
    policy: RatePolicy,
    blocks: Arc<dyn BlockStore>,
    recent: DashMap<(UserId, GroupId), VecDeque<DateTime<Utc>>>,
}

impl SpamGuard {
    /// Guard with the given policy and block store
    pub fn new(policy: RatePolicy, blocks: Arc<dyn BlockStore>) -> Self {
        Self {
            policy,
            blocks,
            recent: DashMap::new(),
        }
    }

    /// Guard with an in-memory block store
    pub fn in_memory(policy: RatePolicy) -> Self {
        Self::new(policy, Arc::new(InMemoryBlockStore::new()))
    }

    /// Active policy
    pub const fn policy(&self) -> RatePolicy {
        self.policy
    }

    /// Check a message sent now
    pub async fn admit(&self, user_id: UserId, group_id: GroupId) -> Result<Admission> {
        self.admit_at(user_id, group_id, Utc::now()).await
    }

    /// Check a message sent at `now`
    ///
    /// The rate view counts admission attempts, not persisted rows: an
    /// admitted message stays in the window even if the caller then fails to
    /// record it.
    pub async fn admit_at(
        &self,
        user_id: UserId,
        group_id: GroupId,
        now: DateTime<Utc>,
    ) -> Result<Admission> {
        if let Some(until) = self.blocks.expiry(user_id).await? {
            if now < until {
                return Ok(Admission::Blocked { until });
            }
        }

        let window = chrono::Duration::from_std(self.policy.window)
            .map_err(|e| TallyError::config_with_source("Rate window out of range", e))?;
        let cutoff = now - window;

        let tripped = {
            let mut recent = self.recent.entry((user_id, group_id)).or_default();
            recent.retain(|at| *at > cutoff);
            let in_window = u32::try_from(recent.len()).unwrap_or(u32::MAX);

            if in_window.saturating_add(1) >= self.policy.max_events {
                recent.clear();
                true
            } else {
                recent.push_back(now);
                false
            }
        };

        if !tripped {
            return Ok(Admission::Admitted);
        }

        let block = chrono::Duration::from_std(self.policy.block_duration)
            .map_err(|e| TallyError::config_with_source("Block duration out of range", e))?;
        let until = now + block;

        if self.blocks.try_block(user_id, until, now).await? {
            info!(%user_id, %group_id, %until, "Flood detected, user blocked");
            Ok(Admission::NewlyBlocked { until })
        } else {
            // Another check won the race; report the block it created.
            let until = self.blocks.expiry(user_id).await?.unwrap_or(until);
            Ok(Admission::Blocked { until })
        }
    }

    /// Drop lapsed blocks and rate windows with nothing left in them
    pub async fn prune(&self, now: DateTime<Utc>) -> Result<usize> {
        let removed = self.blocks.prune(now).await?;

        if let Ok(window) = chrono::Duration::from_std(self.policy.window) {
            let cutoff = now - window;
            self.recent.retain(|_, recent| {
                recent.retain(|at| *at > cutoff);
                !recent.is_empty()
            });
        }

        if removed > 0 {
            debug!("Pruned {} lapsed blocks", removed);
        }
        Ok(removed)
    }

    /// Number of stored blocks
    pub async fn active_blocks(&self) -> Result<usize> {
        self.blocks.len().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
    }

    fn ms(millis: i64) -> chrono::Duration {
        chrono::Duration::milliseconds(millis)
    }

    #[tokio::test]
    async fn test_burst_blocks_on_tenth_message() {
        let guard = SpamGuard::in_memory(RatePolicy::burst());
        let (user, group) = (UserId(1), GroupId(1));

        for i in 0..9 {
            let outcome = guard.admit_at(user, group, t0() + ms(i * 100)).await.unwrap();
            assert_eq!(outcome, Admission::Admitted, "message {i}");
        }

        let outcome = guard.admit_at(user, group, t0() + ms(950)).await.unwrap();
        assert!(matches!(outcome, Admission::NewlyBlocked { .. }));
    }

    #[tokio::test]
    async fn test_slow_messages_never_trip_burst() {
        let guard = SpamGuard::in_memory(RatePolicy::burst());
        for i in 0..30 {
            let outcome = guard
                .admit_at(UserId(1), GroupId(1), t0() + ms(i * 500))
                .await
                .unwrap();
            assert_eq!(outcome, Admission::Admitted);
        }
    }

    #[tokio::test]
    async fn test_spacing_blocks_second_quick_message() {
        let guard = SpamGuard::in_memory(RatePolicy::spacing());
        let (user, group) = (UserId(1), GroupId(1));

        assert_eq!(guard.admit_at(user, group, t0()).await.unwrap(), Admission::Admitted);
        assert_eq!(
            guard.admit_at(user, group, t0() + ms(7_000)).await.unwrap(),
            Admission::Admitted
        );
        assert!(matches!(
            guard.admit_at(user, group, t0() + ms(13_000)).await.unwrap(),
            Admission::NewlyBlocked { .. }
        ));
    }

    #[tokio::test]
    async fn test_block_applies_in_every_group() {
        let guard = SpamGuard::in_memory(RatePolicy::spacing());
        let user = UserId(1);

        guard.admit_at(user, GroupId(1), t0()).await.unwrap();
        guard.admit_at(user, GroupId(1), t0() + ms(100)).await.unwrap();

        let outcome = guard.admit_at(user, GroupId(2), t0() + ms(200)).await.unwrap();
        assert!(matches!(outcome, Admission::Blocked { .. }));
        assert_eq!(
            guard.admit_at(UserId(2), GroupId(1), t0() + ms(200)).await.unwrap(),
            Admission::Admitted
        );
    }

    #[tokio::test]
    async fn test_block_expires() {
        let policy = RatePolicy::spacing().with_block_duration(Duration::from_secs(60));
        let guard = SpamGuard::in_memory(policy);
        let (user, group) = (UserId(1), GroupId(1));

        guard.admit_at(user, group, t0()).await.unwrap();
        let until = match guard.admit_at(user, group, t0() + ms(1)).await.unwrap() {
            Admission::NewlyBlocked { until } => until,
            other => panic!("expected a new block, got {other:?}"),
        };
        assert_eq!(until, t0() + ms(1) + chrono::Duration::seconds(60));

        assert_eq!(
            guard.admit_at(user, group, until - ms(1)).await.unwrap(),
            Admission::Blocked { until }
        );
        assert_eq!(guard.admit_at(user, group, until).await.unwrap(), Admission::Admitted);
    }

    #[tokio::test]
    async fn test_prune_drops_lapsed_blocks() {
        let policy = RatePolicy::spacing().with_block_duration(Duration::from_secs(60));
        let guard = SpamGuard::in_memory(policy);

        guard.admit_at(UserId(1), GroupId(1), t0()).await.unwrap();
        guard.admit_at(UserId(1), GroupId(1), t0()).await.unwrap();
        assert_eq!(guard.active_blocks().await.unwrap(), 1);

        assert_eq!(guard.prune(t0() + ms(30_000)).await.unwrap(), 0);
        assert_eq!(guard.prune(t0() + ms(61_000)).await.unwrap(), 1);
        assert_eq!(guard.active_blocks().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_try_block_reports_only_first_insert() {
        let store = InMemoryBlockStore::new();
        let until = t0() + ms(60_000);

        assert!(store.try_block(UserId(1), until, t0()).await.unwrap());
        assert!(!store.try_block(UserId(1), until, t0() + ms(1)).await.unwrap());
        assert!(store.try_block(UserId(1), until + ms(60_000), until).await.unwrap());
    }

    #[test]
    fn test_policy_from_config() {
        let config = SpamGuardConfig::default();
        assert_eq!(RatePolicy::from_config(&config), RatePolicy::burst());
    }
}
