//! Ranked, time-windowed views over the ledger

use crate::ledger::{ActivityLedger, GroupCount, UserCount};
use crate::preferences::PreferenceStore;
use crate::window::{resolve, Window};
use futures::try_join;
use serde::Serialize;
use std::sync::Arc;
use tally_common::{GroupId, Result, UserId};
use tally_i18n::{Category, Language};

/// One row of a leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    /// User or group name
    pub label: String,
    /// Messages in the window
    pub count: u64,
    /// 1-based position
    pub rank: usize,
}

/// Ranked rows plus the total they were drawn from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    /// Rows, count descending
    pub entries: Vec<RankedEntry>,
    /// Messages in scope, including users not listed
    pub total: u64,
    /// Window the view covers
    pub window: Window,
}

impl Leaderboard {
    fn ranked<I>(rows: I, total: u64, window: Window) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        let entries = rows
            .into_iter()
            .enumerate()
            .map(|(index, (label, count))| RankedEntry {
                label,
                count,
                rank: index + 1,
            })
            .collect();

        Self {
            entries,
            total,
            window,
        }
    }

    /// Whether there is nothing to show
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Message counts of one user across every window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    /// Since local midnight
    pub today: u64,
    /// Since Monday
    pub week: u64,
    /// All time
    pub overall: u64,
    /// Stored or default language
    pub language: Language,
    /// Stored or default category
    pub category: Category,
}

impl UserStats {
    /// Count for a given window
    pub const fn count(&self, window: Window) -> u64 {
        match window {
            Window::Today => self.today,
            Window::Week => self.week,
            Window::Overall => self.overall,
        }
    }
}

/// Stateless composition of the window resolver and the ledger
#[derive(Clone)]
pub struct LeaderboardAggregator {
    ledger: Arc<dyn ActivityLedger>,
    preferences: PreferenceStore,
}

impl LeaderboardAggregator {
    /// Aggregator over the given stores
    pub fn new(ledger: Arc<dyn ActivityLedger>, preferences: PreferenceStore) -> Self {
        Self {
            ledger,
            preferences,
        }
    }

    /// Top users of a group
    pub async fn group_leaderboard(&self, group_id: GroupId, window: Window) -> Result<Leaderboard> {
        let since = resolve(window);
        let (rows, total) = try_join!(
            self.ledger.leaderboard(group_id, since),
            self.ledger.total(group_id, since)
        )?;
        Ok(Leaderboard::ranked(rows.into_iter().map(user_row), total, window))
    }

    /// Groups a user is most active in; the total spans every group
    pub async fn user_groups(&self, user_id: UserId, window: Window) -> Result<Leaderboard> {
        let since = resolve(window);
        let (rows, total) = try_join!(
            self.ledger.groups_for_user(user_id, since),
            self.ledger.user_total(user_id, since)
        )?;
        Ok(Leaderboard::ranked(rows.into_iter().map(group_row), total, window))
    }

    /// Top users across every group
    pub async fn global_leaderboard(&self, window: Window) -> Result<Leaderboard> {
        let since = resolve(window);
        let (rows, total) = try_join!(
            self.ledger.global_leaderboard(since),
            self.ledger.global_total(since)
        )?;
        Ok(Leaderboard::ranked(rows.into_iter().map(user_row), total, window))
    }

    /// Every user of a group
    pub async fn group_breakdown(&self, group_id: GroupId, window: Window) -> Result<Leaderboard> {
        let since = resolve(window);
        let (rows, total) = try_join!(
            self.ledger.group_members(group_id, since),
            self.ledger.total(group_id, since)
        )?;
        Ok(Leaderboard::ranked(rows.into_iter().map(user_row), total, window))
    }

    /// A user's counts for every window plus their preferences
    pub async fn user_stats(&self, user_id: UserId) -> Result<UserStats> {
        let (today, week, overall) = try_join!(
            self.ledger.user_total(user_id, resolve(Window::Today)),
            self.ledger.user_total(user_id, resolve(Window::Week)),
            self.ledger.user_total(user_id, resolve(Window::Overall))
        )?;
        let preference = self.preferences.get_or_default(user_id)?;

        Ok(UserStats {
            today,
            week,
            overall,
            language: preference.language,
            category: preference.category,
        })
    }
}

fn user_row(row: UserCount) -> (String, u64) {
    (row.display_name, row.count)
}

fn group_row(row: GroupCount) -> (String, u64) {
    (row.group_display_name, row.count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{ActivityRecord, SqliteLedger};

    async fn setup() -> (Arc<SqliteLedger>, LeaderboardAggregator) {
        let ledger = Arc::new(SqliteLedger::in_memory().await.unwrap());
        let preferences = PreferenceStore::temporary(Language::English).unwrap();
        let aggregator = LeaderboardAggregator::new(ledger.clone(), preferences);
        (ledger, aggregator)
    }

    fn record(user: u64, group: u64, name: &str) -> ActivityRecord {
        ActivityRecord {
            user_id: UserId(user),
            group_id: GroupId(group),
            display_name: name.to_string(),
            group_display_name: format!("group-{group}"),
        }
    }

    #[tokio::test]
    async fn test_empty_leaderboard_is_not_an_error() {
        let (_, aggregator) = setup().await;
        let board = aggregator
            .group_leaderboard(GroupId(1), Window::Overall)
            .await
            .unwrap();

        assert!(board.is_empty());
        assert_eq!(board.total, 0);
        assert_eq!(board.window, Window::Overall);
    }

    #[tokio::test]
    async fn test_ranks_are_one_based() {
        let (ledger, aggregator) = setup().await;
        ledger.record(&record(1, 1, "alice")).await.unwrap();
        ledger.record(&record(1, 1, "alice")).await.unwrap();
        ledger.record(&record(2, 1, "bob")).await.unwrap();

        let board = aggregator
            .group_leaderboard(GroupId(1), Window::Today)
            .await
            .unwrap();
        assert_eq!(
            board.entries,
            vec![
                RankedEntry { label: "alice".into(), count: 2, rank: 1 },
                RankedEntry { label: "bob".into(), count: 1, rank: 2 },
            ]
        );
        assert_eq!(board.total, 3);
    }

    #[tokio::test]
    async fn test_user_groups_labels_are_group_names() {
        let (ledger, aggregator) = setup().await;
        ledger.record(&record(1, 1, "alice")).await.unwrap();
        ledger.record(&record(1, 2, "alice")).await.unwrap();
        ledger.record(&record(1, 2, "alice")).await.unwrap();

        let board = aggregator.user_groups(UserId(1), Window::Week).await.unwrap();
        assert_eq!(board.entries[0].label, "group-2");
        assert_eq!(board.total, 3);
    }

    #[tokio::test]
    async fn test_user_stats_combines_windows_and_preferences() {
        let (ledger, aggregator) = setup().await;
        ledger.record(&record(1, 1, "alice")).await.unwrap();
        ledger
            .record_at(&record(1, 1, "alice"), chrono::Utc::now() - chrono::Duration::days(30))
            .await
            .unwrap();

        let stats = aggregator.user_stats(UserId(1)).await.unwrap();
        assert_eq!(stats.today, 1);
        assert_eq!(stats.week, 1);
        assert_eq!(stats.overall, 2);
        assert_eq!(stats.count(Window::Overall), 2);
        assert_eq!(stats.language, Language::English);
        assert_eq!(stats.category, Category::Unspecified);
    }
}
