//! Append-only activity ledger
//!
//! Every admitted message becomes one row in `activity_events`. Rows are
//! never updated or deleted; all views are computed by query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tally_common::{GroupId, Result, TallyError, UserId};
use tracing::{debug, info};

/// Database schema version for migrations
const SCHEMA_VERSION: i32 = 1;

/// Maximum number of rows in any ranked view
pub const LEADERBOARD_LIMIT: usize = 10;

/// One admitted message, as handed to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Sender
    pub user_id: UserId,
    /// Group the message was sent in
    pub group_id: GroupId,
    /// Sender's display name at the time of the message
    pub display_name: String,
    /// Group's display name at the time of the message
    pub group_display_name: String,
}

/// Per-user message count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCount {
    /// User
    pub user_id: UserId,
    /// Most recently recorded display name
    pub display_name: String,
    /// Messages in range
    pub count: u64,
}

/// Per-group message count for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    /// Group
    pub group_id: GroupId,
    /// Most recently recorded group name
    pub group_display_name: String,
    /// Messages in range
    pub count: u64,
}

/// Persisted, queryable record of admitted messages
///
/// Lower bounds are inclusive; `None` means all history. Ranked views are
/// ordered by count descending, then by most recent activity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityLedger: Send + Sync {
    /// Append one event stamped now
    async fn record(&self, record: &ActivityRecord) -> Result<()> {
        self.record_at(record, Utc::now()).await
    }

    /// Append one event with an explicit timestamp
    async fn record_at(&self, record: &ActivityRecord, at: DateTime<Utc>) -> Result<()>;

    /// Top users of a group, at most [`LEADERBOARD_LIMIT`]
    async fn leaderboard(
        &self,
        group_id: GroupId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<UserCount>>;

    /// Every user of a group
    async fn group_members(
        &self,
        group_id: GroupId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<UserCount>>;

    /// Messages in a group
    async fn total(&self, group_id: GroupId, since: Option<DateTime<Utc>>) -> Result<u64>;

    /// Messages by a user across all groups
    async fn user_total(&self, user_id: UserId, since: Option<DateTime<Utc>>) -> Result<u64>;

    /// Messages by a user in one group
    async fn user_group_total(
        &self,
        user_id: UserId,
        group_id: GroupId,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64>;

    /// Groups a user is active in, at most [`LEADERBOARD_LIMIT`]
    async fn groups_for_user(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<GroupCount>>;

    /// Top users across all groups, at most [`LEADERBOARD_LIMIT`]
    async fn global_leaderboard(&self, since: Option<DateTime<Utc>>) -> Result<Vec<UserCount>>;

    /// Messages across all groups
    async fn global_total(&self, since: Option<DateTime<Utc>>) -> Result<u64>;
}

/// SQLite-backed ledger
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Open (or create) the ledger file at `path`
    pub async fn connect(path: impl AsRef<Path>, max_connections: u32) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening activity ledger at {}", path.display());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(storage("Failed to open ledger database"))?;

        Self::with_pool(pool).await
    }

    /// Private in-memory ledger, mainly for tests
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(storage("Invalid in-memory database URL"))?;

        // Every connection to `:memory:` is its own database, so keep exactly one alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(storage("Failed to open in-memory ledger"))?;

        Self::with_pool(pool).await
    }

    /// Wrap an existing pool, creating the schema if needed
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let ledger = Self { pool };
        ledger.initialize_schema().await?;
        Ok(ledger)
    }

    /// Close the pool, waiting for in-flight queries
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn initialize_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage("Failed to create schema_version table"))?;

        let current_version: Option<i32> =
            sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await
                .map_err(storage("Failed to read schema version"))?;

        if let Some(version) = current_version.filter(|v| *v >= SCHEMA_VERSION) {
            debug!("Ledger schema is up to date (version {})", version);
            return Ok(());
        }

        info!("Creating ledger schema (version {})", SCHEMA_VERSION);

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS activity_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                group_id INTEGER NOT NULL,
                group_display_name TEXT NOT NULL,
                display_name TEXT NOT NULL,
                event_time INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage("Failed to create activity_events table"))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_activity_group_time ON activity_events(group_id, event_time)",
        )
        .execute(&self.pool)
        .await
        .map_err(storage("Failed to create group index"))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_activity_user_time ON activity_events(user_id, event_time)",
        )
        .execute(&self.pool)
        .await
        .map_err(storage("Failed to create user index"))?;

        sqlx::query("INSERT OR REPLACE INTO schema_version (version) VALUES (?)")
            .bind(SCHEMA_VERSION)
            .execute(&self.pool)
            .await
            .map_err(storage("Failed to record schema version"))?;

        Ok(())
    }

    /// Ranked users, optionally scoped to one group; a negative limit means no limit
    async fn ranked_users(
        &self,
        group_id: Option<GroupId>,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<UserCount>> {
        let rows = sqlx::query(
            r#"
            WITH counts AS (
                SELECT user_id, COUNT(*) AS cnt, MAX(id) AS last_id
                FROM activity_events
                WHERE (?1 IS NULL OR group_id = ?1)
                  AND (?2 IS NULL OR event_time >= ?2)
                GROUP BY user_id
            )
            SELECT c.user_id, c.cnt,
                   (SELECT e.display_name FROM activity_events e
                    WHERE e.user_id = c.user_id
                    ORDER BY e.id DESC LIMIT 1) AS display_name
            FROM counts c
            ORDER BY c.cnt DESC, c.last_id DESC
            LIMIT ?3
            "#,
        )
        .bind(group_id.map(|g| to_sql(g.0)))
        .bind(since.map(|t| t.timestamp()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(storage("Failed to query user ranking"))?;

        rows.iter().map(user_count_from_row).collect()
    }

    async fn count(
        &self,
        user_id: Option<UserId>,
        group_id: Option<GroupId>,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM activity_events
            WHERE (?1 IS NULL OR user_id = ?1)
              AND (?2 IS NULL OR group_id = ?2)
              AND (?3 IS NULL OR event_time >= ?3)
            "#,
        )
        .bind(user_id.map(|u| to_sql(u.0)))
        .bind(group_id.map(|g| to_sql(g.0)))
        .bind(since.map(|t| t.timestamp()))
        .fetch_one(&self.pool)
        .await
        .map_err(storage("Failed to count activity"))?;

        Ok(u64::try_from(total).unwrap_or_default())
    }
}

#[async_trait]
impl ActivityLedger for SqliteLedger {
    async fn record_at(&self, record: &ActivityRecord, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO activity_events (
                user_id, group_id, group_display_name, display_name, event_time
            ) VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(to_sql(record.user_id.0))
        .bind(to_sql(record.group_id.0))
        .bind(&record.group_display_name)
        .bind(&record.display_name)
        .bind(at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(storage("Failed to record activity"))?;

        debug!(
            user_id = %record.user_id,
            group_id = %record.group_id,
            "Recorded activity event"
        );
        Ok(())
    }

    async fn leaderboard(
        &self,
        group_id: GroupId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<UserCount>> {
        self.ranked_users(Some(group_id), since, limit_sql(LEADERBOARD_LIMIT))
            .await
    }

    async fn group_members(
        &self,
        group_id: GroupId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<UserCount>> {
        self.ranked_users(Some(group_id), since, -1).await
    }

    async fn total(&self, group_id: GroupId, since: Option<DateTime<Utc>>) -> Result<u64> {
        self.count(None, Some(group_id), since).await
    }

    async fn user_total(&self, user_id: UserId, since: Option<DateTime<Utc>>) -> Result<u64> {
        self.count(Some(user_id), None, since).await
    }

    async fn user_group_total(
        &self,
        user_id: UserId,
        group_id: GroupId,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64> {
        self.count(Some(user_id), Some(group_id), since).await
    }

    async fn groups_for_user(
        &self,
        user_id: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<GroupCount>> {
        let rows = sqlx::query(
            r#"
            WITH counts AS (
                SELECT group_id, COUNT(*) AS cnt, MAX(id) AS last_id
                FROM activity_events
                WHERE user_id = ?1
                  AND (?2 IS NULL OR event_time >= ?2)
                GROUP BY group_id
            )
            SELECT c.group_id, c.cnt,
                   (SELECT e.group_display_name FROM activity_events e
                    WHERE e.group_id = c.group_id
                    ORDER BY e.id DESC LIMIT 1) AS group_display_name
            FROM counts c
            ORDER BY c.cnt DESC, c.last_id DESC
            LIMIT ?3
            "#,
        )
        .bind(to_sql(user_id.0))
        .bind(since.map(|t| t.timestamp()))
        .bind(limit_sql(LEADERBOARD_LIMIT))
        .fetch_all(&self.pool)
        .await
        .map_err(storage("Failed to query user groups"))?;

        rows.iter()
            .map(|row| {
                Ok(GroupCount {
                    group_id: GroupId(from_sql(row.try_get("group_id").map_err(decode)?)),
                    group_display_name: row.try_get("group_display_name").map_err(decode)?,
                    count: u64::try_from(row.try_get::<i64, _>("cnt").map_err(decode)?)
                        .unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn global_leaderboard(&self, since: Option<DateTime<Utc>>) -> Result<Vec<UserCount>> {
        self.ranked_users(None, since, limit_sql(LEADERBOARD_LIMIT))
            .await
    }

    async fn global_total(&self, since: Option<DateTime<Utc>>) -> Result<u64> {
        self.count(None, None, since).await
    }
}

fn user_count_from_row(row: &SqliteRow) -> Result<UserCount> {
    Ok(UserCount {
        user_id: UserId(from_sql(row.try_get("user_id").map_err(decode)?)),
        display_name: row.try_get("display_name").map_err(decode)?,
        count: u64::try_from(row.try_get::<i64, _>("cnt").map_err(decode)?).unwrap_or_default(),
    })
}

fn storage(context: &'static str) -> impl FnOnce(sqlx::Error) -> TallyError {
    move |e| TallyError::storage_with_source(context, e)
}

fn decode(e: sqlx::Error) -> TallyError {
    TallyError::storage_with_source("Malformed ledger row", e)
}

// Platform ids are 64-bit unsigned; SQLite integers are signed.
#[allow(clippy::cast_possible_wrap)]
const fn to_sql(id: u64) -> i64 {
    id as i64
}

#[allow(clippy::cast_sign_loss)]
const fn from_sql(id: i64) -> u64 {
    id as u64
}

fn limit_sql(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(user: u64, group: u64, name: &str) -> ActivityRecord {
        ActivityRecord {
            user_id: UserId(user),
            group_id: GroupId(group),
            display_name: name.to_string(),
            group_display_name: format!("group-{group}"),
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_empty_ledger() {
        let ledger = SqliteLedger::in_memory().await.unwrap();
        assert!(ledger.leaderboard(GroupId(1), None).await.unwrap().is_empty());
        assert_eq!(ledger.total(GroupId(1), None).await.unwrap(), 0);
        assert!(ledger.groups_for_user(UserId(1), None).await.unwrap().is_empty());
        assert_eq!(ledger.global_total(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_count() {
        let ledger = SqliteLedger::in_memory().await.unwrap();
        for _ in 0..3 {
            ledger.record_at(&record(1, 10, "alice"), base()).await.unwrap();
        }
        ledger.record_at(&record(2, 10, "bob"), base()).await.unwrap();
        for _ in 0..2 {
            ledger.record_at(&record(3, 10, "carol"), base()).await.unwrap();
        }

        let board = ledger.leaderboard(GroupId(10), None).await.unwrap();
        let names: Vec<_> = board.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, ["alice", "carol", "bob"]);
        assert_eq!(board[0].count, 3);
        assert_eq!(ledger.total(GroupId(10), None).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_ties_go_to_most_recent_activity() {
        let ledger = SqliteLedger::in_memory().await.unwrap();
        ledger.record_at(&record(1, 10, "alice"), base()).await.unwrap();
        ledger.record_at(&record(2, 10, "bob"), base()).await.unwrap();

        let board = ledger.leaderboard(GroupId(10), None).await.unwrap();
        assert_eq!(board[0].user_id, UserId(2));
        assert_eq!(board[1].user_id, UserId(1));
    }

    #[tokio::test]
    async fn test_display_name_is_latest_snapshot() {
        let ledger = SqliteLedger::in_memory().await.unwrap();
        ledger.record_at(&record(1, 10, "old"), base()).await.unwrap();
        ledger.record_at(&record(1, 10, "new"), base()).await.unwrap();

        let board = ledger.leaderboard(GroupId(10), None).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].display_name, "new");
    }

    #[tokio::test]
    async fn test_lower_bound_is_inclusive() {
        let ledger = SqliteLedger::in_memory().await.unwrap();
        ledger
            .record_at(&record(1, 10, "alice"), base() - Duration::seconds(1))
            .await
            .unwrap();
        ledger.record_at(&record(1, 10, "alice"), base()).await.unwrap();

        assert_eq!(ledger.total(GroupId(10), Some(base())).await.unwrap(), 1);
        assert_eq!(ledger.total(GroupId(10), None).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_out_of_order_timestamps_count_by_value() {
        let ledger = SqliteLedger::in_memory().await.unwrap();
        ledger.record_at(&record(1, 10, "alice"), base()).await.unwrap();
        ledger
            .record_at(&record(1, 10, "alice"), base() - Duration::days(3))
            .await
            .unwrap();

        let since = Some(base() - Duration::days(1));
        assert_eq!(ledger.user_total(UserId(1), since).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_leaderboard_is_capped() {
        let ledger = SqliteLedger::in_memory().await.unwrap();
        for user in 0..15 {
            ledger
                .record_at(&record(user, 10, &format!("user{user}")), base())
                .await
                .unwrap();
        }

        assert_eq!(ledger.leaderboard(GroupId(10), None).await.unwrap().len(), 10);
        assert_eq!(ledger.group_members(GroupId(10), None).await.unwrap().len(), 15);
        assert_eq!(ledger.global_leaderboard(None).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_user_views_span_groups() {
        let ledger = SqliteLedger::in_memory().await.unwrap();
        ledger.record_at(&record(1, 10, "alice"), base()).await.unwrap();
        ledger.record_at(&record(1, 20, "alice"), base()).await.unwrap();
        ledger.record_at(&record(1, 20, "alice"), base()).await.unwrap();
        ledger.record_at(&record(2, 20, "bob"), base()).await.unwrap();

        assert_eq!(ledger.user_total(UserId(1), None).await.unwrap(), 3);
        assert_eq!(
            ledger
                .user_group_total(UserId(1), GroupId(20), None)
                .await
                .unwrap(),
            2
        );

        let groups = ledger.groups_for_user(UserId(1), None).await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group_id, GroupId(20));
        assert_eq!(groups[0].group_display_name, "group-20");
        assert_eq!(groups[0].count, 2);
    }

    #[tokio::test]
    async fn test_large_ids_survive_storage() {
        let ledger = SqliteLedger::in_memory().await.unwrap();
        let user = u64::MAX - 7;
        ledger.record_at(&record(user, 10, "big"), base()).await.unwrap();

        let board = ledger.leaderboard(GroupId(10), None).await.unwrap();
        assert_eq!(board[0].user_id, UserId(user));
    }

    #[tokio::test]
    async fn test_file_ledger_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.sqlite");

        let ledger = SqliteLedger::connect(&path, 2).await.unwrap();
        ledger.record(&record(1, 10, "alice")).await.unwrap();
        ledger.close().await;

        let reopened = SqliteLedger::connect(&path, 2).await.unwrap();
        assert_eq!(reopened.total(GroupId(10), None).await.unwrap(), 1);
    }
}
