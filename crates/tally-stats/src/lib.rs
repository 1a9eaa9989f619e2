//! # Tally Stats
//!
//! Activity tracking core for Tally Bot.
//!
//! This crate records admitted group messages in an append-only ledger,
//! blocks users who flood a group, and serves ranked views of the ledger
//! over time windows resolved on the local calendar.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod guard;
pub mod ledger;
pub mod notify;
pub mod preferences;
pub mod tracker;
pub mod window;

pub use aggregator::{Leaderboard, LeaderboardAggregator, RankedEntry, UserStats};
pub use guard::{Admission, BlockStore, InMemoryBlockStore, RatePolicy, SpamGuard};
pub use ledger::{ActivityLedger, ActivityRecord, GroupCount, SqliteLedger, UserCount, LEADERBOARD_LIMIT};
pub use notify::{deliver, Delivery, DeliveryPolicy, Notice, NoticeTarget, NoticeThrottle, Notifier};
pub use preferences::{PreferenceStore, UserPreference};
pub use tracker::{ActivityTracker, AdmissionOutcome, EventKind, InboundEvent};
pub use window::{resolve, resolve_at, Window};
