//! Admission of inbound message events
//!
//! [`ActivityTracker::handle`] runs one event through the spam guard,
//! records it when admitted, and sends the flood or block notice when not.

use crate::guard::{Admission, SpamGuard};
use crate::ledger::{ActivityLedger, ActivityRecord};
use crate::notify::{deliver, DeliveryPolicy, Notice, NoticeThrottle, Notifier};
use crate::preferences::PreferenceStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tally_common::{sanitize_display_name, GroupId, Result, UserId};
use tally_i18n::{Language, MessageKey, Messages};
use tracing::{debug, instrument, warn};

/// Kind of inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A plain text message
    TextMessage,
    /// Anything else (stickers, joins, edits, commands)
    Other,
}

/// One event delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Sender
    pub user_id: UserId,
    /// Sender's current display name
    pub display_name: String,
    /// Group the event happened in; `None` for private chats
    pub group_id: Option<GroupId>,
    /// Group's current display name
    pub group_display_name: String,
    /// What happened
    pub kind: EventKind,
}

/// What the tracker did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// Not a group text message
    Ignored,
    /// Counted in the ledger
    Recorded,
    /// Sender is blocked; discarded
    Rejected,
    /// Sender just tripped the flood threshold; discarded
    FloodDetected,
}

/// Entry point for inbound events
pub struct ActivityTracker {
    ledger: Arc<dyn ActivityLedger>,
    guard: Arc<SpamGuard>,
    notifier: Arc<dyn Notifier>,
    preferences: PreferenceStore,
    throttle: NoticeThrottle,
    delivery: DeliveryPolicy,
    banner_image_url: Option<String>,
}

impl ActivityTracker {
    /// Default gap between "still blocked" notices to one user
    pub const DEFAULT_NOTICE_INTERVAL: Duration = Duration::from_secs(60);

    /// Tracker wired to the given services
    pub fn new(
        ledger: Arc<dyn ActivityLedger>,
        guard: Arc<SpamGuard>,
        notifier: Arc<dyn Notifier>,
        preferences: PreferenceStore,
    ) -> Self {
        Self {
            ledger,
            guard,
            notifier,
            preferences,
            throttle: NoticeThrottle::new(Self::DEFAULT_NOTICE_INTERVAL),
            delivery: DeliveryPolicy::default(),
            banner_image_url: None,
        }
    }

    /// Retry bounds for notices
    #[must_use]
    pub const fn with_delivery_policy(mut self, delivery: DeliveryPolicy) -> Self {
        self.delivery = delivery;
        self
    }

    /// Gap between repeated block notices to one user
    #[must_use]
    pub fn with_notice_interval(mut self, interval: Duration) -> Self {
        self.throttle = NoticeThrottle::new(interval);
        self
    }

    /// Image attached to flood notices
    #[must_use]
    pub fn with_banner(mut self, banner_image_url: Option<String>) -> Self {
        self.banner_image_url = banner_image_url;
        self
    }

    /// Drop lapsed blocks, stale rate windows, and old throttle entries
    pub async fn prune(&self, now: DateTime<Utc>) -> Result<usize> {
        let removed = self.guard.prune(now).await?;
        self.throttle.cleanup_old_entries(now).await;

        let active = self.guard.active_blocks().await?;
        debug!(removed, active, "Pruned guard state");
        Ok(removed)
    }

    /// Forget the per-user notice state kept for `user_id`
    pub async fn forget_user(&self, user_id: UserId) {
        self.throttle.clear_user(user_id).await;
    }

    /// Handle an event received now
    pub async fn handle(&self, event: &InboundEvent) -> Result<AdmissionOutcome> {
        self.handle_at(event, Utc::now()).await
    }

    /// Handle an event received at `now`
    ///
    /// Guard and ledger faults are returned so the caller can fail closed.
    /// Notice delivery never fails the event.
    #[instrument(skip(self, event), fields(user_id = %event.user_id))]
    pub async fn handle_at(&self, event: &InboundEvent, now: DateTime<Utc>) -> Result<AdmissionOutcome> {
        let Some(group_id) = event.group_id else {
            return Ok(AdmissionOutcome::Ignored);
        };
        if event.kind != EventKind::TextMessage {
            return Ok(AdmissionOutcome::Ignored);
        }

        let display_name = sanitize_display_name(&event.display_name, &event.user_id.to_string());

        match self.guard.admit_at(event.user_id, group_id, now).await? {
            Admission::Admitted => {
                let record = ActivityRecord {
                    user_id: event.user_id,
                    group_id,
                    display_name,
                    group_display_name: sanitize_display_name(
                        &event.group_display_name,
                        &group_id.to_string(),
                    ),
                };
                self.ledger.record_at(&record, now).await?;
                Ok(AdmissionOutcome::Recorded)
            }
            Admission::Blocked { until } => {
                if self.throttle.try_acquire_at(event.user_id, now).await {
                    let language = self.language_for(event.user_id);
                    let minutes = minutes_until(now, until).to_string();
                    let text = Messages::get_with_args(
                        MessageKey::StillBlocked,
                        language,
                        &[("minutes", &minutes)],
                    );
                    let notice = Notice::user(event.user_id, text);
                    deliver(self.notifier.as_ref(), &notice, self.delivery).await;
                } else {
                    debug!("Block notice throttled");
                }
                Ok(AdmissionOutcome::Rejected)
            }
            Admission::NewlyBlocked { until } => {
                let language = self.language_for(event.user_id);
                let minutes = minutes_until(now, until).to_string();
                let text = Messages::get_with_args(
                    MessageKey::FloodDetected,
                    language,
                    &[("name", &display_name), ("minutes", &minutes)],
                );
                let notice = Notice::group(group_id, text).with_image(self.banner_image_url.clone());
                deliver(self.notifier.as_ref(), &notice, self.delivery).await;
                Ok(AdmissionOutcome::FloodDetected)
            }
        }
    }

    fn language_for(&self, user_id: UserId) -> Language {
        match self.preferences.get_or_default(user_id) {
            Ok(preference) => preference.language,
            Err(e) => {
                warn!(error = %e, "Falling back to default language");
                self.preferences.default_language()
            }
        }
    }
}

/// Whole minutes left until `until`, rounded up, at least one
fn minutes_until(now: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    let seconds = (until - now).num_seconds().max(0);
    ((seconds + 59) / 60).max(1)
}
