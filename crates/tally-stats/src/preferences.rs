//! User preference storage
//!
//! This module provides a sled-based embedded store for each user's display
//! language and self-reported category. Records are created lazily on the
//! first explicit change and removed only on the user's request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tally_common::{Result, TallyError, UserId};
use tally_i18n::{Category, Language};
use tracing::{debug, info};

/// Stored preferences of one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreference {
    /// Platform user id
    pub user_id: UserId,
    /// Display language
    pub language: Language,
    /// Self-reported category
    #[serde(default)]
    pub category: Category,
    /// When the record was first written
    pub created_at: DateTime<Utc>,
    /// When the record was last written
    pub updated_at: DateTime<Utc>,
}

impl UserPreference {
    /// Fresh preferences with the given language
    pub fn new(user_id: UserId, language: Language) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            language,
            category: Category::default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn mark_updated(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Sled-backed preference store
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    /// Sled database instance
    db: Arc<sled::Db>,
    /// Tree holding one JSON record per user
    preferences_tree: sled::Tree,
    /// Language reported for users without a record
    default_language: Language,
}

impl PreferenceStore {
    /// Open (or create) the store at `path`
    pub fn open<P: AsRef<Path>>(path: P, default_language: Language) -> Result<Self> {
        info!("Opening user preference store at {:?}", path.as_ref());

        let db = sled::Config::default()
            .path(path.as_ref())
            .cache_capacity(16 * 1024 * 1024)
            .flush_every_ms(Some(1000))
            .open()
            .map_err(storage("Failed to open preference store"))?;

        Self::from_db(db, default_language)
    }

    /// Store that lives only as long as the process, for tests
    pub fn temporary(default_language: Language) -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(storage("Failed to open temporary preference store"))?;

        Self::from_db(db, default_language)
    }

    fn from_db(db: sled::Db, default_language: Language) -> Result<Self> {
        let preferences_tree = db
            .open_tree("user_preferences")
            .map_err(storage("Failed to open user preferences tree"))?;

        Ok(Self {
            db: Arc::new(db),
            preferences_tree,
            default_language,
        })
    }

    /// Language used for users without a record
    pub const fn default_language(&self) -> Language {
        self.default_language
    }

    /// Stored preferences, if the user has any
    pub fn get(&self, user_id: UserId) -> Result<Option<UserPreference>> {
        let stored = self
            .preferences_tree
            .get(key(user_id))
            .map_err(storage("Failed to read user preferences"))?;

        stored
            .map(|data| serde_json::from_slice(&data).map_err(TallyError::from))
            .transpose()
    }

    /// Stored preferences, or the defaults without writing them
    pub fn get_or_default(&self, user_id: UserId) -> Result<UserPreference> {
        Ok(self
            .get(user_id)?
            .unwrap_or_else(|| UserPreference::new(user_id, self.default_language)))
    }

    /// Change the display language
    pub async fn set_language(&self, user_id: UserId, language: Language) -> Result<UserPreference> {
        self.update(user_id, |preference| preference.language = language)
            .await
    }

    /// Change the category
    pub async fn set_category(&self, user_id: UserId, category: Category) -> Result<UserPreference> {
        self.update(user_id, |preference| preference.category = category)
            .await
    }

    async fn update<F>(&self, user_id: UserId, update_fn: F) -> Result<UserPreference>
    where
        F: Fn(&mut UserPreference),
    {
        let key = key(user_id);

        // Retry until no concurrent writer replaced the record underneath us.
        let preference = loop {
            let current = self
                .preferences_tree
                .get(key)
                .map_err(storage("Failed to read user preferences"))?;

            let mut preference = match &current {
                Some(data) => serde_json::from_slice(data)?,
                None => UserPreference::new(user_id, self.default_language),
            };
            update_fn(&mut preference);
            preference.mark_updated();

            let json_data = serde_json::to_vec(&preference)?;
            let swapped = self
                .preferences_tree
                .compare_and_swap(key, current, Some(json_data))
                .map_err(storage("Failed to write user preferences"))?;

            match swapped {
                Ok(()) => break preference,
                Err(_) => debug!(%user_id, "Preference write raced, retrying"),
            }
        };

        self.preferences_tree
            .flush_async()
            .await
            .map_err(storage("Failed to flush user preferences"))?;

        debug!(%user_id, "Stored user preferences");
        Ok(preference)
    }

    /// Erase a user's record; returns whether one existed
    pub async fn delete(&self, user_id: UserId) -> Result<bool> {
        let existed = self
            .preferences_tree
            .remove(key(user_id))
            .map_err(storage("Failed to delete user preferences"))?
            .is_some();

        if existed {
            self.preferences_tree
                .flush_async()
                .await
                .map_err(storage("Failed to flush preference deletion"))?;
            info!(%user_id, "Deleted user preferences on request");
        }

        Ok(existed)
    }

    /// Everything stored about a user, as JSON
    pub fn export(&self, user_id: UserId) -> Result<Option<serde_json::Value>> {
        self.get(user_id)?
            .map(|preference| serde_json::to_value(preference).map_err(TallyError::from))
            .transpose()
    }

    /// Number of users with a stored record
    pub fn user_count(&self) -> usize {
        self.preferences_tree.len()
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(storage("Failed to flush preference store"))?;
        Ok(())
    }
}

fn key(user_id: UserId) -> [u8; 8] {
    user_id.0.to_be_bytes()
}

fn storage(context: &'static str) -> impl FnOnce(sled::Error) -> TallyError {
    move |e| TallyError::storage_with_source(context, e)
}
