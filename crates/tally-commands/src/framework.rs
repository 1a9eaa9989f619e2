//! Poise framework setup and command registration logic.

use std::sync::Arc;
use tally_common::UserId;
use tally_config::Config;
use tally_i18n::{Language, MessageKey, Messages};
use tally_stats::{ActivityTracker, LeaderboardAggregator, PreferenceStore};
use tracing::{error, warn};

/// Application data accessible in all commands.
pub struct Data {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Admission pipeline for inbound messages.
    pub tracker: Arc<ActivityTracker>,
    /// Ranked views over the ledger.
    pub aggregator: LeaderboardAggregator,
    /// Per-user language and category.
    pub preferences: PreferenceStore,
}

impl Data {
    /// Language to reply to `user_id` in.
    pub fn language_for(&self, user_id: UserId) -> Language {
        match self.preferences.get_or_default(user_id) {
            Ok(preference) => preference.language,
            Err(e) => {
                warn!(error = %e, %user_id, "Could not read preferences");
                self.config.data.default_language
            }
        }
    }
}

/// Application error type for commands.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Command context type.
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Every command the bot registers.
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        crate::start::start(),
        crate::rankings::rankings(),
        crate::rankings::groupstats(),
        crate::my_top::mytop(),
        crate::top_users::topusers(),
        crate::profile::profile(),
        crate::settings::settings(),
    ]
}

/// Creates a new Poise framework.
pub fn create_framework(config: &Config) -> poise::FrameworkBuilder<Data, Error> {
    poise::Framework::builder().options(poise::FrameworkOptions {
        commands: commands(),
        on_error: |error| Box::pin(on_error(error)),
        event_handler: |ctx, event, framework, data| {
            Box::pin(crate::events::event_handler(ctx, event, framework, data))
        },
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(config.discord.command_prefix.clone()),
            mention_as_prefix: true,
            ..Default::default()
        },
        ..Default::default()
    })
}

/// Global error handler for the framework.
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command '{}': {:?}", ctx.command().name, error);
            let language = ctx.data().language_for(UserId(ctx.author().id.get()));
            if let Err(e) = ctx.say(Messages::get(MessageKey::RetryLater, language)).await {
                warn!("Failed to send error reply: {:?}", e);
            }
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!("Error in event handler for {:?}: {:?}", event.snake_case_name(), error);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {:?}", e);
            }
        }
    }
}
