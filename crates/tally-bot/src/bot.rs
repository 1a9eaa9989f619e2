//! Core bot logic using the Poise framework.

use crate::error::BotResult;
use chrono::Utc;
use poise::serenity_prelude::{self as serenity, GatewayIntents};
use std::sync::Arc;
use std::time::Duration;
use tally_commands::{create_framework, Data, SerenityNotifier};
use tally_config::Config;
use tally_stats::{
    ActivityTracker, DeliveryPolicy, LeaderboardAggregator, Notifier, PreferenceStore, RatePolicy,
    SpamGuard, SqliteLedger,
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// How often lapsed blocks and throttle entries are swept.
pub const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60);

/// Storage and guard state shared by the tracker and the commands.
#[derive(Clone)]
pub struct Services {
    /// Activity ledger.
    pub ledger: Arc<SqliteLedger>,
    /// Flood guard.
    pub guard: Arc<SpamGuard>,
    /// Per-user preferences.
    pub preferences: PreferenceStore,
}

impl Services {
    /// Opens the stores named in `config`.
    pub async fn open(config: &Config) -> BotResult<Self> {
        let ledger = SqliteLedger::connect(
            &config.database.ledger_path,
            config.database.max_connections,
        )
        .await?;
        let preferences = PreferenceStore::open(
            &config.database.preferences_path,
            config.data.default_language,
        )?;
        info!(users = preferences.user_count(), "Preference store opened");
        let policy = RatePolicy::from_config(&config.spam_guard);
        info!(
            max_events = policy.max_events,
            window_secs = policy.window.as_secs(),
            block_secs = policy.block_duration.as_secs(),
            "Spam guard configured"
        );

        Ok(Self {
            ledger: Arc::new(ledger),
            guard: Arc::new(SpamGuard::in_memory(policy)),
            preferences,
        })
    }

    /// Builds the admission pipeline around `notifier`.
    pub fn tracker(&self, config: &Config, notifier: Arc<dyn Notifier>) -> ActivityTracker {
        ActivityTracker::new(
            self.ledger.clone(),
            self.guard.clone(),
            notifier,
            self.preferences.clone(),
        )
        .with_delivery_policy(DeliveryPolicy::from_config(&config.notifications))
        .with_notice_interval(config.spam_guard.notice_interval())
        .with_banner(config.discord.banner_image_url.clone())
    }

    /// Ranked views over the ledger.
    pub fn aggregator(&self) -> LeaderboardAggregator {
        LeaderboardAggregator::new(self.ledger.clone(), self.preferences.clone())
    }

    /// Flushes preferences and closes the ledger pool.
    pub async fn close(&self) {
        if let Err(e) = self.preferences.flush().await {
            warn!(error = %e, "Failed to flush preferences");
        }
        self.ledger.close().await;
    }
}

/// Periodically prunes the tracker's guard and throttle state.
pub fn spawn_maintenance(tracker: Arc<ActivityTracker>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match tracker.prune(Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "Released lapsed blocks"),
                Err(e) => warn!(error = %e, "Guard maintenance failed"),
            }
        }
    })
}

/// Main bot structure.
pub struct TallyBot {
    config: Arc<Config>,
}

impl TallyBot {
    /// Creates a new bot instance.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Opens storage, connects to Discord, and runs until shut down.
    pub async fn start(&self) -> BotResult<()> {
        let services = Services::open(&self.config).await?;
        let config = self.config.clone();
        let setup_services = services.clone();

        let framework = create_framework(&self.config)
            .setup(move |ctx, ready, framework| {
                Box::pin(async move {
                    info!("Logged in as {}", ready.user.name);
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                    let notifier = Arc::new(SerenityNotifier::new(ctx.http.clone()));
                    let tracker = Arc::new(setup_services.tracker(&config, notifier));
                    spawn_maintenance(tracker.clone(), MAINTENANCE_INTERVAL);

                    Ok(Data {
                        aggregator: setup_services.aggregator(),
                        preferences: setup_services.preferences.clone(),
                        tracker,
                        config,
                    })
                })
            })
            .build();

        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let mut client = serenity::ClientBuilder::new(&self.config.discord.token, intents)
            .framework(framework)
            .await?;

        let shard_manager = client.shard_manager.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {:?}", e);
                return;
            }
            info!("Received shutdown signal, starting graceful shutdown");
            shard_manager.shutdown_all().await;
        });

        info!("Tally bot is starting up...");
        let result = client.start().await;
        services.close().await;
        info!("Shutdown complete");

        result.map_err(Into::into)
    }
}
