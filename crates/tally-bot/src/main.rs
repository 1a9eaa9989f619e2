//! Main entry point for Tally Bot.

use tally_bot::{BotResult, TallyBot};
use tally_common::logging::init_logging;
use tally_config::ConfigLoader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> BotResult<()> {
    let config = ConfigLoader::load()?;

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_logging(&config.logging)?;

    info!("Starting Tally Bot v{}", env!("CARGO_PKG_VERSION"));

    let bot = TallyBot::new(config);
    if let Err(e) = bot.start().await {
        error!("Bot failed: {}", e);
        return Err(e);
    }

    Ok(())
}
