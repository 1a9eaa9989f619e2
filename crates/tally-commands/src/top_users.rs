//! Leaderboard across every group.

use crate::args::{autocomplete_window, language, parse_window};
use crate::framework::{Context, Error};
use crate::render;
use tally_i18n::MessageKey;

/// Show the most active users across all groups.
#[poise::command(slash_command, prefix_command)]
pub async fn topusers(
    ctx: Context<'_>,
    #[description = "today, week, or overall"]
    #[autocomplete = "autocomplete_window"]
    window: Option<String>,
) -> Result<(), Error> {
    let window = match parse_window(window.as_deref()) {
        Ok(window) => window,
        Err(e) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
    };

    let board = ctx.data().aggregator.global_leaderboard(window).await?;
    ctx.say(render::leaderboard(
        MessageKey::GlobalLeaderboardTitle,
        &board,
        language(ctx),
    ))
    .await?;
    Ok(())
}
