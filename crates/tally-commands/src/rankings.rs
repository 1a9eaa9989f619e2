//! Group leaderboards.

use crate::args::{autocomplete_window, group_id, language, parse_window};
use crate::framework::{Context, Error};
use crate::render;
use tally_i18n::{MessageKey, Messages};
use tally_stats::Window;

/// Show the most active members of this group.
#[poise::command(slash_command, prefix_command)]
pub async fn rankings(
    ctx: Context<'_>,
    #[description = "today, week, or overall"]
    #[autocomplete = "autocomplete_window"]
    window: Option<String>,
) -> Result<(), Error> {
    let language = language(ctx);
    let Some(group_id) = group_id(ctx) else {
        ctx.say(Messages::get(MessageKey::GroupOnly, language)).await?;
        return Ok(());
    };

    let window = match parse_window(window.as_deref()) {
        Ok(window) => window,
        Err(e) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
    };

    let board = ctx.data().aggregator.group_leaderboard(group_id, window).await?;
    ctx.say(render::leaderboard(MessageKey::LeaderboardTitle, &board, language))
        .await?;
    Ok(())
}

/// Show every member's message count in this group.
#[poise::command(slash_command, prefix_command)]
pub async fn groupstats(ctx: Context<'_>) -> Result<(), Error> {
    let language = language(ctx);
    let Some(group_id) = group_id(ctx) else {
        ctx.say(Messages::get(MessageKey::GroupOnly, language)).await?;
        return Ok(());
    };

    let board = ctx
        .data()
        .aggregator
        .group_breakdown(group_id, Window::Overall)
        .await?;
    ctx.say(render::leaderboard(MessageKey::GroupStatsTitle, &board, language))
        .await?;
    Ok(())
}
