//! The caller's most active groups.

use crate::args::{author_id, autocomplete_window, language, parse_window};
use crate::framework::{Context, Error};
use crate::render;
use tally_i18n::MessageKey;

/// Show the groups you are most active in.
#[poise::command(slash_command, prefix_command)]
pub async fn mytop(
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

    let board = ctx.data().aggregator.user_groups(author_id(ctx), window).await?;
    ctx.say(render::leaderboard(MessageKey::MyGroupsTitle, &board, language(ctx)))
        .await?;
    Ok(())
}
