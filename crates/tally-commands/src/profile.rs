//! Per-user statistics.

use crate::args::{author_id, language};
use crate::framework::{Context, Error};
use crate::render;

/// Show your message counts and settings.
#[poise::command(slash_command, prefix_command)]
pub async fn profile(ctx: Context<'_>) -> Result<(), Error> {
    let stats = ctx.data().aggregator.user_stats(author_id(ctx)).await?;
    let name = ctx
        .author()
        .global_name
        .clone()
        .unwrap_or_else(|| ctx.author().name.clone());

    ctx.say(render::profile(&name, &stats, language(ctx))).await?;
    Ok(())
}
