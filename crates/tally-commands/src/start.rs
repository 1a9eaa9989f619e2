//! Greeting command.

use crate::args::language;
use crate::framework::{Context, Error};
use poise::serenity_prelude as serenity;
use tally_config::DiscordConfig;
use tally_i18n::{Language, MessageKey, Messages};

/// Shows what the bot does.
#[poise::command(slash_command, prefix_command)]
pub async fn start(ctx: Context<'_>) -> Result<(), Error> {
    let language = language(ctx);
    let discord = &ctx.data().config.discord;

    let mut embed =
        serenity::CreateEmbed::new().description(Messages::get(MessageKey::Welcome, language));
    if let Some(url) = &discord.banner_image_url {
        embed = embed.image(url);
    }

    let mut reply = poise::CreateReply::default().embed(embed);
    let buttons: Vec<_> = welcome_links(discord, language)
        .into_iter()
        .map(|(label, url)| serenity::CreateButton::new_link(url).label(label))
        .collect();
    if !buttons.is_empty() {
        reply = reply.components(vec![serenity::CreateActionRow::Buttons(buttons)]);
    }

    ctx.send(reply).await?;
    Ok(())
}

/// Configured support and updates links as `(label, url)` pairs.
pub fn welcome_links(discord: &DiscordConfig, language: Language) -> Vec<(String, String)> {
    [
        (MessageKey::SupportLink, &discord.support_url),
        (MessageKey::UpdatesLink, &discord.updates_url),
    ]
    .into_iter()
    .filter_map(|(key, url)| {
        url.as_ref()
            .map(|url| (Messages::get(key, language), url.clone()))
    })
    .collect()
}
