//! Settings subcommands with Poise's built-in subcommand support.

use crate::args::{author_id, autocomplete_category, autocomplete_language, language};
use crate::framework::{Context, Error};
use tally_i18n::{Category, Language, MessageKey, Messages};

/// Manage your language and category.
#[poise::command(
    slash_command,
    prefix_command,
    subcommands("set_language", "set_category", "show", "export", "delete")
)]
pub async fn settings(ctx: Context<'_>) -> Result<(), Error> {
    show_inner(ctx).await
}

/// Set the language the bot replies in.
#[poise::command(slash_command, prefix_command, rename = "language")]
pub async fn set_language(
    ctx: Context<'_>,
    #[description = "Language code (en, es, fr, de)"]
    #[autocomplete = "autocomplete_language"]
    code: String,
) -> Result<(), Error> {
    let chosen = match code.parse::<Language>() {
        Ok(chosen) => chosen,
        Err(e) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
    };

    ctx.data()
        .preferences
        .set_language(author_id(ctx), chosen)
        .await?;

    ctx.say(Messages::get_with_args(
        MessageKey::LanguageUpdated,
        chosen,
        &[("language", chosen.display_name())],
    ))
    .await?;
    Ok(())
}

/// Set the category shown on your profile.
#[poise::command(slash_command, prefix_command, rename = "category")]
pub async fn set_category(
    ctx: Context<'_>,
    #[description = "student, professional, creator, gamer, other"]
    #[autocomplete = "autocomplete_category"]
    code: String,
) -> Result<(), Error> {
    let chosen = match code.parse::<Category>() {
        Ok(chosen) => chosen,
        Err(e) => {
            ctx.say(e.to_string()).await?;
            return Ok(());
        }
    };

    let stored = ctx
        .data()
        .preferences
        .set_category(author_id(ctx), chosen)
        .await?;

    ctx.say(Messages::get_with_args(
        MessageKey::CategoryUpdated,
        stored.language,
        &[("category", chosen.label(stored.language))],
    ))
    .await?;
    Ok(())
}

/// Show your current settings.
#[poise::command(slash_command, prefix_command)]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    show_inner(ctx).await
}

/// Show everything stored about you.
#[poise::command(slash_command, prefix_command, ephemeral)]
pub async fn export(ctx: Context<'_>) -> Result<(), Error> {
    let reply_language = language(ctx);
    let text = match ctx.data().preferences.export(author_id(ctx))? {
        Some(stored) => format!(
            "{}\n```json\n{}\n```",
            Messages::get(MessageKey::DataExportTitle, reply_language),
            serde_json::to_string_pretty(&stored)?
        ),
        None => Messages::get(MessageKey::NoStoredData, reply_language),
    };
    ctx.say(text).await?;
    Ok(())
}

/// Delete your stored settings.
#[poise::command(slash_command, prefix_command, ephemeral)]
pub async fn delete(ctx: Context<'_>) -> Result<(), Error> {
    let reply_language = language(ctx);
    let user_id = author_id(ctx);
    ctx.data().preferences.delete(user_id).await?;
    ctx.data().tracker.forget_user(user_id).await;
    ctx.say(Messages::get(MessageKey::DataDeleted, reply_language))
        .await?;
    Ok(())
}

async fn show_inner(ctx: Context<'_>) -> Result<(), Error> {
    let preference = ctx.data().preferences.get_or_default(author_id(ctx))?;
    let lang = preference.language;

    let text = [
        Messages::get_with_args(
            MessageKey::ProfileLanguage,
            lang,
            &[("language", lang.display_name())],
        ),
        Messages::get_with_args(
            MessageKey::ProfileCategory,
            lang,
            &[("category", preference.category.label(lang))],
        ),
    ]
    .join("\n");

    ctx.say(text).await?;
    Ok(())
}
