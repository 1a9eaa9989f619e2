//! Argument parsing and lookups shared by commands.

use crate::framework::Context;
use tally_common::{GroupId, TallyError, UserId};
use tally_i18n::{Category, Language};
use tally_stats::Window;

/// Parses an optional window argument; missing means [`Window::Overall`].
pub fn parse_window(input: Option<&str>) -> Result<Window, TallyError> {
    input.map_or(Ok(Window::Overall), str::parse)
}

/// Names from `options` starting with `partial`, ignoring case.
pub fn matching<'a>(
    options: impl IntoIterator<Item = &'a str> + 'a,
    partial: &str,
) -> impl Iterator<Item = String> + 'a {
    let partial = partial.trim().to_lowercase();
    options
        .into_iter()
        .filter(move |option| option.starts_with(&partial))
        .map(String::from)
}

/// Suggests window names.
pub async fn autocomplete_window<'a>(
    _ctx: Context<'_>,
    partial: &'a str,
) -> impl Iterator<Item = String> + 'a {
    matching(Window::ALL.map(Window::name), partial)
}

/// Suggests language codes.
pub async fn autocomplete_language<'a>(
    _ctx: Context<'_>,
    partial: &'a str,
) -> impl Iterator<Item = String> + 'a {
    matching(Language::ALL.map(Language::code), partial)
}

/// Suggests category codes.
pub async fn autocomplete_category<'a>(
    _ctx: Context<'_>,
    partial: &'a str,
) -> impl Iterator<Item = String> + 'a {
    matching(Category::ALL.map(Category::code), partial)
}

/// Caller's id in the tally domain.
pub fn author_id(ctx: Context<'_>) -> UserId {
    UserId(ctx.author().id.get())
}

/// Group the command was used in; channels inside a guild are groups.
pub fn group_id(ctx: Context<'_>) -> Option<GroupId> {
    ctx.guild_id().map(|_| GroupId(ctx.channel_id().get()))
}

/// Caller's reply language.
pub fn language(ctx: Context<'_>) -> Language {
    ctx.data().language_for(author_id(ctx))
}
