//! Plain-text rendering of leaderboards and profiles.

use tally_common::truncate_string;
use tally_i18n::{Language, MessageKey, Messages};
use tally_stats::{Leaderboard, UserStats, Window};

/// Discord's message length limit.
pub const MESSAGE_LIMIT: usize = 2000;

/// Longest label shown on a leaderboard line.
const LABEL_LIMIT: usize = 32;

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// Renders a leaderboard under the heading `title`.
pub fn leaderboard(title: MessageKey, board: &Leaderboard, language: Language) -> String {
    let heading = format!(
        "{} ({})",
        Messages::get(title, language),
        board.window.label(language)
    );

    if board.is_empty() {
        return format!("{heading}\n\n{}", Messages::get(MessageKey::NoData, language));
    }

    let lines: Vec<String> = board
        .entries
        .iter()
        .map(|entry| {
            let marker = MEDALS
                .get(entry.rank - 1)
                .map_or_else(|| format!("{}.", entry.rank), |medal| (*medal).to_string());
            format!(
                "{marker} {}: {}",
                truncate_string(&entry.label, LABEL_LIMIT),
                entry.count
            )
        })
        .collect();

    let total = board.total.to_string();
    let footer =
        Messages::get_with_args(MessageKey::TotalMessages, language, &[("total", &total)]);

    truncate_string(
        &format!("{heading}\n\n{}\n\n{footer}", lines.join("\n")),
        MESSAGE_LIMIT,
    )
}

/// Renders a user's profile.
pub fn profile(name: &str, stats: &UserStats, language: Language) -> String {
    let mut lines = vec![Messages::get_with_args(
        MessageKey::ProfileTitle,
        language,
        &[("name", name)],
    )];
    lines.push(String::new());

    for window in Window::ALL {
        let label = window.label(language);
        let count = stats.count(window).to_string();
        lines.push(Messages::get_with_args(
            MessageKey::ProfileWindowLine,
            language,
            &[("window", &label), ("count", &count)],
        ));
    }

    lines.push(String::new());
    lines.push(Messages::get_with_args(
        MessageKey::ProfileCategory,
        language,
        &[("category", stats.category.label(language))],
    ));
    lines.push(Messages::get_with_args(
        MessageKey::ProfileLanguage,
        language,
        &[("language", stats.language.display_name())],
    ));

    lines.join("\n")
}
