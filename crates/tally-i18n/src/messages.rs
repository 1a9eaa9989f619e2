//! Typed message catalogue.
//!
//! Every user-facing string is a [`MessageKey`] variant, and every variant
//! has a template in every [`Language`]. Adding a key or a language is a
//! compile-time checked change: the `match` in [`Messages::template`] is
//! exhaustive. Templates use `{name}` placeholders filled by
//! [`Messages::get_with_args`].

use crate::locale::Language;

/// Identifies one user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// Greeting sent by the start command
    Welcome,
    /// Heading of a group leaderboard
    LeaderboardTitle,
    /// Heading of the cross-group leaderboard
    GlobalLeaderboardTitle,
    /// Heading of a user's per-group breakdown
    MyGroupsTitle,
    /// Heading of the full group member breakdown
    GroupStatsTitle,
    /// Placeholder for an empty result
    NoData,
    /// Footer with the number of counted messages; `{total}`
    TotalMessages,
    /// Label of the `today` window
    WindowToday,
    /// Label of the `week` window
    WindowWeek,
    /// Label of the `overall` window
    WindowOverall,
    /// Heading of the profile view; `{name}`
    ProfileTitle,
    /// Profile line for one window; `{window}`, `{count}`
    ProfileWindowLine,
    /// Profile line for the category; `{category}`
    ProfileCategory,
    /// Profile line for the language; `{language}`
    ProfileLanguage,
    /// Broadcast to the group when a flood is detected; `{name}`, `{minutes}`
    FloodDetected,
    /// Reply to a user whose block is still active; `{minutes}`
    StillBlocked,
    /// Generic storage failure reply
    RetryLater,
    /// Confirmation of a language change; `{language}`
    LanguageUpdated,
    /// Confirmation of a category change; `{category}`
    CategoryUpdated,
    /// Reply to a group-only command used elsewhere
    GroupOnly,
    /// Confirmation of a data deletion request
    DataDeleted,
    /// Heading of a user data export
    DataExportTitle,
    /// Reply to an export request when nothing is stored
    NoStoredData,
    /// Label of the support link on the welcome message
    SupportLink,
    /// Label of the updates link on the welcome message
    UpdatesLink,
}

/// Message accessor for typed translations
pub struct Messages;

impl Messages {
    /// Gets the raw template of a message
    #[allow(clippy::too_many_lines)]
    pub const fn template(key: MessageKey, language: Language) -> &'static str {
        use Language::{English, French, German, Spanish};
        use MessageKey as K;

        match (key, language) {
            (K::Welcome, English) => "💬 Welcome! This bot counts group messages and builds rankings.\n\nBy using this bot, you consent to data processing.",
            (K::Welcome, Spanish) => "💬 ¡Bienvenido! Este bot cuenta los mensajes del grupo y crea clasificaciones.\n\nAl usar este bot, aceptas el tratamiento de datos.",
            (K::Welcome, French) => "💬 Bienvenue ! Ce bot compte les messages du groupe et établit des classements.\n\nEn utilisant ce bot, vous acceptez le traitement des données.",
            (K::Welcome, German) => "💬 Willkommen! Dieser Bot zählt Gruppennachrichten und erstellt Ranglisten.\n\nMit der Nutzung stimmst du der Datenverarbeitung zu.",

            (K::LeaderboardTitle, English) => "📈 LEADERBOARD",
            (K::LeaderboardTitle, Spanish) => "📈 CLASIFICACIÓN",
            (K::LeaderboardTitle, French) => "📈 CLASSEMENT",
            (K::LeaderboardTitle, German) => "📈 RANGLISTE",

            (K::GlobalLeaderboardTitle, English) => "🌍 TOP USERS",
            (K::GlobalLeaderboardTitle, Spanish) => "🌍 MEJORES USUARIOS",
            (K::GlobalLeaderboardTitle, French) => "🌍 MEILLEURS UTILISATEURS",
            (K::GlobalLeaderboardTitle, German) => "🌍 TOP-NUTZER",

            (K::MyGroupsTitle, English) => "📊 Your Group Rankings",
            (K::MyGroupsTitle, Spanish) => "📊 Tus grupos",
            (K::MyGroupsTitle, French) => "📊 Vos groupes",
            (K::MyGroupsTitle, German) => "📊 Deine Gruppen",

            (K::GroupStatsTitle, English) => "📊 Group Stats",
            (K::GroupStatsTitle, Spanish) => "📊 Estadísticas del grupo",
            (K::GroupStatsTitle, French) => "📊 Statistiques du groupe",
            (K::GroupStatsTitle, German) => "📊 Gruppenstatistik",

            (K::NoData, English) => "No data yet.",
            (K::NoData, Spanish) => "Todavía no hay datos.",
            (K::NoData, French) => "Pas encore de données.",
            (K::NoData, German) => "Noch keine Daten.",

            (K::TotalMessages, English) => "Total messages: {total}",
            (K::TotalMessages, Spanish) => "Mensajes totales: {total}",
            (K::TotalMessages, French) => "Messages au total : {total}",
            (K::TotalMessages, German) => "Nachrichten insgesamt: {total}",

            (K::WindowToday, English) => "Today",
            (K::WindowToday, Spanish) => "Hoy",
            (K::WindowToday, French) => "Aujourd'hui",
            (K::WindowToday, German) => "Heute",

            (K::WindowWeek, English) => "This week",
            (K::WindowWeek, Spanish) => "Esta semana",
            (K::WindowWeek, French) => "Cette semaine",
            (K::WindowWeek, German) => "Diese Woche",

            (K::WindowOverall, English) => "Overall",
            (K::WindowOverall, Spanish) => "Total",
            (K::WindowOverall, French) => "Global",
            (K::WindowOverall, German) => "Gesamt",

            (K::ProfileTitle, English) => "👤 Profile of {name}",
            (K::ProfileTitle, Spanish) => "👤 Perfil de {name}",
            (K::ProfileTitle, French) => "👤 Profil de {name}",
            (K::ProfileTitle, German) => "👤 Profil von {name}",

            (K::ProfileWindowLine, English) => "{window}: {count} messages",
            (K::ProfileWindowLine, Spanish) => "{window}: {count} mensajes",
            (K::ProfileWindowLine, French) => "{window} : {count} messages",
            (K::ProfileWindowLine, German) => "{window}: {count} Nachrichten",

            (K::ProfileCategory, English) => "Category: {category}",
            (K::ProfileCategory, Spanish) => "Categoría: {category}",
            (K::ProfileCategory, French) => "Catégorie : {category}",
            (K::ProfileCategory, German) => "Kategorie: {category}",

            (K::ProfileLanguage, English) => "Language: {language}",
            (K::ProfileLanguage, Spanish) => "Idioma: {language}",
            (K::ProfileLanguage, French) => "Langue : {language}",
            (K::ProfileLanguage, German) => "Sprache: {language}",

            (K::FloodDetected, English) => "🚫 Spam detected! {name} is blocked for {minutes} minutes.",
            (K::FloodDetected, Spanish) => "🚫 ¡Spam detectado! {name} queda bloqueado durante {minutes} minutos.",
            (K::FloodDetected, French) => "🚫 Spam détecté ! {name} est bloqué pendant {minutes} minutes.",
            (K::FloodDetected, German) => "🚫 Spam erkannt! {name} ist für {minutes} Minuten gesperrt.",

            (K::StillBlocked, English) => "🚫 You are blocked for spam! Try again in {minutes} min.",
            (K::StillBlocked, Spanish) => "🚫 ¡Estás bloqueado por spam! Inténtalo de nuevo en {minutes} min.",
            (K::StillBlocked, French) => "🚫 Vous êtes bloqué pour spam ! Réessayez dans {minutes} min.",
            (K::StillBlocked, German) => "🚫 Du bist wegen Spam gesperrt! Versuche es in {minutes} Min. erneut.",

            (K::RetryLater, English) => "⚠️ Something went wrong, please try again later.",
            (K::RetryLater, Spanish) => "⚠️ Algo salió mal, inténtalo más tarde.",
            (K::RetryLater, French) => "⚠️ Une erreur est survenue, réessayez plus tard.",
            (K::RetryLater, German) => "⚠️ Etwas ist schiefgelaufen, bitte versuche es später erneut.",

            (K::LanguageUpdated, English) => "✅ Language set to {language}.",
            (K::LanguageUpdated, Spanish) => "✅ Idioma cambiado a {language}.",
            (K::LanguageUpdated, French) => "✅ Langue définie sur {language}.",
            (K::LanguageUpdated, German) => "✅ Sprache auf {language} gesetzt.",

            (K::CategoryUpdated, English) => "✅ Category set to {category}.",
            (K::CategoryUpdated, Spanish) => "✅ Categoría cambiada a {category}.",
            (K::CategoryUpdated, French) => "✅ Catégorie définie sur {category}.",
            (K::CategoryUpdated, German) => "✅ Kategorie auf {category} gesetzt.",

            (K::GroupOnly, English) => "This command only works inside a group.",
            (K::GroupOnly, Spanish) => "Este comando solo funciona dentro de un grupo.",
            (K::GroupOnly, French) => "Cette commande ne fonctionne que dans un groupe.",
            (K::GroupOnly, German) => "Dieser Befehl funktioniert nur in einer Gruppe.",

            (K::DataDeleted, English) => "🗑️ Your preferences have been deleted.",
            (K::DataDeleted, Spanish) => "🗑️ Tus preferencias han sido eliminadas.",
            (K::DataDeleted, French) => "🗑️ Vos préférences ont été supprimées.",
            (K::DataDeleted, German) => "🗑️ Deine Einstellungen wurden gelöscht.",

            (K::DataExportTitle, English) => "📦 Your stored data:",
            (K::DataExportTitle, Spanish) => "📦 Tus datos guardados:",
            (K::DataExportTitle, French) => "📦 Vos données enregistrées :",
            (K::DataExportTitle, German) => "📦 Deine gespeicherten Daten:",

            (K::NoStoredData, English) => "Nothing is stored about you.",
            (K::NoStoredData, Spanish) => "No hay nada guardado sobre ti.",
            (K::NoStoredData, French) => "Aucune donnée n'est enregistrée à votre sujet.",
            (K::NoStoredData, German) => "Über dich ist nichts gespeichert.",

            (K::SupportLink, English) => "Support",
            (K::SupportLink, Spanish) => "Soporte",
            (K::SupportLink, French) => "Assistance",
            (K::SupportLink, German) => "Hilfe",

            (K::UpdatesLink, English) => "Updates",
            (K::UpdatesLink, Spanish) => "Novedades",
            (K::UpdatesLink, French) => "Nouveautés",
            (K::UpdatesLink, German) => "Neuigkeiten",
        }
    }

    /// Gets a localized message.
    pub fn get(key: MessageKey, language: Language) -> String {
        Self::template(key, language).to_string()
    }

    /// Gets a localized message with `{name}` placeholders replaced.
    ///
    /// Placeholders without a matching argument are left untouched.
    pub fn get_with_args(key: MessageKey, language: Language, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(Self::template(key, language).to_string(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_plain_message() {
        assert_eq!(Messages::get(MessageKey::NoData, Language::English), "No data yet.");
        assert_eq!(Messages::get(MessageKey::WindowWeek, Language::German), "Diese Woche");
    }

    #[test]
    fn test_get_with_args_fills_placeholders() {
        let text = Messages::get_with_args(
            MessageKey::FloodDetected,
            Language::English,
            &[("name", "alice"), ("minutes", "20")],
        );
        assert_eq!(text, "🚫 Spam detected! alice is blocked for 20 minutes.");
    }

    #[test]
    fn test_missing_argument_is_left_in_place() {
        let text = Messages::get_with_args(MessageKey::TotalMessages, Language::English, &[]);
        assert_eq!(text, "Total messages: {total}");
    }
}
