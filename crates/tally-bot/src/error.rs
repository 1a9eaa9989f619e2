//! Application-wide error types using thiserror.

use poise::serenity_prelude as serenity;
use tally_common::TallyError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Configuration or storage error raised by the workspace crates.
    #[error("{0}")]
    Tally(#[from] TallyError),

    /// Discord/Serenity error.
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// Poise framework error.
    #[error("Framework error: {0}")]
    Framework(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    /// Whether the error came from a persistence layer.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Tally(e) if e.is_storage())
    }
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;
