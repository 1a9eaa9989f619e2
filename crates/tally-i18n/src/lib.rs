//! # Tally I18n
//!
//! Closed language and category enums with a typed message catalogue for
//! Tally Bot.
//!
//! Locales are a fixed enum rather than runtime dictionaries, so every
//! message is guaranteed to exist in every supported language.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod category;
pub mod locale;
pub mod messages;

pub use category::*;
pub use locale::*;
pub use messages::*;
