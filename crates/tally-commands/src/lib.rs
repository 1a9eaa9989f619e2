//! # Tally Commands
//!
//! Discord command implementations using Poise framework for Tally Bot.
//!
//! This crate wires the activity tracker into the gateway message stream
//! and exposes leaderboards, profiles, and settings as slash and prefix
//! commands.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod args;
pub mod events;
pub mod framework;
pub mod my_top;
pub mod notifier;
pub mod profile;
pub mod rankings;
pub mod render;
pub mod settings;
pub mod start;
pub mod top_users;

pub use framework::*;
pub use notifier::SerenityNotifier;
