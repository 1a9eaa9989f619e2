//! # Tally Bot
//!
//! Discord bot that counts group messages, blocks flooders, and answers
//! leaderboard commands over today, this week, and all time.
//!
//! This is the main binary crate that wires storage, the admission pipeline,
//! and the Poise framework together.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod error;

pub use bot::*;
pub use error::*;
