//! # Tally Config
//!
//! Type-safe configuration management for Tally Bot.
//!
//! This crate provides the configuration schema, its defaults and
//! validation, and YAML loading with environment overrides.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::*;
pub use schema::*;
