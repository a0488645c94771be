//! # Cogwheel Commands
//!
//! Poise commands for Cogwheel and the Discord side of interactive
//! sessions: renderers, notifiers and the component pump that feeds a
//! session driver.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod about;
pub mod anilist;
pub mod context;
pub mod discord;
pub mod help;
pub mod memory;
pub mod trivia;
pub mod welcome;

pub use context::{create_command_context, CommandContext, CommandError, Context};

/// Every command the bot registers.
pub fn all_commands() -> Vec<poise::Command<CommandContext, CommandError>> {
    vec![
        help::help(),
        trivia::trivia(),
        memory::memorygame(),
        anilist::anilist(),
        anilist::anilist_compare(),
        anilist::anilist_logout(),
        welcome::welcome_channel(),
        welcome::welcome_message(),
        welcome::welcome_test(),
        about::about(),
    ]
}
