//! # Cogwheel Bot
//!
//! Discord bot with a paginated help menu, trivia, a memory game, AniList
//! profiles and per-guild welcome messages.
//!
//! This is the binary crate that wires configuration, storage and the poise
//! framework together and owns the process lifecycle.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod cli;
pub mod error;

pub use bot::*;
pub use cli::Args;
pub use error::*;
