//! # Cogwheel Config
//!
//! Type-safe configuration management for Cogwheel.
//!
//! This crate provides configuration loading from YAML with environment
//! variable overrides, validation, and a lock-free cache for readers.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod defaults;
pub mod loader;
pub mod schema;

pub use cache::*;
pub use loader::*;
pub use schema::*;
