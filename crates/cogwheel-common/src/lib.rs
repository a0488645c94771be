//! # Cogwheel Common
//!
//! Shared types, utilities, and common functionality for Cogwheel.
//!
//! This crate provides the identifiers, error taxonomy, logging bootstrap and
//! text helpers used across all other crates in the Cogwheel workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{CogwheelError, Result};
pub use logging::{init_logging, LoggingConfig};
pub use types::*;
pub use utils::*;
