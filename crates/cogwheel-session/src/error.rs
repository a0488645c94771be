//! Errors raised while constructing session payloads.

use cogwheel_common::CogwheelError;
use thiserror::Error;

/// Failures that prevent a session from being created.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Memory boards only come in 3x3, 4x4 and 5x5.
    #[error("Invalid board size. Please choose 3, 4, or 5.")]
    InvalidBoardSize(usize),

    /// Too few distinct symbols to fill the board with pairs.
    #[error("Not enough custom emojis in the server! You need at least {needed}.")]
    NotEnoughSymbols {
        /// Distinct symbols the board needs.
        needed: usize,
    },

    /// A hand-built layout does not describe a playable board.
    #[error("Invalid board layout: {0}")]
    InvalidLayout(String),

    /// A question must offer between two and four choices.
    #[error("A question needs between 2 and 4 choices, got {0}")]
    InvalidQuestion(usize),
}

impl From<SessionError> for CogwheelError {
    fn from(err: SessionError) -> Self {
        Self::validation(err.to_string())
    }
}
