//! # Cogwheel Session
//!
//! The interactive session core shared by every paginated or game-like
//! command in Cogwheel.
//!
//! A [`Session`] owns one user's in-progress exchange with a feature. Input
//! events flow through the [`InputGate`], re-arm the [`ExpiryTimer`] and are
//! folded into the payload by its [`Transition`] implementation. Rendering and
//! ephemeral notices are boundary calls behind the [`Renderer`] and
//! [`Notifier`] traits, driven by [`SessionDriver`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod driver;
pub mod error;
pub mod gate;
pub mod memory;
pub mod pager;
pub mod registry;
pub mod session;
pub mod timer;
pub mod transition;
pub mod trivia;

pub use driver::{Frame, KeepAlive, Notifier, Renderer, SessionDriver};
pub use error::SessionError;
pub use gate::{Input, InputGate};
pub use memory::{MemoryBoard, MemoryEvent, Tile, TileState};
pub use pager::{Pager, PagerEvent};
pub use registry::{Lease, SessionRegistry};
pub use session::{Feature, Session, SessionId, TerminalReason};
pub use timer::{ExpiryTimer, TimerState};
pub use transition::{Directive, Step, Transition};
pub use trivia::{Letter, Question, Trivia, TriviaEvent, TriviaPhase};
