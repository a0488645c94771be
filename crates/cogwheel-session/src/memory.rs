//! Memory game board.
//!
//! Tiles are addressed by column `x` and row `y`. The centre tile is always a
//! locked, non-playable slot; even-sized boards also lock the final slot so
//! the remaining tiles form whole pairs.

use crate::error::SessionError;
use crate::transition::{Step, Transition};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

/// Board sizes that can be played.
pub const BOARD_SIZES: [usize; 3] = [3, 4, 5];

/// Visible state of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    /// Face down and selectable.
    Concealed,
    /// Face up as the pending first pick.
    Revealed,
    /// Part of a found pair. Permanent.
    Matched,
    /// Face up as half of a mismatched pair, about to be turned back.
    Incorrect,
    /// Not part of the game.
    Locked,
}

/// One board slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile<V> {
    /// Hidden symbol; `None` only for locked slots.
    pub symbol: Option<V>,
    /// What the player currently sees.
    pub state: TileState,
}

impl<V> Tile<V> {
    /// Whether the symbol is visible.
    pub const fn is_face_up(&self) -> bool {
        matches!(
            self.state,
            TileState::Revealed | TileState::Matched | TileState::Incorrect
        )
    }
}

/// Memory game events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryEvent {
    /// Turn over the tile at column `x`, row `y`.
    Reveal {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },
    /// Turn a mismatched pair back face down.
    Settle,
}

/// A square memory game board.
#[derive(Debug, Clone)]
pub struct MemoryBoard<V> {
    size: usize,
    tiles: Vec<Tile<V>>,
    pending: Option<usize>,
    flashing: Option<(usize, usize)>,
    matches: usize,
    moves: u32,
    mismatch_delay: Duration,
    started_at: Instant,
    finished_at: Option<Instant>,
}

/// Number of pairs on a board of `size`.
pub const fn pairs_for(size: usize) -> usize {
    (size * size - 1) / 2
}

const fn locked_slots(size: usize) -> [Option<usize>; 2] {
    let center = (size / 2) * size + size / 2;
    if size % 2 == 0 {
        [Some(center), Some(size * size - 1)]
    } else {
        [Some(center), None]
    }
}

impl<V: Clone + PartialEq> MemoryBoard<V> {
    /// Deals a random board of `size` using distinct symbols drawn from `symbols`.
    pub fn generate<R>(
        size: usize,
        symbols: &[V],
        mismatch_delay: Duration,
        rng: &mut R,
    ) -> Result<Self, SessionError>
    where
        R: Rng + ?Sized,
    {
        if !BOARD_SIZES.contains(&size) {
            return Err(SessionError::InvalidBoardSize(size));
        }

        let pairs = pairs_for(size);
        if symbols.len() < pairs {
            return Err(SessionError::NotEnoughSymbols { needed: pairs });
        }

        let mut deck: Vec<V> = symbols
            .choose_multiple(rng, pairs)
            .flat_map(|symbol| [symbol.clone(), symbol.clone()])
            .collect();
        deck.shuffle(rng);

        let locked = locked_slots(size);
        let mut deck = deck.into_iter();
        let layout = (0..size * size)
            .map(|index| {
                if locked.contains(&Some(index)) {
                    None
                } else {
                    deck.next()
                }
            })
            .collect();

        Self::with_layout(size, layout, mismatch_delay)
    }

    /// Builds a board from an explicit row-major layout; `None` marks locked slots.
    pub fn with_layout(
        size: usize,
        layout: Vec<Option<V>>,
        mismatch_delay: Duration,
    ) -> Result<Self, SessionError> {
        if !BOARD_SIZES.contains(&size) {
            return Err(SessionError::InvalidBoardSize(size));
        }
        if layout.len() != size * size {
            return Err(SessionError::InvalidLayout(format!(
                "expected {} slots, got {}",
                size * size,
                layout.len()
            )));
        }

        let symbols: Vec<&V> = layout.iter().flatten().collect();
        if symbols.len() != pairs_for(size) * 2 {
            return Err(SessionError::InvalidLayout(format!(
                "expected {} playable slots, got {}",
                pairs_for(size) * 2,
                symbols.len()
            )));
        }
        if symbols
            .iter()
            .any(|s| symbols.iter().filter(|other| *other == s).count() != 2)
        {
            return Err(SessionError::InvalidLayout(
                "every symbol must appear exactly twice".to_string(),
            ));
        }

        let tiles = layout
            .into_iter()
            .map(|symbol| {
                let state = if symbol.is_some() {
                    TileState::Concealed
                } else {
                    TileState::Locked
                };
                Tile { symbol, state }
            })
            .collect();

        Ok(Self {
            size,
            tiles,
            pending: None,
            flashing: None,
            matches: 0,
            moves: 0,
            mismatch_delay,
            started_at: Instant::now(),
            finished_at: None,
        })
    }

    /// Restarts the clock, e.g. once the face-up preview is over.
    pub fn start_clock(&mut self) {
        self.started_at = Instant::now();
    }

    fn reveal(&mut self, x: usize, y: usize) -> Step<MemoryEvent> {
        if self.is_complete() || self.flashing.is_some() || x >= self.size || y >= self.size {
            return Step::ignore();
        }

        let index = y * self.size + x;
        if self.tiles[index].state != TileState::Concealed {
            return Step::ignore();
        }

        self.moves += 1;
        self.tiles[index].state = TileState::Revealed;

        let Some(first) = self.pending.take() else {
            self.pending = Some(index);
            return Step::render();
        };

        if self.tiles[first].symbol == self.tiles[index].symbol {
            self.tiles[first].state = TileState::Matched;
            self.tiles[index].state = TileState::Matched;
            self.matches += 1;

            if self.is_complete() {
                self.finished_at = Some(Instant::now());
                return Step::finish();
            }
            Step::render()
        } else {
            self.tiles[first].state = TileState::Incorrect;
            self.tiles[index].state = TileState::Incorrect;
            self.flashing = Some((first, index));
            Step::deferred(self.mismatch_delay, MemoryEvent::Settle)
        }
    }

    fn settle(&mut self) -> Step<MemoryEvent> {
        let Some((a, b)) = self.flashing.take() else {
            return Step::ignore();
        };
        self.tiles[a].state = TileState::Concealed;
        self.tiles[b].state = TileState::Concealed;
        Step::render()
    }
}

impl<V> MemoryBoard<V> {
    /// Side length.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Tile at column `x`, row `y`.
    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile<V>> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.tiles.get(y * self.size + x)
    }

    /// Rows of tiles, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile<V>]> {
        self.tiles.chunks(self.size)
    }

    /// Pairs found so far.
    pub const fn matches(&self) -> usize {
        self.matches
    }

    /// Pairs on the board.
    pub const fn pairs(&self) -> usize {
        pairs_for(self.size)
    }

    /// Tiles turned over so far.
    pub const fn moves(&self) -> u32 {
        self.moves
    }

    /// Whether every pair has been found.
    pub const fn is_complete(&self) -> bool {
        self.matches == pairs_for(self.size)
    }

    /// Time from the start of play until completion (or until now).
    pub fn elapsed(&self) -> Duration {
        self.finished_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.started_at)
    }
}

impl<V: Clone + PartialEq> Transition for MemoryBoard<V> {
    type Event = MemoryEvent;

    fn apply(&mut self, event: Self::Event) -> Step<Self::Event> {
        match event {
            MemoryEvent::Reveal { x, y } => self.reveal(x, y),
            MemoryEvent::Settle => self.settle(),
        }
    }
}
