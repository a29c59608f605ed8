use core::fmt;
use serde::{Deserialize, Serialize};

pub use card::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use generator::*;
pub use grid::*;
pub use persistence::*;
pub use resolver::*;
pub use schedule::*;
pub use snapshot::*;
pub use state::*;
pub use storage::*;
pub use types::*;

pub mod level;

mod card;
mod config;
mod engine;
mod error;
mod events;
mod generator;
mod grid;
mod persistence;
mod resolver;
mod schedule;
mod snapshot;
mod state;
mod storage;
mod types;

/// Smallest side accepted for manually sized grids.
pub const MIN_SIDE: Coord = 2;
/// Largest side accepted for manually sized grids.
pub const MAX_SIDE: Coord = 6;

/// Grid dimensions in cards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub rows: Coord,
    pub columns: Coord,
}

impl GridSize {
    pub const fn new_unchecked(rows: Coord, columns: Coord) -> Self {
        Self { rows, columns }
    }

    pub fn new(rows: Coord, columns: Coord) -> Self {
        let rows = rows.clamp(MIN_SIDE, MAX_SIDE);
        let columns = columns.clamp(MIN_SIDE, MAX_SIDE);
        Self::new_unchecked(rows, columns)
    }

    pub const fn total_cards(&self) -> CardCount {
        mult(self.rows, self.columns)
    }

    pub const fn total_pairs(&self) -> CardCount {
        self.total_cards() / 2
    }

    pub const fn is_even(&self) -> bool {
        self.total_cards() % 2 == 0
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}

/// Outcome of a flip request
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Card unknown, not flippable, or two cards already in flight
    Ignored,
    /// Card is turning over and will be revealed once the clock reaches it
    Flipped,
}

impl FlipOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        match self {
            Self::Ignored => false,
            Self::Flipped => true,
        }
    }
}
